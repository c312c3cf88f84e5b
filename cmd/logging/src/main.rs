//! Structured logging example
//!
//! Emits an error through `tracing` with a JSON subscriber, then prints the
//! JSON projection of the same error and of an aggregate.
//!
//! # Environment Variables
//!
//! - `RUST_LOG=debug` - Also show cerror's configuration event

use cerror::{join, log, value, CError, CResult, ResultExt};
use tracing_subscriber::EnvFilter;

fn validate(input: &str) -> CResult<()> {
    if input != "OK" {
        let runtime = std::io::Error::new(std::io::ErrorKind::InvalidInput, "runtime error");
        return Err(CError::wrap(runtime, "invalid input", [value("input", input.to_string())]));
    }
    Ok(())
}

fn some_action(input: &str) -> CResult<()> {
    validate(input).wrap_err("failed validation")
}

fn main() {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let Err(err) = some_action("ng") else {
        return;
    };

    log::log_error("fail some_action", &err);

    match serde_json::to_string_pretty(&err) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("serialize failed: {}", e),
    }

    let errs = join!(err, CError::new("second failure", [value("attempt", 2)]));
    if let Some(errs) = errs {
        tracing::warn!(errors = %errs.log_value(), "batch had failures");
        match serde_json::to_string(&errs) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("serialize failed: {}", e),
        }
    }
}
