//! Basic cerror example
//!
//! Walks through construction, wrapping, tags, typed values, identity
//! matching, builders and aggregates.
//!
//! # Environment Variables
//!
//! - `CERROR_CAPTURE_STACK=0` - Disable stack capture
//! - `CERROR_MAX_FRAMES=<n>` - Frames kept per error (default 32)

use cerror::prelude::*;
use cerror::{append, chain, Builder};
use serde::Serialize;

const NOT_FOUND: Tag = Tag::new("not_found");
const INVALID_INPUT: Tag = Tag::new("invalid_input");

#[derive(Debug, Serialize)]
struct Request {
    method: &'static str,
    path: String,
}

const REQUEST: TypedKey<Request> = TypedKey::new("request");
const USER_ID: TypedKey<u64> = TypedKey::new("user_id");

fn user_not_found() -> CError {
    CError::new("user not found", [id("E_USER_NOT_FOUND")])
}

fn find_user(user_id: u64) -> CResult<String> {
    if user_id == 0 {
        return Err(CError::new(
            "user not found",
            [id("E_USER_NOT_FOUND"), typed_value(&USER_ID, user_id), tag(NOT_FOUND)],
        ));
    }
    Ok(format!("user-{}", user_id))
}

fn handle(path: &str, user_id: u64) -> CResult<String> {
    find_user(user_id).map_err(|e| {
        CError::wrap(
            e,
            "handler error",
            [
                value("user_id", user_id),
                typed_value(&REQUEST, Request { method: "GET", path: path.to_string() }),
            ],
        )
    })
}

fn validate(name: &str, email: &str) -> Option<Errors> {
    let mut errs = None;
    if name.is_empty() {
        errs = append!(errs, CError::new("name is required", [tag(INVALID_INPUT)]));
    }
    if !email.contains('@') {
        errs = append!(errs, CError::new("email is invalid", [value("email", email.to_string()), tag(INVALID_INPUT)]));
    }
    errs
}

fn main() {
    println!("=== cerror Basic Example ===\n");

    // Wrapping and merged context
    let err = match handle("/users/0", 0) {
        Ok(user) => {
            println!("found {}", user);
            return;
        }
        Err(e) => e,
    };
    println!("message:  {}", err);
    println!("tags:     {:?}", err.tags());
    for (key, value) in err.values() {
        println!("value:    {} = {}", key, value);
    }
    if let Some(user_id) = err.typed_value(&USER_ID) {
        println!("user_id:  {}", user_id);
    }
    if let Some(request) = err.typed_value(&REQUEST) {
        println!("request:  {} {}", request.method, request.path);
    }

    // Identity matching across independent chains
    let sentinel = user_not_found();
    println!("\nis user_not_found: {}", chain::is(&err, &sentinel));
    println!("has not_found tag: {}", err.has_tag(&NOT_FOUND));

    // Builder
    let request_scope = Builder::new([value("request_id", "r-42"), value("route", "/orders")]);
    let order_err = request_scope.error("order rejected", [value("order_id", 1001)]);
    println!("\nbuilder error: {} {:?}", order_err, order_err.values().keys().collect::<Vec<_>>());

    // Attach context to an existing error without changing its message
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied");
    let annotated = with(io_err, [value("path", "/var/lib/app")]);
    println!("with:          {} {:?}", annotated, annotated.values().keys().collect::<Vec<_>>());

    // Aggregates
    let errs = validate("", "nobody");
    println!("\nvalidation ({} errors):\n{}", errs.len(), errs.message());
    println!("has invalid_input: {}", errs.has_tag(&INVALID_INPUT));
    println!("valid input: {}", validate("ada", "ada@example.com").is_empty());

    // Detailed report
    println!("\n{:?}", err);

    println!("=== Example Complete ===");
}
