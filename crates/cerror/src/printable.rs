//! Serializable projection of an error chain.
//!
//! `CError` and `Errors` implement [`serde::Serialize`] through these types:
//!
//! ```json
//! {
//!   "message": "handler error",
//!   "id": "",
//!   "stacktrace": [{"func": "app::handle", "file": "src/app.rs", "line": 42}],
//!   "cause": {"message": "fail", "...": "..."},
//!   "values": {"user": "alice"},
//!   "typed_values": {},
//!   "tags": ["not_found"]
//! }
//! ```

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::chain;
use crate::error::CError;
use crate::errors::Errors;
use crate::stack::Frame;
use crate::value::Values;

/// Owned snapshot of a `CError` with merged context.
#[derive(Debug, Clone, Serialize)]
pub struct Printable {
    pub message: String,
    pub id: String,
    pub stacktrace: Vec<Frame>,
    pub cause: Option<PrintableCause>,
    pub values: Values,
    pub typed_values: Values,
    pub tags: Vec<String>,
}

/// A cause is projected in full while it is a `CError`, otherwise as its
/// message.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PrintableCause {
    Error(Box<Printable>),
    Message(String),
}

impl CError {
    pub fn printable(&self) -> Printable {
        let cause = match (self.cause_cerror(), self.cause()) {
            (Some(own), _) => Some(PrintableCause::Error(Box::new(own.printable()))),
            (None, Some(foreign)) => Some(PrintableCause::Message(foreign.to_string())),
            (None, None) => None,
        };
        Printable {
            message: self.message().to_string(),
            id: self.id().to_string(),
            stacktrace: self.stacks().to_vec(),
            cause,
            values: self.values(),
            typed_values: self.typed_values(),
            tags: self.tags(),
        }
    }
}

impl Serialize for CError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.printable().serialize(serializer)
    }
}

/// One aggregate member: a `Printable` if its chain holds a `CError`,
/// otherwise its message.
#[derive(Serialize)]
#[serde(untagged)]
enum Member {
    Error(Printable),
    Message(String),
}

impl Serialize for Errors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let members: Vec<Member> = self
            .iter()
            .map(|err| match chain::unwrap(&**err) {
                Some(own) => Member::Error(own.printable()),
                None => Member::Message(err.to_string()),
            })
            .collect();
        let mut state = serializer.serialize_struct("Errors", 1)?;
        state.serialize_field("errors", &members)?;
        state.end()
    }
}
