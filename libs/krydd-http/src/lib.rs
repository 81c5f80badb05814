//! HTTP plumbing shared by the Krydd handlers: RFC 9457 problems, the static
//! error catalog and the `{ success, data, nextCursor }` response envelope.

pub mod catalog;
pub mod envelope;
pub mod problem;

pub use catalog::ErrDef;
pub use envelope::{created, ok, ok_message, ok_page, ApiEnvelope};
pub use problem::{Problem, ProblemResponse, ValidationError, APPLICATION_PROBLEM_JSON};
