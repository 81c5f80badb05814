use axum::extract::{FromRequest, FromRequestParts};
use krydd_http::ProblemResponse;

/// `Json` whose rejection renders as a 400 problem.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ProblemResponse))]
pub struct ApiJson<T>(pub T);

/// `Query` whose rejection renders as a 400 problem.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ProblemResponse))]
pub struct ApiQuery<T>(pub T);
