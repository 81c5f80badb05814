//! Static error catalog. Each entry fixes the status, title and code of one
//! problem type; handlers only supply the occurrence detail.
use http::StatusCode;

use crate::problem::Problem;

/// Static error definition from catalog
#[derive(Debug, Clone, Copy)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    /// Convert this error definition into a Problem with the given detail
    #[inline]
    pub fn to_problem(&self, detail: impl Into<String>) -> Problem {
        Problem::new(
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            self.title,
            detail.into(),
        )
        .with_code(self.code)
        .with_type(self.type_url)
    }
}

macro_rules! err_def {
    ($name:ident, $status:expr, $title:expr, $code:literal) => {
        pub const $name: ErrDef = ErrDef {
            status: $status,
            title: $title,
            code: $code,
            type_url: concat!("https://errors.krydd.app/", $code),
        };
    };
}

err_def!(VALIDATION_FAILED, 400, "Validation Failed", "VALIDATION_ERROR");
err_def!(BAD_REQUEST, 400, "Bad Request", "BAD_REQUEST");
err_def!(INVALID_CURSOR, 400, "Invalid Cursor", "INVALID_CURSOR");
err_def!(NOT_FOUND, 404, "Not Found", "NOT_FOUND");
err_def!(CONFLICT, 409, "Conflict", "CONFLICT");
err_def!(
    INTERNAL,
    500,
    "Internal Server Error",
    "INTERNAL_ERROR"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn err_def_to_problem_works() {
        let problem = NOT_FOUND.to_problem("Recipe 'r1' not found");
        assert_eq!(problem.status, 404);
        assert_eq!(problem.title, "Not Found");
        assert_eq!(problem.detail, "Recipe 'r1' not found");
        assert_eq!(problem.code, "NOT_FOUND");
        assert_eq!(problem.type_url, "https://errors.krydd.app/NOT_FOUND");
    }

    #[test]
    fn catalog_statuses() {
        assert_eq!(VALIDATION_FAILED.status, 400);
        assert_eq!(INVALID_CURSOR.status, 400);
        assert_eq!(CONFLICT.status, 409);
        assert_eq!(INTERNAL.status, 500);
    }
}
