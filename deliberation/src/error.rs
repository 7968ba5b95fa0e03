use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::Response;
use std::io::Cursor;

pub type DeliberationResult<T> = Result<T, DeliberationError>;

/// Everything a handler can fail with once the request guards have passed.
#[derive(thiserror::Error, Debug)]
pub enum DeliberationError {
    #[error("Object not found")]
    NotFound,

    #[error("Malformed form submission")]
    Malformed,

    #[error("Invalid form submission")]
    Invalid(#[from] ::validator::ValidationErrors),

    #[error("Database error: {0}")]
    Database(#[from] ::diesel::result::Error),

    #[error("Could not render template: {0}")]
    Template(#[from] ::handlebars::RenderError),
}

impl DeliberationError {
    pub fn status(&self) -> Status {
        match self {
            DeliberationError::NotFound => Status::NotFound,
            DeliberationError::Malformed => Status::BadRequest,
            DeliberationError::Invalid(_) => Status::BadRequest,
            DeliberationError::Database(::diesel::result::Error::NotFound) => Status::NotFound,
            DeliberationError::Database(_) => Status::InternalServerError,
            DeliberationError::Template(_) => Status::InternalServerError,
        }
    }
}

impl<'r> Responder<'r, 'static> for DeliberationError {
    fn respond_to(self, request: &'r rocket::Request<'_>) -> rocket::response::Result<'static> {
        let status = self.status();
        if status == Status::InternalServerError {
            log::error!("{} {} failed: {}", request.method(), request.uri(), self);
        }

        let body: String = ::serde_json::json!({
            "error": status.code,
        })
        .to_string();
        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_rows_are_not_found() {
        let err: DeliberationError = ::diesel::result::Error::NotFound.into();
        assert_eq!(err.status(), Status::NotFound);
        assert_eq!(DeliberationError::NotFound.status(), Status::NotFound);
    }

    #[test]
    fn validation_failures_are_bad_requests() {
        let err: DeliberationError = ::validator::ValidationErrors::new().into();
        assert_eq!(err.status(), Status::BadRequest);
    }

    #[test]
    fn other_database_errors_are_internal() {
        let err: DeliberationError = ::diesel::result::Error::RollbackTransaction.into();
        assert_eq!(err.status(), Status::InternalServerError);
    }
}
