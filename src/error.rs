use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::db::DatabaseError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(DatabaseError::from(err))
    }
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    status: u16,
    title: &'a str,
    details: &'a str,
}

impl AppError {
    pub fn status_and_title(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Database(err) => match err {
                DatabaseError::NotFound => (StatusCode::NOT_FOUND, "Resource not found"),
                DatabaseError::Duplicate(_) => (StatusCode::CONFLICT, "Resource already exists"),
                DatabaseError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "Invalid input data"),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred",
                ),
            },
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, "Resource not found"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad request"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, title) = self.status_and_title();

        // Server-side failures are logged but not echoed back.
        let details = if status.is_server_error() {
            error!(error = %self, "Request failed");
            String::new()
        } else {
            self.to_string()
        };

        let page = ErrorTemplate {
            status: status.as_u16(),
            title,
            details: &details,
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                error!("Failed to render error page: {}", e);
                (status, title).into_response()
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_errors_map_to_http_statuses() {
        let cases = [
            (AppError::from(DatabaseError::NotFound), StatusCode::NOT_FOUND),
            (
                AppError::from(DatabaseError::Duplicate("slug".into())),
                StatusCode::CONFLICT,
            ),
            (
                AppError::from(DatabaseError::InvalidInput("fk".into())),
                StatusCode::BAD_REQUEST,
            ),
            (AppError::from(sqlx::Error::PoolTimedOut), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status_and_title().0, expected, "{err}");
        }
    }

    #[test]
    fn request_errors_map_to_client_statuses() {
        assert_eq!(
            AppError::NotFound("Topic 9.9".into()).status_and_title(),
            (StatusCode::NOT_FOUND, "Resource not found")
        );
        assert_eq!(
            AppError::BadRequest("Unknown location: attic".into()).status_and_title(),
            (StatusCode::BAD_REQUEST, "Bad request")
        );
    }

    #[test]
    fn row_not_found_is_a_not_found() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert_eq!(err.status_and_title().0, StatusCode::NOT_FOUND);
    }
}
