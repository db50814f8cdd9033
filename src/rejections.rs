use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use maud::html;

use crate::{names, views};

/// Handler-boundary error. Internal failures are logged where they happen
/// (via [`ResultExt`]) and surfaced to the user as a short message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppError {
    Internal(&'static str),
    Input(&'static str),
    Unauthorized,
    Forbidden,
    NotFound,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
            AppError::Input(m) => (StatusCode::BAD_REQUEST, m),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "you need to sign in first"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "you do not have access to this page"),
            AppError::NotFound => (StatusCode::NOT_FOUND, "nothing to see here"),
        };

        let body = views::page(
            "Error",
            html! {
                article {
                    h2 { (message) }
                    @if self == AppError::Unauthorized {
                        p { a href=(names::ADMIN_LOGIN_URL) { "Sign in" } }
                    } @else {
                        p { a href=(names::HOME_URL) { "Back to the quiz" } }
                    }
                }
            },
            false,
        );

        (status, body).into_response()
    }
}

/// Convert internal errors into [`AppError`]s, logging the cause.
pub trait ResultExt<T> {
    /// Log the error and reply 500 with `msg`.
    fn reject(self, msg: &'static str) -> Result<T, AppError>;
    /// Log the error and reply 400 with `msg`, for failures the caller can fix.
    fn reject_input(self, msg: &'static str) -> Result<T, AppError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn reject(self, msg: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::error!(error = %e, "{msg}");
            AppError::Internal(msg)
        })
    }

    fn reject_input(self, msg: &'static str) -> Result<T, AppError> {
        self.map_err(|e| {
            tracing::warn!(error = %e, "{msg}");
            AppError::Input(msg)
        })
    }
}
