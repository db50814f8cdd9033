use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;

use crate::{db::models::Account, names, rejections::AppError, utils, AppState};

/// Extracts whether the request is an HTMX request by checking the `HX-Request` header.
pub struct IsHtmx(pub bool);

impl<S: Send + Sync> FromRequestParts<S> for IsHtmx {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_htmx = parts
            .headers
            .get("HX-Request")
            .and_then(|v: &axum::http::HeaderValue| v.to_str().ok())
            .is_some_and(|v| v == "true");
        Ok(IsHtmx(is_htmx))
    }
}

/// The player context carried in cookies: display name, stable id, attempt
/// token, and UI preferences. A fresh browser has none of it.
pub struct Player {
    pub name: Option<String>,
    pub public_id: Option<String>,
    pub attempt_token: Option<String>,
    pub last_score: Option<u32>,
    pub dark_mode: bool,
}

impl<S: Send + Sync> FromRequestParts<S> for Player {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let name = jar
            .get(names::PLAYER_NAME_COOKIE_NAME)
            .map(|c| utils::decode_cookie_value(c.value()))
            .filter(|v| !v.is_empty());
        let public_id = jar
            .get(names::PLAYER_ID_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty());
        let attempt_token = jar
            .get(names::ATTEMPT_COOKIE_NAME)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty());
        let last_score = jar
            .get(names::LAST_SCORE_COOKIE_NAME)
            .and_then(|c| c.value().parse().ok());
        let dark_mode = jar
            .get(names::DARK_MODE_COOKIE_NAME)
            .is_some_and(|c| c.value() == "on");

        Ok(Player {
            name,
            public_id,
            attempt_token,
            last_score,
            dark_mode,
        })
    }
}

/// Guard extractor that verifies the session cookie against the database.
/// Carries the authenticated account for use in handlers.
pub struct AuthGuard(pub Account);

impl FromRequestParts<AppState> for AuthGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        if let Some(session_id) = jar
            .get(names::SESSION_COOKIE_NAME)
            .map(|c| c.value().to_string())
        {
            if let Ok(Some(account)) = state.db.account_by_session(&session_id).await {
                return Ok(AuthGuard(account));
            }
        }

        Err(AppError::Unauthorized)
    }
}

/// Like [`AuthGuard`], but additionally requires the admin flag. Signed-in
/// non-admins get 403 instead of 401.
pub struct AdminGuard(pub Account);

impl FromRequestParts<AppState> for AdminGuard {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthGuard(account) = AuthGuard::from_request_parts(parts, state).await?;

        if !account.is_admin {
            return Err(AppError::Forbidden);
        }

        Ok(AdminGuard(account))
    }
}
