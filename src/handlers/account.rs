use axum::{
    extract::{Path, Query, State},
    http::{
        header::{LOCATION, SET_COOKIE},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use maud::Markup;
use serde::Deserialize;
use ulid::Ulid;

use crate::extractors::{AuthGuard, IsHtmx, Player};
use crate::federated::Provider;
use crate::rejections::{AppError, ResultExt};
use crate::services::auth::{
    ChangePasswordOutcome, LoginOutcome, RegisterOutcome, ResetPasswordOutcome,
};
use crate::views::account as account_views;
use crate::{names, utils, views, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::ADMIN_LOGIN_URL, get(login_page).post(login_post))
        .route(
            names::ADMIN_REGISTER_URL,
            get(register_page).post(register_post),
        )
        .route(names::ADMIN_LOGOUT_URL, post(logout_post))
        .route(
            names::ADMIN_FORGOT_PASSWORD_URL,
            get(forgot_password_page).post(forgot_password_post),
        )
        .route("/admin/reset-password/{token}", get(reset_password_page))
        .route(names::ADMIN_RESET_PASSWORD_URL, post(reset_password_post))
        .route(
            names::ADMIN_CHANGE_PASSWORD_URL,
            get(change_password_page).post(change_password_post),
        )
        .route("/admin/auth/{provider}", get(federated_start))
        .route("/admin/auth/{provider}/callback", get(federated_callback))
}

/// The external providers worth showing a button for.
fn configured_providers(state: &AppState) -> Vec<Provider> {
    Provider::ALL
        .into_iter()
        .filter(|p| state.federated.is_configured(*p))
        .collect()
}

async fn login_page(
    State(state): State<AppState>,
    IsHtmx(is_htmx): IsHtmx,
    player: Player,
) -> Markup {
    let providers = configured_providers(&state);
    views::render(
        is_htmx,
        "Sign in",
        account_views::login(account_views::LoginState::NoError, &providers),
        player.dark_mode,
    )
}

#[derive(Deserialize)]
struct LoginPost {
    email: String,
    password: String,
}

async fn login_post(
    State(state): State<AppState>,
    Json(body): Json<LoginPost>,
) -> Result<Response, AppError> {
    let outcome = state
        .auth
        .login(&body.email, &body.password)
        .await
        .reject("login failed")?;

    match outcome {
        LoginOutcome::Success(session_token) => {
            let cookie = utils::cookie(
                names::SESSION_COOKIE_NAME,
                &session_token,
                names::SESSION_COOKIE_MAX_AGE,
                state.secure_cookies,
            )
            .reject("could not build the session cookie")?;
            let mut headers = HeaderMap::new();
            headers.insert(SET_COOKIE, cookie);
            headers.insert("HX-Redirect", HeaderValue::from_static(names::ADMIN_URL));
            Ok((headers, "").into_response())
        }
        LoginOutcome::InvalidCredentials => {
            let providers = configured_providers(&state);
            Ok(views::titled(
                "Sign in",
                account_views::login(account_views::LoginState::IncorrectPassword, &providers),
            )
            .into_response())
        }
    }
}

async fn register_page(IsHtmx(is_htmx): IsHtmx, player: Player) -> Markup {
    views::render(
        is_htmx,
        "Register",
        account_views::register(account_views::RegisterState::NoError),
        player.dark_mode,
    )
}

#[derive(Deserialize)]
struct RegisterPost {
    email: String,
    display_name: String,
    password: String,
}

async fn register_post(
    State(state): State<AppState>,
    Json(body): Json<RegisterPost>,
) -> Result<Response, AppError> {
    let outcome = state
        .auth
        .register(&body.email, &body.password, &body.display_name)
        .await
        .reject("registration failed")?;

    let register_state = match outcome {
        RegisterOutcome::LoggedIn(session_token) => {
            let cookie = utils::cookie(
                names::SESSION_COOKIE_NAME,
                &session_token,
                names::SESSION_COOKIE_MAX_AGE,
                state.secure_cookies,
            )
            .reject("could not build the session cookie")?;
            let mut headers = HeaderMap::new();
            headers.insert(SET_COOKIE, cookie);
            headers.insert("HX-Redirect", HeaderValue::from_static(names::ADMIN_URL));
            return Ok((headers, "").into_response());
        }
        RegisterOutcome::EmptyFields => account_views::RegisterState::EmptyFields,
        RegisterOutcome::EmailTaken => account_views::RegisterState::EmailTaken,
        RegisterOutcome::WeakPassword => account_views::RegisterState::WeakPassword,
    };

    Ok(views::titled("Register", account_views::register(register_state)).into_response())
}

async fn logout_post(
    jar: CookieJar,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(session_id) = jar
        .get(names::SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
    {
        let _ = state.auth.logout(&session_id).await;
    }

    let clear = utils::clear_cookie(names::SESSION_COOKIE_NAME, state.secure_cookies)
        .reject("could not build the clear cookie")?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, clear);
    headers.insert(
        "HX-Redirect",
        HeaderValue::from_static(names::ADMIN_LOGIN_URL),
    );

    Ok((headers, ""))
}

async fn forgot_password_page(IsHtmx(is_htmx): IsHtmx, player: Player) -> Markup {
    views::render(
        is_htmx,
        "Forgot password",
        account_views::forgot_password(account_views::ForgotPasswordState::NoError),
        player.dark_mode,
    )
}

#[derive(Deserialize)]
struct ForgotPasswordPost {
    email: String,
}

async fn forgot_password_post(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordPost>,
) -> Result<Response, AppError> {
    let sent = state
        .auth
        .forgot_password(&body.email)
        .await
        .reject("could not process the password reset")?;

    let fp_state = if sent {
        account_views::ForgotPasswordState::EmailSent
    } else {
        account_views::ForgotPasswordState::EmailNotConfigured
    };

    Ok(views::titled("Forgot password", account_views::forgot_password(fp_state)).into_response())
}

async fn reset_password_page(
    State(state): State<AppState>,
    IsHtmx(is_htmx): IsHtmx,
    player: Player,
    Path(token): Path<String>,
) -> Result<Markup, AppError> {
    let valid = state
        .auth
        .validate_reset_token(&token)
        .await
        .reject("could not validate the reset token")?;

    let rp_state = if valid {
        account_views::ResetPasswordState::Form
    } else {
        account_views::ResetPasswordState::InvalidToken
    };
    let token_str = if valid { token.as_str() } else { "" };

    Ok(views::render(
        is_htmx,
        "Reset password",
        account_views::reset_password(rp_state, token_str),
        player.dark_mode,
    ))
}

#[derive(Deserialize)]
struct ResetPasswordPost {
    token: String,
    password: String,
}

async fn reset_password_post(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordPost>,
) -> Result<Response, AppError> {
    let outcome = state
        .auth
        .reset_password(&body.token, &body.password)
        .await
        .reject("could not reset the password")?;

    let (rp_state, token_str) = match outcome {
        ResetPasswordOutcome::Success => (account_views::ResetPasswordState::Success, ""),
        ResetPasswordOutcome::EmptyPassword => (
            account_views::ResetPasswordState::EmptyPassword,
            body.token.as_str(),
        ),
        ResetPasswordOutcome::WeakPassword => (
            account_views::ResetPasswordState::WeakPassword,
            body.token.as_str(),
        ),
        ResetPasswordOutcome::InvalidToken => (account_views::ResetPasswordState::InvalidToken, ""),
    };

    Ok(
        views::titled(
            "Reset password",
            account_views::reset_password(rp_state, token_str),
        )
        .into_response(),
    )
}

async fn change_password_page(
    AuthGuard(account): AuthGuard,
    IsHtmx(is_htmx): IsHtmx,
    player: Player,
) -> Markup {
    views::render(
        is_htmx,
        "Your account",
        account_views::change_password(&account, account_views::ChangePasswordState::NoError),
        player.dark_mode,
    )
}

#[derive(Deserialize)]
struct ChangePasswordPost {
    current_password: String,
    new_password: String,
}

async fn change_password_post(
    AuthGuard(account): AuthGuard,
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordPost>,
) -> Result<Response, AppError> {
    let outcome = state
        .auth
        .change_password(account.id, &body.current_password, &body.new_password)
        .await
        .reject("could not change the password")?;

    let pw_state = match outcome {
        ChangePasswordOutcome::Success => account_views::ChangePasswordState::Success,
        ChangePasswordOutcome::EmptyFields => account_views::ChangePasswordState::EmptyFields,
        ChangePasswordOutcome::WeakPassword => account_views::ChangePasswordState::WeakPassword,
        ChangePasswordOutcome::IncorrectPassword => {
            account_views::ChangePasswordState::IncorrectPassword
        }
    };

    Ok(
        views::titled(
            "Your account",
            account_views::change_password(&account, pw_state),
        )
        .into_response(),
    )
}

async fn federated_start(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Response, AppError> {
    let provider = Provider::from_slug(&provider).ok_or(AppError::NotFound)?;

    let oauth_state = Ulid::new().to_string();
    // None when the provider has no credentials; there is no button for it
    // either, so a plain 404 will do.
    let url = state
        .federated
        .authorize_url(provider, &oauth_state)
        .ok_or(AppError::NotFound)?;

    let state_cookie = utils::lax_cookie(
        names::OAUTH_STATE_COOKIE_NAME,
        &oauth_state,
        names::OAUTH_STATE_MAX_AGE,
        state.secure_cookies,
    )
    .reject("could not build the state cookie")?;
    let location = HeaderValue::from_str(&url).reject("could not build the redirect")?;

    Ok((
        StatusCode::SEE_OTHER,
        [(SET_COOKIE, state_cookie), (LOCATION, location)],
        "",
    )
        .into_response())
}

#[derive(Deserialize)]
struct FederatedCallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

async fn federated_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    player: Player,
    Path(provider): Path<String>,
    Query(query): Query<FederatedCallbackQuery>,
) -> Result<Response, AppError> {
    let provider = Provider::from_slug(&provider).ok_or(AppError::NotFound)?;

    let clear_state = utils::clear_cookie(names::OAUTH_STATE_COOKIE_NAME, state.secure_cookies)
        .reject("could not build the clear cookie")?;

    let expected = jar
        .get(names::OAUTH_STATE_COOKIE_NAME)
        .map(|c| c.value().to_string());
    let state_matches = match (&query.state, &expected) {
        (Some(returned), Some(expected)) => returned == expected,
        _ => false,
    };

    if let (true, Some(code)) = (state_matches, &query.code) {
        match state.federated.verify_code(provider, code).await {
            Ok(identity) => {
                let session_token = state
                    .auth
                    .federated_sign_in(&identity.email, &identity.display_name)
                    .await
                    .reject("external sign-in failed")?;
                let session_cookie = utils::cookie(
                    names::SESSION_COOKIE_NAME,
                    &session_token,
                    names::SESSION_COOKIE_MAX_AGE,
                    state.secure_cookies,
                )
                .reject("could not build the session cookie")?;
                return Ok((
                    StatusCode::SEE_OTHER,
                    [
                        (SET_COOKIE, clear_state),
                        (SET_COOKIE, session_cookie),
                        (LOCATION, HeaderValue::from_static(names::ADMIN_URL)),
                    ],
                    "",
                )
                    .into_response());
            }
            Err(e) => {
                tracing::warn!(error = %e, provider = provider.slug(), "federated sign-in failed");
            }
        }
    } else {
        tracing::warn!(
            provider = provider.slug(),
            "federated callback with missing code or mismatched state"
        );
    }

    let providers = configured_providers(&state);
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, clear_state);
    Ok((
        headers,
        views::page(
            "Sign in",
            account_views::login(account_views::LoginState::FederatedFailed, &providers),
            player.dark_mode,
        ),
    )
        .into_response())
}
