use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use maud::Markup;
use serde::Deserialize;
use ulid::Ulid;

use crate::db::Db;
use crate::engine::{AdvanceOutcome, LoadOutcome, QuizState, Screen, SelectOutcome, TickOutcome};
use crate::extractors::{IsHtmx, Player};
use crate::rejections::{AppError, ResultExt};
use crate::views::quiz as quiz_views;
use crate::{names, utils, views, AppState};

/// Everything the player touches. The whole attempt lives server side, keyed
/// by the attempt cookie; the browser only swaps fragments into `main`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::HOME_URL, get(home))
        .route(names::SET_NAME_URL, post(set_name))
        .route(names::START_QUIZ_URL, post(start_quiz))
        .route(names::SELECT_ANSWER_URL, post(select_answer))
        .route(names::SUBMIT_ANSWER_URL, post(submit_answer))
        .route(names::TICK_URL, post(tick))
        .route(names::NEXT_QUESTION_URL, post(next_question))
        .route(names::RESET_QUIZ_URL, post(reset_quiz))
        .route(names::ABANDON_QUIZ_URL, post(abandon_quiz))
        .route(names::LEADERBOARD_URL, get(leaderboard))
        .route(names::TOGGLE_DARK_MODE_URL, post(toggle_dark_mode))
}

async fn home(
    State(state): State<AppState>,
    player: Player,
    IsHtmx(is_htmx): IsHtmx,
) -> Result<Markup, AppError> {
    let attempt = load_attempt(&state.db, player.attempt_token.as_deref()).await?;
    let body = screen_markup(&state, &attempt, &player).await?;
    Ok(views::render(is_htmx, screen_title(&attempt), body, player.dark_mode))
}

#[derive(Deserialize)]
struct SetNamePost {
    name: String,
}

async fn set_name(
    State(state): State<AppState>,
    player: Player,
    Json(body): Json<SetNamePost>,
) -> Result<Response, AppError> {
    let name: String = body.name.trim().chars().take(40).collect();
    if name.is_empty() {
        let markup = views::titled("Welcome", quiz_views::welcome(None, player.last_score));
        return Ok(markup.into_response());
    }

    let public_id = player
        .public_id
        .clone()
        .unwrap_or_else(|| Ulid::new().to_string());
    state
        .quiz
        .register_player(&public_id, &name)
        .await
        .reject("could not save the player")?;

    let (token, minted) = attempt_token(&player);
    let mut attempt = load_attempt(&state.db, Some(&token)).await?;
    attempt.start();
    state
        .db
        .save_attempt(&token, &attempt)
        .await
        .reject("could not save the attempt")?;

    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        utils::cookie(
            names::PLAYER_NAME_COOKIE_NAME,
            &name,
            names::PLAYER_COOKIE_MAX_AGE,
            state.secure_cookies,
        )
        .reject("could not build the name cookie")?,
    );
    headers.append(
        SET_COOKIE,
        utils::cookie(
            names::PLAYER_ID_COOKIE_NAME,
            &public_id,
            names::PLAYER_COOKIE_MAX_AGE,
            state.secure_cookies,
        )
        .reject("could not build the player cookie")?,
    );
    if minted {
        headers.append(
            SET_COOKIE,
            utils::cookie(
                names::ATTEMPT_COOKIE_NAME,
                &token,
                names::PLAYER_COOKIE_MAX_AGE,
                state.secure_cookies,
            )
            .reject("could not build the attempt cookie")?,
        );
    }

    let markup = views::titled("Pick a topic", quiz_views::categories(&name, None));
    Ok((headers, markup).into_response())
}

#[derive(Deserialize)]
struct StartQuizPost {
    category: String,
}

async fn start_quiz(
    State(state): State<AppState>,
    player: Player,
    Json(body): Json<StartQuizPost>,
) -> Result<Response, AppError> {
    let Some(name) = player.name.clone() else {
        // No name on file, back to the door.
        let markup = views::titled("Welcome", quiz_views::welcome(None, player.last_score));
        return Ok(markup.into_response());
    };

    let (token, minted) = attempt_token(&player);
    let mut attempt = load_attempt(&state.db, Some(&token)).await?;

    let outcome = state
        .quiz
        .start_quiz(&mut attempt, &body.category)
        .await
        .reject("could not load the questions")?;
    state
        .db
        .save_attempt(&token, &attempt)
        .await
        .reject("could not save the attempt")?;

    let markup = match outcome {
        LoadOutcome::Started => {
            views::titled(screen_title(&attempt), quiz_views::question(&attempt))
        }
        LoadOutcome::NoQuestions => {
            let notice = format!(
                "No questions available for {} yet. Pick another topic.",
                body.category
            );
            views::titled("Pick a topic", quiz_views::categories(&name, Some(&notice)))
        }
    };

    let mut headers = HeaderMap::new();
    if minted {
        headers.append(
            SET_COOKIE,
            utils::cookie(
                names::ATTEMPT_COOKIE_NAME,
                &token,
                names::PLAYER_COOKIE_MAX_AGE,
                state.secure_cookies,
            )
            .reject("could not build the attempt cookie")?,
        );
    }
    Ok((headers, markup).into_response())
}

#[derive(Deserialize)]
struct SelectAnswerPost {
    #[serde(deserialize_with = "super::deserialize_string_or_usize")]
    option: usize,
}

async fn select_answer(
    State(state): State<AppState>,
    player: Player,
    Json(body): Json<SelectAnswerPost>,
) -> Result<&'static str, AppError> {
    let Some(token) = player.attempt_token else {
        return Ok("");
    };
    let mut attempt = load_attempt(&state.db, Some(&token)).await?;
    if attempt.select(body.option) == SelectOutcome::Selected {
        state
            .db
            .save_attempt(&token, &attempt)
            .await
            .reject("could not save the attempt")?;
    }
    // The radios swap nothing; the browser already shows the checked state.
    Ok("")
}

async fn submit_answer(State(state): State<AppState>, player: Player) -> Result<Markup, AppError> {
    let token = player.attempt_token.clone();
    let mut attempt = load_attempt(&state.db, token.as_deref()).await?;

    attempt.submit();
    if let Some(token) = &token {
        state
            .db
            .save_attempt(token, &attempt)
            .await
            .reject("could not save the attempt")?;
    }

    respond_screen(&state, &attempt, &player).await
}

async fn tick(State(state): State<AppState>, player: Player) -> Result<Response, AppError> {
    let token = player.attempt_token.clone();
    let mut attempt = load_attempt(&state.db, token.as_deref()).await?;

    match attempt.tick() {
        TickOutcome::Counting(seconds) => {
            if let Some(token) = &token {
                state
                    .db
                    .save_attempt(token, &attempt)
                    .await
                    .reject("could not save the attempt")?;
            }
            Ok(quiz_views::countdown(seconds).into_response())
        }
        TickOutcome::Expired(advanced) => {
            let mut headers = if advanced == AdvanceOutcome::Finished {
                finish_headers(&state, &attempt, &player).await?
            } else {
                HeaderMap::new()
            };
            if let Some(token) = &token {
                state
                    .db
                    .save_attempt(token, &attempt)
                    .await
                    .reject("could not save the attempt")?;
            }
            // The poller can only swap itself, so aim the next screen at
            // `main` instead.
            headers.insert("HX-Retarget", HeaderValue::from_static("main"));
            headers.insert("HX-Reswap", HeaderValue::from_static("innerHTML"));
            let markup = respond_screen(&state, &attempt, &player).await?;
            Ok((headers, markup).into_response())
        }
        TickOutcome::Idle => {
            // A straggler from a view that no longer shows a countdown.
            let mut headers = HeaderMap::new();
            headers.insert("HX-Reswap", HeaderValue::from_static("none"));
            Ok((headers, "").into_response())
        }
    }
}

async fn next_question(State(state): State<AppState>, player: Player) -> Result<Response, AppError> {
    let token = player.attempt_token.clone();
    let mut attempt = load_attempt(&state.db, token.as_deref()).await?;

    let outcome = attempt.advance();
    let headers = if outcome == AdvanceOutcome::Finished {
        finish_headers(&state, &attempt, &player).await?
    } else {
        HeaderMap::new()
    };
    if outcome != AdvanceOutcome::NotReady {
        if let Some(token) = &token {
            state
                .db
                .save_attempt(token, &attempt)
                .await
                .reject("could not save the attempt")?;
        }
    }

    let markup = respond_screen(&state, &attempt, &player).await?;
    Ok((headers, markup).into_response())
}

async fn reset_quiz(State(state): State<AppState>, player: Player) -> Result<Markup, AppError> {
    let token = player.attempt_token.clone();
    let mut attempt = load_attempt(&state.db, token.as_deref()).await?;

    attempt.reset();
    if let Some(token) = &token {
        state
            .db
            .save_attempt(token, &attempt)
            .await
            .reject("could not save the attempt")?;
    }

    respond_screen(&state, &attempt, &player).await
}

async fn abandon_quiz(State(state): State<AppState>, player: Player) -> Result<Response, AppError> {
    let mut attempt = load_attempt(&state.db, player.attempt_token.as_deref()).await?;

    attempt.cancel();

    // An absent row already reads as the welcome screen.
    let mut headers = HeaderMap::new();
    if let Some(token) = &player.attempt_token {
        state
            .db
            .delete_attempt(token)
            .await
            .reject("could not drop the attempt")?;
        headers.append(
            SET_COOKIE,
            utils::clear_cookie(names::ATTEMPT_COOKIE_NAME, state.secure_cookies)
                .reject("could not clear the attempt cookie")?,
        );
    }

    let markup = respond_screen(&state, &attempt, &player).await?;
    Ok((headers, markup).into_response())
}

async fn leaderboard(
    State(state): State<AppState>,
    player: Player,
    IsHtmx(is_htmx): IsHtmx,
) -> Result<Markup, AppError> {
    let token = player.attempt_token.clone();
    let mut attempt = load_attempt(&state.db, token.as_deref()).await?;

    attempt.view_leaderboard();
    if let Some(token) = &token {
        state
            .db
            .save_attempt(token, &attempt)
            .await
            .reject("could not save the attempt")?;
    }

    let body = screen_markup(&state, &attempt, &player).await?;
    Ok(views::render(is_htmx, screen_title(&attempt), body, player.dark_mode))
}

async fn toggle_dark_mode(
    State(state): State<AppState>,
    player: Player,
) -> Result<impl IntoResponse, AppError> {
    let value = if player.dark_mode { "off" } else { "on" };
    let cookie = utils::cookie(
        names::DARK_MODE_COOKIE_NAME,
        value,
        names::PLAYER_COOKIE_MAX_AGE,
        state.secure_cookies,
    )
    .reject("could not build the theme cookie")?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);
    headers.insert("HX-Refresh", HeaderValue::from_static("true"));
    Ok((headers, ""))
}

/// Record a finished attempt on the leaderboard and remember the score in a
/// cookie for the welcome screen.
async fn finish_headers(
    state: &AppState,
    attempt: &QuizState,
    player: &Player,
) -> Result<HeaderMap, AppError> {
    if let (Some(public_id), Some(name)) = (&player.public_id, &player.name) {
        state
            .quiz
            .finish_quiz(public_id, name, attempt.score)
            .await
            .reject("could not record the score")?;
    }

    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        utils::cookie(
            names::LAST_SCORE_COOKIE_NAME,
            &attempt.score.to_string(),
            names::PLAYER_COOKIE_MAX_AGE,
            state.secure_cookies,
        )
        .reject("could not build the score cookie")?,
    );
    Ok(headers)
}

async fn respond_screen(
    state: &AppState,
    attempt: &QuizState,
    player: &Player,
) -> Result<Markup, AppError> {
    let body = screen_markup(state, attempt, player).await?;
    Ok(views::titled(screen_title(attempt), body))
}

/// The markup for whatever screen the attempt is on.
async fn screen_markup(
    state: &AppState,
    attempt: &QuizState,
    player: &Player,
) -> Result<Markup, AppError> {
    let markup = match attempt.screen {
        Screen::Welcome => quiz_views::welcome(player.name.as_deref(), player.last_score),
        Screen::Category => match &player.name {
            Some(name) => quiz_views::categories(name, None),
            None => quiz_views::welcome(None, player.last_score),
        },
        Screen::Quiz if attempt.answered => quiz_views::feedback(attempt),
        Screen::Quiz => quiz_views::question(attempt),
        Screen::Results => quiz_views::results(attempt),
        Screen::Leaderboard => {
            let entries = state
                .quiz
                .leaderboard()
                .await
                .reject("could not load the leaderboard")?;
            quiz_views::leaderboard(&entries, player.public_id.as_deref())
        }
    };
    Ok(markup)
}

fn screen_title(attempt: &QuizState) -> &str {
    match attempt.screen {
        Screen::Welcome => "Welcome",
        Screen::Category => "Pick a topic",
        Screen::Quiz => attempt.category.as_deref().unwrap_or("Quiz"),
        Screen::Results => "Your results",
        Screen::Leaderboard => "Leaderboard",
    }
}

fn attempt_token(player: &Player) -> (String, bool) {
    match &player.attempt_token {
        Some(token) => (token.clone(), false),
        None => (Ulid::new().to_string(), true),
    }
}

async fn load_attempt(db: &Db, token: Option<&str>) -> Result<QuizState, AppError> {
    if let Some(token) = token {
        if let Some(attempt) = db
            .load_attempt(token)
            .await
            .reject("could not load the attempt")?
        {
            return Ok(attempt);
        }
    }
    Ok(QuizState::new())
}
