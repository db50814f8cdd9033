use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use maud::Markup;
use serde::Deserialize;

use crate::db::models::Account;
use crate::engine::Reference;
use crate::extractors::{AdminGuard, IsHtmx, Player};
use crate::models::{parse_bulk_import, ImportReport, NewQuestion};
use crate::rejections::{AppError, ResultExt};
use crate::views::admin as admin_views;
use crate::{names, views, AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(names::ADMIN_URL, get(dashboard))
        .route(
            names::ADMIN_QUESTIONS_URL,
            get(questions).post(create_question),
        )
        .route(names::ADMIN_NEW_QUESTION_URL, get(new_question))
        .route(
            "/admin/questions/{id}",
            put(update_question).delete(delete_question),
        )
        .route("/admin/questions/{id}/edit", get(edit_question))
        .route(names::ADMIN_IMPORT_URL, get(import_page).post(run_import))
        .route(names::ADMIN_USERS_URL, get(users))
}

async fn dashboard(
    AdminGuard(account): AdminGuard,
    IsHtmx(is_htmx): IsHtmx,
    player: Player,
    State(state): State<AppState>,
) -> Result<Markup, AppError> {
    let counts = state
        .db
        .dashboard_counts()
        .await
        .reject("could not load the dashboard")?;

    Ok(views::render(
        is_htmx,
        "Dashboard",
        admin_views::dashboard(&account, &counts),
        player.dark_mode,
    ))
}

async fn questions(
    AdminGuard(account): AdminGuard,
    IsHtmx(is_htmx): IsHtmx,
    player: Player,
    State(state): State<AppState>,
) -> Result<Markup, AppError> {
    let questions = state
        .db
        .list_questions()
        .await
        .reject("could not load the questions")?;

    Ok(views::render(
        is_htmx,
        "Questions",
        admin_views::questions(&account, &questions),
        player.dark_mode,
    ))
}

async fn new_question(
    AdminGuard(account): AdminGuard,
    IsHtmx(is_htmx): IsHtmx,
    player: Player,
) -> Result<Markup, AppError> {
    Ok(views::render(
        is_htmx,
        "New question",
        admin_views::question_form(&account, None, None),
        player.dark_mode,
    ))
}

/// The flat field names json-enc produces for the question form.
#[derive(Deserialize)]
struct QuestionFormBody {
    passage: String,
    category: String,
    #[serde(default)]
    explanation: String,
    #[serde(deserialize_with = "super::deserialize_string_or_usize")]
    correct: usize,
    book_0: String,
    #[serde(deserialize_with = "super::deserialize_string_or_i32")]
    chapter_0: i32,
    #[serde(deserialize_with = "super::deserialize_string_or_i32")]
    verse_0: i32,
    book_1: String,
    #[serde(deserialize_with = "super::deserialize_string_or_i32")]
    chapter_1: i32,
    #[serde(deserialize_with = "super::deserialize_string_or_i32")]
    verse_1: i32,
    book_2: String,
    #[serde(deserialize_with = "super::deserialize_string_or_i32")]
    chapter_2: i32,
    #[serde(deserialize_with = "super::deserialize_string_or_i32")]
    verse_2: i32,
    book_3: String,
    #[serde(deserialize_with = "super::deserialize_string_or_i32")]
    chapter_3: i32,
    #[serde(deserialize_with = "super::deserialize_string_or_i32")]
    verse_3: i32,
}

impl QuestionFormBody {
    fn into_question(self) -> Result<NewQuestion, &'static str> {
        let options = vec![
            Reference {
                book: self.book_0.trim().to_string(),
                chapter: self.chapter_0,
                verse: self.verse_0,
            },
            Reference {
                book: self.book_1.trim().to_string(),
                chapter: self.chapter_1,
                verse: self.verse_1,
            },
            Reference {
                book: self.book_2.trim().to_string(),
                chapter: self.chapter_2,
                verse: self.verse_2,
            },
            Reference {
                book: self.book_3.trim().to_string(),
                chapter: self.chapter_3,
                verse: self.verse_3,
            },
        ];
        let correct_answer = options
            .get(self.correct)
            .cloned()
            .ok_or("the correct answer must be one of the four options")?;

        let question = NewQuestion {
            category: self.category,
            passage: self.passage,
            options,
            correct_answer,
            explanation: self.explanation,
        };
        question.validate()?;
        Ok(question)
    }
}

async fn create_question(
    AdminGuard(account): AdminGuard,
    State(state): State<AppState>,
    Json(body): Json<QuestionFormBody>,
) -> Result<Markup, AppError> {
    let question = match body.into_question() {
        Ok(question) => question,
        Err(msg) => {
            let markup = admin_views::question_form(&account, None, Some(msg));
            return Ok(views::titled("New question", markup));
        }
    };

    state
        .db
        .insert_question(&question)
        .await
        .reject("could not save the question")?;

    question_list(&state, &account).await
}

async fn edit_question(
    AdminGuard(account): AdminGuard,
    IsHtmx(is_htmx): IsHtmx,
    player: Player,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Markup, AppError> {
    let question = state
        .db
        .get_question(id)
        .await
        .reject("could not load the question")?;

    Ok(views::render(
        is_htmx,
        "Edit question",
        admin_views::question_form(&account, Some(&question), None),
        player.dark_mode,
    ))
}

async fn update_question(
    AdminGuard(account): AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<QuestionFormBody>,
) -> Result<Markup, AppError> {
    let question = match body.into_question() {
        Ok(question) => question,
        Err(msg) => {
            let existing = state
                .db
                .get_question(id)
                .await
                .reject("could not load the question")?;
            let markup = admin_views::question_form(&account, Some(&existing), Some(msg));
            return Ok(views::titled("Edit question", markup));
        }
    };

    state
        .db
        .update_question(id, &question)
        .await
        .reject("could not update the question")?;

    question_list(&state, &account).await
}

async fn delete_question(
    AdminGuard(account): AdminGuard,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Markup, AppError> {
    state
        .db
        .delete_question(id)
        .await
        .reject("could not delete the question")?;

    question_list(&state, &account).await
}

/// The refreshed question list, as create/update/delete respond with it.
async fn question_list(state: &AppState, account: &Account) -> Result<Markup, AppError> {
    let questions = state
        .db
        .list_questions()
        .await
        .reject("could not load the questions")?;
    Ok(views::titled(
        "Questions",
        admin_views::questions(account, &questions),
    ))
}

async fn import_page(
    AdminGuard(account): AdminGuard,
    IsHtmx(is_htmx): IsHtmx,
    player: Player,
) -> Result<Markup, AppError> {
    Ok(views::render(
        is_htmx,
        "Bulk import",
        admin_views::import(&account, None, None),
        player.dark_mode,
    ))
}

#[derive(Deserialize)]
struct ImportPost {
    payload: String,
}

async fn run_import(
    AdminGuard(account): AdminGuard,
    State(state): State<AppState>,
    Json(body): Json<ImportPost>,
) -> Result<Markup, AppError> {
    let elements = match parse_bulk_import(&body.payload) {
        Ok(elements) => elements,
        Err(e) => {
            let markup = admin_views::import(&account, None, Some(e.message()));
            return Ok(views::titled("Bulk import", markup));
        }
    };

    // Each element stands alone: one bad row never blocks the rest.
    let mut report = ImportReport::default();
    for (idx, element) in elements.into_iter().enumerate() {
        match element {
            Ok(question) => match state.db.insert_question(&question).await {
                Ok(_) => report.inserted += 1,
                Err(e) => {
                    tracing::error!(error = %e, index = idx, "bulk import insert failed");
                    report.failed.push((idx, "could not be saved".to_string()));
                }
            },
            Err(reason) => report.failed.push((idx, reason)),
        }
    }
    tracing::info!(
        inserted = report.inserted,
        skipped = report.failed.len(),
        "bulk import finished"
    );

    Ok(views::titled(
        "Bulk import",
        admin_views::import(&account, Some(&report), None),
    ))
}

#[derive(Deserialize)]
struct UsersQuery {
    active: Option<String>,
}

async fn users(
    AdminGuard(account): AdminGuard,
    IsHtmx(is_htmx): IsHtmx,
    player: Player,
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Result<Markup, AppError> {
    let active_only = query.active.as_deref() == Some("1");
    let players = if active_only {
        state
            .db
            .list_active_players()
            .await
            .reject("could not load the players")?
    } else {
        state
            .db
            .list_players()
            .await
            .reject("could not load the players")?
    };

    Ok(views::render(
        is_htmx,
        "Players",
        admin_views::users(&account, &players, active_only),
        player.dark_mode,
    ))
}
