mod common;

use std::collections::BTreeMap;

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;
use versequiz::db::Db;
use versequiz::email::ResendEmailSender;
use versequiz::engine::Reference;
use versequiz::federated::{FederatedConfig, OAuthVerifier};
use versequiz::models::NewQuestion;
use versequiz::services::auth::AuthService;
use versequiz::services::quiz::QuizService;
use versequiz::{names, router, AppState};

fn app(db: Db) -> Router {
    let auth = AuthService::new(
        db.clone(),
        ResendEmailSender::new(String::new()),
        "http://localhost:1414".to_string(),
    );
    let quiz = QuizService::new(db.clone());
    router(AppState {
        db,
        auth,
        quiz,
        federated: OAuthVerifier::new(FederatedConfig::default()),
        secure_cookies: false,
    })
}

fn reference(book: &str, chapter: i32, verse: i32) -> Reference {
    Reference {
        book: book.to_string(),
        chapter,
        verse,
    }
}

fn seeded_question(
    category: &str,
    passage: &str,
    correct: Reference,
    others: [Reference; 3],
) -> NewQuestion {
    let mut options = vec![correct.clone()];
    options.extend(others);
    NewQuestion {
        category: category.to_string(),
        passage: passage.to_string(),
        options,
        correct_answer: correct,
        explanation: String::new(),
    }
}

fn john_3_16(category: &str) -> NewQuestion {
    seeded_question(
        category,
        "For God so loved the world, that he gave his only begotten Son.",
        reference("John", 3, 16),
        [
            reference("Genesis", 1, 1),
            reference("Psalm", 23, 1),
            reference("Romans", 8, 28),
        ],
    )
}

fn genesis_1_1(category: &str) -> NewQuestion {
    seeded_question(
        category,
        "In the beginning God created the heaven and the earth.",
        reference("Genesis", 1, 1),
        [
            reference("John", 3, 16),
            reference("Exodus", 20, 3),
            reference("Acts", 2, 38),
        ],
    )
}

/// Where the correct answer sits among the four options as rendered, found
/// by comparing the byte offsets of the option texts. The server shuffles
/// options, so the screen is the only source of truth.
fn on_screen_index(body: &str, question: &NewQuestion) -> usize {
    let mut offsets: Vec<(usize, bool)> = question
        .options
        .iter()
        .map(|option| {
            let text = option.to_string();
            let at = body
                .find(&text)
                .unwrap_or_else(|| panic!("option {text} not on screen"));
            (at, *option == question.correct_answer)
        })
        .collect();
    offsets.sort();
    offsets
        .iter()
        .position(|(_, correct)| *correct)
        .expect("correct option on screen")
}

struct Page {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: String,
}

impl Page {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A headless stand-in for one browser: carries cookies between requests
/// and always sends the htmx marker, the way the real UI does.
struct Browser {
    app: Router,
    cookies: BTreeMap<String, String>,
}

impl Browser {
    fn new(app: Router) -> Self {
        Self {
            app,
            cookies: BTreeMap::new(),
        }
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn remember_cookies(&mut self, resp: &Response<Body>) {
        for value in resp.headers().get_all(header::SET_COOKIE) {
            let Ok(text) = value.to_str() else { continue };
            let Some((name, rest)) = text.split_once('=') else {
                continue;
            };
            let value = rest.split(';').next().unwrap_or("").trim();
            if value.is_empty() {
                self.cookies.remove(name);
            } else {
                self.cookies.insert(name.to_string(), value.to_string());
            }
        }
    }

    async fn get(&mut self, uri: &str) -> Page {
        self.request(Method::GET, uri, None).await
    }

    async fn post(&mut self, uri: &str, json: &str) -> Page {
        self.request(Method::POST, uri, Some(json.to_string())).await
    }

    async fn request(&mut self, method: Method, uri: &str, json: Option<String>) -> Page {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("HX-Request", "true");
        if json.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        if !self.cookies.is_empty() {
            let jar = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, jar);
        }

        let body = json.map(Body::from).unwrap_or_else(Body::empty);
        let resp = self
            .app
            .clone()
            .oneshot(builder.body(body).expect("request build should succeed"))
            .await
            .expect("router should respond");

        self.remember_cookies(&resp);
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp
            .into_body()
            .collect()
            .await
            .expect("read response body")
            .to_bytes();
        Page {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).expect("utf-8 body"),
        }
    }
}

#[tokio::test]
async fn a_full_attempt_lands_on_the_leaderboard() {
    let db = common::create_test_db().await;
    let q1 = john_3_16("Bible Characters");
    let q2 = genesis_1_1("Bible Characters");
    db.insert_question(&q1).await.expect("seed question");
    db.insert_question(&q2).await.expect("seed question");
    let mut browser = Browser::new(app(db.clone()));

    let page = browser.post(names::SET_NAME_URL, r#"{"name":"Ada"}"#).await;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Pick a topic"));
    assert_eq!(browser.cookie(names::PLAYER_NAME_COOKIE_NAME), Some("Ada"));
    assert!(browser.cookie(names::PLAYER_ID_COOKIE_NAME).is_some());
    assert!(browser.cookie(names::ATTEMPT_COOKIE_NAME).is_some());

    let mut page = browser
        .post(names::START_QUIZ_URL, r#"{"category":"Bible Characters"}"#)
        .await;
    assert!(page.body.contains("Where is this found?"));

    for round in 0..2 {
        let question = [&q1, &q2]
            .into_iter()
            .find(|q| page.body.contains(&q.passage))
            .expect("a seeded passage on screen");
        let idx = on_screen_index(&page.body, question);

        // json-enc sends form values as strings
        let select = browser
            .post(names::SELECT_ANSWER_URL, &format!(r#"{{"option":"{idx}"}}"#))
            .await;
        assert_eq!(select.status, StatusCode::OK);

        let feedback = browser.post(names::SUBMIT_ANSWER_URL, "{}").await;
        assert!(
            feedback.body.contains("Correct!"),
            "round {round} should be scored correct"
        );

        page = browser.post(names::NEXT_QUESTION_URL, "{}").await;
    }

    assert!(page.body.contains("Quiz complete!"));
    assert!(page.body.contains("I scored 2/2"));
    assert_eq!(browser.cookie(names::LAST_SCORE_COOKIE_NAME), Some("2"));

    let board_page = browser.get(names::LEADERBOARD_URL).await;
    assert!(board_page.body.contains("Ada"));
    assert!(board_page.body.contains("badge-you"), "own row is marked");

    let board = db.top_players().await.expect("load leaderboard");
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].name, "Ada");
    assert_eq!(board[0].score, 2);
}

#[tokio::test]
async fn a_replayed_attempt_overwrites_the_leaderboard_entry() {
    let db = common::create_test_db().await;
    let q = john_3_16("General Knowledge");
    db.insert_question(&q).await.expect("seed question");
    let mut browser = Browser::new(app(db.clone()));

    browser.post(names::SET_NAME_URL, r#"{"name":"Grace"}"#).await;
    let page = browser
        .post(names::START_QUIZ_URL, r#"{"category":"General Knowledge"}"#)
        .await;
    let idx = on_screen_index(&page.body, &q);
    browser
        .post(names::SELECT_ANSWER_URL, &format!(r#"{{"option":"{idx}"}}"#))
        .await;
    browser.post(names::SUBMIT_ANSWER_URL, "{}").await;
    browser.post(names::NEXT_QUESTION_URL, "{}").await;

    let board = db.top_players().await.expect("load leaderboard");
    assert_eq!(board[0].score, 1);

    // Play again, this time getting it wrong
    let page = browser.post(names::RESET_QUIZ_URL, "{}").await;
    assert!(page.body.contains("Pick a topic"));
    let page = browser
        .post(names::START_QUIZ_URL, r#"{"category":"General Knowledge"}"#)
        .await;
    let wrong = (on_screen_index(&page.body, &q) + 1) % 4;
    browser
        .post(names::SELECT_ANSWER_URL, &format!(r#"{{"option":"{wrong}"}}"#))
        .await;
    let feedback = browser.post(names::SUBMIT_ANSWER_URL, "{}").await;
    assert!(feedback.body.contains("Not quite."));
    browser.post(names::NEXT_QUESTION_URL, "{}").await;

    let board = db.top_players().await.expect("load leaderboard");
    assert_eq!(board.len(), 1, "the same player merges into one entry");
    assert_eq!(board[0].score, 0, "the newest attempt wins");
    assert_eq!(browser.cookie(names::LAST_SCORE_COOKIE_NAME), Some("0"));
}

#[tokio::test]
async fn an_empty_topic_keeps_the_player_choosing() {
    let db = common::create_test_db().await;
    let mut browser = Browser::new(app(db));

    browser.post(names::SET_NAME_URL, r#"{"name":"Ada"}"#).await;
    let page = browser
        .post(names::START_QUIZ_URL, r#"{"category":"Places & Location"}"#)
        .await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("No questions available for"));
    assert!(page.body.contains("Pick another topic."));
    assert!(page.body.contains("Pick a topic"));
}

#[tokio::test]
async fn starting_without_a_name_returns_to_the_welcome_screen() {
    let db = common::create_test_db().await;
    let mut browser = Browser::new(app(db));

    let page = browser
        .post(names::START_QUIZ_URL, r#"{"category":"Bible Characters"}"#)
        .await;

    assert!(page.body.contains("Test your Bible knowledge"));
}

#[tokio::test]
async fn a_blank_name_stays_on_the_welcome_screen() {
    let db = common::create_test_db().await;
    let mut browser = Browser::new(app(db));

    let page = browser.post(names::SET_NAME_URL, r#"{"name":"   "}"#).await;

    assert!(page.body.contains("Test your Bible knowledge"));
    assert!(browser.cookie(names::PLAYER_NAME_COOKIE_NAME).is_none());
}

#[tokio::test]
async fn the_countdown_expires_into_the_results_screen() {
    let db = common::create_test_db().await;
    db.insert_question(&john_3_16("Bible Characters"))
        .await
        .expect("seed question");
    let mut browser = Browser::new(app(db.clone()));

    browser.post(names::SET_NAME_URL, r#"{"name":"Ada"}"#).await;
    browser
        .post(names::START_QUIZ_URL, r#"{"category":"Bible Characters"}"#)
        .await;

    let first = browser.post(names::TICK_URL, "{}").await;
    assert!(first.body.contains("59s"));
    assert!(first.body.contains("id=\"countdown\""));

    for _ in 0..58 {
        let tick = browser.post(names::TICK_URL, "{}").await;
        assert!(tick.body.contains("countdown"));
    }

    // The sixtieth second auto-submits with nothing pending
    let expired = browser.post(names::TICK_URL, "{}").await;
    assert_eq!(expired.header("HX-Retarget"), Some("main"));
    assert_eq!(expired.header("HX-Reswap"), Some("innerHTML"));
    assert!(expired.body.contains("Quiz complete!"));
    assert!(expired.body.contains("I scored 0/1"));

    let board = db.top_players().await.expect("load leaderboard");
    assert_eq!(board[0].score, 0);

    // A straggling poll after the quiz ended swaps nothing
    let stale = browser.post(names::TICK_URL, "{}").await;
    assert_eq!(stale.header("HX-Reswap"), Some("none"));
    assert!(stale.body.is_empty());
}

#[tokio::test]
async fn an_abandoned_attempt_returns_home_with_the_last_score() {
    let db = common::create_test_db().await;
    let q = john_3_16("Bible Characters");
    db.insert_question(&q).await.expect("seed question");
    let mut browser = Browser::new(app(db));

    browser.post(names::SET_NAME_URL, r#"{"name":"Ada"}"#).await;
    let page = browser
        .post(names::START_QUIZ_URL, r#"{"category":"Bible Characters"}"#)
        .await;
    let idx = on_screen_index(&page.body, &q);
    browser
        .post(names::SELECT_ANSWER_URL, &format!(r#"{{"option":"{idx}"}}"#))
        .await;
    browser.post(names::SUBMIT_ANSWER_URL, "{}").await;
    browser.post(names::NEXT_QUESTION_URL, "{}").await;

    let home = browser.post(names::ABANDON_QUIZ_URL, "{}").await;
    assert!(home.body.contains("Test your Bible knowledge"));
    assert!(home.body.contains("Last time you scored"));
    assert_eq!(browser.cookie(names::ATTEMPT_COOKIE_NAME), None);
}

#[tokio::test]
async fn toggling_dark_mode_round_trips_the_cookie() {
    let db = common::create_test_db().await;
    let mut browser = Browser::new(app(db));

    let page = browser.post(names::TOGGLE_DARK_MODE_URL, "{}").await;
    assert_eq!(page.header("HX-Refresh"), Some("true"));
    assert_eq!(browser.cookie(names::DARK_MODE_COOKIE_NAME), Some("on"));

    browser.post(names::TOGGLE_DARK_MODE_URL, "{}").await;
    assert_eq!(browser.cookie(names::DARK_MODE_COOKIE_NAME), Some("off"));
}
