mod common;

use common::create_test_db;
use versequiz::db::Db;
use versequiz::engine::{QuizState, Reference, Screen};
use versequiz::models::NewQuestion;

fn reference(book: &str, chapter: i32, verse: i32) -> Reference {
    Reference {
        book: book.to_string(),
        chapter,
        verse,
    }
}

fn sample_question(category: &str, passage: &str) -> NewQuestion {
    let options = vec![
        reference("John", 3, 16),
        reference("Genesis", 1, 1),
        reference("Psalm", 23, 1),
        reference("Romans", 8, 28),
    ];
    NewQuestion {
        category: category.to_string(),
        passage: passage.to_string(),
        correct_answer: options[0].clone(),
        options,
        explanation: "A well known verse.".to_string(),
    }
}

async fn insert(db: &Db, category: &str, passage: &str) -> i64 {
    db.insert_question(&sample_question(category, passage))
        .await
        .expect("insert question")
}

#[tokio::test]
async fn test_db_connection() {
    let db = create_test_db().await;

    assert_eq!(db.count_questions().await.unwrap(), 0);
    assert!(db.list_questions().await.unwrap().is_empty());
    assert!(db.top_players().await.unwrap().is_empty());
}

// --- Question tests ---

#[tokio::test]
async fn test_question_crud() {
    let db = create_test_db().await;

    let id = insert(&db, "Bible Characters", "Who am I?").await;
    assert!(id > 0);

    let question = db.get_question(id).await.unwrap();
    assert_eq!(question.category, "Bible Characters");
    assert_eq!(question.passage, "Who am I?");
    assert_eq!(question.correct_answer, reference("John", 3, 16));
    // Options come back in the order they were written
    assert_eq!(question.options.len(), 4);
    assert_eq!(question.options[0], reference("John", 3, 16));
    assert_eq!(question.options[3], reference("Romans", 8, 28));

    let mut updated = sample_question("General Knowledge", "Changed passage");
    updated.options.reverse();
    db.update_question(id, &updated).await.unwrap();

    let question = db.get_question(id).await.unwrap();
    assert_eq!(question.category, "General Knowledge");
    assert_eq!(question.passage, "Changed passage");
    assert_eq!(question.options[0], reference("Romans", 8, 28));

    db.delete_question(id).await.unwrap();
    assert!(db.get_question(id).await.is_err());
    assert_eq!(db.count_questions().await.unwrap(), 0);
}

#[tokio::test]
async fn test_update_missing_question_fails() {
    let db = create_test_db().await;

    let result = db
        .update_question(999, &sample_question("General Knowledge", "nope"))
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_list_questions_newest_first() {
    let db = create_test_db().await;

    let first = insert(&db, "Bible Characters", "first").await;
    let second = insert(&db, "Bible Characters", "second").await;
    let third = insert(&db, "Bible Characters", "third").await;

    let ids: Vec<i64> = db
        .list_questions()
        .await
        .unwrap()
        .iter()
        .map(|q| q.id)
        .collect();
    assert_eq!(ids, vec![third, second, first]);
}

#[tokio::test]
async fn test_questions_in_category_carry_their_options() {
    let db = create_test_db().await;

    insert(&db, "Bible Characters", "in category one").await;
    insert(&db, "Bible Characters", "also in category one").await;
    insert(&db, "General Knowledge", "in another category").await;

    let questions = db.questions_in_category("Bible Characters").await.unwrap();
    assert_eq!(questions.len(), 2);
    for question in &questions {
        assert_eq!(question.options.len(), 4);
        assert_eq!(question.correct_answer, reference("John", 3, 16));
    }

    let empty = db.questions_in_category("Places & Location").await.unwrap();
    assert!(empty.is_empty());
}

// --- Player and leaderboard tests ---

#[tokio::test]
async fn test_record_score_creates_then_merges() {
    let db = create_test_db().await;

    db.record_score("p-1", "Ada", 7).await.unwrap();
    let board = db.top_players().await.unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].score, 7);

    // Same player again: one entry, latest score and name win
    db.record_score("p-1", "Ada L.", 3).await.unwrap();
    let board = db.top_players().await.unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].name, "Ada L.");
    assert_eq!(board[0].score, 3);
}

#[tokio::test]
async fn test_touch_player_never_touches_the_score() {
    let db = create_test_db().await;

    db.record_score("p-1", "Ada", 5).await.unwrap();
    db.touch_player("p-1", "Ada the Second").await.unwrap();

    let board = db.top_players().await.unwrap();
    assert_eq!(board[0].name, "Ada the Second");
    assert_eq!(board[0].score, 5);
}

#[tokio::test]
async fn test_top_players_caps_at_leaderboard_size() {
    let db = create_test_db().await;

    for i in 1..=12 {
        db.record_score(&format!("p-{i}"), &format!("Player {i}"), i)
            .await
            .unwrap();
    }

    let board = db.top_players().await.unwrap();
    assert_eq!(board.len() as i64, versequiz::names::LEADERBOARD_SIZE);
    assert_eq!(board[0].score, 12);
    assert!(
        board.windows(2).all(|w| w[0].score >= w[1].score),
        "leaderboard must be sorted by score, got {:?}",
        board.iter().map(|e| e.score).collect::<Vec<_>>()
    );
    assert!(board.iter().all(|e| e.score > 2), "the two lowest scores fall off");
}

#[tokio::test]
async fn test_player_rosters_and_dashboard_counts() {
    let db = create_test_db().await;

    insert(&db, "Bible Characters", "a question").await;
    db.touch_player("p-1", "Ada").await.unwrap();
    db.touch_player("p-2", "Grace").await.unwrap();

    assert_eq!(db.list_players().await.unwrap().len(), 2);
    // Both were seen just now, so the 24h filter keeps them
    assert_eq!(db.list_active_players().await.unwrap().len(), 2);

    let counts = db.dashboard_counts().await.unwrap();
    assert_eq!(counts.total_questions, 1);
    assert_eq!(counts.total_players, 2);
    assert_eq!(counts.active_players, 2);
}

// --- Attempt store tests ---

#[tokio::test]
async fn test_attempt_roundtrip_and_overwrite() {
    let db = create_test_db().await;

    assert!(db.load_attempt("missing").await.unwrap().is_none());

    let mut state = QuizState::new();
    state.screen = Screen::Category;
    state.score = 3;
    db.save_attempt("token-1", &state).await.unwrap();

    let loaded = db.load_attempt("token-1").await.unwrap().unwrap();
    assert_eq!(loaded.screen, Screen::Category);
    assert_eq!(loaded.score, 3);

    state.score = 4;
    db.save_attempt("token-1", &state).await.unwrap();
    let loaded = db.load_attempt("token-1").await.unwrap().unwrap();
    assert_eq!(loaded.score, 4);

    db.delete_attempt("token-1").await.unwrap();
    assert!(db.load_attempt("token-1").await.unwrap().is_none());
}

// --- Account tests ---

#[tokio::test]
async fn test_account_lifecycle() {
    let db = create_test_db().await;

    assert!(!db.email_exists("ada@example.com").await.unwrap());
    let account_id = db
        .create_account("ada@example.com", "password123", "Ada")
        .await
        .unwrap();
    assert!(db.email_exists("ada@example.com").await.unwrap());

    assert!(db
        .verify_account_password("ada@example.com", "password123")
        .await
        .unwrap());
    assert!(!db
        .verify_account_password("ada@example.com", "wrong")
        .await
        .unwrap());

    // Fresh accounts are not admins until promoted
    let account = db
        .find_account_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(!account.is_admin);

    assert!(!db.promote_to_admin("nobody@example.com").await.unwrap());
    assert!(db.promote_to_admin("ada@example.com").await.unwrap());
    let account = db
        .find_account_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(account.is_admin);

    let session = db.create_account_session(account_id).await.unwrap();
    let found = db.account_by_session(&session).await.unwrap().unwrap();
    assert_eq!(found.email, "ada@example.com");

    db.delete_account_session(&session).await.unwrap();
    assert!(db.account_by_session(&session).await.unwrap().is_none());
}

#[tokio::test]
async fn test_federated_accounts_have_no_password() {
    let db = create_test_db().await;

    db.create_federated_account("fed@example.com", "Fed").await.unwrap();

    assert!(db.email_exists("fed@example.com").await.unwrap());
    assert!(!db
        .verify_account_password("fed@example.com", "")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_password_reset_token_flow() {
    let db = create_test_db().await;

    db.create_account("ada@example.com", "password123", "Ada")
        .await
        .unwrap();

    assert!(db
        .create_password_reset_token("nobody@example.com")
        .await
        .unwrap()
        .is_none());

    let token = db
        .create_password_reset_token("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(db.validate_password_reset_token(&token).await.unwrap());

    assert!(db
        .reset_password_with_token(&token, "newpassword1")
        .await
        .unwrap());
    assert!(db
        .verify_account_password("ada@example.com", "newpassword1")
        .await
        .unwrap());
    assert!(!db
        .verify_account_password("ada@example.com", "password123")
        .await
        .unwrap());

    // The token burns on use
    assert!(!db.validate_password_reset_token(&token).await.unwrap());
    assert!(!db
        .reset_password_with_token(&token, "anotherpass1")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_change_password_checks_the_current_one() {
    let db = create_test_db().await;

    let account_id = db
        .create_account("ada@example.com", "password123", "Ada")
        .await
        .unwrap();

    assert!(!db
        .change_password(account_id, "wrong", "newpassword1")
        .await
        .unwrap());
    assert!(db
        .change_password(account_id, "password123", "newpassword1")
        .await
        .unwrap());
    assert!(db
        .verify_account_password("ada@example.com", "newpassword1")
        .await
        .unwrap());
}
