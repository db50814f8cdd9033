// Player flow
pub const HOME_URL: &str = "/";
pub const SET_NAME_URL: &str = "/set-name";
pub const START_QUIZ_URL: &str = "/start-quiz";
pub const SELECT_ANSWER_URL: &str = "/select-answer";
pub const SUBMIT_ANSWER_URL: &str = "/submit-answer";
pub const TICK_URL: &str = "/tick";
pub const NEXT_QUESTION_URL: &str = "/next-question";
pub const RESET_QUIZ_URL: &str = "/reset-quiz";
pub const ABANDON_QUIZ_URL: &str = "/abandon-quiz";
pub const LEADERBOARD_URL: &str = "/leaderboard";
pub const TOGGLE_DARK_MODE_URL: &str = "/toggle-dark-mode";

// Admin panel
pub const ADMIN_URL: &str = "/admin";
pub const ADMIN_LOGIN_URL: &str = "/admin/login";
pub const ADMIN_REGISTER_URL: &str = "/admin/register";
pub const ADMIN_LOGOUT_URL: &str = "/admin/logout";
pub const ADMIN_FORGOT_PASSWORD_URL: &str = "/admin/forgot-password";
pub const ADMIN_RESET_PASSWORD_URL: &str = "/admin/reset-password";
pub const ADMIN_CHANGE_PASSWORD_URL: &str = "/admin/change-password";
pub const ADMIN_QUESTIONS_URL: &str = "/admin/questions";
pub const ADMIN_NEW_QUESTION_URL: &str = "/admin/questions/new";
pub const ADMIN_IMPORT_URL: &str = "/admin/import";
pub const ADMIN_USERS_URL: &str = "/admin/users";

pub fn admin_question_url(id: i64) -> String {
    format!("/admin/questions/{id}")
}

pub fn admin_edit_question_url(id: i64) -> String {
    format!("/admin/questions/{id}/edit")
}

pub fn admin_reset_password_url(token: &str) -> String {
    format!("/admin/reset-password/{token}")
}

pub fn admin_federated_url(provider: &str) -> String {
    format!("/admin/auth/{provider}")
}

pub fn admin_federated_callback_url(provider: &str) -> String {
    format!("/admin/auth/{provider}/callback")
}

// Cookies
pub const SESSION_COOKIE_NAME: &str = "admin_session";
pub const ATTEMPT_COOKIE_NAME: &str = "quiz_attempt";
pub const PLAYER_NAME_COOKIE_NAME: &str = "player_name";
pub const PLAYER_ID_COOKIE_NAME: &str = "player_id";
pub const LAST_SCORE_COOKIE_NAME: &str = "last_score";
pub const DARK_MODE_COOKIE_NAME: &str = "dark_mode";
pub const OAUTH_STATE_COOKIE_NAME: &str = "oauth_state";

pub const SESSION_COOKIE_MAX_AGE: i64 = 60 * 60 * 24 * 30;
pub const PLAYER_COOKIE_MAX_AGE: i64 = 60 * 60 * 24 * 365;
pub const OAUTH_STATE_MAX_AGE: i64 = 60 * 10;

// Quiz topics, in display order
pub const CATEGORIES: [&str; 4] = [
    "Passage/Memory verses",
    "Bible Characters",
    "Places & Location",
    "General Knowledge",
];

pub const LEADERBOARD_SIZE: i64 = 10;
