// Database model structs

use crate::engine::Reference;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub is_admin: bool,
}

/// One row of the admin question table; options live in their own rows.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct QuestionSummary {
    pub id: i64,
    pub category: String,
    pub passage: String,
    pub correct_book: String,
    pub correct_chapter: i32,
    pub correct_verse: i32,
    pub explanation: String,
}

impl QuestionSummary {
    pub fn correct_answer(&self) -> Reference {
        Reference {
            book: self.correct_book.clone(),
            chapter: self.correct_chapter,
            verse: self.correct_verse,
        }
    }
}

/// A question with its options resolved, as the edit form needs it.
#[derive(Debug, Clone)]
pub struct QuestionDetail {
    pub id: i64,
    pub category: String,
    pub passage: String,
    pub options: Vec<Reference>,
    pub correct_answer: Reference,
    pub explanation: String,
}

#[derive(sqlx::FromRow)]
pub struct OptionRow {
    pub book: String,
    pub chapter: i32,
    pub verse: i32,
}

impl From<OptionRow> for Reference {
    fn from(row: OptionRow) -> Self {
        Reference {
            book: row.book,
            chapter: row.chapter,
            verse: row.verse,
        }
    }
}

/// Flattened question+option row used when loading a whole category in one
/// query.
#[derive(sqlx::FromRow)]
pub struct CategoryQuestionRow {
    pub id: i64,
    pub passage: String,
    pub correct_book: String,
    pub correct_chapter: i32,
    pub correct_verse: i32,
    pub explanation: String,
    pub option_book: String,
    pub option_chapter: i32,
    pub option_verse: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LeaderboardEntry {
    pub public_id: String,
    pub name: String,
    pub score: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PlayerRow {
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub email: Option<String>,
    pub score: i64,
    pub last_active: String,
}

#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct DashboardCounts {
    pub total_questions: i64,
    pub total_players: i64,
    pub active_players: i64,
}
