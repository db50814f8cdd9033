use color_eyre::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::db::models::LeaderboardEntry;
use crate::db::Db;
use crate::engine::{LoadOutcome, QuizQuestion, QuizState};

// ---------------------------------------------------------------------------
// QuestionRepository trait (DIP: service defines the abstraction it needs)
// ---------------------------------------------------------------------------

#[cfg_attr(test, mockall::automock)]
pub trait QuestionRepository: Send + Sync {
    fn questions_in_category(
        &self,
        category: &str,
    ) -> impl std::future::Future<Output = Result<Vec<QuizQuestion>>> + Send;

    fn touch_player(
        &self,
        public_id: &str,
        name: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn record_score(
        &self,
        public_id: &str,
        name: &str,
        score: i64,
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    fn top_players(&self) -> impl std::future::Future<Output = Result<Vec<LeaderboardEntry>>> + Send;
}

impl QuestionRepository for Db {
    fn questions_in_category(
        &self,
        category: &str,
    ) -> impl std::future::Future<Output = Result<Vec<QuizQuestion>>> + Send {
        Db::questions_in_category(self, category)
    }

    fn touch_player(
        &self,
        public_id: &str,
        name: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send {
        Db::touch_player(self, public_id, name)
    }

    fn record_score(
        &self,
        public_id: &str,
        name: &str,
        score: i64,
    ) -> impl std::future::Future<Output = Result<()>> + Send {
        Db::record_score(self, public_id, name, score)
    }

    fn top_players(&self) -> impl std::future::Future<Output = Result<Vec<LeaderboardEntry>>> + Send {
        Db::top_players(self)
    }
}

// ---------------------------------------------------------------------------
// QuizService
// ---------------------------------------------------------------------------

pub struct QuizService<R: QuestionRepository = Db> {
    repo: R,
}

impl<R: QuestionRepository + Clone> Clone for QuizService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
        }
    }
}

impl<R: QuestionRepository> QuizService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Load a category's questions into the attempt and start it. Each start
    /// draws a fresh seed, so retrying the same category reshuffles.
    pub async fn start_quiz(&self, state: &mut QuizState, category: &str) -> Result<LoadOutcome> {
        let questions = self.repo.questions_in_category(category).await?;

        let shuffle_seed = rand::random::<i32>();
        let mut rng = StdRng::seed_from_u64(shuffle_seed as u64);

        Ok(state.load(category, questions, &mut rng))
    }

    /// Mark a player as seen, keeping their stored name current.
    pub async fn register_player(&self, public_id: &str, name: &str) -> Result<()> {
        self.repo.touch_player(public_id, name).await
    }

    /// Record the final score of an attempt and return the refreshed
    /// leaderboard.
    pub async fn finish_quiz(
        &self,
        public_id: &str,
        name: &str,
        score: u32,
    ) -> Result<Vec<LeaderboardEntry>> {
        self.repo
            .record_score(public_id, name, i64::from(score))
            .await?;
        self.repo.top_players().await
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
        self.repo.top_players().await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::engine::{Reference, Screen};

    fn service(mock_repo: MockQuestionRepository) -> QuizService<MockQuestionRepository> {
        QuizService::new(mock_repo)
    }

    fn reference(book: &str, chapter: i32, verse: i32) -> Reference {
        Reference {
            book: book.to_string(),
            chapter,
            verse,
        }
    }

    fn question(id: i64) -> QuizQuestion {
        QuizQuestion {
            id,
            passage: format!("Passage {id}"),
            options: vec![
                reference("John", 3, 16),
                reference("Genesis", 1, 1),
                reference("Psalm", 23, 1),
                reference("Romans", 8, 28),
            ],
            correct_answer: reference("John", 3, 16),
            explanation: String::new(),
        }
    }

    #[tokio::test]
    async fn start_quiz_loads_category_questions() {
        let mut mock = MockQuestionRepository::new();
        mock.expect_questions_in_category()
            .withf(|category| category == "Bible Characters")
            .returning(|_| Box::pin(async { Ok(vec![question(1), question(2)]) }));

        let svc = service(mock);
        let mut state = QuizState::new();
        state.start();

        let outcome = svc.start_quiz(&mut state, "Bible Characters").await.unwrap();

        assert_eq!(outcome, LoadOutcome::Started);
        assert_eq!(state.screen, Screen::Quiz);
        assert_eq!(state.total_questions(), 2);
    }

    #[tokio::test]
    async fn start_quiz_empty_category_returns_no_questions() {
        let mut mock = MockQuestionRepository::new();
        mock.expect_questions_in_category()
            .returning(|_| Box::pin(async { Ok(Vec::new()) }));

        let svc = service(mock);
        let mut state = QuizState::new();
        state.start();

        let outcome = svc.start_quiz(&mut state, "Places & Location").await.unwrap();

        assert_eq!(outcome, LoadOutcome::NoQuestions);
        assert_eq!(state.screen, Screen::Category);
    }

    #[tokio::test]
    async fn start_quiz_propagates_repository_errors() {
        let mut mock = MockQuestionRepository::new();
        mock.expect_questions_in_category()
            .returning(|_| Box::pin(async { Err(color_eyre::eyre::eyre!("db down")) }));

        let svc = service(mock);
        let mut state = QuizState::new();

        assert!(svc.start_quiz(&mut state, "General Knowledge").await.is_err());
    }

    #[tokio::test]
    async fn register_player_touches_roster() {
        let mut mock = MockQuestionRepository::new();
        mock.expect_touch_player()
            .withf(|public_id, name| public_id == "p-1" && name == "Ada")
            .returning(|_, _| Box::pin(async { Ok(()) }));

        let svc = service(mock);
        svc.register_player("p-1", "Ada").await.unwrap();
    }

    #[tokio::test]
    async fn finish_quiz_records_score_then_returns_leaderboard() {
        let mut mock = MockQuestionRepository::new();
        mock.expect_record_score()
            .withf(|public_id, name, score| public_id == "p-1" && name == "Ada" && *score == 7)
            .returning(|_, _, _| Box::pin(async { Ok(()) }));
        mock.expect_top_players().returning(|| {
            Box::pin(async {
                Ok(vec![LeaderboardEntry {
                    public_id: "p-1".to_string(),
                    name: "Ada".to_string(),
                    score: 7,
                }])
            })
        });

        let svc = service(mock);
        let board = svc.finish_quiz("p-1", "Ada", 7).await.unwrap();

        assert_eq!(board.len(), 1);
        assert_eq!(board[0].score, 7);
    }

    #[tokio::test]
    async fn leaderboard_passes_through() {
        let mut mock = MockQuestionRepository::new();
        mock.expect_top_players()
            .returning(|| Box::pin(async { Ok(Vec::new()) }));

        let svc = service(mock);
        assert!(svc.leaderboard().await.unwrap().is_empty());
    }
}
