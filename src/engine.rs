//! Pure quiz state machine: screens, question sequencing, timer, scoring.
//! No I/O lives here; handlers load the state, apply one transition, and
//! persist the result.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Countdown budget per question, in seconds.
pub const QUESTION_SECONDS: u16 = 60;

/// A scripture reference. Equality is field-by-field, which is also how
/// answers are judged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub book: String,
    pub chapter: i32,
    pub verse: i32,
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: i64,
    pub passage: String,
    pub options: Vec<Reference>,
    pub correct_answer: Reference,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Welcome,
    Category,
    Quiz,
    Results,
    Leaderboard,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    Started,
    NoQuestions,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected,
    Rejected,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    Correct,
    Incorrect,
    AlreadyAnswered,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AdvanceOutcome {
    NextQuestion,
    Finished,
    NotReady,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still counting; carries the remaining seconds.
    Counting(u16),
    /// Countdown hit zero: the question was auto-submitted and the attempt
    /// advanced. Carries the advance result (next question or finished).
    Expired(AdvanceOutcome),
    /// Nothing to do (answered, or not on the quiz screen).
    Idle,
}

/// The whole attempt state. Serialized as-is into the attempt store between
/// requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizState {
    pub screen: Screen,
    pub category: Option<String>,
    pub questions: Vec<QuizQuestion>,
    pub current: usize,
    pub pending: Option<Reference>,
    pub answered: bool,
    pub score: u32,
    pub time_left: u16,
}

impl Default for QuizState {
    fn default() -> Self {
        Self::new()
    }
}

impl QuizState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Welcome,
            category: None,
            questions: Vec::new(),
            current: 0,
            pending: None,
            answered: false,
            score: 0,
            time_left: QUESTION_SECONDS,
        }
    }

    fn clear_attempt(&mut self) {
        self.category = None;
        self.questions.clear();
        self.current = 0;
        self.pending = None;
        self.answered = false;
        self.score = 0;
        self.time_left = QUESTION_SECONDS;
    }

    /// Move from the welcome screen to category selection.
    pub fn start(&mut self) {
        self.clear_attempt();
        self.screen = Screen::Category;
    }

    /// Begin a quiz over the given questions. Shuffles the question order
    /// and, independently, each question's options; an empty set keeps the
    /// player on the category screen. Every load shuffles afresh.
    pub fn load<R: Rng>(
        &mut self,
        category: &str,
        mut questions: Vec<QuizQuestion>,
        rng: &mut R,
    ) -> LoadOutcome {
        if questions.is_empty() {
            self.screen = Screen::Category;
            return LoadOutcome::NoQuestions;
        }

        questions.shuffle(rng);
        for question in &mut questions {
            question.options.shuffle(rng);
        }

        self.clear_attempt();
        self.category = Some(category.to_string());
        self.questions = questions;
        self.screen = Screen::Quiz;
        LoadOutcome::Started
    }

    /// Record an option as the pending answer. Only possible while the
    /// current question is unanswered and time remains.
    pub fn select(&mut self, index: usize) -> SelectOutcome {
        if self.screen != Screen::Quiz || self.answered || self.time_left == 0 {
            return SelectOutcome::Rejected;
        }
        let Some(option) = self
            .current_question()
            .and_then(|q| q.options.get(index))
            .cloned()
        else {
            return SelectOutcome::Rejected;
        };
        self.pending = Some(option);
        SelectOutcome::Selected
    }

    /// Lock in the pending answer and score it. No pending answer counts as
    /// incorrect. Guarded: once answered, further submits are no-ops.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.screen != Screen::Quiz {
            return SubmitOutcome::AlreadyAnswered;
        }
        if self.answered {
            return SubmitOutcome::AlreadyAnswered;
        }
        let Some(question) = self.questions.get(self.current) else {
            return SubmitOutcome::AlreadyAnswered;
        };

        self.answered = true;
        if self.pending.as_ref() == Some(&question.correct_answer) {
            self.score += 1;
            SubmitOutcome::Correct
        } else {
            SubmitOutcome::Incorrect
        }
    }

    /// One second of countdown. At zero the question is auto-submitted with
    /// whatever is pending and the attempt advances.
    pub fn tick(&mut self) -> TickOutcome {
        if self.screen != Screen::Quiz || self.answered {
            return TickOutcome::Idle;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left > 0 {
            return TickOutcome::Counting(self.time_left);
        }
        self.submit();
        TickOutcome::Expired(self.advance())
    }

    /// Move to the next question, or finish the attempt when none remain.
    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.screen != Screen::Quiz || !self.answered {
            return AdvanceOutcome::NotReady;
        }
        if self.current + 1 < self.questions.len() {
            self.current += 1;
            self.pending = None;
            self.answered = false;
            self.time_left = QUESTION_SECONDS;
            AdvanceOutcome::NextQuestion
        } else {
            self.screen = Screen::Results;
            AdvanceOutcome::Finished
        }
    }

    /// Back to category selection, dropping all attempt progress. The next
    /// load fetches and shuffles afresh.
    pub fn reset(&mut self) {
        self.clear_attempt();
        self.screen = Screen::Category;
    }

    /// Abandon the attempt entirely and return to the welcome screen.
    pub fn cancel(&mut self) {
        self.clear_attempt();
        self.screen = Screen::Welcome;
    }

    pub fn view_leaderboard(&mut self) {
        if matches!(
            self.screen,
            Screen::Welcome | Screen::Results | Screen::Leaderboard
        ) {
            self.screen = Screen::Leaderboard;
        }
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current)
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn is_last_question(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    /// Whether the just-answered question was correct. `None` until answered.
    pub fn last_answer_correct(&self) -> Option<bool> {
        if !self.answered {
            return None;
        }
        self.current_question()
            .map(|q| self.pending.as_ref() == Some(&q.correct_answer))
    }
}
