use color_eyre::eyre::{bail, OptionExt};
use color_eyre::Result;

use super::models::{CategoryQuestionRow, OptionRow, QuestionDetail, QuestionSummary};
use super::Db;
use crate::engine::{QuizQuestion, Reference};
use crate::models::NewQuestion;

impl Db {
    pub async fn insert_question(&self, question: &NewQuestion) -> Result<i64> {
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO questions (category, passage, correct_book, correct_chapter, correct_verse, explanation)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&question.category)
        .bind(&question.passage)
        .bind(&question.correct_answer.book)
        .bind(question.correct_answer.chapter)
        .bind(question.correct_answer.verse)
        .bind(&question.explanation)
        .fetch_one(&mut *tx)
        .await?;

        insert_options(&mut tx, id, &question.options).await?;
        tx.commit().await?;

        tracing::info!(question_id = id, category = %question.category, "question created");
        Ok(id)
    }

    pub async fn update_question(&self, id: i64, question: &NewQuestion) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE questions
            SET category = ?, passage = ?, correct_book = ?, correct_chapter = ?,
                correct_verse = ?, explanation = ?, updated_at = datetime('now')
            WHERE id = ?
            "#,
        )
        .bind(&question.category)
        .bind(&question.passage)
        .bind(&question.correct_answer.book)
        .bind(question.correct_answer.chapter)
        .bind(question.correct_answer.verse)
        .bind(&question.explanation)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            bail!("question {id} not found");
        }

        sqlx::query("DELETE FROM options WHERE question_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_options(&mut tx, id, &question.options).await?;
        tx.commit().await?;

        tracing::info!(question_id = id, "question updated");
        Ok(())
    }

    pub async fn delete_question(&self, id: i64) -> Result<()> {
        // options go with it via ON DELETE CASCADE
        sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::info!(question_id = id, "question deleted");
        Ok(())
    }

    pub async fn get_question(&self, id: i64) -> Result<QuestionDetail> {
        let summary: QuestionSummary = sqlx::query_as(
            r#"
            SELECT id, category, passage, correct_book, correct_chapter, correct_verse, explanation
            FROM questions WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_eyre("question not found")?;

        let options: Vec<OptionRow> =
            sqlx::query_as("SELECT book, chapter, verse FROM options WHERE question_id = ? ORDER BY position")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;

        let correct_answer = summary.correct_answer();
        Ok(QuestionDetail {
            id: summary.id,
            category: summary.category,
            passage: summary.passage,
            correct_answer,
            options: options.into_iter().map(Reference::from).collect(),
            explanation: summary.explanation,
        })
    }

    pub async fn list_questions(&self) -> Result<Vec<QuestionSummary>> {
        let questions = sqlx::query_as::<_, QuestionSummary>(
            r#"
            SELECT id, category, passage, correct_book, correct_chapter, correct_verse, explanation
            FROM questions ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(questions)
    }

    /// Everything the quiz needs for one category, questions and options in
    /// a single JOIN.
    pub async fn questions_in_category(&self, category: &str) -> Result<Vec<QuizQuestion>> {
        let rows = sqlx::query_as::<_, CategoryQuestionRow>(
            r#"
            SELECT q.id, q.passage, q.correct_book, q.correct_chapter, q.correct_verse,
                   q.explanation,
                   o.book AS option_book, o.chapter AS option_chapter, o.verse AS option_verse
            FROM questions q
            JOIN options o ON o.question_id = q.id
            WHERE q.category = ?
            ORDER BY q.id, o.position
            "#,
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        let mut questions: Vec<QuizQuestion> = Vec::new();
        for row in rows {
            let option = Reference {
                book: row.option_book,
                chapter: row.option_chapter,
                verse: row.option_verse,
            };
            match questions.last_mut() {
                Some(last) if last.id == row.id => last.options.push(option),
                _ => questions.push(QuizQuestion {
                    id: row.id,
                    passage: row.passage,
                    correct_answer: Reference {
                        book: row.correct_book,
                        chapter: row.correct_chapter,
                        verse: row.correct_verse,
                    },
                    options: vec![option],
                    explanation: row.explanation,
                }),
            }
        }

        Ok(questions)
    }

    pub async fn count_questions(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM questions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

async fn insert_options(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    question_id: i64,
    options: &[Reference],
) -> Result<()> {
    for (position, option) in options.iter().enumerate() {
        sqlx::query(
            "INSERT INTO options (question_id, position, book, chapter, verse) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(question_id)
        .bind(position as i64)
        .bind(&option.book)
        .bind(option.chapter)
        .bind(option.verse)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
