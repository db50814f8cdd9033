use serde::Deserialize;

use crate::engine::Reference;

/// A validated question ready to be written to the store.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub category: String,
    pub passage: String,
    pub options: Vec<Reference>,
    pub correct_answer: Reference,
    pub explanation: String,
}

impl NewQuestion {
    /// Write-time checks. Forms satisfy these by construction; bulk-import
    /// elements and any other caller go through here before touching the
    /// store.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.passage.trim().is_empty() {
            return Err("the passage text must not be empty");
        }
        if self.category.trim().is_empty() {
            return Err("a category is required");
        }
        if self.options.len() != 4 {
            return Err("a question needs exactly 4 options");
        }
        if self
            .options
            .iter()
            .any(|o| o.book.trim().is_empty() || o.chapter < 1 || o.verse < 1)
        {
            return Err("every option needs a book, a chapter and a verse");
        }
        if !self.options.contains(&self.correct_answer) {
            return Err("the correct answer must match one of the options");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ReferencePayload {
    pub book: String,
    pub chapter: i32,
    pub verse: i32,
}

impl From<ReferencePayload> for Reference {
    fn from(p: ReferencePayload) -> Self {
        Reference {
            book: p.book,
            chapter: p.chapter,
            verse: p.verse,
        }
    }
}

/// One element of the bulk-import payload, matching the original export
/// shape (camelCase keys; `question` accepted as an alias for `passage`).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionPayload {
    #[serde(alias = "question")]
    pub passage: String,
    #[serde(default)]
    pub category: Option<String>,
    pub options: Vec<ReferencePayload>,
    pub correct_answer: ReferencePayload,
    #[serde(default)]
    pub explanation: String,
}

impl From<QuestionPayload> for NewQuestion {
    fn from(p: QuestionPayload) -> Self {
        NewQuestion {
            category: p.category.unwrap_or_default(),
            passage: p.passage,
            options: p.options.into_iter().map(Reference::from).collect(),
            correct_answer: p.correct_answer.into(),
            explanation: p.explanation,
        }
    }
}

/// Whole-batch failures. Either one rejects the import before any writes.
#[derive(Debug, PartialEq, Eq)]
pub enum BulkParseError {
    InvalidJson,
    NotAnArray,
}

impl BulkParseError {
    pub fn message(&self) -> &'static str {
        match self {
            BulkParseError::InvalidJson => "the pasted text is not valid JSON",
            BulkParseError::NotAnArray => "the payload must be a JSON array of questions",
        }
    }
}

/// What happened to an imported batch: how many rows went in, and which
/// elements were skipped and why.
#[derive(Debug, Default)]
pub struct ImportReport {
    pub inserted: usize,
    pub failed: Vec<(usize, String)>,
}

/// Parse a bulk-import payload. The batch as a whole must be a JSON array;
/// after that, each element stands alone, so one bad element never blocks
/// the others.
pub fn parse_bulk_import(text: &str) -> Result<Vec<Result<NewQuestion, String>>, BulkParseError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|_| BulkParseError::InvalidJson)?;

    let serde_json::Value::Array(elements) = value else {
        return Err(BulkParseError::NotAnArray);
    };

    Ok(elements
        .into_iter()
        .map(|element| {
            let question: NewQuestion = serde_json::from_value::<QuestionPayload>(element)
                .map_err(|e| e.to_string())?
                .into();
            question.validate().map_err(str::to_string)?;
            Ok(question)
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn option_json(book: &str, chapter: i32, verse: i32) -> String {
        format!(r#"{{"book":"{book}","chapter":{chapter},"verse":{verse}}}"#)
    }

    fn question_json(passage_key: &str) -> String {
        format!(
            r#"{{
                "{passage_key}": "For God so loved the world...",
                "category": "Passage/Memory verses",
                "options": [{}, {}, {}, {}],
                "correctAnswer": {},
                "explanation": "The most widely known verse."
            }}"#,
            option_json("John", 3, 16),
            option_json("Genesis", 1, 1),
            option_json("Psalm", 23, 1),
            option_json("Romans", 8, 28),
            option_json("John", 3, 16),
        )
    }

    #[test]
    fn rejects_text_that_is_not_json() {
        assert_eq!(
            parse_bulk_import("not json at all").unwrap_err(),
            BulkParseError::InvalidJson
        );
    }

    #[test]
    fn rejects_a_payload_that_is_not_an_array() {
        let err = parse_bulk_import(&question_json("passage")).unwrap_err();
        assert_eq!(err, BulkParseError::NotAnArray);
    }

    #[test]
    fn parses_a_valid_array_and_accepts_the_question_alias() {
        let payload = format!(
            "[{}, {}]",
            question_json("passage"),
            question_json("question")
        );
        let elements = parse_bulk_import(&payload).unwrap();

        assert_eq!(elements.len(), 2);
        for element in &elements {
            let q = element.as_ref().unwrap();
            assert_eq!(q.passage, "For God so loved the world...");
            assert_eq!(q.options.len(), 4);
            assert_eq!(q.correct_answer.book, "John");
        }
    }

    #[test]
    fn bad_elements_fail_alone_without_sinking_the_batch() {
        let payload = format!(
            r#"[{}, {{"passage": "incomplete"}}]"#,
            question_json("passage")
        );
        let elements = parse_bulk_import(&payload).unwrap();

        assert_eq!(elements.len(), 2);
        assert!(elements[0].is_ok());
        assert!(elements[1].is_err(), "missing fields fail that element only");
    }

    #[test]
    fn an_element_whose_correct_answer_matches_no_option_is_rejected() {
        let bad = format!(
            r#"{{
                "passage": "In the beginning...",
                "category": "General Knowledge",
                "options": [{}, {}, {}, {}],
                "correctAnswer": {},
                "explanation": ""
            }}"#,
            option_json("John", 3, 16),
            option_json("Genesis", 1, 1),
            option_json("Psalm", 23, 1),
            option_json("Romans", 8, 28),
            option_json("Exodus", 20, 3),
        );
        let elements = parse_bulk_import(&format!("[{bad}]")).unwrap();

        let err = elements[0].as_ref().unwrap_err();
        assert!(
            err.contains("correct answer"),
            "expected a correct-answer message, got: {err}"
        );
    }

    #[test]
    fn validate_requires_exactly_four_options() {
        let mut question: NewQuestion =
            serde_json::from_str::<QuestionPayload>(&question_json("passage"))
                .unwrap()
                .into();
        question.options.pop();

        assert!(question.validate().is_err());
    }
}
