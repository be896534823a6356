//! Grammar transformation drill: numbered sentences with an answer key.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::SectionRole;
use crate::quiz::{numbered_lines, push_part, PrintableQuiz};

/// A set of sentences to transform (e.g. active → passive), with the answer
/// key and an optional translation of the originals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentenceDrill {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    pub instruction: String,
    pub sentences: Vec<String>,
    #[serde(default)]
    pub answers: Vec<String>,
    #[serde(default)]
    pub translation: Option<String>,
}

impl PrintableQuiz for SentenceDrill {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parts(&self) -> Vec<(SectionRole, String)> {
        let mut parts = Vec::with_capacity(5);
        push_part(&mut parts, SectionRole::TITLE, &self.title);
        push_part(&mut parts, SectionRole::INSTRUCTION, &self.instruction);
        if !self.sentences.is_empty() {
            parts.push((SectionRole::BODY, numbered_lines(&self.sentences)));
        }
        if !self.answers.is_empty() {
            parts.push((SectionRole::ANSWER_LINE, numbered_lines(&self.answers)));
        }
        if let Some(translation) = &self.translation {
            push_part(&mut parts, SectionRole::TRANSLATION, translation);
        }
        parts
    }

    /// The answer key is the first thing to move; sentences always stay with
    /// their instruction.
    fn break_candidates(&self) -> Vec<Vec<SectionRole>> {
        vec![
            vec![],
            vec![SectionRole::ANSWER_LINE],
            vec![SectionRole::ANSWER_LINE, SectionRole::TRANSLATION],
        ]
    }
}
