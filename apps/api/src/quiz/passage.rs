//! Reading-comprehension question: a passage with multiple-choice options.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::layout::SectionRole;
use crate::quiz::{numbered_lines, push_part, standard_break_candidates, PrintableQuiz};

/// A generated passage question as produced by the quiz generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassageQuestion {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub instruction: String,
    pub passage: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub answer: Option<String>,
    /// Native-language translation of the passage.
    #[serde(default)]
    pub translation: Option<String>,
}

impl PrintableQuiz for PassageQuestion {
    fn id(&self) -> Uuid {
        self.id
    }

    fn parts(&self) -> Vec<(SectionRole, String)> {
        let mut parts = Vec::with_capacity(6);
        push_part(&mut parts, SectionRole::TITLE, &self.title);
        push_part(&mut parts, SectionRole::INSTRUCTION, &self.instruction);
        push_part(&mut parts, SectionRole::BODY, &self.passage);
        if !self.options.is_empty() {
            parts.push((SectionRole::OPTION_LIST, numbered_lines(&self.options)));
        }
        if let Some(answer) = self.answer.as_deref().map(str::trim) {
            if !answer.is_empty() {
                parts.push((SectionRole::ANSWER_LINE, format!("Answer: {answer}")));
            }
        }
        if let Some(translation) = &self.translation {
            push_part(&mut parts, SectionRole::TRANSLATION, translation);
        }
        parts
    }

    fn break_candidates(&self) -> Vec<Vec<SectionRole>> {
        standard_break_candidates()
    }
}
