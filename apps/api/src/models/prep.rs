use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Category used when a question arrives without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// Difficulty of a generated question. Closed set; `Medium` when the model omits it.
/// Deserializes case-insensitively through `FromStr`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{other}'")),
        }
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(label)
    }
}

/// A single interview question with its model answer.
///
/// Client-supplied questions (e.g. `existingQuestions`) are accepted leniently; questions
/// coming from the model go through the strict decoding in `generation::generator`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Question {
    pub question: String,
    pub difficulty: Difficulty,
    pub category: String,
    pub model_answer: String,
    pub key_points: Vec<String>,
    pub follow_ups: Vec<String>,
}

impl Default for Question {
    fn default() -> Self {
        Question {
            question: String::new(),
            difficulty: Difficulty::default(),
            category: DEFAULT_CATEGORY.to_string(),
            model_answer: String::new(),
            key_points: Vec::new(),
            follow_ups: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrepPlan {
    pub topics_to_revise: Vec<String>,
    /// Free text, may contain markdown.
    pub timeline: String,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillGapAnalysis {
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    /// Free text, may contain markdown.
    pub recommendations: String,
}

/// Full output of one generation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub questions: Vec<Question>,
    pub prep_plan: PrepPlan,
    pub skill_gap_analysis: SkillGapAnalysis,
}

impl GenerationResult {
    /// Unions continuation questions onto this result. No deduplication is performed.
    /// Returns the new question count.
    pub fn append_questions(&mut self, more: Vec<Question>) -> usize {
        self.questions.extend(more);
        self.questions.len()
    }
}

/// Output of a continuation call: new questions only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContinueResult {
    pub questions: Vec<Question>,
}
