//! Prep Generator: turns a resume + job description into interview questions, a study plan
//! and a skill-gap analysis via one chat-completion call.
//!
//! Flow: validate inputs → require backend → build prompts → complete (single-shot or
//! streamed, always fully accumulated) → strict decode → fill optional leaves with defaults.
//!
//! The model output is decoded against a strict wire schema: structural problems (not an
//! object, no questions, a question without text, an unknown difficulty, a missing plan or
//! gap section, a wrongly typed field) fail the whole call with `UpstreamFormat`. Only leaf
//! values that are absent or `null` receive defaults, so callers never see a hole.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::prompts::{
    fill_template, number_questions, system_prompt, CONTINUE_SYSTEM, CONTINUE_USER_TEMPLATE,
    GENERATE_SYSTEM, GENERATE_USER_TEMPLATE,
};
use crate::llm_client::{strip_json_fences, CompletionBackend, CompletionRequest, LlmError};
use crate::models::prep::{
    ContinueResult, Difficulty, GenerationResult, PrepPlan, Question, SkillGapAnalysis,
    DEFAULT_CATEGORY,
};

const GENERATE_TEMPERATURE: f32 = 0.7;
const CONTINUE_TEMPERATURE: f32 = 0.8;

// ────────────────────────────────────────────────────────────────────────────
// Wire schema (model output)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGeneration {
    questions: Vec<WireQuestion>,
    prep_plan: WirePrepPlan,
    skill_gap_analysis: WireSkillGap,
}

#[derive(Debug, Deserialize)]
struct WireContinuation {
    questions: Vec<WireQuestion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireQuestion {
    question: Option<String>,
    difficulty: Option<String>,
    category: Option<String>,
    model_answer: Option<String>,
    key_points: Option<Vec<String>>,
    follow_ups: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePrepPlan {
    topics_to_revise: Option<Vec<String>>,
    timeline: Option<String>,
    resources: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSkillGap {
    strengths: Option<Vec<String>>,
    gaps: Option<Vec<String>>,
    recommendations: Option<String>,
}

impl WireQuestion {
    fn into_question(self, index: usize) -> Result<Question, AppError> {
        let question = self
            .question
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .ok_or_else(|| format_error(format!("question {index} has no text")))?;

        let difficulty = match self.difficulty.as_deref() {
            None => Difficulty::default(),
            Some(raw) => raw
                .parse::<Difficulty>()
                .map_err(|e| format_error(format!("question {index}: {e}")))?,
        };

        let category = self
            .category
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Ok(Question {
            question,
            difficulty,
            category,
            model_answer: self.model_answer.unwrap_or_default(),
            key_points: self.key_points.unwrap_or_default(),
            follow_ups: self.follow_ups.unwrap_or_default(),
        })
    }
}

impl From<WirePrepPlan> for PrepPlan {
    fn from(wire: WirePrepPlan) -> Self {
        PrepPlan {
            topics_to_revise: wire.topics_to_revise.unwrap_or_default(),
            timeline: wire.timeline.unwrap_or_default(),
            resources: wire.resources.unwrap_or_default(),
        }
    }
}

impl From<WireSkillGap> for SkillGapAnalysis {
    fn from(wire: WireSkillGap) -> Self {
        SkillGapAnalysis {
            strengths: wire.strengths.unwrap_or_default(),
            gaps: wire.gaps.unwrap_or_default(),
            recommendations: wire.recommendations.unwrap_or_default(),
        }
    }
}

fn format_error(detail: impl Into<String>) -> AppError {
    AppError::UpstreamFormat(detail.into())
}

// ────────────────────────────────────────────────────────────────────────────
// Decoding
// ────────────────────────────────────────────────────────────────────────────

/// Parses the raw text and checks the structural parts serde's struct decoding would let
/// through (a top-level array, array-shaped questions).
fn decode_object(raw: &str) -> Result<Value, AppError> {
    let text = strip_json_fences(raw);
    if text.is_empty() {
        return Err(format_error("empty response"));
    }
    let value: Value = serde_json::from_str(text)
        .map_err(|e| format_error(format!("response is not valid JSON: {e}")))?;

    if !value.is_object() {
        return Err(format_error("response is not a JSON object"));
    }
    let problem = match value.get("questions") {
        Some(Value::Array(items)) if items.is_empty() => {
            Some("response contained no questions".to_string())
        }
        Some(Value::Array(items)) => items
            .iter()
            .position(|q| !q.is_object())
            .map(|index| format!("question {index} is not an object")),
        Some(_) => Some("'questions' is not an array".to_string()),
        None => Some("response has no 'questions'".to_string()),
    };

    match problem {
        Some(detail) => Err(format_error(detail)),
        None => Ok(value),
    }
}

fn convert_questions(wire: Vec<WireQuestion>) -> Result<Vec<Question>, AppError> {
    wire.into_iter()
        .enumerate()
        .map(|(i, q)| q.into_question(i))
        .collect()
}

/// Decodes a full generation response.
pub fn parse_generation(raw: &str) -> Result<GenerationResult, AppError> {
    let value = decode_object(raw)?;
    let wire: WireGeneration = serde_json::from_value(value)
        .map_err(|e| format_error(format!("response does not match schema: {e}")))?;

    Ok(GenerationResult {
        questions: convert_questions(wire.questions)?,
        prep_plan: wire.prep_plan.into(),
        skill_gap_analysis: wire.skill_gap_analysis.into(),
    })
}

/// Decodes a continuation response (questions only).
pub fn parse_continuation(raw: &str) -> Result<ContinueResult, AppError> {
    let value = decode_object(raw)?;
    let wire: WireContinuation = serde_json::from_value(value)
        .map_err(|e| format_error(format!("response does not match schema: {e}")))?;

    Ok(ContinueResult {
        questions: convert_questions(wire.questions)?,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Generator
// ────────────────────────────────────────────────────────────────────────────

/// Rejects blank inputs before any network activity.
pub fn validate_inputs(resume: &str, job_description: &str) -> Result<(), AppError> {
    if resume.trim().is_empty() || job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Resume and job description are required".to_string(),
        ));
    }
    Ok(())
}

fn map_llm_error(err: LlmError) -> AppError {
    match err {
        LlmError::EmptyContent => format_error("empty response"),
        other => AppError::Upstream(other.to_string()),
    }
}

/// Owns the completion backend. `None` means no upstream credential was configured.
#[derive(Clone)]
pub struct PrepGenerator {
    backend: Option<Arc<dyn CompletionBackend>>,
}

impl PrepGenerator {
    pub fn new(backend: Option<Arc<dyn CompletionBackend>>) -> Self {
        Self { backend }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    fn backend(&self) -> Result<&dyn CompletionBackend, AppError> {
        self.backend
            .as_deref()
            .ok_or_else(|| AppError::Configuration("OPENAI_API_KEY is not set".to_string()))
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<String, AppError> {
        let backend = self.backend()?;
        let system = system_prompt(system);
        backend
            .complete(CompletionRequest {
                system: &system,
                user,
                temperature,
            })
            .await
            .map_err(map_llm_error)
    }

    /// Full preparation package for a resume / job description pair.
    pub async fn generate(
        &self,
        resume: &str,
        job_description: &str,
    ) -> Result<GenerationResult, AppError> {
        validate_inputs(resume, job_description)?;

        let user = fill_template(
            GENERATE_USER_TEMPLATE,
            &[("resume", resume), ("job_description", job_description)],
        );
        let raw = self.complete(GENERATE_SYSTEM, &user, GENERATE_TEMPERATURE).await?;
        let result = parse_generation(&raw)?;

        if !(12..=18).contains(&result.questions.len()) {
            warn!(
                "Model returned {} questions, outside the requested 12-18",
                result.questions.len()
            );
        }
        info!("Generated {} questions", result.questions.len());
        Ok(result)
    }

    /// Additional questions that avoid `existing`. The caller merges them; nothing here
    /// deduplicates, the model is only instructed not to repeat.
    pub async fn continue_generate(
        &self,
        resume: &str,
        job_description: &str,
        existing: &[Question],
    ) -> Result<ContinueResult, AppError> {
        validate_inputs(resume, job_description)?;

        let existing_questions = number_questions(existing);
        let user = fill_template(
            CONTINUE_USER_TEMPLATE,
            &[
                ("resume", resume),
                ("job_description", job_description),
                ("existing_questions", &existing_questions),
            ],
        );
        let raw = self.complete(CONTINUE_SYSTEM, &user, CONTINUE_TEMPERATURE).await?;
        let result = parse_continuation(&raw)?;

        info!(
            "Generated {} additional questions ({} existing)",
            result.questions.len(),
            existing.len()
        );
        Ok(result)
    }
}
