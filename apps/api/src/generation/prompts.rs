// All LLM prompt templates for the Generation module.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::{JSON_ONLY_INSTRUCTION, UNTRUSTED_INPUT_INSTRUCTION};
use crate::models::prep::Question;

/// System prompt for a full preparation package.
pub const GENERATE_SYSTEM: &str = r#"You are an expert technical interview coach. You analyze a candidate's resume against a job description and produce a complete interview preparation package.

STEP 1 - TECHNOLOGY INVENTORY
Identify EVERY concrete technology the job description names: languages, frontend and backend frameworks, databases, cloud platforms and their services, DevOps tooling, data/ML libraries, messaging and API technologies.

STEP 2 - QUESTIONS
Write 12-18 questions. At least 70% of them MUST target the technologies from step 1 directly (internals, optimization, debugging, system design with that stack, framework best practices). Avoid generic questions such as "How do you handle errors?"; prefer "How would you speed up a PostgreSQL query joining five large tables?". The remainder may be behavioral questions about working with that stack in a team.

STEP 3 - PLAN AND GAPS
Compare the resume with the inventory. List strengths and concrete gaps, a study plan naming the technologies to revise, and resources (official documentation first). Every field of prepPlan and skillGapAnalysis must be non-empty.

OUTPUT SCHEMA
{
  "questions": [
    {
      "question": "string - specific to the job's stack",
      "difficulty": "Easy" | "Medium" | "Hard",
      "category": "string naming the technology, e.g. 'Kubernetes Networking'",
      "modelAnswer": "string - detailed answer with examples, markdown allowed",
      "keyPoints": ["string"],
      "followUps": ["string - technology-specific follow-up"]
    }
  ],
  "prepPlan": {
    "topicsToRevise": ["string"],
    "timeline": "string - study timeline, markdown allowed",
    "resources": ["string"]
  },
  "skillGapAnalysis": {
    "strengths": ["string"],
    "gaps": ["string"],
    "recommendations": "string - learning path per gap, markdown allowed"
  }
}"#;

/// User prompt for a full preparation package. Replace `{resume}` and `{job_description}`.
pub const GENERATE_USER_TEMPLATE: &str = r#"Resume:
{resume}

Job Description:
{job_description}

Build the technology inventory for this job description and generate the interview preparation package. Every technical question must be anchored in that inventory."#;

/// System prompt for generating additional questions.
pub const CONTINUE_SYSTEM: &str = r#"You are an expert technical interview coach. You extend an existing set of interview questions for a candidate.

CRITICAL: NEVER repeat or rephrase any question from the EXISTING QUESTIONS list. Every question must be new.

Stay on the technologies named in the job description, but explore different angles: edge cases and failure modes, advanced usage, trade-offs between alternative approaches, production troubleshooting, system design variations.

OUTPUT SCHEMA
{
  "questions": [
    {
      "question": "string - new, not in the existing list",
      "difficulty": "Easy" | "Medium" | "Hard",
      "category": "string naming the technology",
      "modelAnswer": "string - detailed answer with examples, markdown allowed",
      "keyPoints": ["string"],
      "followUps": ["string"]
    }
  ]
}

Generate 6-10 new questions."#;

/// User prompt for a continuation.
/// Replace `{resume}`, `{job_description}` and `{existing_questions}`.
pub const CONTINUE_USER_TEMPLATE: &str = r#"Resume:
{resume}

Job Description:
{job_description}

EXISTING QUESTIONS (DO NOT REPEAT):
{existing_questions}

Generate 6-10 new questions that differ from every existing question."#;

/// Joins a feature system prompt with the shared fragments.
pub fn system_prompt(base: &str) -> String {
    format!("{base}\n\n{UNTRUSTED_INPUT_INSTRUCTION}\n{JSON_ONLY_INSTRUCTION}")
}

/// Numbered list of question texts: `1. ...\n2. ...`.
pub fn number_questions(questions: &[Question]) -> String {
    questions
        .iter()
        .enumerate()
        .map(|(i, q)| format!("{}. {}", i + 1, q.question.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replaces `{name}` placeholders in a single pass, so placeholder-looking text inside a
/// substituted value is never expanded again. Unknown `{...}` sequences are kept verbatim.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let candidate = &rest[open..];
        let hit = values.iter().find(|(name, _)| {
            candidate
                .strip_prefix('{')
                .and_then(|s| s.strip_prefix(*name))
                .is_some_and(|s| s.starts_with('}'))
        });
        match hit {
            Some((name, value)) => {
                out.push_str(value);
                rest = &candidate[name.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
