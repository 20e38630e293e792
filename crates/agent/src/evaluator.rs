//! Evaluator processor: scores a split result with a second model.
//!
//! The split record is rendered into a prompt, sent with the evaluator
//! instructions, and the reply is validated against the rubric: four numeric
//! scores plus a comment. Anything that goes wrong yields a zero-score
//! fallback whose comment explains the failure.

use std::sync::Arc;

use serde_json::{Map, Value};
use splitscore_core::message::{History, Message};
use splitscore_core::provider::{Provider, ProviderRequest};
use splitscore_core::{Category, EvaluationResult, ProcessError, ScoreMetric, Scores, SplitResult};
use tracing::{debug, info, warn};

use crate::prompts::EVALUATOR_INSTRUCTIONS;
use crate::reply;

/// Stand-in for `mensaje_original` when the input record has none.
pub const MISSING_MESSAGE: &str = "(message unavailable)";

const COMMENT_KEY: &str = "comentario";

pub struct EvaluatorAgent {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    instructions: String,
}

impl EvaluatorAgent {
    /// Create an evaluator using the built-in instructions at temperature 0.
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            instructions: EVALUATOR_INSTRUCTIONS.trim().to_string(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Replace the system instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Score one split result. Never fails; see [`EvaluationResult::fallback`].
    pub async fn evaluate(&self, result: &SplitResult) -> EvaluationResult {
        self.try_evaluate(result)
            .await
            .unwrap_or_else(|e| fallback_for(result, e))
    }

    async fn try_evaluate(&self, result: &SplitResult) -> Result<EvaluationResult, ProcessError> {
        let (original, message_type, categories) = required_fields(result)?;
        let prompt = evaluation_prompt(original, message_type, categories)?;

        let mut history = History::new();
        history.push(Message::user(prompt));
        let request = ProviderRequest::new(
            self.model.as_str(),
            history.with_system(&self.instructions),
            self.temperature,
        );

        let response = self.provider.complete(request).await?;
        debug!(reply = %response.message.content, "Raw evaluator reply");

        parse_evaluation(original, &response.message.content)
    }

    /// Score every result in order. Always returns one evaluation per input.
    pub async fn evaluate_all(&self, results: &[SplitResult]) -> Vec<EvaluationResult> {
        let mut evaluations = Vec::with_capacity(results.len());

        for (index, result) in results.iter().enumerate() {
            let evaluation = match self.try_evaluate(result).await {
                Ok(evaluation) => {
                    info!("Evaluation {}: mean score = {:.2}", index + 1, evaluation.mean_score());
                    evaluation
                }
                Err(e) => {
                    warn!(error = %e, "Evaluation {} failed", index + 1);
                    fallback_for(result, e)
                }
            };
            evaluations.push(evaluation);
        }

        evaluations
    }
}

fn fallback_for(result: &SplitResult, reason: ProcessError) -> EvaluationResult {
    let original = result.original_message.as_deref().unwrap_or(MISSING_MESSAGE);
    EvaluationResult::fallback(original, reason)
}

/// The three fields an evaluation needs, or why they are unavailable.
fn required_fields(result: &SplitResult) -> Result<(&str, &str, &[Category]), ProcessError> {
    let original = result
        .original_message
        .as_deref()
        .ok_or_else(|| ProcessError::Schema("missing required field: original_message".into()))?;

    if let Some(err) = &result.error {
        return Err(ProcessError::Schema(format!("split failed: {err}")));
    }

    let message_type = result
        .message_type
        .as_deref()
        .ok_or_else(|| ProcessError::Schema("missing required field: message_type".into()))?;
    let categories = result
        .categories
        .as_deref()
        .ok_or_else(|| ProcessError::Schema("missing required field: categories".into()))?;

    Ok((original, message_type, categories))
}

fn evaluation_prompt(
    original: &str,
    message_type: &str,
    categories: &[Category],
) -> Result<String, ProcessError> {
    let categories_json = serde_json::to_string_pretty(categories)
        .map_err(|e| ProcessError::Schema(format!("categories not serializable: {e}")))?;

    Ok(format!(
        "Original message: {original}\nMessage type: {message_type}\nCategories and content:\n{categories_json}"
    ))
}

/// Validate a reply against the rubric and build the evaluation.
fn parse_evaluation(original: &str, content: &str) -> Result<EvaluationResult, ProcessError> {
    let map = reply::parse_object(content)?;

    for key in ScoreMetric::RUBRIC
        .iter()
        .map(ScoreMetric::key)
        .chain(std::iter::once(COMMENT_KEY))
    {
        if !map.contains_key(key) {
            return Err(ProcessError::Schema(format!("missing required key: {key}")));
        }
    }

    let scores = Scores {
        type_accuracy: score(&map, ScoreMetric::TypeAccuracy)?,
        category_relevance: score(&map, ScoreMetric::CategoryRelevance)?,
        content_completeness: score(&map, ScoreMetric::ContentCompleteness)?,
        extraction_quality: score(&map, ScoreMetric::ExtractionQuality)?,
    };

    let comment = match &map[COMMENT_KEY] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    Ok(EvaluationResult::new(original, scores, comment))
}

/// Coerce a score to `f64`: JSON numbers and numeric strings are accepted.
fn score(map: &Map<String, Value>, metric: ScoreMetric) -> Result<f64, ProcessError> {
    let key = metric.key();
    let value = &map[key];
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| ProcessError::Schema(format!("{key} is not numeric: {value}")))
}
