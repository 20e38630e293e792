//! Records produced by the splitter and evaluator.
//!
//! `SplitResult` mirrors the JSON the splitting model returns, plus the text
//! it was produced from. `EvaluationResult` serializes with the Spanish keys
//! the evaluation sheet expects; its mean score is computed on construction.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One keyword-tagged group of extracted fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub keyword: String,
    #[serde(default)]
    pub content: Vec<String>,
}

impl Category {
    pub fn new(keyword: impl Into<String>, content: Vec<String>) -> Self {
        Self {
            keyword: keyword.into(),
            content,
        }
    }
}

/// The outcome of splitting one message (or one part of it).
///
/// `message_type` and `categories` are absent on error-shaped results, which
/// instead carry `error` and, for unparseable replies, `raw_content`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<Category>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_content: Option<String>,

    /// Any other fields the model returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SplitResult {
    /// An error-shaped result for a failed model call.
    pub fn failed(original_message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            original_message: Some(original_message.into()),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// An error-shaped result for a reply that could not be used.
    pub fn malformed(
        original_message: impl Into<String>,
        error: impl Into<String>,
        raw_content: impl Into<String>,
    ) -> Self {
        Self {
            raw_content: Some(raw_content.into()),
            ..Self::failed(original_message, error)
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Categories, or an empty slice for error-shaped results.
    pub fn categories(&self) -> &[Category] {
        self.categories.as_deref().unwrap_or(&[])
    }
}

/// The four rubric scores of an evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    #[serde(rename = "precisión_del_tipo_de_mensaje")]
    pub type_accuracy: f64,

    #[serde(rename = "relevancia_de_la_categoría")]
    pub category_relevance: f64,

    #[serde(rename = "exhaustividad_del_contenido")]
    pub content_completeness: f64,

    #[serde(rename = "calidad_de_la_extracción")]
    pub extraction_quality: f64,
}

impl Scores {
    /// Arithmetic mean of the four scores.
    pub fn mean(&self) -> f64 {
        (self.type_accuracy
            + self.category_relevance
            + self.content_completeness
            + self.extraction_quality)
            / 4.0
    }
}

/// A quality judgment of one `SplitResult`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    #[serde(rename = "mensaje_original")]
    original_message: String,

    #[serde(flatten)]
    scores: Scores,

    #[serde(rename = "puntuación_media")]
    mean_score: f64,

    #[serde(rename = "comentario")]
    comment: String,
}

impl EvaluationResult {
    pub fn new(original_message: impl Into<String>, scores: Scores, comment: impl Into<String>) -> Self {
        Self {
            original_message: original_message.into(),
            mean_score: scores.mean(),
            scores,
            comment: comment.into(),
        }
    }

    /// The zero-score placeholder used whenever an evaluation cannot be made.
    pub fn fallback(original_message: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::new(
            original_message,
            Scores::default(),
            format!("Evaluation error: {reason}"),
        )
    }

    pub fn original_message(&self) -> &str {
        &self.original_message
    }

    pub fn scores(&self) -> &Scores {
        &self.scores
    }

    pub fn mean_score(&self) -> f64 {
        self.mean_score
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Value of a single reported metric.
    pub fn score(&self, metric: ScoreMetric) -> f64 {
        match metric {
            ScoreMetric::TypeAccuracy => self.scores.type_accuracy,
            ScoreMetric::CategoryRelevance => self.scores.category_relevance,
            ScoreMetric::ContentCompleteness => self.scores.content_completeness,
            ScoreMetric::ExtractionQuality => self.scores.extraction_quality,
            ScoreMetric::Mean => self.mean_score,
        }
    }
}

/// The metrics reported for an evaluation, in sheet/report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScoreMetric {
    TypeAccuracy,
    CategoryRelevance,
    ContentCompleteness,
    ExtractionQuality,
    Mean,
}

impl ScoreMetric {
    /// All metrics, mean last.
    pub const ALL: [ScoreMetric; 5] = [
        ScoreMetric::TypeAccuracy,
        ScoreMetric::CategoryRelevance,
        ScoreMetric::ContentCompleteness,
        ScoreMetric::ExtractionQuality,
        ScoreMetric::Mean,
    ];

    /// The four scores the evaluation model must return.
    pub const RUBRIC: [ScoreMetric; 4] = [
        ScoreMetric::TypeAccuracy,
        ScoreMetric::CategoryRelevance,
        ScoreMetric::ContentCompleteness,
        ScoreMetric::ExtractionQuality,
    ];

    /// The serialized key.
    pub fn key(&self) -> &'static str {
        match self {
            ScoreMetric::TypeAccuracy => "precisión_del_tipo_de_mensaje",
            ScoreMetric::CategoryRelevance => "relevancia_de_la_categoría",
            ScoreMetric::ContentCompleteness => "exhaustividad_del_contenido",
            ScoreMetric::ExtractionQuality => "calidad_de_la_extracción",
            ScoreMetric::Mean => "puntuación_media",
        }
    }

    /// Human label: the key with spaces, first letter capitalized.
    pub fn label(&self) -> String {
        let spaced = self.key().replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl std::fmt::Display for ScoreMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_result_parses_model_reply() {
        let json = r#"{"message_type":"A","categories":[{"keyword":"k","content":["x","y"]}],"lang":"es"}"#;
        let result: SplitResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.message_type.as_deref(), Some("A"));
        assert_eq!(result.categories().len(), 1);
        assert_eq!(result.categories()[0].content, vec!["x", "y"]);
        assert_eq!(result.extra.get("lang"), Some(&Value::from("es")));
        assert!(!result.is_error());
    }

    #[test]
    fn failed_result_omits_split_fields() {
        let result = SplitResult::failed("hello", "boom");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["original_message"], "hello");
        assert_eq!(json["error"], "boom");
        assert!(json.get("message_type").is_none());
        assert!(json.get("categories").is_none());
        assert!(result.categories().is_empty());
    }

    #[test]
    fn malformed_result_keeps_raw_reply() {
        let result = SplitResult::malformed("hello", "invalid JSON response", "oops");
        assert!(result.is_error());
        assert_eq!(result.raw_content.as_deref(), Some("oops"));
        assert_eq!(result.original_message.as_deref(), Some("hello"));
    }

    #[test]
    fn mean_is_computed_on_construction() {
        let scores = Scores {
            type_accuracy: 5.0,
            category_relevance: 4.0,
            content_completeness: 3.0,
            extraction_quality: 4.0,
        };
        let eval = EvaluationResult::new("msg", scores, "ok");
        assert!((eval.mean_score() - 4.0).abs() < 1e-9);
        assert!((eval.score(ScoreMetric::Mean) - scores.mean()).abs() < 1e-9);
    }

    #[test]
    fn fallback_has_zero_scores_and_reason() {
        let eval = EvaluationResult::fallback("msg", "missing required key: comentario");
        for metric in ScoreMetric::ALL {
            assert_eq!(eval.score(metric), 0.0);
        }
        assert!(eval.comment().starts_with("Evaluation error:"));
        assert!(eval.comment().contains("comentario"));
    }

    #[test]
    fn evaluation_serializes_with_sheet_keys() {
        let eval = EvaluationResult::new("msg", Scores::default(), "c");
        let json = serde_json::to_value(&eval).unwrap();
        assert_eq!(json["mensaje_original"], "msg");
        assert_eq!(json["comentario"], "c");
        for metric in ScoreMetric::ALL {
            assert!(json.get(metric.key()).is_some(), "missing {}", metric.key());
        }
    }

    #[test]
    fn metric_labels_are_readable() {
        assert_eq!(ScoreMetric::Mean.label(), "Puntuación media");
        assert_eq!(
            ScoreMetric::TypeAccuracy.label(),
            "Precisión del tipo de mensaje"
        );
    }
}
