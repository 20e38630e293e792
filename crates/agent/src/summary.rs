//! Batch-level score averages.

use splitscore_core::{EvaluationResult, ScoreMetric};

/// Averages below this are flagged for attention in the run report.
pub const ATTENTION_THRESHOLD: f64 = 4.0;

/// Per-metric averages over a batch of evaluations.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSummary {
    count: usize,
    averages: Vec<(ScoreMetric, f64)>,
}

impl ScoreSummary {
    /// Average every metric over `results`. An empty batch has no averages.
    pub fn from_results(results: &[EvaluationResult]) -> Self {
        let count = results.len();
        if count == 0 {
            return Self {
                count,
                averages: Vec::new(),
            };
        }

        let averages = ScoreMetric::ALL
            .iter()
            .map(|&metric| {
                let total: f64 = results.iter().map(|r| r.score(metric)).sum();
                (metric, total / count as f64)
            })
            .collect();

        Self { count, averages }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Every metric with its average, in report order (mean last).
    pub fn averages(&self) -> &[(ScoreMetric, f64)] {
        &self.averages
    }

    pub fn average(&self, metric: ScoreMetric) -> Option<f64> {
        self.averages
            .iter()
            .find(|(m, _)| *m == metric)
            .map(|(_, avg)| *avg)
    }

    /// Metrics averaging strictly below `threshold`.
    pub fn below(&self, threshold: f64) -> Vec<(ScoreMetric, f64)> {
        self.averages
            .iter()
            .filter(|(_, avg)| *avg < threshold)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitscore_core::Scores;

    fn eval(a: f64, b: f64, c: f64, d: f64) -> EvaluationResult {
        EvaluationResult::new(
            "m",
            Scores {
                type_accuracy: a,
                category_relevance: b,
                content_completeness: c,
                extraction_quality: d,
            },
            "",
        )
    }

    #[test]
    fn averages_each_metric() {
        let summary = ScoreSummary::from_results(&[eval(5.0, 4.0, 3.0, 4.0), eval(3.0, 4.0, 5.0, 2.0)]);

        assert_eq!(summary.count(), 2);
        assert_eq!(summary.average(ScoreMetric::TypeAccuracy), Some(4.0));
        assert_eq!(summary.average(ScoreMetric::CategoryRelevance), Some(4.0));
        assert_eq!(summary.average(ScoreMetric::ContentCompleteness), Some(4.0));
        assert_eq!(summary.average(ScoreMetric::ExtractionQuality), Some(3.0));
        assert!((summary.average(ScoreMetric::Mean).unwrap() - 3.75).abs() < 1e-9);
    }

    #[test]
    fn averages_follow_report_order() {
        let summary = ScoreSummary::from_results(&[eval(1.0, 2.0, 3.0, 4.0)]);
        let metrics: Vec<_> = summary.averages().iter().map(|(m, _)| *m).collect();
        assert_eq!(metrics, ScoreMetric::ALL.to_vec());
    }

    #[test]
    fn below_threshold_is_strict() {
        let summary = ScoreSummary::from_results(&[eval(4.0, 3.5, 5.0, 4.0)]);
        let flagged: Vec<_> = summary
            .below(ATTENTION_THRESHOLD)
            .into_iter()
            .map(|(m, _)| m)
            .collect();
        assert_eq!(flagged, vec![ScoreMetric::CategoryRelevance]);
    }

    #[test]
    fn empty_batch_has_no_averages() {
        let summary = ScoreSummary::from_results(&[]);
        assert!(summary.is_empty());
        assert!(summary.averages().is_empty());
        assert!(summary.below(ATTENTION_THRESHOLD).is_empty());
    }
}
