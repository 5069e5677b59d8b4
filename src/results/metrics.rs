//! Derived views over a result's statistics.

use crate::models::{AnalysisResult, Statistics};

pub const AVG_SCORE_LABEL: &str = "평균 점수";
pub const MAX_SCORE_LABEL: &str = "최대 점수";

/// Headline metrics for the results view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    pub avg_structural_score: f64,
    pub max_structural_score: f64,
    pub distinct_cell_types: usize,
    pub is_valid: bool,
}

impl MetricSummary {
    /// Computed from the result every time; never cached.
    pub fn of(result: &AnalysisResult) -> Self {
        let stats = &result.statistics;
        Self {
            avg_structural_score: stats.avg_structural_score,
            max_structural_score: stats.max_structural_score,
            distinct_cell_types: stats.type_distribution.len(),
            is_valid: result.validation.is_valid,
        }
    }
}

/// One bar of the score chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartPoint {
    pub label: &'static str,
    pub value: f64,
}

/// Two-point series fed to the bar chart: average then maximum score.
pub fn chart_series(stats: &Statistics) -> [ChartPoint; 2] {
    [
        ChartPoint {
            label: AVG_SCORE_LABEL,
            value: stats.avg_structural_score,
        },
        ChartPoint {
            label: MAX_SCORE_LABEL,
            value: stats.max_structural_score,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;

    #[test]
    fn test_missing_statistics_yield_zeroes() {
        let result = AnalysisResult::from_json(r#"{"analysisId":"x"}"#, None).unwrap();
        let summary = MetricSummary::of(&result);
        assert_eq!(summary.avg_structural_score, 0.0);
        assert_eq!(summary.max_structural_score, 0.0);
        assert_eq!(summary.distinct_cell_types, 0);
        assert!(!summary.is_valid);
    }

    #[test]
    fn test_summary_from_statistics() {
        let json = r#"{
            "statistics": {
                "avgStructuralScore": 0.42,
                "maxStructuralScore": 0.97,
                "typeDistribution": {"HEADER": 3, "PARAGRAPH": 40, "TABLE": 2}
            },
            "validation": {"isValid": true, "warnings": []}
        }"#;
        let result = AnalysisResult::from_json(json, Some(DocumentType::Report)).unwrap();
        let summary = MetricSummary::of(&result);
        assert_eq!(summary.distinct_cell_types, 3);
        assert!(summary.is_valid);

        let series = chart_series(&result.statistics);
        assert_eq!(series[0].label, "평균 점수");
        assert_eq!(series[0].value, 0.42);
        assert_eq!(series[1].label, "최대 점수");
        assert_eq!(series[1].value, 0.97);
    }
}
