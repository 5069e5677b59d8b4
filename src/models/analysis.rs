//! Analysis result model.
//!
//! `RawAnalysis` mirrors the service payload with every field optional.
//! `AnalysisResult` is the canonical, fully-defaulted shape every view uses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{finite_or_zero, lenient_f64, lenient_u64, null_as_default, opaque_id, preview};
use super::{parse_document_type_lenient, DocumentType};
use crate::results::keywords::normalize_keyword;

/// Characters of a key section shown in list display.
pub const KEY_SECTION_PREVIEW_CHARS: usize = 150;

/// Analysis payload as returned by the service (full or quick analysis, or storage).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysis {
    #[serde(default, deserialize_with = "opaque_id", alias = "id")]
    pub analysis_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64", alias = "cellCount")]
    pub total_cells: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_pages: u64,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "keyword_list")]
    pub keywords: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keyword_locations: BTreeMap<String, Option<Vec<Location>>>,
    #[serde(default)]
    pub statistics: Option<Statistics>,
    /// Flat score carried by stored results, which have no statistics block.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_structural_score: f64,
    #[serde(default)]
    pub validation: Option<Validation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub key_sections: Vec<KeySection>,
    #[serde(default)]
    pub success: Option<bool>,
}

/// Full structured output of a document analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub analysis_id: String,
    pub file_name: String,
    pub document_type: DocumentType,
    pub total_cells: u64,
    pub total_pages: u64,
    pub summary: Option<String>,
    /// Keywords in source order; duplicates preserved.
    pub keywords: Vec<String>,
    /// Locations keyed by trimmed keyword.
    pub keyword_locations: BTreeMap<String, Vec<Location>>,
    pub statistics: Statistics,
    pub validation: Validation,
    pub key_sections: Vec<KeySection>,
    pub success: Option<bool>,
}

impl AnalysisResult {
    /// Normalize a raw payload.
    ///
    /// `type_hint` fills in the document type when the payload does not carry
    /// one (the full analysis response never echoes it back).
    pub fn from_raw(raw: RawAnalysis, type_hint: Option<DocumentType>) -> Self {
        let document_type = match raw.document_type.as_deref() {
            Some(t) if !t.trim().is_empty() => parse_document_type_lenient(Some(t)),
            _ => type_hint.unwrap_or_default(),
        };

        // Source keys may carry whitespace; collisions after trimming merge
        // in key order.
        let mut keyword_locations: BTreeMap<String, Vec<Location>> = BTreeMap::new();
        for (key, locations) in raw.keyword_locations {
            keyword_locations
                .entry(normalize_keyword(&key).to_string())
                .or_default()
                .extend(locations.unwrap_or_default());
        }

        Self {
            analysis_id: raw.analysis_id.unwrap_or_default(),
            file_name: raw.file_name.unwrap_or_default(),
            document_type,
            total_cells: raw.total_cells,
            total_pages: raw.total_pages,
            summary: raw.summary.filter(|s| !s.trim().is_empty()),
            keywords: raw.keywords,
            keyword_locations,
            statistics: raw.statistics.unwrap_or_else(|| Statistics {
                avg_structural_score: raw.avg_structural_score,
                ..Default::default()
            }),
            validation: raw.validation.unwrap_or_default(),
            key_sections: raw.key_sections,
            success: raw.success,
        }
    }

    /// Parse and normalize a JSON payload.
    pub fn from_json(json: &str, type_hint: Option<DocumentType>) -> serde_json::Result<Self> {
        let raw: RawAnalysis = serde_json::from_str(json)?;
        Ok(Self::from_raw(raw, type_hint))
    }

    /// Keywords as displayed (trimmed), one per source entry.
    pub fn display_keywords(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(|k| normalize_keyword(k))
    }

    /// Whether the result carries an id that can be used as a route key.
    pub fn has_id(&self) -> bool {
        !self.analysis_id.is_empty()
    }
}

/// Keywords arrive as a JSON array, or (from storage) as text holding a JSON
/// array or a comma-separated list.
fn keyword_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect(),
        Some(serde_json::Value::String(text)) => {
            if let Ok(items) = serde_json::from_str::<Vec<String>>(&text) {
                items
            } else if text.trim().is_empty() {
                Vec::new()
            } else {
                text.split(',').map(str::to_string).collect()
            }
        }
        _ => Vec::new(),
    })
}

/// A document location supporting a keyword.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub page_number: u64,
    /// Relevance in `[0, 1]`.
    #[serde(default, deserialize_with = "lenient_f64")]
    pub relevance_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

impl Location {
    /// Relevance as a whole percentage, rounded to nearest and clamped to 0..=100.
    pub fn relevance_percent(&self) -> u32 {
        let pct = (finite_or_zero(self.relevance_score) * 100.0).round();
        pct.clamp(0.0, 100.0) as u32
    }
}

/// Structural-score statistics over all cells.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_structural_score: f64,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub max_structural_score: f64,
    /// Cell-type name to cell count.
    #[serde(default, deserialize_with = "type_distribution")]
    pub type_distribution: BTreeMap<String, u64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_resonance: f64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub header_count: u64,
}

fn type_distribution<'de, D>(deserializer: D) -> Result<BTreeMap<String, u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(k, v)| (k, super::value_as_u64(&v)))
        .collect())
}

/// Structure validation outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    #[serde(default, deserialize_with = "null_as_default", alias = "valid")]
    pub is_valid: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub warnings: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
}

/// High-scoring cell surfaced as a key section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySection {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub section_type: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

impl KeySection {
    /// Content truncated for list display.
    pub fn preview(&self) -> String {
        preview(&self.content, KEY_SECTION_PREVIEW_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_payload_defaults() {
        let result = AnalysisResult::from_json("{}", None).unwrap();
        assert_eq!(result.analysis_id, "");
        assert_eq!(result.document_type, DocumentType::General);
        assert_eq!(result.total_cells, 0);
        assert_eq!(result.statistics, Statistics::default());
        assert!(!result.validation.is_valid);
        assert!(result.summary.is_none());
        assert!(result.keywords.is_empty());
    }

    #[test]
    fn test_nulls_are_defaulted() {
        let json = r#"{
            "analysisId": 42,
            "fileName": null,
            "totalCells": null,
            "keywords": null,
            "keywordLocations": {"AI": null},
            "statistics": {"avgStructuralScore": null, "typeDistribution": null},
            "validation": null,
            "keySections": null
        }"#;
        let result = AnalysisResult::from_json(json, None).unwrap();
        assert_eq!(result.analysis_id, "42");
        assert_eq!(result.file_name, "");
        assert_eq!(result.statistics.avg_structural_score, 0.0);
        assert!(result.statistics.type_distribution.is_empty());
        assert_eq!(result.keyword_locations.get("AI"), Some(&Vec::new()));
    }

    #[test]
    fn test_location_keys_are_trimmed_and_merged() {
        let json = r#"{
            "keywordLocations": {
                " AI": [{"pageNumber": 1, "relevanceScore": 0.5, "content": "a"}],
                "AI": [{"pageNumber": 2, "relevanceScore": 0.9, "content": "b"}]
            }
        }"#;
        let result = AnalysisResult::from_json(json, None).unwrap();
        let pages: Vec<u64> = result.keyword_locations["AI"]
            .iter()
            .map(|l| l.page_number)
            .collect();
        assert_eq!(pages, vec![1, 2]);
        assert_eq!(result.keyword_locations.len(), 1);
    }

    #[test]
    fn test_type_hint_only_when_absent() {
        let result = AnalysisResult::from_json("{}", Some(DocumentType::Report)).unwrap();
        assert_eq!(result.document_type, DocumentType::Report);

        let result =
            AnalysisResult::from_json(r#"{"documentType":"MANUAL"}"#, Some(DocumentType::Report))
                .unwrap();
        assert_eq!(result.document_type, DocumentType::Manual);
    }

    #[test]
    fn test_quick_payload_shape() {
        let json = r#"{
            "success": true,
            "cellCount": 17,
            "summary": "Short",
            "validation": {"valid": true, "errors": [], "warnings": ["w1"]}
        }"#;
        let result = AnalysisResult::from_json(json, None).unwrap();
        assert_eq!(result.total_cells, 17);
        assert!(result.validation.is_valid);
        assert_eq!(result.validation.warnings, vec!["w1".to_string()]);
        assert!(!result.has_id());
    }

    #[test]
    fn test_relevance_percent_rounding() {
        let loc = |score: f64| Location {
            page_number: 1,
            relevance_score: score,
            content: String::new(),
        };
        assert_eq!(loc(0.8).relevance_percent(), 80);
        assert_eq!(loc(0.806).relevance_percent(), 81);
        assert_eq!(loc(0.004).relevance_percent(), 0);
        assert_eq!(loc(1.7).relevance_percent(), 100);
        assert_eq!(loc(-0.2).relevance_percent(), 0);
        assert_eq!(loc(f64::NAN).relevance_percent(), 0);
    }

    #[test]
    fn test_key_section_preview_keeps_full_content() {
        let section = KeySection {
            section_type: "HEADER".to_string(),
            score: 0.9,
            content: "x".repeat(200),
        };
        assert_eq!(section.preview().chars().count(), 153);
        assert_eq!(section.content.len(), 200);
    }

    #[test]
    fn test_stored_result_shape() {
        let json = r#"{
            "id": 7,
            "fileName": "q3.pdf",
            "documentType": "REPORT",
            "totalPages": 12,
            "keywords": "[\"revenue\", \"risk\"]",
            "avgStructuralScore": 0.61
        }"#;
        let result = AnalysisResult::from_json(json, None).unwrap();
        assert_eq!(result.analysis_id, "7");
        assert_eq!(result.keywords, vec!["revenue", "risk"]);
        assert_eq!(result.statistics.avg_structural_score, 0.61);
        assert_eq!(result.statistics.max_structural_score, 0.0);

        let json = r#"{"keywords": "alpha, beta"}"#;
        let result = AnalysisResult::from_json(json, None).unwrap();
        let shown: Vec<&str> = result.display_keywords().collect();
        assert_eq!(shown, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_flat_score_as_string_does_not_fail_decode() {
        let json = r#"{"id": 8, "fileName": "q4.pdf", "avgStructuralScore": "0.55"}"#;
        let result = AnalysisResult::from_json(json, None).unwrap();
        assert_eq!(result.analysis_id, "8");
        assert_eq!(result.statistics.avg_structural_score, 0.55);

        let json = r#"{"id": 9, "avgStructuralScore": "n/a"}"#;
        let result = AnalysisResult::from_json(json, None).unwrap();
        assert_eq!(result.statistics.avg_structural_score, 0.0);
    }

    #[test]
    fn test_display_keywords_preserve_duplicates() {
        let json = r#"{"keywords": ["AI ", "Data", " AI"]}"#;
        let result = AnalysisResult::from_json(json, None).unwrap();
        let shown: Vec<&str> = result.display_keywords().collect();
        assert_eq!(shown, vec!["AI", "Data", "AI"]);
    }
}
