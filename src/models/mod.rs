//! Data models for analysis results and history listings.
//!
//! Wire payloads from the analysis service are partially populated and use
//! nulls liberally; the helpers here turn every absent value into its
//! default so that nothing downstream has to deal with missing numbers.

pub mod analysis;
pub mod history;

pub use analysis::{
    AnalysisResult, KeySection, Location, RawAnalysis, Statistics, Validation,
    KEY_SECTION_PREVIEW_CHARS,
};
pub use history::HistoryEntry;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Document category the analysis service tunes its filters for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    ResearchPaper,
    Report,
    Contract,
    Presentation,
    Manual,
    #[default]
    General,
}

impl DocumentType {
    pub const ALL: [DocumentType; 6] = [
        DocumentType::ResearchPaper,
        DocumentType::Report,
        DocumentType::Contract,
        DocumentType::Presentation,
        DocumentType::Manual,
        DocumentType::General,
    ];

    /// Wire value, e.g. `RESEARCH_PAPER`.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::ResearchPaper => "RESEARCH_PAPER",
            DocumentType::Report => "REPORT",
            DocumentType::Contract => "CONTRACT",
            DocumentType::Presentation => "PRESENTATION",
            DocumentType::Manual => "MANUAL",
            DocumentType::General => "GENERAL",
        }
    }

    /// Localized label shown in the upload form.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::ResearchPaper => "논문",
            DocumentType::Report => "보고서",
            DocumentType::Contract => "계약서",
            DocumentType::Presentation => "발표자료",
            DocumentType::Manual => "매뉴얼",
            DocumentType::General => "일반 문서",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown document type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown document type: {0}")]
pub struct UnknownDocumentType(pub String);

impl FromStr for DocumentType {
    type Err = UnknownDocumentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace('-', "_").to_ascii_uppercase();
        DocumentType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| UnknownDocumentType(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for DocumentType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(parse_document_type_lenient(raw.as_deref()))
    }
}

/// Parse a document type, falling back to `GENERAL` for absent or unknown values.
pub fn parse_document_type_lenient(raw: Option<&str>) -> DocumentType {
    match raw {
        None => DocumentType::General,
        Some(s) => s.parse().unwrap_or_else(|_| {
            tracing::debug!("Unknown document type {:?}, using GENERAL", s);
            DocumentType::General
        }),
    }
}

/// Deserialize a nullable value, mapping `null` to the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a number that may be null, a string, or non-finite into a finite `f64`.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(value_as_f64).unwrap_or(0.0))
}

/// Deserialize a count that may be null, fractional, negative or a string.
pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(value_as_u64).unwrap_or(0))
}

/// Like [`lenient_u64`], but keeps an absent or `null` value as `None`.
pub(crate) fn lenient_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.is_null()).map(|v| value_as_u64(&v)))
}

/// Deserialize an opaque identifier that may arrive as a JSON string or number.
pub(crate) fn opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub(crate) fn value_as_f64(value: &serde_json::Value) -> f64 {
    let n = match value {
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    finite_or_zero(n)
}

pub(crate) fn value_as_u64(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

pub(crate) fn finite_or_zero(n: f64) -> f64 {
    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Take at most `max_chars` characters (UTF-8 safe), appending "..." when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_type_round_trip_names() {
        for t in DocumentType::ALL {
            assert_eq!(t.as_str().parse::<DocumentType>().unwrap(), t);
        }
        assert_eq!(
            "research-paper".parse::<DocumentType>().unwrap(),
            DocumentType::ResearchPaper
        );
        assert!("SPREADSHEET".parse::<DocumentType>().is_err());
    }

    #[test]
    fn test_document_type_lenient_deserialize() {
        let t: DocumentType = serde_json::from_str("\"CONTRACT\"").unwrap();
        assert_eq!(t, DocumentType::Contract);
        let t: DocumentType = serde_json::from_str("\"whatever\"").unwrap();
        assert_eq!(t, DocumentType::General);
        let t: DocumentType = serde_json::from_str("null").unwrap();
        assert_eq!(t, DocumentType::General);
    }

    #[test]
    fn test_preview_is_char_safe() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("한국어문서", 2), "한국...");
        assert_eq!(preview("exact", 5), "exact");
    }

    #[test]
    fn test_value_coercions() {
        assert_eq!(value_as_f64(&serde_json::json!("0.5")), 0.5);
        assert_eq!(value_as_f64(&serde_json::json!(null)), 0.0);
        assert_eq!(value_as_u64(&serde_json::json!(-3)), 0);
        assert_eq!(value_as_u64(&serde_json::json!(4.0)), 4);
    }
}
