//! History listing entries.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{lenient_f64, lenient_opt_u64, lenient_u64, opaque_id, preview, DocumentType};

/// Characters of the summary shown in the history list.
pub const SUMMARY_PREVIEW_CHARS: usize = 100;

/// Summary projection of a stored analysis, used in listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default, deserialize_with = "required_id")]
    pub id: String,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub file_name: String,
    #[serde(default)]
    pub document_type: DocumentType,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_pages: u64,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub total_cells: u64,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub avg_structural_score: f64,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub processing_time_ms: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl HistoryEntry {
    /// Summary truncated for the list, or `None` when the entry has no summary.
    pub fn summary_preview(&self) -> Option<String> {
        self.summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(|s| preview(s, SUMMARY_PREVIEW_CHARS))
    }

    /// Creation date formatted for the list (`YYYY-MM-DD`), `-` when unknown.
    pub fn created_date(&self) -> String {
        self.created_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

fn required_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(opaque_id(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339 (converted to UTC), zone-less ISO-8601 as emitted by the
/// storage service, or the `[y, m, d, h, min, s, nanos]` array form.
fn timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => parse_timestamp(&s),
        Some(serde_json::Value::Array(parts)) => {
            let n: Vec<i64> = parts.iter().filter_map(|p| p.as_i64()).collect();
            timestamp_from_parts(&n)
        }
        _ => None,
    })
}

fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).naive_utc());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
}

fn timestamp_from_parts(n: &[i64]) -> Option<NaiveDateTime> {
    let get = |i: usize| n.get(i).copied().unwrap_or(0);
    if n.len() < 3 {
        return None;
    }
    let date = chrono::NaiveDate::from_ymd_opt(get(0) as i32, get(1) as u32, get(2) as u32)?;
    date.and_hms_nano_opt(get(3) as u32, get(4) as u32, get(5) as u32, get(6) as u32)
}
