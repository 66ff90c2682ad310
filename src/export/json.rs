use chrono::{DateTime, Utc};
use serde::Serialize;

use super::segments::Segment;
use crate::utils::EngineError;

/// JSON 修订稿
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TrackedDocument<'a> {
    document: &'a str,
    generated_at: DateTime<Utc>,
    inserted: usize,
    proposed: usize,
    segments: &'a [Segment],
}

/// 渲染为 JSON 修订稿
pub fn render(title: &str, segments: &[Segment]) -> Result<Vec<u8>, EngineError> {
    let inserted = segments
        .iter()
        .filter(|s| matches!(s, Segment::Inserted { .. }))
        .count();
    let proposed = segments
        .iter()
        .filter(|s| matches!(s, Segment::Proposed { .. }))
        .count();

    let document = TrackedDocument {
        document: title,
        generated_at: Utc::now(),
        inserted,
        proposed,
        segments,
    };

    Ok(serde_json::to_vec_pretty(&document)?)
}
