// SPDX-FileCopyrightText: 2026 Sluice Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text extraction from heterogeneous upstream frames.
//!
//! The engine's response framing is only partially documented; a frame may
//! arrive in any of three shapes. Each shape gets one pure extraction
//! function, tried in priority order, so the stream loop never sniffs
//! formats inline. Empty strings are dropped at extraction time.

use serde_json::Value;

type Extractor = fn(&Value) -> Option<Vec<String>>;

/// Extraction functions in priority order.
const EXTRACTORS: [Extractor; 3] = [extract_content_parts, extract_candidates, extract_flat_text];

/// Extract all text increments from one parsed frame.
///
/// Returns an empty vector for frames in none of the known shapes; such
/// frames are skipped, never fatal.
pub fn extract_text(frame: &Value) -> Vec<String> {
    for extractor in EXTRACTORS {
        if let Some(texts) = extractor(frame) {
            return texts;
        }
    }
    Vec::new()
}

/// Primary shape: `{"content": {"parts": [{"text": ...}, ...]}}`.
fn extract_content_parts(frame: &Value) -> Option<Vec<String>> {
    let parts = frame.get("content")?.get("parts")?.as_array()?;
    collect_part_texts(parts)
}

/// Alternate shape: `{"candidates": [{"content": {"parts": [{"text": ...}]}}, ...]}`.
fn extract_candidates(frame: &Value) -> Option<Vec<String>> {
    let candidates = frame.get("candidates")?.as_array()?;
    let mut texts = Vec::new();
    for candidate in candidates {
        if let Some(parts) = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(Value::as_array)
            && let Some(mut t) = collect_part_texts(parts)
        {
            texts.append(&mut t);
        }
    }
    if texts.is_empty() { None } else { Some(texts) }
}

/// Flat shape: `{"text": ...}`.
fn extract_flat_text(frame: &Value) -> Option<Vec<String>> {
    let text = frame.get("text")?.as_str()?;
    if text.is_empty() {
        None
    } else {
        Some(vec![text.to_string()])
    }
}

fn collect_part_texts(parts: &[Value]) -> Option<Vec<String>> {
    let texts: Vec<String> = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if texts.is_empty() { None } else { Some(texts) }
}
