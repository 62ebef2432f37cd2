//! src/remote/file_meta.rs
//! ============================================================================
//! # FileMeta: Remote File Descriptor
//!
//! Immutable descriptor of one remote image file, deserialized straight from
//! the listing collaborator's JSON (camelCase field names on the wire).

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

static SIZE_SUFFIX: OnceLock<Regex> = OnceLock::new();

fn size_suffix() -> &'static Regex {
    SIZE_SUFFIX.get_or_init(|| Regex::new(r"=s\d+$").expect("size suffix pattern is valid"))
}

/// One remote file as reported by the listing collaborator. Never mutated
/// after receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    /// Unique per remote file; the dedup key for the whole pipeline.
    pub id: String,
    pub name: String,
    /// Thumbnail URI carrying a trailing `=s<N>` size suffix.
    pub thumbnail_link: String,
    pub created_time: DateTime<Utc>,
}

impl FileMeta {
    /// Full-size variant of the thumbnail URI: the trailing `=s<N>` suffix
    /// is swapped for `suffix` (e.g. `s4000`). URIs without a size suffix
    /// pass through unchanged.
    pub fn hi_res_link(&self, suffix: &str) -> String {
        size_suffix()
            .replace(&self.thumbnail_link, format!("={suffix}"))
            .into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hi_res_link_swaps_size_suffix() {
        let file = FileMeta {
            id: "abc123".to_string(),
            name: "sunset.jpg".to_string(),
            thumbnail_link: "https://lh3.example.com/abc123=s220".to_string(),
            created_time: Utc::now(),
        };
        assert_eq!(
            file.hi_res_link("s4000"),
            "https://lh3.example.com/abc123=s4000"
        );
    }

    #[test]
    fn hi_res_link_leaves_unsuffixed_uris_alone() {
        let file = FileMeta {
            id: "abc123".to_string(),
            name: "sunset.jpg".to_string(),
            thumbnail_link: "https://lh3.example.com/abc123".to_string(),
            created_time: Utc::now(),
        };
        assert_eq!(file.hi_res_link("s4000"), "https://lh3.example.com/abc123");
    }

    #[test]
    fn deserializes_camel_case_listing_entry() {
        let json = r#"{
            "id": "1xYz",
            "name": "beach.png",
            "thumbnailLink": "https://lh3.example.com/1xYz=s220",
            "createdTime": "2024-01-15T10:30:00Z"
        }"#;
        let file: FileMeta = serde_json::from_str(json).expect("parse");
        assert_eq!(file.id, "1xYz");
        assert_eq!(file.thumbnail_link, "https://lh3.example.com/1xYz=s220");
        assert_eq!(file.created_time.to_rfc3339(), "2024-01-15T10:30:00+00:00");
    }
}
