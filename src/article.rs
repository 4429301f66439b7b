// src/article.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Truncated hex length of an article id.
pub const ID_LEN: usize = 16;

/// Canonical, provider-agnostic article record.
///
/// Produced once by the normalizer and immutable afterwards; downstream
/// stages only filter, reorder, or annotate the locality fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub url: String,
    /// Always an absolute http(s) URL or a generated data-URI placeholder.
    pub image: String,
    pub source: String,
    pub author: String,
    #[serde(rename = "publishedAt")]
    pub published_at: DateTime<Utc>,
    pub category: String,
    /// Distance to the requester, set only by the local-news selector.
    #[serde(rename = "distanceKm", skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    /// True when the article came from a feed inside the local radius.
    #[serde(rename = "isLocal", skip_serializing_if = "Option::is_none")]
    pub is_local: Option<bool>,
}

impl Article {
    /// Identity key used by the deduplicator: URL when present, otherwise
    /// the normalized title.
    pub fn identity_key(&self) -> String {
        if self.url.is_empty() {
            normalized_title(&self.title)
        } else {
            self.url.clone()
        }
    }
}

/// Lowercased title with all whitespace stripped. Used as the id/dedup
/// fallback when a record exceptionally lacks a URL.
pub fn normalized_title(title: &str) -> String {
    title
        .to_lowercase()
        .split_whitespace()
        .collect::<String>()
}

/// Derive a stable article id from the canonical URL (fallback: normalized
/// title). Same input always yields the same id: SHA-256, truncated to
/// [`ID_LEN`] hex chars.
pub fn article_id(url: &str, title: &str) -> String {
    let key = if url.is_empty() {
        normalized_title(title)
    } else {
        url.to_string()
    };
    let digest = Sha256::digest(key.as_bytes());
    let hex = format!("{digest:x}");
    hex[..ID_LEN].to_string()
}
