// src/providers/mediastack.rs
//! Mediastack response shape: `{pagination, data: [...]}` with snake_case
//! `published_at`, a plain-string `source`, and offset-based paging.

use anyhow::Result;
use serde::Deserialize;

use crate::normalize::RawRecord;

use super::{encode_query, ProviderSpec, RequestParams};

const ENDPOINT: &str = "http://api.mediastack.com/v1";

pub fn spec() -> ProviderSpec {
    ProviderSpec {
        id: "mediastack",
        key_env: "MEDIASTACK_KEY",
        decode,
        headlines_url,
        search_url: Some(search_url),
    }
}

fn headlines_url(p: &RequestParams) -> String {
    let limit = p.page_size.to_string();
    let offset = (p.page.saturating_sub(1) * p.page_size).to_string();
    let mut pairs = vec![
        ("access_key", p.key),
        ("languages", p.language),
        ("limit", limit.as_str()),
        ("offset", offset.as_str()),
    ];
    if p.category != "all" && p.category != "general" {
        pairs.push(("categories", p.category));
    }
    format!("{ENDPOINT}/news?{}", encode_query(&pairs))
}

fn search_url(p: &RequestParams) -> String {
    let limit = p.page_size.to_string();
    let pairs = [
        ("access_key", p.key),
        ("languages", p.language),
        ("keywords", p.query.unwrap_or_default()),
        ("limit", limit.as_str()),
    ];
    format!("{ENDPOINT}/news?{}", encode_query(&pairs))
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    source: Option<String>,
    image: Option<String>,
    category: Option<String>,
    published_at: Option<String>,
}

fn decode(payload: &str) -> Result<Vec<RawRecord>> {
    let envelope: Envelope = serde_json::from_str(payload)?;
    Ok(envelope
        .data
        .into_iter()
        .map(|a| RawRecord {
            title: a.title,
            description: a.description,
            content: None,
            url: a.url,
            image: a.image,
            source: a.source,
            author: a.author,
            published: a.published_at,
            category: a.category,
        })
        .collect())
}
