// src/providers/newsapi.rs
//! NewsAPI.org response shape: `{status, articles: [...]}` with
//! `urlToImage`/`publishedAt` field names, a `source.name` object, and
//! `[+N chars]` truncation markers in `content`.

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::config::country_for_language;
use crate::normalize::RawRecord;

use super::{encode_query, ProviderSpec, RequestParams};

const ENDPOINT: &str = "https://newsapi.org/v2";

pub fn spec() -> ProviderSpec {
    ProviderSpec {
        id: "newsapi",
        key_env: "NEWSAPI_KEY",
        decode,
        headlines_url,
        search_url: Some(search_url),
    }
}

fn headlines_url(p: &RequestParams) -> String {
    let page = p.page.to_string();
    let page_size = p.page_size.to_string();
    let mut pairs = vec![
        ("apiKey", p.key),
        ("pageSize", page_size.as_str()),
        ("page", page.as_str()),
        ("language", p.language),
    ];
    // Top headlines are keyed by category when one is requested, otherwise
    // by the language's country.
    if p.category != "all" && p.category != "general" {
        pairs.push(("category", p.category));
    } else {
        pairs.push(("country", country_for_language(p.language)));
    }
    format!("{ENDPOINT}/top-headlines?{}", encode_query(&pairs))
}

fn search_url(p: &RequestParams) -> String {
    let page = p.page.to_string();
    let page_size = p.page_size.to_string();
    let pairs = [
        ("apiKey", p.key),
        ("q", p.query.unwrap_or_default()),
        ("language", p.language),
        ("pageSize", page_size.as_str()),
        ("page", page.as_str()),
        ("sortBy", "publishedAt"),
    ];
    format!("{ENDPOINT}/everything?{}", encode_query(&pairs))
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    source: Option<SourceRef>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    #[serde(rename = "urlToImage")]
    url_to_image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SourceRef {
    name: Option<String>,
}

fn decode(payload: &str) -> Result<Vec<RawRecord>> {
    let envelope: Envelope = serde_json::from_str(payload)?;
    if envelope.status.as_deref() != Some("ok") {
        bail!(
            "newsapi error: {}",
            envelope.message.unwrap_or_else(|| "unknown".to_string())
        );
    }
    Ok(envelope
        .articles
        .into_iter()
        .map(|a| RawRecord {
            title: a.title,
            description: a.description,
            content: a.content,
            url: a.url,
            image: a.url_to_image,
            source: a.source.and_then(|s| s.name),
            author: a.author,
            published: a.published_at,
            category: None,
        })
        .collect())
}
