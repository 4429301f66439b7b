// src/providers/currentsapi.rs
//! CurrentsAPI response shape: `{status, news: [...]}` — note the result
//! array is `news`, the date field is `published`, categories are an array,
//! and the closest thing to a publisher is `author`.

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::normalize::RawRecord;

use super::{encode_query, ProviderSpec, RequestParams};

const ENDPOINT: &str = "https://api.currentsapi.services/v1";

pub fn spec() -> ProviderSpec {
    ProviderSpec {
        id: "currentsapi",
        key_env: "CURRENTSAPI_KEY",
        decode,
        headlines_url,
        search_url: Some(search_url),
    }
}

fn headlines_url(p: &RequestParams) -> String {
    let page_size = p.page_size.to_string();
    let page_number = p.page.to_string();
    let mut pairs = vec![
        ("apiKey", p.key),
        ("language", p.language),
        ("page_size", page_size.as_str()),
        ("page_number", page_number.as_str()),
    ];
    if p.category != "all" && p.category != "general" {
        pairs.push(("category", p.category));
    }
    format!("{ENDPOINT}/latest-news?{}", encode_query(&pairs))
}

fn search_url(p: &RequestParams) -> String {
    let page_size = p.page_size.to_string();
    let pairs = [
        ("apiKey", p.key),
        ("language", p.language),
        ("keywords", p.query.unwrap_or_default()),
        ("page_size", page_size.as_str()),
    ];
    format!("{ENDPOINT}/search?{}", encode_query(&pairs))
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: Option<String>,
    #[serde(default)]
    news: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    author: Option<String>,
    image: Option<String>,
    #[serde(default)]
    category: Vec<String>,
    published: Option<String>,
}

fn decode(payload: &str) -> Result<Vec<RawRecord>> {
    let envelope: Envelope = serde_json::from_str(payload)?;
    if envelope.status.as_deref() != Some("ok") {
        bail!("currentsapi error: status {:?}", envelope.status);
    }
    Ok(envelope
        .news
        .into_iter()
        .map(|a| RawRecord {
            title: a.title,
            description: a.description.clone(),
            content: a.description,
            url: a.url,
            image: a.image,
            source: a.author.clone(),
            author: a.author,
            published: a.published,
            category: a.category.into_iter().next(),
        })
        .collect())
}
