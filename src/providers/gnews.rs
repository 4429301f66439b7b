// src/providers/gnews.rs
//! GNews response shape: `{totalArticles, articles: [...]}` with an `image`
//! field and a `source.name` object. Categories arrive as `topic` on the
//! request side only.

use anyhow::Result;
use serde::Deserialize;

use crate::normalize::RawRecord;

use super::{encode_query, ProviderSpec, RequestParams};

const ENDPOINT: &str = "https://gnews.io/api/v4";

pub fn spec() -> ProviderSpec {
    ProviderSpec {
        id: "gnews",
        key_env: "GNEWS_KEY",
        decode,
        headlines_url,
        search_url: Some(search_url),
    }
}

fn headlines_url(p: &RequestParams) -> String {
    let page = p.page.to_string();
    let max = p.page_size.to_string();
    let mut pairs = vec![
        ("apikey", p.key),
        ("lang", p.language),
        ("max", max.as_str()),
        ("page", page.as_str()),
    ];
    if p.category != "all" && p.category != "general" {
        pairs.push(("topic", p.category));
    }
    format!("{ENDPOINT}/top-headlines?{}", encode_query(&pairs))
}

fn search_url(p: &RequestParams) -> String {
    let max = p.page_size.to_string();
    let pairs = [
        ("apikey", p.key),
        ("q", p.query.unwrap_or_default()),
        ("lang", p.language),
        ("max", max.as_str()),
    ];
    format!("{ENDPOINT}/search?{}", encode_query(&pairs))
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    articles: Vec<ApiArticle>,
}

#[derive(Debug, Deserialize)]
struct ApiArticle {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    image: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
    source: Option<SourceRef>,
}

#[derive(Debug, Deserialize)]
struct SourceRef {
    name: Option<String>,
}

fn decode(payload: &str) -> Result<Vec<RawRecord>> {
    let envelope: Envelope = serde_json::from_str(payload)?;
    Ok(envelope
        .articles
        .into_iter()
        .map(|a| RawRecord {
            title: a.title,
            description: a.description,
            content: a.content,
            url: a.url,
            image: a.image,
            source: a.source.and_then(|s| s.name),
            author: None,
            published: a.published_at,
            category: None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn articles_array_maps_image_and_source() {
        let payload = r#"{
            "totalArticles": 1,
            "articles": [{
                "title": "Headline",
                "description": "Short take",
                "content": "Body",
                "url": "https://example.com/story",
                "image": "https://img.example.com/g.jpg",
                "publishedAt": "2025-06-10T09:30:00Z",
                "source": {"name": "GN Source", "url": "https://example.com"}
            }]
        }"#;
        let records = decode(payload).unwrap();
        assert_eq!(records[0].image.as_deref(), Some("https://img.example.com/g.jpg"));
        assert_eq!(records[0].source.as_deref(), Some("GN Source"));
    }

    #[test]
    fn topic_appears_only_for_specific_categories() {
        let p = RequestParams {
            key: "k",
            category: "sports",
            language: "en",
            query: None,
            page: 1,
            page_size: 20,
        };
        assert!(headlines_url(&p).contains("topic=sports"));
        let general = RequestParams {
            category: "general",
            ..p
        };
        assert!(!headlines_url(&general).contains("topic="));
    }
}
