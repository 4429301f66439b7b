// src/normalize.rs
//! Normalizer: maps provider-shaped [`RawRecord`]s onto the canonical
//! [`Article`], with HTML cleanup, truncation-marker removal, date parsing,
//! and image validation with placeholder fallback.

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use regex::Regex;
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::{OffsetDateTime, UtcOffset};

use crate::article::{article_id, Article};
use crate::category;
use crate::placeholder::placeholder_image;

/// Intermediate, provider-shaped representation of one article.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub source: Option<String>,
    pub author: Option<String>,
    pub published: Option<String>,
    pub category: Option<String>,
}

/// Titles some providers substitute for withdrawn articles.
const REMOVED_SENTINELS: [&str; 2] = ["[Removed]", "[REMOVED]"];

/// Decode HTML entities, strip tags, collapse whitespace.
pub fn clean_html(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}

/// Replace provider truncation markers like `[+1234 chars]` with an ellipsis.
pub fn strip_truncation_marker(s: &str) -> String {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| Regex::new(r"(?i)\s*\[\+\d+\s*chars?\]").unwrap());
    re.replace_all(s, "...").to_string()
}

/// Parse a provider date string (RFC 2822 for RSS, RFC 3339 for Atom/JSON,
/// plus one naive fallback format). Unparsable or missing dates resolve to
/// `fallback`, the fetch time.
pub fn parse_date(raw: Option<&str>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return fallback;
    };

    let unix = OffsetDateTime::parse(raw, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339))
        .map(|dt| dt.to_offset(UtcOffset::UTC).unix_timestamp())
        .ok();

    unix.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .or_else(|| {
            // "2025-06-10 09:30:00 +0000" shape some JSON providers emit.
            chrono::DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S %z")
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
        .or_else(|| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
        })
        .unwrap_or(fallback)
}

/// Accept only syntactically valid absolute http(s) URLs. Everything else
/// (empty, `"null"`, relative paths, other schemes) is rejected.
pub fn valid_image(raw: Option<&str>) -> Option<String> {
    let candidate = raw.map(str::trim).filter(|s| !s.is_empty() && *s != "null")?;
    let parsed = url::Url::parse(candidate).ok()?;
    match parsed.scheme() {
        "http" | "https" => Some(candidate.to_string()),
        _ => None,
    }
}

/// Normalize a batch of raw records. Records missing a title or URL are
/// dropped, as are removed-article sentinels. `now` is the fetch time used
/// for unparsable dates.
pub fn normalize(records: Vec<RawRecord>, now: DateTime<Utc>) -> Vec<Article> {
    records
        .into_iter()
        .filter_map(|r| normalize_one(r, now))
        .collect()
}

fn normalize_one(record: RawRecord, now: DateTime<Utc>) -> Option<Article> {
    let title = clean_html(record.title.as_deref()?);
    if title.is_empty() || REMOVED_SENTINELS.contains(&title.as_str()) {
        return None;
    }
    let url = record.url.as_deref().map(str::trim).unwrap_or_default();
    if url.is_empty() {
        return None;
    }

    let description = strip_truncation_marker(&clean_html(
        record.description.as_deref().unwrap_or_default(),
    ));
    let content_raw = record
        .content
        .as_deref()
        .or(record.description.as_deref())
        .unwrap_or_default();
    let content = strip_truncation_marker(&clean_html(content_raw));

    let category = record
        .category
        .as_deref()
        .map(category::canonical)
        .unwrap_or_else(|| category::DEFAULT_CATEGORY.to_string());

    let image = valid_image(record.image.as_deref())
        .unwrap_or_else(|| placeholder_image(&category));

    let source = record
        .source
        .map(|s| clean_html(&s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    let author = record
        .author
        .map(|a| clean_html(&a))
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| source.clone());

    Some(Article {
        id: article_id(url, &title),
        title,
        description,
        content,
        url: url.to_string(),
        image,
        source,
        author,
        published_at: parse_date(record.published.as_deref(), now),
        category,
        distance_km: None,
        is_local: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placeholder::PLACEHOLDER_SCHEME;

    fn record(title: &str, url: &str) -> RawRecord {
        RawRecord {
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            ..RawRecord::default()
        }
    }

    #[test]
    fn clean_html_strips_tags_and_decodes_entities() {
        let s = "<p>Rates &amp; markets:&nbsp;<b>update</b></p>";
        assert_eq!(clean_html(s), "Rates & markets: update");
    }

    #[test]
    fn truncation_marker_becomes_ellipsis() {
        let out = strip_truncation_marker("Example text[+120 chars]");
        assert_eq!(out, "Example text...");
        assert!(!out.contains("chars]"));
        assert_eq!(strip_truncation_marker("Solo [+1 char]"), "Solo...");
    }

    #[test]
    fn records_without_title_or_url_are_dropped() {
        let now = Utc::now();
        let missing_url = RawRecord {
            title: Some("t".into()),
            ..RawRecord::default()
        };
        let missing_title = RawRecord {
            url: Some("https://e.com".into()),
            ..RawRecord::default()
        };
        assert!(normalize(vec![missing_url, missing_title], now).is_empty());
    }

    #[test]
    fn removed_sentinel_is_dropped() {
        let now = Utc::now();
        let r = record("[Removed]", "https://example.com/gone");
        assert!(normalize(vec![r], now).is_empty());
    }

    #[test]
    fn invalid_image_falls_back_to_placeholder() {
        let now = Utc::now();
        for bad in ["not-a-url", "null", "", "/relative/img.png", "ftp://x/y.png"] {
            let mut r = record("title", "https://example.com/a");
            r.image = Some(bad.to_string());
            let out = normalize(vec![r], now);
            assert!(
                out[0].image.starts_with(PLACEHOLDER_SCHEME),
                "image {bad:?} should be replaced"
            );
        }
    }

    #[test]
    fn valid_image_is_kept() {
        let now = Utc::now();
        let mut r = record("title", "https://example.com/a");
        r.image = Some("https://cdn.example.com/pic.jpg".into());
        let out = normalize(vec![r], now);
        assert_eq!(out[0].image, "https://cdn.example.com/pic.jpg");
    }

    #[test]
    fn unparsable_date_defaults_to_fetch_time() {
        let now = Utc::now();
        let mut r = record("title", "https://example.com/a");
        r.published = Some("yesterday-ish".into());
        let out = normalize(vec![r], now);
        assert_eq!(out[0].published_at, now);
    }

    #[test]
    fn rfc2822_and_rfc3339_dates_parse() {
        let fallback = Utc::now();
        let a = parse_date(Some("Tue, 10 Jun 2025 09:30:00 GMT"), fallback);
        let b = parse_date(Some("2025-06-10T09:30:00Z"), fallback);
        assert_eq!(a, b);
        assert_ne!(a, fallback);
    }

    #[test]
    fn author_defaults_to_source() {
        let now = Utc::now();
        let mut r = record("title", "https://example.com/a");
        r.source = Some("BBC News".into());
        let out = normalize(vec![r], now);
        assert_eq!(out[0].author, "BBC News");
    }

    #[test]
    fn normalization_is_idempotent_for_ids() {
        let now = Utc::now();
        let a = normalize(vec![record("t", "https://example.com/x")], now);
        let b = normalize(vec![record("t", "https://example.com/x")], now);
        assert_eq!(a[0].id, b[0].id);
    }
}
