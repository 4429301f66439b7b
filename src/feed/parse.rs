// src/feed/parse.rs
//! RSS 2.0 and Atom parsing into provider-shaped [`RawRecord`]s.
//!
//! Image extraction priority per item: explicit image enclosure, then
//! `media:thumbnail`, then `media:content`, then the first `<img>` sniffed
//! out of the description HTML. None found leaves the image empty; the
//! normalizer supplies the placeholder.

use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use quick_xml::de::from_str;
use regex::Regex;
use serde::Deserialize;

use crate::normalize::{clean_html, RawRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedKind {
    Rss,
    Atom,
}

/// Sniff the document kind from the root element.
pub fn detect_kind(payload: &str) -> Option<FeedKind> {
    let head: String = payload.chars().take(512).collect();
    if head.contains("<rss") {
        Some(FeedKind::Rss)
    } else if head.contains("<feed") {
        Some(FeedKind::Atom)
    } else {
        None
    }
}

/// Parse a feed document. Fails softly: a document that cannot be parsed at
/// all yields an empty sequence, never an error to the caller.
pub fn parse_feed(payload: &str) -> Vec<RawRecord> {
    let t0 = std::time::Instant::now();
    let xml = scrub_html_entities_for_xml(payload);

    let records = match detect_kind(&xml) {
        Some(FeedKind::Rss) => parse_rss(&xml),
        Some(FeedKind::Atom) => parse_atom(&xml),
        None => {
            tracing::warn!("unknown feed format, skipping document");
            Ok(Vec::new())
        }
    };
    let records = records.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "malformed feed document, skipping");
        Vec::new()
    });

    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_parse_ms").record(ms);
    counter!("feed_records_total").increment(records.len() as u64);
    records
}

// --- RSS 2.0 ---

#[derive(Debug, Deserialize)]
struct RssDoc {
    channel: RssChannel,
}

#[derive(Debug, Deserialize)]
struct RssChannel {
    title: Option<Text>,
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<Text>,
    link: Option<Text>,
    description: Option<Text>,
    #[serde(rename = "pubDate")]
    pub_date: Option<Text>,
    #[serde(rename = "category", default)]
    categories: Vec<Text>,
    enclosure: Option<Enclosure>,
    #[serde(rename = "media:thumbnail", default)]
    media_thumbnails: Vec<MediaRef>,
    #[serde(rename = "media:content", default)]
    media_contents: Vec<MediaRef>,
}

/// Element whose text we want even when attributes are present
/// (e.g. `<category domain="...">World</category>`).
#[derive(Debug, Deserialize)]
struct Text {
    #[serde(rename = "$text")]
    value: Option<String>,
}

impl Text {
    fn get(&self) -> Option<String> {
        self.value
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

fn text_of(field: &Option<Text>) -> Option<String> {
    field.as_ref().and_then(Text::get)
}

#[derive(Debug, Deserialize)]
struct Enclosure {
    #[serde(rename = "@url")]
    url: Option<String>,
    #[serde(rename = "@type")]
    mime: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaRef {
    #[serde(rename = "@url")]
    url: Option<String>,
}

fn parse_rss(xml: &str) -> anyhow::Result<Vec<RawRecord>> {
    let doc: RssDoc = from_str(xml)?;
    let source = text_of(&doc.channel.title).map(|t| clean_html(&t));

    let records = doc
        .channel
        .items
        .into_iter()
        .map(|item| {
            let description_html = text_of(&item.description).unwrap_or_default();
            let image = item
                .enclosure
                .as_ref()
                .filter(|e| {
                    e.mime
                        .as_deref()
                        .map(|m| m.starts_with("image"))
                        .unwrap_or(false)
                })
                .and_then(|e| e.url.clone())
                .or_else(|| item.media_thumbnails.iter().find_map(|m| m.url.clone()))
                .or_else(|| item.media_contents.iter().find_map(|m| m.url.clone()))
                .or_else(|| extract_image_from_html(&description_html));

            RawRecord {
                title: text_of(&item.title).map(|t| clean_html(&t)),
                description: Some(clean_html(&description_html)),
                content: None,
                url: text_of(&item.link),
                image,
                source: source.clone(),
                author: None,
                published: text_of(&item.pub_date),
                category: item.categories.iter().find_map(Text::get),
            }
        })
        .collect();
    Ok(records)
}

// --- Atom ---

#[derive(Debug, Deserialize)]
struct AtomFeed {
    title: Option<Text>,
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<Text>,
    summary: Option<Text>,
    content: Option<Text>,
    updated: Option<Text>,
    published: Option<Text>,
    #[serde(rename = "link", default)]
    links: Vec<AtomLink>,
    #[serde(rename = "category", default)]
    categories: Vec<AtomCategory>,
    #[serde(rename = "media:thumbnail", default)]
    media_thumbnails: Vec<MediaRef>,
    #[serde(rename = "media:content", default)]
    media_contents: Vec<MediaRef>,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomCategory {
    #[serde(rename = "@term")]
    term: Option<String>,
}

fn parse_atom(xml: &str) -> anyhow::Result<Vec<RawRecord>> {
    let doc: AtomFeed = from_str(xml)?;
    let source = text_of(&doc.title).map(|t| clean_html(&t));

    let records = doc
        .entries
        .into_iter()
        .map(|entry| {
            let summary_html = text_of(&entry.summary)
                .or_else(|| text_of(&entry.content))
                .unwrap_or_default();
            let image = entry
                .media_thumbnails
                .iter()
                .find_map(|m| m.url.clone())
                .or_else(|| entry.media_contents.iter().find_map(|m| m.url.clone()))
                .or_else(|| extract_image_from_html(&summary_html));

            // rel="alternate" (or rel-less) link points at the article.
            let url = entry
                .links
                .iter()
                .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
                .and_then(|l| l.href.clone());

            RawRecord {
                title: text_of(&entry.title).map(|t| clean_html(&t)),
                description: Some(clean_html(&summary_html)),
                content: None,
                url,
                image,
                source: source.clone(),
                author: None,
                published: text_of(&entry.updated).or_else(|| text_of(&entry.published)),
                category: entry.categories.iter().find_map(|c| c.term.clone()),
            }
        })
        .collect();
    Ok(records)
}

/// First `<img src="...">` in an HTML fragment.
fn extract_image_from_html(html: &str) -> Option<String> {
    static RE: OnceCell<Regex> = OnceCell::new();
    let re = RE.get_or_init(|| Regex::new(r#"(?i)<img[^>]+src\s*=\s*["']([^"'>]+)["']"#).unwrap());
    re.captures(html).map(|c| c[1].to_string())
}

/// Feeds routinely embed HTML entities that are not valid XML entities.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Example Wire</title>
    <item>
      <title>First &amp; foremost</title>
      <link>https://example.com/one</link>
      <description><![CDATA[<p>Lead paragraph <img src="https://img.example.com/a.jpg"> text</p>]]></description>
      <pubDate>Tue, 10 Jun 2025 09:30:00 GMT</pubDate>
      <category>World</category>
    </item>
    <item>
      <title>Second story</title>
      <link>https://example.com/two</link>
      <description>Plain text</description>
      <enclosure url="https://img.example.com/b.jpg" type="image/jpeg" length="1000"/>
      <media:thumbnail url="https://img.example.com/thumb.jpg"/>
    </item>
  </channel>
</rss>"#;

    const ATOM: &str = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Atom</title>
  <entry>
    <title>Atom entry</title>
    <link rel="alternate" href="https://example.com/atom-one"/>
    <summary>Summary text</summary>
    <updated>2025-06-10T09:30:00Z</updated>
    <category term="technology"/>
  </entry>
</feed>"#;

    #[test]
    fn detects_rss_and_atom() {
        assert_eq!(detect_kind(RSS), Some(FeedKind::Rss));
        assert_eq!(detect_kind(ATOM), Some(FeedKind::Atom));
        assert_eq!(detect_kind("{\"error\":\"nope\"}"), None);
    }

    #[test]
    fn rss_items_are_extracted_with_channel_source() {
        let records = parse_feed(RSS);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title.as_deref(), Some("First & foremost"));
        assert_eq!(records[0].url.as_deref(), Some("https://example.com/one"));
        assert_eq!(records[0].source.as_deref(), Some("Example Wire"));
        assert_eq!(records[0].category.as_deref(), Some("World"));
        assert_eq!(
            records[0].published.as_deref(),
            Some("Tue, 10 Jun 2025 09:30:00 GMT")
        );
    }

    #[test]
    fn image_priority_enclosure_beats_thumbnail_beats_html() {
        let records = parse_feed(RSS);
        // Second item: enclosure wins over media:thumbnail.
        assert_eq!(
            records[1].image.as_deref(),
            Some("https://img.example.com/b.jpg")
        );
        // First item: only an <img> inside the description HTML.
        assert_eq!(
            records[0].image.as_deref(),
            Some("https://img.example.com/a.jpg")
        );
    }

    #[test]
    fn description_html_is_stripped_to_text() {
        let records = parse_feed(RSS);
        let desc = records[0].description.as_deref().unwrap();
        assert!(!desc.contains('<'), "tags left in {desc:?}");
        assert!(desc.contains("Lead paragraph"));
    }

    #[test]
    fn atom_entries_use_alternate_link_and_term() {
        let records = parse_feed(ATOM);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].url.as_deref(),
            Some("https://example.com/atom-one")
        );
        assert_eq!(records[0].category.as_deref(), Some("technology"));
        assert_eq!(records[0].published.as_deref(), Some("2025-06-10T09:30:00Z"));
    }

    #[test]
    fn atom_image_priority_thumbnail_beats_content_beats_html() {
        let atom = r#"<?xml version="1.0"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:media="http://search.yahoo.com/mrss/">
  <title>Example Atom</title>
  <entry>
    <title>Content image only</title>
    <link rel="alternate" href="https://example.com/a"/>
    <summary><![CDATA[Text <img src="https://img.example.com/inline.png">]]></summary>
    <media:content url="https://img.example.com/content.jpg"/>
  </entry>
  <entry>
    <title>Thumbnail wins</title>
    <link rel="alternate" href="https://example.com/b"/>
    <media:thumbnail url="https://img.example.com/thumb.jpg"/>
    <media:content url="https://img.example.com/content.jpg"/>
  </entry>
</feed>"#;
        let records = parse_feed(atom);
        assert_eq!(
            records[0].image.as_deref(),
            Some("https://img.example.com/content.jpg")
        );
        assert_eq!(
            records[1].image.as_deref(),
            Some("https://img.example.com/thumb.jpg")
        );
    }

    #[test]
    fn malformed_document_yields_empty_sequence() {
        assert!(parse_feed("<rss><channel><item></rss>").is_empty());
        assert!(parse_feed("totally not xml").is_empty());
    }
}
