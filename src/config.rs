// src/config.rs
//! Aggregator tuning knobs plus the feed catalog (curated defaults with an
//! optional TOML/JSON override file).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

const ENV_FEEDS_PATH: &str = "WORLDNEWS_FEEDS_PATH";

/// One RSS/Atom feed: URL, display name, category tag, optional coordinate
/// for locality ranking. Read-only during aggregation.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FeedDescriptor {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Tuning constants for the aggregation pipeline. Values mirror the observed
/// production behavior; the pagination ceiling in particular is part of the
/// external contract.
#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Page 1 returns up to this many articles regardless of page size.
    pub first_page_ceiling: usize,
    /// Page size requested per REST provider in a burst (kept small to
    /// respect provider rate limits).
    pub provider_page_size: u32,
    /// Page size when the caller omits one.
    pub default_page_size: usize,
    /// Freshness window of the combined (category, language) dataset.
    pub combined_ttl: Duration,
    /// Freshness window of per-source responses.
    pub source_ttl: Duration,
    pub combined_max_entries: usize,
    pub source_max_entries: usize,
    /// Upper bound on any single upstream fetch.
    pub fetch_timeout: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            first_page_ceiling: 200,
            provider_page_size: 20,
            default_page_size: 12,
            combined_ttl: Duration::from_secs(5 * 60),
            source_ttl: Duration::from_secs(15 * 60),
            combined_max_entries: 20,
            source_max_entries: 100,
            fetch_timeout: Duration::from_secs(10),
        }
    }
}

/// Country used by providers that key headlines by country rather than
/// language.
pub fn country_for_language(language: &str) -> &'static str {
    match language {
        "es" => "es",
        "fr" => "fr",
        "de" => "de",
        "ar" => "ae",
        "zh" => "cn",
        "hi" => "in",
        _ => "us",
    }
}

/// Feed descriptors grouped by ISO-639-1 language code.
#[derive(Debug, Clone)]
pub struct FeedCatalog {
    feeds: HashMap<String, Vec<FeedDescriptor>>,
}

#[derive(Debug, Deserialize)]
struct FeedsFile {
    feeds: HashMap<String, Vec<FeedDescriptor>>,
}

impl FeedCatalog {
    pub fn new(feeds: HashMap<String, Vec<FeedDescriptor>>) -> Self {
        Self { feeds }
    }

    /// Curated defaults per language.
    pub fn builtin() -> Self {
        fn f(name: &str, url: &str, category: &str) -> FeedDescriptor {
            FeedDescriptor {
                name: name.to_string(),
                url: url.to_string(),
                category: category.to_string(),
                latitude: None,
                longitude: None,
            }
        }

        let mut feeds = HashMap::new();
        feeds.insert(
            "en".to_string(),
            vec![
                f("BBC World News", "http://feeds.bbci.co.uk/news/world/rss.xml", "world"),
                f("CNN International", "http://rss.cnn.com/rss/edition.rss", "world"),
                f("Al Jazeera English", "https://www.aljazeera.com/xml/rss/all.xml", "world"),
                f("BBC Business", "http://feeds.bbci.co.uk/news/business/rss.xml", "business"),
                f("TechCrunch", "https://techcrunch.com/feed/", "technology"),
                f("The Verge", "https://www.theverge.com/rss/index.xml", "technology"),
            ],
        );
        feeds.insert(
            "es".to_string(),
            vec![
                f("BBC Mundo", "https://feeds.bbci.co.uk/mundo/rss.xml", "world"),
                f("CNN Español", "https://cnnespanol.cnn.com/feed/", "world"),
            ],
        );
        feeds.insert(
            "fr".to_string(),
            vec![
                f("BBC Afrique", "https://feeds.bbci.co.uk/afrique/rss.xml", "world"),
                f("France 24", "https://www.france24.com/en/rss", "world"),
            ],
        );
        feeds.insert(
            "de".to_string(),
            vec![f("Deutsche Welle", "https://rss.dw.com/xml/rss-de-all", "world")],
        );
        feeds.insert(
            "ar".to_string(),
            vec![f("Al Jazeera Arabic", "https://www.aljazeera.com/xml/rss/all.xml", "world")],
        );
        feeds.insert(
            "zh".to_string(),
            vec![f(
                "Xinhua News",
                "http://www.xinhuanet.com/english/rss/worldrss.xml",
                "world",
            )],
        );
        Self { feeds }
    }

    /// Load from an explicit TOML or JSON file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading feed catalog from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let file: FeedsFile = if ext == "json" {
            serde_json::from_str(&content).context("parsing feed catalog json")?
        } else {
            toml::from_str(&content).context("parsing feed catalog toml")?
        };
        Ok(Self { feeds: file.feeds })
    }

    /// Resolution order:
    /// 1) $WORLDNEWS_FEEDS_PATH
    /// 2) config/feeds.toml
    /// 3) config/feeds.json
    /// 4) curated builtin catalog
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_FEEDS_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(anyhow!("{ENV_FEEDS_PATH} points to non-existent path"));
        }
        let toml_p = PathBuf::from("config/feeds.toml");
        if toml_p.exists() {
            return Self::load_from(&toml_p);
        }
        let json_p = PathBuf::from("config/feeds.json");
        if json_p.exists() {
            return Self::load_from(&json_p);
        }
        Ok(Self::builtin())
    }

    /// Feeds for a language, falling back to English.
    pub fn feeds_for(&self, language: &str) -> &[FeedDescriptor] {
        self.feeds
            .get(language)
            .or_else(|| self.feeds.get("en"))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.feeds.keys().map(String::as_str)
    }
}
