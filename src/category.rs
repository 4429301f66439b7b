// src/category.rs
//! Fixed category taxonomy plus the multilingual keyword heuristic used when
//! a language has no category-tagged feeds.

use crate::article::Article;

pub const DEFAULT_CATEGORY: &str = "general";

/// The taxonomy every article is mapped into.
pub const CATEGORIES: [&str; 10] = [
    "general",
    "world",
    "politics",
    "business",
    "technology",
    "health",
    "sports",
    "entertainment",
    "science",
    "nation",
];

/// Map a provider/feed-declared category string onto the taxonomy.
/// Unknown tags collapse to `general`.
pub fn canonical(raw: &str) -> String {
    let tag = raw.trim().to_lowercase();
    let tag = match tag.as_str() {
        "tech" => "technology",
        "sport" => "sports",
        "finance" | "economy" | "markets" => "business",
        other => other,
    };
    if CATEGORIES.contains(&tag) {
        tag.to_string()
    } else {
        DEFAULT_CATEGORY.to_string()
    }
}

/// Per-category keyword lists, multilingual (en/es/fr/de/ar/zh/hi). A match
/// on any keyword in title+description counts the article into the category.
fn keywords_for(category: &str) -> &'static [&'static str] {
    match category {
        "business" => &[
            "business", "economy", "market", "stock", "finance", "company", "trade", "banco",
            "economía", "mercado", "économie", "marché", "wirtschaft", "unternehmen", "اقتصاد",
            "سوق", "经济", "市场", "व्यापार", "बाजार",
        ],
        "technology" => &[
            "technology", "tech", "digital", "software", "computer", "internet", "ai", "app",
            "tecnología", "technologie", "technik", "تقنية", "تكنولوجيا", "科技", "技术",
            "प्रौद्योगिकी",
        ],
        "sports" => &[
            "sport", "football", "soccer", "basketball", "tennis", "game", "match", "player",
            "team", "deporte", "fútbol", "رياضة", "كرة", "体育", "足球", "खेल", "फुटबॉल",
        ],
        "health" => &[
            "health", "medical", "doctor", "hospital", "disease", "medicine", "patient", "salud",
            "médico", "santé", "médecin", "gesundheit", "arzt", "صحة", "طبيب", "健康", "医疗",
            "स्वास्थ्य", "चिकित्सा",
        ],
        "entertainment" => &[
            "entertainment", "movie", "film", "music", "celebrity", "actor", "tv", "show",
            "entretenimiento", "película", "divertissement", "unterhaltung", "ترفيه", "فيلم",
            "娱乐", "电影", "मनोरंजन", "फिल्म",
        ],
        "politics" => &[
            "politic", "government", "president", "minister", "election", "vote", "parliament",
            "política", "gobierno", "politique", "gouvernement", "politik", "regierung", "سياسة",
            "حكومة", "政治", "政府", "राजनीति", "सरकार",
        ],
        "world" => &[
            "world", "international", "global", "country", "nation", "mundial", "monde", "welt",
            "عالمي", "دولي", "世界", "国际", "विश्व", "अंतरराष्ट्रीय",
        ],
        _ => &[],
    }
}

/// Best-effort check whether free text belongs to a category.
pub fn text_matches(text: &str, category: &str) -> bool {
    let keywords = keywords_for(category);
    if keywords.is_empty() {
        return true;
    }
    let haystack = text.to_lowercase();
    keywords.iter().any(|k| haystack.contains(&k.to_lowercase()))
}

/// Narrow a merged article list down to one category by keyword matching.
/// Categories without a keyword list pass everything through unchanged.
pub fn filter_by_keywords(articles: Vec<Article>, category: &str) -> Vec<Article> {
    if keywords_for(category).is_empty() {
        return articles;
    }
    articles
        .into_iter()
        .filter(|a| text_matches(&format!("{} {}", a.title, a.description), category))
        .collect()
}
