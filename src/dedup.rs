// src/dedup.rs
//! Order-preserving deduplication across sources. First occurrence wins; no
//! field-level merging.

use std::collections::HashSet;

use crate::article::Article;

/// Collapse near-duplicates by identity key (URL, else normalized title).
/// Stable O(n): survivors keep their input order.
pub fn dedupe(articles: Vec<Article>) -> Vec<Article> {
    let mut seen: HashSet<String> = HashSet::with_capacity(articles.len());
    let mut unique = Vec::with_capacity(articles.len());
    for article in articles {
        if seen.insert(article.identity_key()) {
            unique.push(article);
        }
    }
    unique
}
