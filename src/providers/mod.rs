// src/providers/mod.rs
//! REST provider registry. Each provider owns its query-parameter convention
//! and response envelope in its own module; adding a provider means writing
//! one module and registering it here — no conditional chains elsewhere.

pub mod currentsapi;
pub mod gnews;
pub mod mediastack;
pub mod newsapi;

use anyhow::Result;

use crate::normalize::RawRecord;

/// Decode a provider response body into provider-shaped records.
pub type DecodeFn = fn(&str) -> Result<Vec<RawRecord>>;
/// Build a fully parameter-encoded request URL.
pub type UrlFn = fn(&RequestParams) -> String;

/// Everything a provider needs to build a request.
pub struct RequestParams<'a> {
    pub key: &'a str,
    pub category: &'a str,
    pub language: &'a str,
    /// Search term; `None` for headline requests.
    pub query: Option<&'a str>,
    pub page: u32,
    pub page_size: u32,
}

/// Static descriptor of one REST provider.
pub struct ProviderSpec {
    pub id: &'static str,
    /// Env var holding the API key; a provider without its key is skipped.
    pub key_env: &'static str,
    pub decode: DecodeFn,
    pub headlines_url: UrlFn,
    /// Providers without a search endpoint stay out of search fan-out.
    pub search_url: Option<UrlFn>,
}

impl ProviderSpec {
    pub fn api_key(&self) -> Option<String> {
        std::env::var(self.key_env).ok().filter(|k| !k.is_empty())
    }
}

pub struct ProviderRegistry {
    providers: Vec<ProviderSpec>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Registry with all built-in provider shapes.
    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(newsapi::spec());
        registry.register(gnews::spec());
        registry.register(currentsapi::spec());
        registry.register(mediastack::spec());
        registry
    }

    pub fn register(&mut self, spec: ProviderSpec) {
        self.providers.push(spec);
    }

    pub fn providers(&self) -> &[ProviderSpec] {
        &self.providers
    }
}

/// Shared helper: query-string encoding for provider URLs.
pub(crate) fn encode_query(pairs: &[(&str, &str)]) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        serializer.append_pair(k, v);
    }
    serializer.finish()
}
