// src/local.rs
//! Location-aware feed selection. Geolocation itself comes from an external
//! collaborator; this module only picks which feeds to fetch, annotates the
//! results with locality, and degrades to "no local news" on timeout.

use std::time::Duration;

use futures::future::join_all;

use crate::article::Article;
use crate::config::{FeedCatalog, FeedDescriptor};
use crate::feed;
use crate::relay::Relay;

/// Requester coordinate supplied by the geolocation collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Feeds within `radius_km` of `origin`, each with its distance. Feeds
/// without a coordinate never count as local.
fn feeds_within<'a>(
    feeds: &'a [FeedDescriptor],
    origin: GeoPoint,
    radius_km: f64,
) -> Vec<(&'a FeedDescriptor, f64)> {
    feeds
        .iter()
        .filter_map(|f| {
            let (lat, lon) = (f.latitude?, f.longitude?);
            let distance = haversine_km(
                origin,
                GeoPoint {
                    latitude: lat,
                    longitude: lon,
                },
            );
            (distance <= radius_km).then_some((f, distance))
        })
        .collect()
}

/// Fetch news near a coordinate. Feeds inside the radius are fetched and
/// annotated as local with their distance; when none qualify, the language's
/// national feeds are used instead, annotated as regional. The whole fetch is
/// bounded by `timeout`; a stalled fetch yields an empty list (callers render
/// "local news unavailable"), leaving in-flight branches to finish on their
/// own.
pub async fn fetch_local_news(
    relay: &dyn Relay,
    catalog: &FeedCatalog,
    language: &str,
    origin: GeoPoint,
    radius_km: f64,
    timeout: Duration,
) -> Vec<Article> {
    let fut = fetch_local_news_inner(relay, catalog, language, origin, radius_km);
    match tokio::time::timeout(timeout, fut).await {
        Ok(articles) => articles,
        Err(_) => {
            tracing::warn!(language, "local news fetch timed out");
            Vec::new()
        }
    }
}

async fn fetch_local_news_inner(
    relay: &dyn Relay,
    catalog: &FeedCatalog,
    language: &str,
    origin: GeoPoint,
    radius_km: f64,
) -> Vec<Article> {
    let feeds = catalog.feeds_for(language);
    let local = feeds_within(feeds, origin, radius_km);

    let (selected, is_local): (Vec<(&FeedDescriptor, Option<f64>)>, bool) = if local.is_empty() {
        tracing::debug!(language, "no feeds in radius, using national feeds");
        (feeds.iter().map(|f| (f, None)).collect(), false)
    } else {
        (local.into_iter().map(|(f, d)| (f, Some(d))).collect(), true)
    };

    let fetches = selected.iter().map(|(f, _)| feed::fetch_feed(relay, f));
    let results = join_all(fetches).await;

    let mut articles: Vec<Article> = Vec::new();
    for ((feed_desc, distance), fetched) in selected.iter().zip(results) {
        articles.extend(fetched.into_iter().map(|a| Article {
            source: feed_desc.name.clone(),
            distance_km: *distance,
            is_local: Some(is_local),
            ..a
        }));
    }

    // Local articles first, then newest-first.
    articles.sort_by(|a, b| {
        let local_a = a.is_local.unwrap_or(false);
        let local_b = b.is_local.unwrap_or(false);
        local_b
            .cmp(&local_a)
            .then_with(|| b.published_at.cmp(&a.published_at))
    });
    articles
}
