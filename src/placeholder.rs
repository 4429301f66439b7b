// src/placeholder.rs
//! Deterministic placeholder images. Pure function from category to a
//! data-URI SVG with a two-stop gradient, used whenever a source supplies no
//! usable image.

/// Scheme prefix every generated placeholder starts with.
pub const PLACEHOLDER_SCHEME: &str = "data:image/svg+xml";

/// Seven fixed category gradients; anything else gets the default grey.
fn gradient_for(category: &str) -> (&'static str, &'static str) {
    match category {
        "world" => ("#1e3a8a", "#3b82f6"),
        "politics" => ("#7f1d1d", "#ef4444"),
        "business" => ("#065f46", "#10b981"),
        "technology" => ("#5b21b6", "#8b5cf6"),
        "health" => ("#9d174d", "#ec4899"),
        "sports" => ("#92400e", "#f59e0b"),
        "entertainment" => ("#831843", "#f472b6"),
        _ => ("#374151", "#9ca3af"),
    }
}

/// Build the category-colored placeholder data URI.
pub fn placeholder_image(category: &str) -> String {
    let (from, to) = gradient_for(category);
    let svg = format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300">"#,
            r#"<defs><linearGradient id="g" x1="0" y1="0" x2="1" y2="1">"#,
            r#"<stop offset="0" stop-color="{from}"/>"#,
            r#"<stop offset="1" stop-color="{to}"/>"#,
            r#"</linearGradient></defs>"#,
            r#"<rect fill="url(%23g)" width="400" height="300"/>"#,
            r#"<text fill="white" x="50%" y="50%" text-anchor="middle" dy=".3em" "#,
            r#"font-family="sans-serif" font-size="24">News</text></svg>"#
        ),
        from = from.replace('#', "%23"),
        to = to.replace('#', "%23"),
    );
    // Minimal percent-encoding, enough for a data URI in src attributes.
    let encoded = svg
        .replace('<', "%3C")
        .replace('>', "%3E")
        .replace('"', "%22")
        .replace(' ', "%20");
    format!("{PLACEHOLDER_SCHEME},{encoded}")
}
