use axum::{body::Body, extract::State, http::header, response::Response};
use chrono::{DateTime, Utc};

use crate::AppState;

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn rfc822(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

/// GET /rss.xml - feed of the vault's works, newest upload first.
pub async fn rss_feed(State(state): State<AppState>) -> Response {
    let base_url =
        std::env::var("SITE_URL").unwrap_or_else(|_| "https://creative-vault.example".to_string());
    let site_title = std::env::var("SITE_TITLE").unwrap_or_else(|_| "Creative Vault".to_string());
    let site_description = std::env::var("SITE_DESCRIPTION")
        .unwrap_or_else(|_| "Stories, documentaries and articles from the vault".to_string());

    let works = state.store.get_works().await;

    let mut items = String::new();
    for work in works.iter().take(50) {
        let work_url = format!("{}/story/{}", base_url, work.id);
        items.push_str(&format!(
            "    <item>\n\
                   <title>{}</title>\n\
                   <link>{}</link>\n\
                   <description>{}</description>\n\
                   <category>{}</category>\n\
                   <pubDate>{}</pubDate>\n\
                   <guid isPermaLink=\"true\">{}</guid>\n\
                 </item>\n",
            escape_xml(&work.title),
            escape_xml(&work_url),
            escape_xml(&work.tagline),
            escape_xml(&work.category.to_string()),
            rfc822(&work.upload_date),
            escape_xml(&work_url),
        ));
    }

    let feed_url = format!("{base_url}/rss.xml");

    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>{}</title>
    <link>{}</link>
    <description>{}</description>
    <language>en-us</language>
    <atom:link href="{}" rel="self" type="application/rss+xml"/>
    <lastBuildDate>{}</lastBuildDate>
{}  </channel>
</rss>"#,
        escape_xml(&site_title),
        escape_xml(&base_url),
        escape_xml(&site_description),
        escape_xml(&feed_url),
        works
            .first()
            .map(|w| rfc822(&w.upload_date))
            .unwrap_or_default(),
        items,
    );

    Response::builder()
        .status(200)
        .header(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")
        .header(
            header::CACHE_CONTROL,
            "public, max-age=3600, stale-while-revalidate=600",
        )
        .body(Body::from(xml))
        .unwrap()
}
