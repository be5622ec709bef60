//! `Accept` header negotiation between the HTML pages and the JSON API.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header::ACCEPT, request::Parts},
};
use std::convert::Infallible;

/// How a response body should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    Html,
    Json,
}

impl ResponseFormat {
    /// JSON only when the client accepts JSON and none of `text/html`,
    /// `application/xhtml+xml` or `application/xml`.
    ///
    /// Wildcards count as accepting, so browsers and `curl`'s default `*/*`
    /// get HTML. A missing header also means HTML.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let Some(accept) = headers.get(ACCEPT).and_then(|v| v.to_str().ok()) else {
            return ResponseFormat::Html;
        };
        let ranges = media_ranges(accept);

        let json = accepts(&ranges, "application/json");
        let html = accepts(&ranges, "text/html")
            || accepts(&ranges, "application/xhtml+xml")
            || accepts(&ranges, "application/xml");
        if json && !html {
            ResponseFormat::Json
        } else {
            ResponseFormat::Html
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ResponseFormat
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ResponseFormat::from_headers(&parts.headers))
    }
}

/// Lowercased media ranges, dropping the ones marked `q=0`.
fn media_ranges(accept: &str) -> Vec<String> {
    accept
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(';');
            let range = parts.next()?.trim().to_ascii_lowercase();
            let refused = parts.any(|param| {
                let param = param.trim().replace(' ', "");
                param
                    .strip_prefix("q=")
                    .and_then(|q| q.parse::<f32>().ok())
                    .is_some_and(|q| q <= 0.0)
            });
            (!range.is_empty() && !refused).then_some(range)
        })
        .collect()
}

fn accepts(ranges: &[String], mime: &str) -> bool {
    ranges.iter().any(|range| {
        range == "*/*"
            || range == mime
            || range
                .strip_suffix("/*")
                .is_some_and(|top| mime.split('/').next() == Some(top))
    })
}
