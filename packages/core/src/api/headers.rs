use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use chrono::{DateTime, Utc};

/// Caching policy for one JSON endpoint.
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    pub max_age: u32,
    pub stale_while_revalidate: u32,
}

impl CachePolicy {
    fn header_value(&self) -> HeaderValue {
        HeaderValue::from_str(&format!(
            "max-age={}, stale-while-revalidate={}",
            self.max_age, self.stale_while_revalidate
        ))
        .expect("cache-control header value should be valid")
    }
}

/// Quoted ETag derived from the serialized body.
pub fn compute_etag(body: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("\"{:x}\"", hasher.finish())
}

/// RFC 7231 HTTP-date.
pub fn http_date(timestamp: DateTime<Utc>) -> HeaderValue {
    HeaderValue::from_str(&timestamp.format("%a, %d %b %Y %H:%M:%S GMT").to_string())
        .expect("last-modified header value should be valid")
}

/// True when `If-None-Match` lists `*` or `etag`.
pub fn if_none_match_matches(headers: &HeaderMap, etag: &str) -> bool {
    headers
        .get(header::IF_NONE_MATCH)
        .and_then(|value| value.to_str().ok())
        .map(|raw| raw.split(',').map(str::trim).any(|tag| tag == "*" || tag == etag))
        .unwrap_or(false)
}

/// `200` with `body`, or an empty `304` when the client already holds it.
pub fn conditional_json(
    request_headers: &HeaderMap,
    policy: CachePolicy,
    modified_at: DateTime<Utc>,
    body: Vec<u8>,
) -> Response {
    let etag = compute_etag(&body);
    let builder = Response::builder()
        .header(header::CACHE_CONTROL, policy.header_value())
        .header(header::ETAG, etag.as_str())
        .header(header::LAST_MODIFIED, http_date(modified_at));

    if if_none_match_matches(request_headers, &etag) {
        return builder
            .status(StatusCode::NOT_MODIFIED)
            .body(Body::empty())
            .expect("304 response should be valid");
    }

    builder
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .expect("json response should be valid")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const POLICY: CachePolicy = CachePolicy {
        max_age: 2,
        stale_while_revalidate: 10,
    };

    #[test]
    fn etag_is_quoted_and_stable() {
        let etag = compute_etag(br#"{"last_block":1}"#);
        assert!(etag.starts_with('"') && etag.ends_with('"'));
        assert_eq!(etag, compute_etag(br#"{"last_block":1}"#));
        assert_ne!(etag, compute_etag(br#"{"last_block":2}"#));
    }

    #[test]
    fn if_none_match_accepts_lists_and_wildcard() {
        let mut headers = HeaderMap::new();
        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("\"a\", \"b\""));
        assert!(if_none_match_matches(&headers, "\"b\""));
        assert!(!if_none_match_matches(&headers, "\"c\""));

        headers.insert(header::IF_NONE_MATCH, HeaderValue::from_static("*"));
        assert!(if_none_match_matches(&headers, "\"c\""));
        assert!(!if_none_match_matches(&HeaderMap::new(), "\"c\""));
    }

    #[test]
    fn http_date_is_rfc_7231() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 7, 8, 9).unwrap();
        assert_eq!(http_date(ts), "Tue, 05 Mar 2024 07:08:09 GMT");
    }

    #[test]
    fn conditional_json_returns_304_for_matching_etag() {
        let body = br#"{"ok":true}"#.to_vec();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::IF_NONE_MATCH,
            HeaderValue::from_str(&compute_etag(&body)).unwrap(),
        );

        let response = conditional_json(&headers, POLICY, Utc::now(), body);

        assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(
            response.headers()[header::CACHE_CONTROL],
            "max-age=2, stale-while-revalidate=10"
        );
    }

    #[test]
    fn conditional_json_returns_200_with_content_type() {
        let response = conditional_json(&HeaderMap::new(), POLICY, Utc::now(), b"{}".to_vec());

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert!(response.headers().contains_key(header::ETAG));
    }
}
