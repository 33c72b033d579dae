//! Credential extraction.
//!
//! A bearer credential may arrive in five places. They are tried in a fixed order and the
//! first hit wins:
//!
//! 1. `Authorization: Bearer <token>`
//! 2. `x-access-token: <token>`
//! 3. `?token=<token>`
//! 4. `Cookie: token=<token>`
//! 5. `{"token": "<token>"}` in a JSON body
//!
//! Each source is a pure function over [`CredentialSources`].

use axum::{
    extract::Query,
    http::{HeaderMap, Uri, header},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

pub const TOKEN_HEADER: &str = "x-access-token";
pub const TOKEN_QUERY_PARAM: &str = "token";
pub const TOKEN_COOKIE: &str = "token";

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    AuthorizationHeader,
    TokenHeader,
    QueryString,
    Cookie,
    Body,
}

/// The parts of a request a credential can be read from.
#[derive(Debug, Clone, Copy)]
pub struct CredentialSources<'a> {
    pub headers: &'a HeaderMap,
    pub uri: &'a Uri,
    /// Buffered request body, when one was read.
    pub body: Option<&'a [u8]>,
}

type Strategy = fn(&CredentialSources<'_>) -> Option<String>;

/// Extraction strategies in precedence order.
pub const STRATEGIES: [(CredentialSource, Strategy); 5] = [
    (CredentialSource::AuthorizationHeader, from_authorization_header),
    (CredentialSource::TokenHeader, from_token_header),
    (CredentialSource::QueryString, from_query_string),
    (CredentialSource::Cookie, from_cookie),
    (CredentialSource::Body, from_body),
];

/// Returns the first credential found, with where it was found.
pub fn extract_credential(sources: &CredentialSources<'_>) -> Option<(CredentialSource, String)> {
    STRATEGIES
        .iter()
        .find_map(|(source, strategy)| strategy(sources).map(|token| (*source, token)))
}

/// Whether the body is worth buffering to look for a `token` field.
pub fn has_json_body(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with("application/json"))
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn from_authorization_header(sources: &CredentialSources<'_>) -> Option<String> {
    sources
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .and_then(non_empty)
}

fn from_token_header(sources: &CredentialSources<'_>) -> Option<String> {
    sources
        .headers
        .get(TOKEN_HEADER)?
        .to_str()
        .ok()
        .and_then(non_empty)
}

#[derive(Deserialize)]
struct TokenField {
    token: Option<String>,
}

fn from_query_string(sources: &CredentialSources<'_>) -> Option<String> {
    let Query(query) = Query::<TokenField>::try_from_uri(sources.uri).ok()?;
    query.token.as_deref().and_then(non_empty)
}

fn from_cookie(sources: &CredentialSources<'_>) -> Option<String> {
    CookieJar::from_headers(sources.headers)
        .get(TOKEN_COOKIE)
        .and_then(|cookie| non_empty(cookie.value()))
}

fn from_body(sources: &CredentialSources<'_>) -> Option<String> {
    let body = sources.body?;
    let field: TokenField = serde_json::from_slice(body).ok()?;
    field.token.as_deref().and_then(non_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    fn extract(
        headers: &HeaderMap,
        uri: &str,
        body: Option<&[u8]>,
    ) -> Option<(CredentialSource, String)> {
        let uri: Uri = uri.parse().unwrap();
        extract_credential(&CredentialSources {
            headers,
            uri: &uri,
            body,
        })
    }

    #[test]
    fn test_nothing_present() {
        assert_eq!(extract(&HeaderMap::new(), "/api/horarios", None), None);
    }

    #[test]
    fn test_each_source_alone() {
        let h = headers(&[("authorization", "Bearer aaa")]);
        assert_eq!(
            extract(&h, "/", None),
            Some((CredentialSource::AuthorizationHeader, "aaa".to_string()))
        );

        let h = headers(&[("x-access-token", "bbb")]);
        assert_eq!(
            extract(&h, "/", None),
            Some((CredentialSource::TokenHeader, "bbb".to_string()))
        );

        assert_eq!(
            extract(&HeaderMap::new(), "/?foo=1&token=ccc", None),
            Some((CredentialSource::QueryString, "ccc".to_string()))
        );

        let h = headers(&[("cookie", "theme=dark; token=ddd")]);
        assert_eq!(
            extract(&h, "/", None),
            Some((CredentialSource::Cookie, "ddd".to_string()))
        );

        assert_eq!(
            extract(&HeaderMap::new(), "/", Some(br#"{"token":"eee","nombre":"x"}"#)),
            Some((CredentialSource::Body, "eee".to_string()))
        );
    }

    #[test]
    fn test_bearer_header_beats_query_string() {
        let h = headers(&[("authorization", "Bearer X")]);
        assert_eq!(
            extract(&h, "/api/eventos?token=Y", None),
            Some((CredentialSource::AuthorizationHeader, "X".to_string()))
        );
    }

    #[test]
    fn test_full_precedence_order() {
        let h = headers(&[("x-access-token", "header"), ("cookie", "token=cookie")]);
        let found = extract(&h, "/?token=query", Some(br#"{"token":"body"}"#));
        assert_eq!(found, Some((CredentialSource::TokenHeader, "header".to_string())));

        let h = headers(&[("cookie", "token=cookie")]);
        let found = extract(&h, "/?token=query", Some(br#"{"token":"body"}"#));
        assert_eq!(found, Some((CredentialSource::QueryString, "query".to_string())));

        let found = extract(&h, "/", Some(br#"{"token":"body"}"#));
        assert_eq!(found, Some((CredentialSource::Cookie, "cookie".to_string())));
    }

    #[test]
    fn test_non_bearer_authorization_falls_through() {
        let h = headers(&[("authorization", "Basic dXNlcjpwYXNz")]);
        assert_eq!(
            extract(&h, "/?token=q", None),
            Some((CredentialSource::QueryString, "q".to_string()))
        );
    }

    #[test]
    fn test_bearer_prefix_is_case_sensitive() {
        let h = headers(&[("authorization", "bearer abc")]);
        assert_eq!(extract(&h, "/", None), None);
    }

    #[test]
    fn test_empty_values_are_absent() {
        let h = headers(&[("authorization", "Bearer "), ("x-access-token", "  ")]);
        assert_eq!(extract(&h, "/?token=", Some(br#"{"token":""}"#)), None);
    }

    #[test]
    fn test_body_that_is_not_an_object_is_ignored() {
        assert_eq!(extract(&HeaderMap::new(), "/", Some(b"[1,2,3]")), None);
        assert_eq!(extract(&HeaderMap::new(), "/", Some(b"not json")), None);
        assert_eq!(extract(&HeaderMap::new(), "/", Some(br#"{"token":12}"#)), None);
    }

    #[test]
    fn test_has_json_body() {
        assert!(has_json_body(&headers(&[(
            "content-type",
            "application/json; charset=utf-8"
        )])));
        assert!(!has_json_body(&headers(&[("content-type", "text/plain")])));
        assert!(!has_json_body(&HeaderMap::new()));
    }
}
