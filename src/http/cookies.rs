//! Access-token lookup in the inbound `Cookie` header.
//!
//! Only reads; the gateway never sets cookies. A missing or empty cookie is
//! not an error, the request is simply forwarded without credentials.

use std::borrow::Cow;
use axum::http::{header::COOKIE, HeaderMap};

/// Find the value of cookie `name` across all `Cookie` headers.
///
/// Values are percent-decoded the way browser-side cookie helpers encode
/// them (a Sanctum token `12|abc` is usually stored as `12%7Cabc`).
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim().trim_matches('"'))
        .filter(|value| !value.is_empty())
        .map(percent_decode)
}

fn percent_decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(lines: &[&str]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for line in lines {
            map.append(COOKIE, HeaderValue::from_str(line).unwrap());
        }
        map
    }

    #[test]
    fn finds_token_among_other_cookies() {
        let map = headers(&["theme=dark; access_token=T123; locale=en"]);
        assert_eq!(read_cookie(&map, "access_token").as_deref(), Some("T123"));
    }

    #[test]
    fn searches_every_cookie_header() {
        let map = headers(&["theme=dark", "access_token=abc"]);
        assert_eq!(read_cookie(&map, "access_token").as_deref(), Some("abc"));
    }

    #[test]
    fn absent_or_empty_cookie_is_none() {
        assert_eq!(read_cookie(&HeaderMap::new(), "access_token"), None);
        assert_eq!(read_cookie(&headers(&["access_token="]), "access_token"), None);
        assert_eq!(read_cookie(&headers(&["x_access_token=1"]), "access_token"), None);
    }

    #[test]
    fn decodes_percent_encoded_values() {
        let map = headers(&["access_token=12%7CAbCd"]);
        assert_eq!(read_cookie(&map, "access_token").as_deref(), Some("12|AbCd"));
    }

    #[test]
    fn keeps_malformed_escapes_verbatim() {
        let map = headers(&["access_token=ab%zz%4"]);
        assert_eq!(read_cookie(&map, "access_token").as_deref(), Some("ab%zz%4"));
    }

    #[test]
    fn non_utf8_escapes_fall_back_to_raw_value() {
        let map = headers(&["access_token=tok%FF%FE"]);
        assert_eq!(read_cookie(&map, "access_token").as_deref(), Some("tok%FF%FE"));
    }

    #[test]
    fn strips_quotes_and_keeps_equals_in_value() {
        let map = headers(&["access_token=\"a=b==\""]);
        assert_eq!(read_cookie(&map, "access_token").as_deref(), Some("a=b=="));
    }
}
