//! One-shot flash messages carried across redirects in a short-lived cookie.
//!
//! Message text is base64-encoded so arbitrary user-facing strings stay
//! cookie-safe. Pages that render JSON read the pending message through the
//! [`Flash`] extractor and clear the cookie in the same response.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use base64ct::{Base64, Encoding};

pub const FLASH_COOKIE: &str = "flash";

pub fn encode(message: &str) -> String {
    Base64::encode_string(message.as_bytes())
}

pub fn decode(value: &str) -> Option<String> {
    let bytes = Base64::decode_vec(value).ok()?;
    String::from_utf8(bytes).ok()
}

/// Value of the named cookie from a request's `Cookie` header, if present.
pub(crate) fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
}

pub fn set_cookie(message: &str) -> HeaderValue {
    format!("{}={}; Path=/; Max-Age=60", FLASH_COOKIE, encode(message))
        .parse()
        .unwrap()
}

pub fn clear_cookie() -> HeaderValue {
    format!("{}=; Path=/; Max-Age=0", FLASH_COOKIE)
        .parse()
        .unwrap()
}

/// Headers that clear a pending flash cookie once the page has shown it.
pub fn clear_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.append(header::SET_COOKIE, clear_cookie());
    headers
}

/// 303 redirect carrying a one-shot message for the next page.
pub fn redirect(to: &str, message: &str) -> Response {
    let mut headers = HeaderMap::new();
    headers.append(header::SET_COOKIE, set_cookie(message));
    (headers, Redirect::to(to)).into_response()
}

/// Pending flash message, if the request carried a readable flash cookie.
pub struct Flash(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Flash(
            cookie_value(&parts.headers, FLASH_COOKIE).and_then(decode),
        ))
    }
}
