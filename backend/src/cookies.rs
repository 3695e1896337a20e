//! Session cookie helpers
//!
//! Builds `Set-Cookie` header values for the session token and reads
//! cookies back out of request headers.

use crate::config::CookieConfig;
use anyhow::Result;
use axum::http::{header::COOKIE, HeaderMap, HeaderValue};

/// Name of the cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

const EXPIRED: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Attributes applied to every cookie the service sets or clears
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub max_age_secs: i64,
    pub path: String,
}

impl CookieOptions {
    pub fn new(config: &CookieConfig, secure: bool) -> Self {
        Self {
            http_only: true,
            secure,
            max_age_secs: config.max_age_secs,
            path: "/".to_string(),
        }
    }

    /// `Set-Cookie` value that stores `value` under `name`
    pub fn set(&self, name: &str, value: &str) -> Result<HeaderValue> {
        let cookie = format!(
            "{}={}; Max-Age={}{}",
            name,
            value,
            self.max_age_secs,
            self.attributes()
        );
        Ok(HeaderValue::from_str(&cookie)?)
    }

    /// `Set-Cookie` value that makes the client drop `name`
    pub fn clear(&self, name: &str) -> Result<HeaderValue> {
        let cookie = format!("{}=; Max-Age=0; Expires={}{}", name, EXPIRED, self.attributes());
        Ok(HeaderValue::from_str(&cookie)?)
    }

    fn attributes(&self) -> String {
        let mut attrs = format!("; Path={}", self.path);
        if self.http_only {
            attrs.push_str("; HttpOnly");
        }
        if self.secure {
            attrs.push_str("; Secure");
        }
        attrs.push_str("; SameSite=Strict");
        attrs
    }
}

/// Read a cookie value from the request's `Cookie` headers
pub fn get<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}
