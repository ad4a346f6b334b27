//! Lectern API client utilities.
//!
//! This crate provides a lightweight client for the course content API.
//! It focuses on:
//!
//! - Constructing an HTTP client with sensible defaults
//! - Validating the configured base URL for safety
//! - Building requests with a consistent User-Agent and Accept headers
//! - Exposing the read-only content operations through [`ContentSource`]
//!
//! The primary entry point is [`LecternClient`]. Wrap it in an
//! [`HttpContentSource`] to obtain the typed operations used by the
//! navigator.
//!
//! # Example
//!
//! ```ignore
//! use lectern_api::{ContentSource, HttpContentSource, LecternClient};
//!
//! async fn show() -> anyhow::Result<()> {
//!     let client = LecternClient::new("http://localhost:5000", std::time::Duration::from_secs(30))?;
//!     let source = HttpContentSource::new(client);
//!     let course = source.course("CS101").await?;
//!     println!("{}", course.course_title);
//!     Ok(())
//! }
//! ```

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Client, RequestBuilder, Url, header};
use tracing::debug;

mod error;
mod source;

pub use error::FetchError;
pub use source::{ContentSource, HttpContentSource};

/// Hostnames allowed to use plain HTTP, typically a local development server.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1"];

/// Characters escaped when interpolating identifiers into a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Clone)]
/// Thin wrapper around a configured `reqwest::Client` for the content API.
///
/// The client pre-configures default headers and builds requests against a
/// validated base URL.
pub struct LecternClient {
    pub base_url: String,
    pub http: Client,
    pub user_agent: String,
}

impl LecternClient {
    /// Construct a [`LecternClient`] for `base_url`.
    ///
    /// Non-localhost hosts must use HTTPS. A trailing slash on the base URL
    /// is dropped so API paths can always start with `/`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        validate_base_url(base_url)?;

        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            user_agent: format!("lectern/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }

    /// Build a `reqwest::RequestBuilder` for a method and API-relative path.
    pub fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "building request");

        self.http
            .request(method, url)
            .header(header::USER_AGENT, &self.user_agent)
    }
}

/// Percent-encode a value for use as a single path segment.
pub fn encode_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Validate that a base URL is acceptable for use by the client.
///
/// Rules:
/// - `localhost` or `127.0.0.1`: any scheme is allowed
/// - otherwise: scheme must be HTTPS
fn validate_base_url(base: &str) -> Result<()> {
    let parsed_base_url = Url::parse(base).map_err(|e| anyhow!("Invalid API base URL '{}': {}", base, e))?;

    let host_name = parsed_base_url
        .host_str()
        .ok_or_else(|| anyhow!("API base URL must include a host"))?;

    if LOCALHOST_DOMAINS
        .iter()
        .any(|&allowed| host_name.eq_ignore_ascii_case(allowed))
    {
        return Ok(());
    }

    if parsed_base_url.scheme() != "https" {
        return Err(anyhow!(
            "API base URL must use https for non-localhost hosts; got '{}://'",
            parsed_base_url.scheme()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localhost_allows_plain_http() {
        assert!(validate_base_url("http://localhost:5000").is_ok());
        assert!(validate_base_url("http://127.0.0.1:8080/api").is_ok());
    }

    #[test]
    fn remote_hosts_require_https() {
        assert!(validate_base_url("https://lms.example.edu").is_ok());
        let error = validate_base_url("http://lms.example.edu").unwrap_err();
        assert!(error.to_string().contains("https"));
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = LecternClient::new("http://localhost:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "http://localhost:5000");
        assert!(client.user_agent.starts_with("lectern/"));
    }

    #[test]
    fn segments_are_percent_encoded() {
        assert_eq!(encode_segment("CS101"), "CS101");
        assert_eq!(encode_segment("a/b c"), "a%2Fb%20c");
        assert_eq!(encode_segment("guest"), "guest");
    }
}
