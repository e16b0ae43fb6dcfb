//! HTTP fetcher implementation
//!
//! This module handles page downloads for the workers:
//! - Building the HTTP client (user agent, timeouts, optional proxy)
//! - One GET per attempt under the retry policy
//! - Charset-preference decoding of the response bytes
//!
//! A fetch ends in one of two outcomes: a fully decoded page, or
//! "no result" — non-success statuses, exhausted retries, and
//! undecodable bytes all collapse into the latter.

use crate::config::FetcherConfig;
use crate::crawler::retry::{RetryPolicy, Retryable};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a single fetch attempt
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure (connect, timeout, TLS, ...)
    #[error("transport error: {0}")]
    Transport(reqwest::Error),

    /// Server-side failure; the request may succeed on retry
    #[error("HTTP {status}")]
    ServerError { status: u16 },

    /// The response body could not be read in full
    #[error("failed to read response body: {0}")]
    Body(reqwest::Error),
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            // Request-builder failures will not improve with retries
            FetchError::Transport(e) => !e.is_builder(),
            FetchError::ServerError { .. } => true,
            FetchError::Body(_) => true,
        }
    }
}

/// A charset tried when decoding fetched bytes
///
/// Decoding is all-or-nothing: a charset either decodes the full byte
/// sequence without error or it is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Ascii,
    Utf16Le,
    Utf16Be,
}

impl Charset {
    /// Parses a config label into a charset
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "ascii" | "us-ascii" => Some(Self::Ascii),
            "utf-16" | "utf16" | "utf-16le" => Some(Self::Utf16Le),
            "utf-16be" => Some(Self::Utf16Be),
            _ => None,
        }
    }

    /// Strictly decodes the full byte sequence, or returns `None`
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            Self::Ascii => {
                if bytes.is_ascii() {
                    // ASCII is a UTF-8 subset, so this cannot fail
                    std::str::from_utf8(bytes).ok().map(str::to_string)
                } else {
                    None
                }
            }
            Self::Utf16Le => decode_utf16(bytes, u16::from_le_bytes),
            Self::Utf16Be => decode_utf16(bytes, u16::from_be_bytes),
        }
    }
}

fn decode_utf16(bytes: &[u8], combine: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|pair| combine([pair[0], pair[1]]));
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Decodes page bytes by trying each charset in preference order
///
/// The first charset that decodes the whole sequence without error wins;
/// if none does, the page yields no result.
pub fn decode_page(bytes: &[u8], charsets: &[Charset]) -> Option<String> {
    charsets.iter().find_map(|charset| charset.decode(bytes))
}

/// Builds the HTTP client shared by all workers
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy.clone())?);
    }

    builder.build()
}

/// One successful HTTP exchange, before decoding
enum Exchange {
    /// 2xx response with its raw body bytes
    Body(Vec<u8>),
    /// Clean negative result (non-success, non-5xx status); never retried
    Negative(u16),
}

/// Downloads pages under the retry policy
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
    charsets: Vec<Charset>,
}

impl Fetcher {
    pub fn new(client: Client, policy: RetryPolicy, charsets: Vec<Charset>) -> Self {
        Self {
            client,
            policy,
            charsets,
        }
    }

    /// Fetches and decodes one page.
    ///
    /// * `Ok(Some(page))` - full decoded page text
    /// * `Ok(None)` - no result: non-success status, exhausted retries,
    ///   or bytes no configured charset could decode
    /// * `Err(FetchError)` - a non-retryable failure
    pub async fn fetch(&self, url: &str) -> Result<Option<String>, FetchError> {
        let exchange = self.policy.run(|| self.attempt(url)).await?;

        match exchange {
            None => Ok(None),
            Some(Exchange::Negative(status)) => {
                tracing::debug!(url, status, "non-success status, no result");
                Ok(None)
            }
            Some(Exchange::Body(bytes)) => {
                let page = decode_page(&bytes, &self.charsets);
                if page.is_none() {
                    tracing::debug!(url, "no configured charset decodes the page");
                }
                Ok(page)
            }
        }
    }

    /// One GET. Transport errors and 5xx are transient; other non-success
    /// statuses are clean negatives that bypass the retry policy.
    async fn attempt(&self, url: &str) -> Result<Exchange, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if status.is_server_error() {
            return Err(FetchError::ServerError {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            return Ok(Exchange::Negative(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(FetchError::Body)?;
        Ok(Exchange::Body(bytes.to_vec()))
    }
}
