//! HTTP access for the scraping engine.
//!
//! The engine never talks to `reqwest` directly. It goes through the
//! [`HttpFetch`] trait so that the transport can be swapped out in tests and
//! decorated with per-site behavior:
//! - [`ReqwestFetcher`]: the real client (rustls, cookie session, timeout)
//! - [`Paced`]: decorator that waits a fixed delay before every request
//!
//! Any transport failure becomes [`ScrapeError::Fetch`] and any non-2xx
//! answer becomes [`ScrapeError::Status`].

use crate::error::ScrapeError;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, instrument, warn};

/// Minimal HTTP surface the engine needs.
#[allow(async_fn_in_trait, reason = "requests are awaited in place, never spawned, so no Send bound is needed")]
pub trait HttpFetch {
    /// GET `url` and return the response body.
    async fn get(&self, url: &str) -> Result<Vec<u8>, ScrapeError>;

    /// POST `fields` as `application/x-www-form-urlencoded` and return the body.
    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<Vec<u8>, ScrapeError>;
}

/// `reqwest`-backed fetcher.
///
/// Keeps a cookie store for the whole run: postback pagination only works
/// when the session cookie from page 1 is sent back with page 2.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| ScrapeError::Config(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    async fn read(url: &str, response: reqwest::Response) -> Result<Vec<u8>, ScrapeError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(|e| ScrapeError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(bytes.to_vec())
    }
}

impl HttpFetch for ReqwestFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        let t0 = Instant::now();
        let response = self.client.get(url).send().await.map_err(|e| ScrapeError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let body = Self::read(url, response).await;
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, ok = body.is_ok(), "GET finished");
        body
    }

    #[instrument(level = "debug", skip(self, fields), fields(field_count = fields.len()))]
    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<Vec<u8>, ScrapeError> {
        let t0 = Instant::now();
        let response = self
            .client
            .post(url)
            .form(fields)
            .send()
            .await
            .map_err(|e| ScrapeError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        let body = Self::read(url, response).await;
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, ok = body.is_ok(), "POST finished");
        body
    }
}

/// Decorator that waits `delay` before every request it forwards.
///
/// This is a plain wait, not a token bucket: there is no burst credit.
pub struct Paced<'a, F> {
    inner: &'a F,
    delay: Duration,
}

impl<'a, F> Paced<'a, F>
where
    F: HttpFetch,
{
    pub fn new(inner: &'a F, delay: Duration) -> Self {
        Self { inner, delay }
    }

    async fn wait(&self) {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

impl<F> fmt::Debug for Paced<'_, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paced").field("delay", &self.delay).finish()
    }
}

impl<F> HttpFetch for Paced<'_, F>
where
    F: HttpFetch,
{
    async fn get(&self, url: &str) -> Result<Vec<u8>, ScrapeError> {
        self.wait().await;
        let res = self.inner.get(url).await;
        if let Err(e) = &res {
            warn!(%url, error = %e, "GET failed");
        }
        res
    }

    async fn post_form(&self, url: &str, fields: &[(String, String)]) -> Result<Vec<u8>, ScrapeError> {
        self.wait().await;
        let res = self.inner.post_form(url, fields).await;
        if let Err(e) = &res {
            warn!(%url, error = %e, "POST failed");
        }
        res
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Request, StaticFetcher};
    use super::*;

    #[tokio::test]
    async fn test_paced_forwards_requests() {
        let inner = StaticFetcher::new().page("https://a.com/", "ok");
        let paced = Paced::new(&inner, Duration::from_millis(5));

        let t0 = Instant::now();
        let body = paced.get("https://a.com/").await.unwrap();
        assert_eq!(body, b"ok");
        assert!(t0.elapsed() >= Duration::from_millis(5));
        assert_eq!(inner.requests(), vec![Request::Get("https://a.com/".to_string())]);
    }

    #[tokio::test]
    async fn test_unknown_url_is_status_error() {
        let inner = StaticFetcher::new().status("https://a.com/down", 503);
        let paced = Paced::new(&inner, Duration::ZERO);

        let err = paced.get("https://a.com/down").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 503, .. }));
        let err = paced.get("https://a.com/missing").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
    }

    #[test]
    fn test_reqwest_fetcher_builds() {
        let fetcher = ReqwestFetcher::new("infinity-news-test", Duration::from_secs(5));
        assert!(fetcher.is_ok());
    }
}
