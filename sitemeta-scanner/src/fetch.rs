use crate::error::Result;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_USER_AGENT: &str = concat!(
    "sitemeta/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/sitemeta/sitemeta)"
);
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(200);

/// A response that passed the gate: success status and an HTML body.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: String,
    /// Where the request ended up after redirects
    pub final_url: String,
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

/// Wraps the HTTP client with a fixed timeout, user agent and a politeness
/// delay slept before every request.
#[derive(Debug, Clone)]
pub struct FetchGate {
    client: Client,
    delay: Duration,
}

impl FetchGate {
    pub fn new() -> Result<Self> {
        Self::with_settings(DEFAULT_TIMEOUT, DEFAULT_USER_AGENT)
    }

    pub fn with_settings(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout / 2)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            delay: DEFAULT_REQUEST_DELAY,
        })
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Fetch `url`, returning `None` for anything that is not a successful
    /// HTML response. Failures are never retried.
    pub async fn fetch(&self, url: &str) -> Option<FetchedPage> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        debug!("Fetching {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Skipping {}: {}", url, e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            debug!("Skipping {}: status {}", url, status.as_u16());
            return None;
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        if !is_html_content_type(&content_type) {
            debug!("Skipping {}: content type {:?}", url, content_type);
            return None;
        }

        let final_url = response.url().to_string();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                debug!("Skipping {}: unreadable body: {}", url, e);
                return None;
            }
        };

        Some(FetchedPage {
            url: url.to_string(),
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

pub fn is_html_content_type(content_type: &str) -> bool {
    content_type.to_lowercase().contains("text/html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    fn gate() -> FetchGate {
        FetchGate::new().unwrap().with_delay(Duration::ZERO)
    }

    #[test]
    fn test_is_html_content_type() {
        assert!(is_html_content_type("text/html"));
        assert!(is_html_content_type("text/html; charset=utf-8"));
        assert!(is_html_content_type("TEXT/HTML"));
        assert!(!is_html_content_type("application/json"));
        assert!(!is_html_content_type(""));
    }

    #[test]
    fn test_default_delay() {
        let gate = FetchGate::new().unwrap();
        assert_eq!(gate.delay(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_precedes_every_request() {
        let gate = FetchGate::new().unwrap().with_delay(Duration::from_secs(3));
        let start = tokio::time::Instant::now();

        // rejected by the client before any connection is made
        assert!(gate.fetch("not a url").await.is_none());
        assert!(start.elapsed() >= Duration::from_secs(3));

        assert!(gate.fetch("not a url").await.is_none());
        assert!(start.elapsed() >= Duration::from_secs(6));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_delay_does_not_sleep() {
        let start = tokio::time::Instant::now();
        assert!(gate().fetch("not a url").await.is_none());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_fetch_html_page() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/page"))
            .and(header("user-agent", DEFAULT_USER_AGENT))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>Hello</body></html>", "text/html; charset=utf-8"),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/page", mock_server.uri());
        let page = gate().fetch(&url).await.expect("page should be usable");

        assert_eq!(page.status, 200);
        assert_eq!(page.url, url);
        assert!(page.body.contains("Hello"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_html() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/data.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("{}", "application/json"),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/data.json", mock_server.uri());
        assert!(gate().fetch(&url).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_raw("<html>not found</html>", "text/html"),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/missing", mock_server.uri());
        assert!(gate().fetch(&url).await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_follows_redirects() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(
                ResponseTemplate::new(301)
                    .insert_header("location", format!("{}/new", mock_server.uri()).as_str()),
            )
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html>moved</html>", "text/html"),
            )
            .mount(&mock_server)
            .await;

        let url = format!("{}/old", mock_server.uri());
        let page = gate().fetch(&url).await.expect("redirect should be followed");
        assert_eq!(page.final_url, format!("{}/new", mock_server.uri()));
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        // Nothing listens on port 9 locally
        assert!(gate().fetch("http://127.0.0.1:9/").await.is_none());
    }
}
