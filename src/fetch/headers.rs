use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, CONNECTION, HeaderMap, HeaderName, HeaderValue, UPGRADE_INSECURE_REQUESTS,
    USER_AGENT,
};

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// An [`HttpClient`] wrapper that sends the same headers a desktop browser
/// would, so search pages are served their regular HTML.
///
/// Headers already present on a request are left untouched.
pub struct BrowserHeaders<C> {
    pub inner: C,
    pub headers: HeaderMap,
}

impl<C> BrowserHeaders<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner,
            headers: browser_headers(),
        }
    }
}

/// The default header set: user agent, accepted content and languages.
pub fn browser_headers() -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    h.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    h.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    h.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
    h.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    h.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    h
}

#[async_trait]
impl<C: HttpClient> HttpClient for BrowserHeaders<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        for (name, value) in &self.headers {
            if !req.headers().contains_key(name) {
                req.headers_mut().insert(name.clone(), value.clone());
            }
        }
        self.inner.execute(req).await
    }
}
