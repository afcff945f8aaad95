use async_trait::async_trait;
use reqwest::{Request, Response};

/// Anything that can send a prepared request. Wrappers such as
/// [`BrowserHeaders`](super::BrowserHeaders) decorate a request and delegate.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
