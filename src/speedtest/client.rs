use crate::errors::SpeedTestError;
use crate::speedtest::requests::{user_agent, Request, RequestBody};
use bytes::Bytes;
use futures::stream;
use reqwest::{Body, Client as ReqwestClient, RequestBuilder, Response};
use std::io;
use std::time::Duration;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Client {
    client: ReqwestClient,
}

impl Client {
    pub fn new() -> Result<Self, SpeedTestError> {
        let client = ReqwestClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(user_agent())
            .build()
            .map_err(|error| {
                SpeedTestError::config(format!(
                    "failed to build HTTP client: {}",
                    error
                ))
                .with_source(error)
            })?;

        Ok(Client { client })
    }

    /// Join a request endpoint onto a base URL, keeping any path prefix
    /// the base carries.
    pub fn url(base: &str, endpoint: &str) -> Result<Url, SpeedTestError> {
        let base = base.trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');

        Ok(Url::parse(&format!("{}/{}", base, endpoint))?)
    }

    /// Send `request` and return the raw response once its status line
    /// arrived. The body is left for the caller to consume.
    pub async fn execute<R: Request>(
        &self,
        base: &str,
        request: R,
    ) -> Result<Response, SpeedTestError> {
        let url = Self::url(base, &request.endpoint())?;
        let headers = request.headers();

        let response = self
            .client
            .request(R::METHOD, url)
            .headers(headers)
            .request_body(request.into_body())
            .send()
            .await?
            .error_for_status()?;

        Ok(response)
    }

    /// Send `request` and deserialize its JSON body. An empty body reads
    /// as JSON `null`, which suits unit responses.
    pub async fn send<R: Request>(
        &self,
        base: &str,
        request: R,
    ) -> Result<R::Response, SpeedTestError> {
        let text = self.execute(base, request).await?.text().await?;
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };

        Ok(serde_json::from_str(text)?)
    }

    /// Whether this client can attach a body that is produced while the
    /// request is in flight.
    pub fn supports_streaming_body(&self) -> Result<(), SpeedTestError> {
        let body = Body::wrap_stream(stream::empty::<Result<Bytes, io::Error>>());

        self.client
            .post("http://localhost/")
            .body(body)
            .build()
            .map(|_| ())
            .map_err(|error| {
                SpeedTestError::streaming_unsupported(error.to_string())
                    .with_source(error)
            })
    }
}

trait RequestBuilderExt: Sized {
    fn request_body(self, body: RequestBody) -> Self;
}

impl RequestBuilderExt for RequestBuilder {
    fn request_body(self, body: RequestBody) -> Self {
        match body {
            RequestBody::None => self,
            RequestBody::Bytes(bytes) => self.body(bytes),
            RequestBody::Stream(stream) => self.body(Body::wrap_stream(stream)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_endpoint() {
        let url = Client::url("http://node:8080", "/api/v1/latency?t=1").unwrap();
        assert_eq!(url.as_str(), "http://node:8080/api/v1/latency?t=1");
    }

    #[test]
    fn test_url_keeps_path_prefix() {
        let url = Client::url("https://host/speed/", "api/v1/config").unwrap();
        assert_eq!(url.as_str(), "https://host/speed/api/v1/config");
    }

    #[test]
    fn test_url_rejects_garbage() {
        assert!(Client::url("not a url", "/api").is_err());
    }

    #[test]
    fn test_streaming_body_supported() {
        let client = Client::new().unwrap();
        assert!(client.supports_streaming_body().is_ok());
    }
}
