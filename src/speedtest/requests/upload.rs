use crate::speedtest::requests::{Request, RequestBody};
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Method;
use serde::Deserialize;
use std::borrow::Cow;

/// `POST {node}/api/v1/upload[?time={secs}]`
///
/// The streaming form passes the phase length so the node knows how long
/// to keep the connection open; fixed-size fallback posts omit it.
pub(crate) struct Upload {
    pub time_secs: Option<u64>,
    pub body: RequestBody,
}

impl Request for Upload {
    type Response = UploadReceipt;

    const METHOD: Method = Method::POST;

    fn endpoint(&self) -> Cow<'_, str> {
        match self.time_secs {
            Some(secs) => format!("/api/v1/upload?time={}", secs).into(),
            None => "/api/v1/upload".into(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );

        headers
    }

    fn into_body(self) -> RequestBody {
        self.body
    }
}

/// Body of a completed upload, as acknowledged by the node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    #[serde(default)]
    pub received_bytes: Option<f64>,
    #[serde(default)]
    pub duration_ms: Option<f64>,
}

impl UploadReceipt {
    pub fn new(received_bytes: Option<f64>, duration_ms: Option<f64>) -> Self {
        Self { received_bytes, duration_ms }
    }

    /// Acknowledged byte count, if the node sent a usable one.
    pub fn received_bytes(&self) -> Option<u64> {
        self.received_bytes
            .filter(|bytes| bytes.is_finite() && *bytes >= 0.0)
            .map(|bytes| bytes as u64)
    }
}
