extern crate serde;

pub mod config;
pub mod download;
pub mod latency;
pub mod servers;
pub mod upload;

use crate::speedtest::transport::UploadBody;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::borrow::Cow;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// User-Agent sent with every request.
pub fn user_agent() -> String {
    match option_env!("NODESPEED_BUILD_GIT_HASH") {
        Some(rev) => format!("{}/{} ({})", NAME, VERSION, rev),
        None => format!("{}/{}", NAME, VERSION),
    }
}

/// Body attached to a request.
pub enum RequestBody {
    None,
    /// A complete, fixed-size body.
    Bytes(Bytes),
    /// A body produced incrementally while the request is in flight.
    Stream(UploadBody),
}

/// One endpoint of the directory or a measurement node.
///
/// `endpoint` is relative to the base URL the request is sent to; the
/// client joins the two.
pub trait Request {
    type Response: DeserializeOwned;

    const METHOD: Method = Method::GET;

    fn endpoint(&self) -> Cow<'_, str>;

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

        headers
    }

    fn into_body(self) -> RequestBody
    where
        Self: Sized,
    {
        RequestBody::None
    }
}
