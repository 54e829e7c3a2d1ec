use crate::speedtest::requests::Request;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use std::borrow::Cow;

/// `GET {node}/api/v1/download?time={secs}`
///
/// The node streams random bytes for roughly `time_hint_secs`; workers
/// read the body incrementally and drop it when their phase ends.
#[derive(Copy, Clone)]
pub(crate) struct Download {
    pub time_hint_secs: u64,
}

impl Request for Download {
    type Response = ();

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/v1/download?time={}", self.time_hint_secs).into()
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        headers
    }
}
