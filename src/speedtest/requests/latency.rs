use crate::speedtest::requests::Request;
use std::borrow::Cow;

/// `GET {node}/api/v1/latency?t={n}`
///
/// The random query parameter defeats intermediate caches.
#[derive(Copy, Clone)]
pub(crate) struct Latency {
    pub cache_buster: u64,
}

impl Latency {
    pub fn new() -> Self {
        Self { cache_buster: rand::random() }
    }
}

impl Request for Latency {
    type Response = ();

    fn endpoint(&self) -> Cow<'_, str> {
        format!("/api/v1/latency?t={}", self.cache_buster).into()
    }
}
