extern crate serde;

use crate::speedtest::requests::Request;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use url::Url;

/// A measurement node as listed by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerDescriptor {
    pub id: String,
    pub city: String,
    pub region: String,
    /// Scheme, host and optional path prefix, without a trailing slash.
    pub base_url: String,
}

impl ServerDescriptor {
    /// Describe a node known only by its URL, e.g. one given on the
    /// command line.
    pub fn from_url(url: &str) -> Option<Self> {
        let base_url = normalize_base_url(url)?;

        Some(Self {
            id: String::new(),
            city: String::new(),
            region: String::new(),
            base_url,
        })
    }

    /// Human-readable location, falling back to the URL.
    pub fn label(&self) -> String {
        match (self.city.is_empty(), self.region.is_empty()) {
            (false, false) => format!("{} ({})", self.city, self.region),
            (false, true) => self.city.clone(),
            (true, false) => self.region.clone(),
            (true, true) => self.base_url.clone(),
        }
    }
}

/// Raw directory entry. Several historical key names carry the URL.
#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default, rename = "URL")]
    url_upper: Option<String>,
    #[serde(default, rename = "baseUrl")]
    base_url: Option<String>,
    #[serde(default, rename = "baseURL")]
    base_url_upper: Option<String>,
}

impl DirectoryEntry {
    fn resolved_url(&self) -> Option<String> {
        [&self.url, &self.url_upper, &self.base_url, &self.base_url_upper]
            .into_iter()
            .flatten()
            .find(|url| !url.trim().is_empty())
            .and_then(|url| normalize_base_url(url))
    }

    fn into_descriptor(self) -> Option<ServerDescriptor> {
        let base_url = self.resolved_url()?;
        let id = match self.id {
            Some(Value::String(id)) => id,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        Some(ServerDescriptor {
            id,
            city: self.city.unwrap_or_default(),
            region: self.region.unwrap_or_default(),
            base_url,
        })
    }
}

/// Trim whitespace and trailing slashes; accept only absolute http(s) URLs.
pub fn normalize_base_url(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }

    let url = Url::parse(trimmed).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }

    Some(trimmed.to_string())
}

/// Turn a directory response into descriptors, keeping input order and
/// dropping every entry without a usable URL. Anything but a JSON array
/// yields no candidates.
pub fn normalize(listing: Value) -> Vec<ServerDescriptor> {
    let Value::Array(entries) = listing else {
        debug!("directory response is not an array");
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| {
            match serde_json::from_value::<DirectoryEntry>(entry) {
                Ok(entry) => entry.into_descriptor(),
                Err(error) => {
                    debug!("skipping malformed directory entry: {}", error);
                    None
                }
            }
        })
        .collect()
}

/// `GET {directory}/api/v1/servers`
pub(crate) struct Servers {}

impl Request for Servers {
    type Response = Value;

    fn endpoint(&'_ self) -> Cow<'_, str> {
        "/api/v1/servers".into()
    }
}
