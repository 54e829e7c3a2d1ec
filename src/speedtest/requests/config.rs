use crate::speedtest::requests::Request;
use serde::Deserialize;
use std::borrow::Cow;

/// `GET {node}/api/v1/config`
pub(crate) struct NodeConfigRequest {}

impl Request for NodeConfigRequest {
    type Response = NodeConfig;

    fn endpoint(&self) -> Cow<'_, str> {
        "/api/v1/config".into()
    }
}

/// Limits a node advertises for the runs it serves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    #[serde(default)]
    pub node_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub max_streams: Option<usize>,
    #[serde(default)]
    pub max_duration_sec: Option<u64>,
}
