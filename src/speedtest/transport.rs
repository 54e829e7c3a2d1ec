//! The seam between the measurement engine and the network.
//!
//! Everything the engine sends goes through [`Transport`], so the
//! selection, latency and transfer logic can be driven against an
//! in-memory node in tests.

use crate::errors::SpeedTestError;
use crate::speedtest::client::Client;
use crate::speedtest::requests::config::{NodeConfig, NodeConfigRequest};
use crate::speedtest::requests::download::Download;
use crate::speedtest::requests::latency::Latency;
use crate::speedtest::requests::servers::Servers;
use crate::speedtest::requests::upload::{Upload, UploadReceipt};
use crate::speedtest::requests::RequestBody;
use bytes::Bytes;
use futures::stream::{BoxStream, Stream};
use futures::{StreamExt, TryStreamExt};
use log::debug;
use serde_json::Value;
use std::io;
use std::pin::Pin;

/// Response body of a download, chunk by chunk.
pub type ChunkStream = BoxStream<'static, Result<Bytes, SpeedTestError>>;

/// Request body of a streaming upload.
pub type UploadBody =
    Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + Sync + 'static>>;

#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Raw directory listing.
    async fn fetch_servers(&self, directory_url: &str)
        -> Result<Value, SpeedTestError>;

    /// One round trip against the latency endpoint, body included.
    async fn ping(&self, base_url: &str) -> Result<(), SpeedTestError>;

    /// Limits the node advertises.
    async fn node_config(&self, base_url: &str)
        -> Result<NodeConfig, SpeedTestError>;

    /// Open a download; resolves once response headers arrived.
    async fn download(
        &self,
        base_url: &str,
        time_hint_secs: u64,
    ) -> Result<ChunkStream, SpeedTestError>;

    /// Stream `body` to the node and return its acknowledgement.
    async fn upload_stream(
        &self,
        base_url: &str,
        time_secs: u64,
        body: UploadBody,
    ) -> Result<UploadReceipt, SpeedTestError>;

    /// Post one fixed-size chunk.
    async fn upload_chunk(
        &self,
        base_url: &str,
        chunk: Bytes,
    ) -> Result<(), SpeedTestError>;

    /// Whether streamed request bodies can be sent at all.
    async fn check_streaming_upload(&self) -> Result<(), SpeedTestError>;
}

/// [`Transport`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, SpeedTestError> {
        Ok(Self { client: Client::new()? })
    }
}

impl From<Client> for HttpTransport {
    fn from(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn fetch_servers(
        &self,
        directory_url: &str,
    ) -> Result<Value, SpeedTestError> {
        self.client.send(directory_url, Servers {}).await
    }

    async fn ping(&self, base_url: &str) -> Result<(), SpeedTestError> {
        self.client.execute(base_url, Latency::new()).await?.bytes().await?;

        Ok(())
    }

    async fn node_config(
        &self,
        base_url: &str,
    ) -> Result<NodeConfig, SpeedTestError> {
        self.client.send(base_url, NodeConfigRequest {}).await
    }

    async fn download(
        &self,
        base_url: &str,
        time_hint_secs: u64,
    ) -> Result<ChunkStream, SpeedTestError> {
        let response =
            self.client.execute(base_url, Download { time_hint_secs }).await?;

        Ok(response.bytes_stream().map_err(SpeedTestError::from).boxed())
    }

    async fn upload_stream(
        &self,
        base_url: &str,
        time_secs: u64,
        body: UploadBody,
    ) -> Result<UploadReceipt, SpeedTestError> {
        let request = Upload {
            time_secs: Some(time_secs),
            body: RequestBody::Stream(body),
        };
        let text = self.client.execute(base_url, request).await?.text().await?;

        // A body that is not a receipt counts as an unacknowledged upload.
        Ok(serde_json::from_str(&text).unwrap_or_else(|error| {
            debug!("upload receipt unreadable: {}", error);
            UploadReceipt::default()
        }))
    }

    async fn upload_chunk(
        &self,
        base_url: &str,
        chunk: Bytes,
    ) -> Result<(), SpeedTestError> {
        let request = Upload { time_secs: None, body: RequestBody::Bytes(chunk) };
        self.client.execute(base_url, request).await?.bytes().await?;

        Ok(())
    }

    async fn check_streaming_upload(&self) -> Result<(), SpeedTestError> {
        self.client.supports_streaming_body()
    }
}
