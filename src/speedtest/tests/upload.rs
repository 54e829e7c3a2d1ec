use crate::errors::SpeedTestError;
use crate::speedtest::requests::upload::UploadReceipt;
use crate::speedtest::tests::pool::WorkerContext;
use crate::speedtest::tests::session::TransferSession;
use crate::speedtest::transport::{Transport, UploadBody};
use bytes::Bytes;
use futures::stream;
use log::debug;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::Poll;
use tokio::time::sleep_until;

/// How upload data is sent to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadMode {
    /// One long POST per stream with an incrementally produced body.
    Streaming,
    /// Repeated fixed-size POSTs.
    Fallback,
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadMode::Streaming => f.write_str("streaming"),
            UploadMode::Fallback => f.write_str("fallback"),
        }
    }
}

/// Bytes handed to the transport by one streaming body.
#[derive(Debug, Default)]
struct BodyState {
    sent: u64,
    closed: bool,
}

fn lock(state: &Mutex<BodyState>) -> std::sync::MutexGuard<'_, BodyState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A body that yields `payload` on every pull until the session finishes
/// or the worker closes it. Each chunk is counted as it is handed over.
fn upload_body(
    session: Arc<TransferSession>,
    payload: Bytes,
    state: Arc<Mutex<BodyState>>,
) -> UploadBody {
    Box::pin(stream::poll_fn(move |_| {
        let mut state = lock(&state);

        if state.closed || session.is_finished() {
            state.closed = true;
            return Poll::Ready(None);
        }

        let bytes = payload.len() as u64;
        state.sent += bytes;
        session.record(bytes);

        Poll::Ready(Some(Ok(payload.clone())))
    }))
}

/// Close the body and return how much it handed over.
fn close(state: &Mutex<BodyState>) -> u64 {
    let mut state = lock(state);
    state.closed = true;
    state.sent
}

enum StreamOutcome {
    Answered(Result<UploadReceipt, SpeedTestError>),
    Cancelled,
    NoAnswer,
}

/// Send one streamed POST that lasts the whole phase, then settle its
/// count against the node's receipt.
///
/// Returns the bytes attributed to this worker: the acknowledged count
/// when the node reports one, the locally sent count when it does not,
/// and zero when the request failed.
pub(crate) async fn streaming_upload_worker<T: Transport>(
    context: WorkerContext<'_, T>,
) -> u64 {
    let session = context.session;
    let state = Arc::new(Mutex::new(BodyState::default()));
    let body = upload_body(
        Arc::clone(session),
        context.payload.clone(),
        Arc::clone(&state),
    );
    let time_secs = context.duration.as_secs_f64().ceil().max(1.0) as u64;
    let answer_deadline = session.deadline() + context.settings.upload_response_grace;

    let outcome = tokio::select! {
        result = context.transport.upload_stream(context.base_url, time_secs, body) => {
            StreamOutcome::Answered(result)
        }
        _ = session.cancel_token().cancelled() => StreamOutcome::Cancelled,
        _ = sleep_until(answer_deadline) => StreamOutcome::NoAnswer,
    };

    let sent = close(&state);

    match outcome {
        StreamOutcome::Answered(Ok(receipt)) => match receipt.received_bytes() {
            Some(acknowledged) => {
                debug!(
                    "upload #{}: sent {} bytes, node acknowledged {} in {:?} ms",
                    context.id, sent, acknowledged, receipt.duration_ms
                );
                session.reconcile(sent, acknowledged)
            }
            None => {
                debug!("upload #{}: no byte count in receipt, keeping {}", context.id, sent);
                sent
            }
        },
        StreamOutcome::Answered(Err(error)) => {
            debug!("upload #{}: request failed: {}", context.id, error);
            session.reconcile(sent, 0)
        }
        StreamOutcome::Cancelled => sent,
        StreamOutcome::NoAnswer => {
            debug!("upload #{}: no response after deadline, keeping {}", context.id, sent);
            sent
        }
    }
}

/// Post the payload again and again until the phase ends. Only POSTs that
/// completed count.
pub(crate) async fn fallback_upload_worker<T: Transport>(
    context: WorkerContext<'_, T>,
) -> u64 {
    let session = context.session;
    let bytes = context.payload.len() as u64;
    let mut uploaded = 0u64;

    while !session.is_finished() {
        let result = tokio::select! {
            result = context.transport.upload_chunk(
                context.base_url,
                context.payload.clone(),
            ) => result,
            _ = session.finished() => break,
        };

        match result {
            Ok(()) => {
                session.record(bytes);
                uploaded += bytes;
            }
            Err(error) => {
                debug!("upload #{}: chunk failed: {}", context.id, error);
                session.pause(context.settings.failure_pause).await;
            }
        }
    }

    debug!("upload #{}: {} bytes", context.id, uploaded);
    uploaded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::Direction;
    use futures::StreamExt;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    #[tokio::test]
    async fn test_body_counts_each_chunk() {
        let session = Arc::new(TransferSession::new(
            Direction::Upload,
            Duration::from_secs(10),
            CancellationToken::new(),
        ));
        let state = Arc::new(Mutex::new(BodyState::default()));
        let mut body =
            upload_body(Arc::clone(&session), Bytes::from_static(b"abcd"), Arc::clone(&state));

        for _ in 0..3 {
            assert_eq!(body.next().await.unwrap().unwrap(), "abcd");
        }

        assert_eq!(close(&state), 12);
        assert_eq!(session.total_bytes(), 12);
        assert!(body.next().await.is_none());
    }

    #[tokio::test]
    async fn test_body_ends_on_cancel() {
        let cancel = CancellationToken::new();
        let session = Arc::new(TransferSession::new(
            Direction::Upload,
            Duration::from_secs(10),
            cancel.clone(),
        ));
        let state = Arc::new(Mutex::new(BodyState::default()));
        let mut body =
            upload_body(Arc::clone(&session), Bytes::from_static(b"x"), state);

        assert!(body.next().await.is_some());
        cancel.cancel();
        assert!(body.next().await.is_none());
        assert_eq!(session.total_bytes(), 1);
    }

    #[test]
    fn test_upload_mode_serializes() {
        assert_eq!(serde_json::to_string(&UploadMode::Fallback).unwrap(), "\"fallback\"");
        assert_eq!(UploadMode::Streaming.to_string(), "streaming");
    }
}
