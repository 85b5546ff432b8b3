//! Consumes a session's output stream and reports it as [`StreamEvent`]s.
//!
//! State machine:
//!
//! ```text
//! Connecting --[CONNECTED] or output--> Streaming
//! Streaming  --[END] or end of body---> Ended
//! Streaming  --[TIMEOUT]--------------> TimedOut   (one warning line)
//! *          --read error-------------> Errored    (one error line)
//! *          --cancel-----------------> Aborted    (silent)
//! ```
//!
//! Reaching any terminal state drops the body, which releases the
//! connection. There is no reconnect.

use futures::StreamExt;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use workstation_core::execution::{ByteStream, StreamState};

use super::decoder::{Frame, FrameDecoder};
use crate::readiness::ReadinessDetector;

/// Warning line emitted when the backend reports a timeout.
pub const TIMEOUT_WARNING: &str = "Execution timed out";

/// What the consumer observed, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Connected,
    /// One line of process output.
    Output(String),
    Warning(String),
    Error(String),
    /// Output suggested the dev server is listening.
    PreviewReady,
    /// Always the last event.
    Finished(StreamState),
}

pub struct StreamConsumer {
    session_id: String,
    state: StreamState,
    decoder: FrameDecoder,
    readiness: ReadinessDetector,
    events: UnboundedSender<StreamEvent>,
}

impl StreamConsumer {
    pub fn new(session_id: impl Into<String>, events: UnboundedSender<StreamEvent>) -> Self {
        Self {
            session_id: session_id.into(),
            state: StreamState::Connecting,
            decoder: FrameDecoder::new(),
            readiness: ReadinessDetector::new(),
            events,
        }
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    /// Reads `stream` until a terminal state and returns that state.
    pub async fn run(mut self, mut stream: ByteStream, cancel: CancellationToken) -> StreamState {
        tracing::debug!("[StreamConsumer] Reading output of session {}", self.session_id);

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return self.finish(StreamState::Aborted),
                next = stream.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    for frame in self.decoder.push(&chunk) {
                        if let Some(end) = self.handle(frame) {
                            return self.finish(end);
                        }
                    }
                }
                Some(Err(err)) => {
                    if cancel.is_cancelled() {
                        return self.finish(StreamState::Aborted);
                    }
                    tracing::warn!(
                        "[StreamConsumer] Read error on session {}: {}",
                        self.session_id,
                        err
                    );
                    self.emit(StreamEvent::Error(err.to_string()));
                    return self.finish(StreamState::Errored);
                }
                None => {
                    let end = self
                        .decoder
                        .finish()
                        .and_then(|frame| self.handle(frame))
                        .unwrap_or(StreamState::Ended);
                    return self.finish(end);
                }
            }
        }
    }

    /// Applies one frame; returns the terminal state it leads to, if any.
    fn handle(&mut self, frame: Frame) -> Option<StreamState> {
        match frame {
            Frame::Connected => {
                self.state = StreamState::Streaming;
                self.emit(StreamEvent::Connected);
                None
            }
            Frame::End => Some(StreamState::Ended),
            Frame::Timeout => {
                self.emit(StreamEvent::Warning(TIMEOUT_WARNING.to_string()));
                Some(StreamState::TimedOut)
            }
            Frame::Output(text) => {
                self.state = StreamState::Streaming;
                for line in text.lines() {
                    self.emit(StreamEvent::Output(line.to_string()));
                }
                if self.readiness.observe(&text) {
                    tracing::info!("[StreamConsumer] Session {} looks ready", self.session_id);
                    self.emit(StreamEvent::PreviewReady);
                }
                None
            }
        }
    }

    fn finish(mut self, state: StreamState) -> StreamState {
        self.state = state;
        tracing::debug!(
            "[StreamConsumer] Session {} stream finished: {:?}",
            self.session_id,
            state
        );
        self.emit(StreamEvent::Finished(state));
        state
    }

    fn emit(&self, event: StreamEvent) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.events.send(event);
    }
}
