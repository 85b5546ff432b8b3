//! Server-sent-event output stream: frame decoding and consumption.

mod consumer;
mod decoder;

pub use consumer::{StreamConsumer, StreamEvent, TIMEOUT_WARNING};
pub use decoder::{CONNECTED_SENTINEL, END_SENTINEL, Frame, FrameDecoder, TIMEOUT_SENTINEL, unescape};
