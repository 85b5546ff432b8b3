//! Line-oriented SSE frame decoder.
//!
//! Chunks are buffered as bytes and split on `\n` before UTF-8 decoding, so
//! a multi-byte character split across two chunks decodes intact.

pub const CONNECTED_SENTINEL: &str = "[CONNECTED]";
pub const END_SENTINEL: &str = "[END]";
pub const TIMEOUT_SENTINEL: &str = "[TIMEOUT]";

const DATA_PREFIX: &str = "data:";

/// A decoded `data:` frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Connected,
    End,
    Timeout,
    /// Literal output, already unescaped.
    Output(String),
}

#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns the frames of every completed line.
    /// The trailing incomplete line stays buffered.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);

        let Some(last_newline) = self.buffer.iter().rposition(|&b| b == b'\n') else {
            return Vec::new();
        };
        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);

        complete
            .split(|&b| b == b'\n')
            .filter_map(|line| parse_line(&String::from_utf8_lossy(line)))
            .collect()
    }

    /// Flushes the retained partial line at end of body.
    pub fn finish(&mut self) -> Option<Frame> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&String::from_utf8_lossy(&rest))
    }
}

/// Parses one SSE line. Comments, blank lines and non-`data:` fields yield
/// nothing.
pub fn parse_line(line: &str) -> Option<Frame> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let payload = line.strip_prefix(DATA_PREFIX)?;
    let payload = payload.strip_prefix(' ').unwrap_or(payload);

    Some(match payload {
        CONNECTED_SENTINEL => Frame::Connected,
        END_SENTINEL => Frame::End,
        TIMEOUT_SENTINEL => Frame::Timeout,
        output => Frame::Output(unescape(output)),
    })
}

/// Turns the literal escapes `\n` and `\r` back into control characters.
pub fn unescape(payload: &str) -> String {
    payload.replace("\\n", "\n").replace("\\r", "\r")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels_and_output() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(b"data: [CONNECTED]\n\ndata: hello\\nworld\n\ndata: [END]\n\n");
        assert_eq!(
            frames,
            vec![
                Frame::Connected,
                Frame::Output("hello\nworld".to_string()),
                Frame::End,
            ]
        );
    }

    #[test]
    fn test_partial_line_is_retained() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"data: hel").is_empty());
        assert_eq!(decoder.push(b"lo\n"), vec![Frame::Output("hello".to_string())]);
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), Some(Frame::Output("tail".to_string())));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_multibyte_split_across_chunks() {
        let text = "data: héllo\n".as_bytes();
        let split = text.iter().position(|&b| b == 0xc3).unwrap() + 1;

        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(&text[..split]).is_empty());
        assert_eq!(
            decoder.push(&text[split..]),
            vec![Frame::Output("héllo".to_string())]
        );
    }

    #[test]
    fn test_ignored_lines() {
        assert_eq!(parse_line(": heartbeat"), None);
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("event: message"), None);
        assert_eq!(parse_line("data: [END]\r"), Some(Frame::End));
        assert_eq!(parse_line("data:[TIMEOUT]"), Some(Frame::Timeout));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a\\r\\nb"), "a\r\nb");
        assert_eq!(unescape("plain"), "plain");
    }
}
