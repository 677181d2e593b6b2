//! Incremental decoder for `text/event-stream` bodies.
//!
//! Bytes arrive in arbitrary chunks; complete events are queued as soon as
//! their terminating blank line has been seen. Follows the WHATWG framing
//! rules: `data:` lines are joined with `\n`, a single space after the colon
//! is dropped, `:` lines are comments, and an event without data is not
//! dispatched.
//!
//! Lines and event data are capped at [`MAX_LINE_BYTES`] so a server that
//! never terminates a line cannot grow the buffer without bound.

use std::collections::VecDeque;

/// Longest accepted line, and longest accepted event payload.
pub const MAX_LINE_BYTES: usize = 1024 * 1024;

/// The stream exceeded the decoder's size limit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("event stream line exceeds {limit} bytes")]
pub struct LineTooLong {
    pub limit: usize,
}

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// `event:` field, if the server named the event.
    pub event: Option<String>,
    /// Joined `data:` lines.
    pub data: String,
    /// Last `id:` seen on the stream.
    pub id: Option<String>,
}

#[derive(Debug)]
pub struct SseDecoder {
    max_line: usize,
    pending: Vec<u8>,
    data: String,
    has_data: bool,
    event: Option<String>,
    last_id: Option<String>,
    ready: VecDeque<SseEvent>,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_max_line(MAX_LINE_BYTES)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoder with a custom size limit.
    pub fn with_max_line(max_line: usize) -> Self {
        Self {
            max_line,
            pending: Vec::new(),
            data: String::new(),
            has_data: false,
            event: None,
            last_id: None,
            ready: VecDeque::new(),
        }
    }

    /// Feed a chunk of the response body.
    ///
    /// Fails once an unterminated line or an undispatched event grows past
    /// the limit; the partial input is dropped and the stream should be
    /// abandoned.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), LineTooLong> {
        self.pending.extend_from_slice(chunk);

        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line).into_owned();
            self.process_line(&line);
        }

        if self.pending.len() > self.max_line || self.data.len() > self.max_line {
            self.pending.clear();
            self.data.clear();
            self.has_data = false;
            return Err(LineTooLong {
                limit: self.max_line,
            });
        }
        Ok(())
    }

    /// Pop the next complete event.
    pub fn next_event(&mut self) -> Option<SseEvent> {
        self.ready.pop_front()
    }

    /// Whether a partially received event is buffered. Per the framing rules
    /// it is discarded if the stream ends now.
    pub fn has_partial(&self) -> bool {
        !self.pending.is_empty() || self.has_data
    }

    fn process_line(&mut self, line: &str) {
        if line.is_empty() {
            self.dispatch();
            return;
        }
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
                self.has_data = true;
            }
            "event" => self.event = Some(value.to_string()),
            "id" => {
                if !value.contains('\0') {
                    self.last_id = Some(value.to_string());
                }
            }
            // retry and unknown fields do not affect decoding
            _ => {}
        }
    }

    fn dispatch(&mut self) {
        let event = self.event.take();
        if !self.has_data {
            self.data.clear();
            return;
        }
        self.has_data = false;

        let mut data = std::mem::take(&mut self.data);
        if data.ends_with('\n') {
            data.pop();
        }
        self.ready.push_back(SseEvent {
            event,
            data,
            id: self.last_id.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(decoder: &mut SseDecoder) -> Vec<SseEvent> {
        std::iter::from_fn(|| decoder.next_event()).collect()
    }

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::new();
        decoder.feed(b"data: {\"type\":\"bundling\"}\n\n").unwrap();
        let events = drain(&mut decoder);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "{\"type\":\"bundling\"}");
        assert_eq!(events[0].event, None);
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        decoder.feed(b"da").unwrap();
        decoder.feed(b"ta: hel").unwrap();
        assert!(decoder.next_event().is_none());
        decoder.feed(b"lo\n").unwrap();
        assert!(decoder.next_event().is_none());
        assert!(decoder.has_partial());
        decoder.feed(b"\n").unwrap();
        assert_eq!(decoder.next_event().map(|e| e.data), Some("hello".to_string()));
        assert!(!decoder.has_partial());
    }

    #[test]
    fn test_crlf_and_multiline_data() {
        let mut decoder = SseDecoder::new();
        decoder.feed(b"event: progress\r\nid: 7\r\ndata: line one\r\ndata:line two\r\n\r\n").unwrap();
        let events = drain(&mut decoder);
        assert_eq!(
            events,
            vec![SseEvent {
                event: Some("progress".to_string()),
                data: "line one\nline two".to_string(),
                id: Some("7".to_string()),
            }]
        );
    }

    #[test]
    fn test_comments_and_empty_events_are_skipped() {
        let mut decoder = SseDecoder::new();
        decoder.feed(b": keep-alive\n\nevent: ping\n\nretry: 1000\ndata: x\n\n").unwrap();
        let events = drain(&mut decoder);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "x");
        assert_eq!(events[0].event, None);
    }

    #[test]
    fn test_multiple_events_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        decoder.feed(b"data: a\n\ndata: b\n\ndata: c\n").unwrap();
        let data: Vec<String> = drain(&mut decoder).into_iter().map(|e| e.data).collect();
        assert_eq!(data, vec!["a", "b"]);
    }

    #[test]
    fn test_unterminated_line_past_limit_is_rejected() {
        let mut decoder = SseDecoder::with_max_line(16);
        decoder.feed(b"data: ok\n\n").unwrap();
        decoder.feed(b"data: 0123456789").unwrap();
        assert_eq!(
            decoder.feed(b"abcdef"),
            Err(LineTooLong { limit: 16 })
        );
        assert!(!decoder.has_partial());
        assert_eq!(decoder.next_event().map(|e| e.data), Some("ok".to_string()));
    }

    #[test]
    fn test_oversized_event_data_is_rejected() {
        let mut decoder = SseDecoder::with_max_line(16);
        decoder.feed(b"data: 0123456789\n").unwrap();
        assert!(decoder.feed(b"data: 0123456789\n").is_err());
        assert!(decoder.next_event().is_none());
    }
}
