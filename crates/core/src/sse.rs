// Server-sent event framing shared by the HTTP clients

/// Incremental SSE decoder.
///
/// Bytes are fed in as they arrive; complete events come out as the joined
/// payload of their `data:` lines. Events without data (comments,
/// keep-alives, bare `event:` lines) are skipped. Bytes are buffered until an
/// event is complete, so multibyte characters split across chunks survive.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Data of the next complete event, if one is buffered
    pub fn next_event(&mut self) -> Option<String> {
        while let Some((end, sep)) = event_boundary(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..end + sep).take(end).collect();
            if let Some(data) = event_data(&String::from_utf8_lossy(&block)) {
                return Some(data);
            }
        }
        None
    }

    /// Data of a final event that was not closed by a blank line
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        event_data(&String::from_utf8_lossy(&rest))
    }
}

/// Every event payload in a complete SSE body
pub fn decode_events(body: &str) -> Vec<String> {
    let mut decoder = SseDecoder::new();
    decoder.push(body.as_bytes());

    let mut events = Vec::new();
    while let Some(data) = decoder.next_event() {
        events.push(data);
    }
    events.extend(decoder.finish());
    events
}

/// Joined `data:` lines of one event block
fn event_data(block: &str) -> Option<String> {
    let lines: Vec<&str> = block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|d| d.strip_prefix(' ').unwrap_or(d))
        .collect();

    (!lines.is_empty()).then(|| lines.join("\n"))
}

/// Position and separator length of the first blank line in `buf`
fn event_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|i| (i, 2));
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|i| (i, 4));

    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}
