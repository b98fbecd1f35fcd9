//! Chat endpoints, plain and streamed.

use crate::client::BullpenClient;
use crate::error::{BullpenError, BullpenResult};
use bullpen_core::sse::SseDecoder;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Chat API for talking to the transfer agent.
pub struct ChatApi<'a> {
    client: &'a BullpenClient,
}

impl<'a> ChatApi<'a> {
    pub(crate) fn new(client: &'a BullpenClient) -> Self {
        Self { client }
    }

    /// Send one message and wait for the full reply.
    pub async fn send(&self, message: impl Into<String>) -> BullpenResult<ChatReply> {
        self.client
            .http
            .post("/api/chat", &ChatRequest::new(message, None))
            .await
    }

    /// Send one message inside a conversation session.
    ///
    /// Only has an effect when the server has conversation memory enabled.
    pub async fn send_in_session(
        &self,
        message: impl Into<String>,
        session_id: impl Into<String>,
    ) -> BullpenResult<ChatReply> {
        self.client
            .http
            .post(
                "/api/chat",
                &ChatRequest::new(message, Some(session_id.into())),
            )
            .await
    }

    /// Send one message and receive the reply word by word.
    pub async fn stream(&self, message: impl Into<String>) -> BullpenResult<ChatStream> {
        let response = self
            .client
            .http
            .post_stream("/api/chat/stream", &ChatRequest::new(message, None))
            .await?;

        Ok(ChatStream::from_bytes(response.bytes_stream()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
}

impl ChatRequest {
    fn new(message: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            message: message.into(),
            session_id,
        }
    }
}

/// Reply from `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    /// Prompt the router picked, e.g. `club_official`
    pub prompt: String,
    pub status: String,
}

/// One event from `POST /api/chat/stream`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Chunk(String),
    Complete,
    Error(String),
}

impl StreamEvent {
    fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Complete | StreamEvent::Error(_))
    }
}

#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    chunk: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse the data of one event. Unknown payloads yield `None`.
fn parse_payload(data: &str) -> Option<BullpenResult<StreamEvent>> {
    let payload: EventPayload = match serde_json::from_str(data) {
        Ok(p) => p,
        Err(e) => return Some(Err(e.into())),
    };

    if let Some(error) = payload.error {
        return Some(Ok(StreamEvent::Error(error)));
    }
    if let Some(chunk) = payload.chunk {
        return Some(Ok(StreamEvent::Chunk(chunk)));
    }
    match payload.status.as_deref() {
        Some("complete") => Some(Ok(StreamEvent::Complete)),
        _ => None,
    }
}

struct SseState<S> {
    bytes: Pin<Box<S>>,
    decoder: SseDecoder,
    finished: bool,
}

/// Stream of chat events. Ends after `Complete` or `Error`.
pub struct ChatStream {
    inner: Pin<Box<dyn Stream<Item = BullpenResult<StreamEvent>> + Send>>,
}

impl ChatStream {
    /// Decode an SSE byte stream into chat events.
    pub fn from_bytes<S, B, E>(bytes: S) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: Into<BullpenError> + Send + 'static,
    {
        let state = SseState {
            bytes: Box::pin(bytes),
            decoder: SseDecoder::new(),
            finished: false,
        };

        let events = futures::stream::unfold(state, |mut st| async move {
            loop {
                if st.finished {
                    return None;
                }

                if let Some(data) = st.decoder.next_event() {
                    if let Some(event) = parse_payload(&data) {
                        st.finished = match &event {
                            Ok(e) => e.is_terminal(),
                            Err(_) => true,
                        };
                        return Some((event, st));
                    }
                    continue;
                }

                match st.bytes.next().await {
                    Some(Ok(chunk)) => st.decoder.push(chunk.as_ref()),
                    Some(Err(e)) => {
                        st.finished = true;
                        return Some((Err(e.into()), st));
                    }
                    None => {
                        st.finished = true;
                        return st
                            .decoder
                            .finish()
                            .and_then(|data| parse_payload(&data))
                            .map(|e| (e, st));
                    }
                }
            }
        });

        Self {
            inner: Box::pin(events),
        }
    }

    /// Drain the stream and join the chunks back into one reply.
    pub async fn collect_text(mut self) -> BullpenResult<String> {
        let mut words = Vec::new();

        while let Some(event) = self.next().await {
            match event? {
                StreamEvent::Chunk(word) => words.push(word),
                StreamEvent::Complete => break,
                StreamEvent::Error(message) => return Err(BullpenError::Stream(message)),
            }
        }

        Ok(words.join(" "))
    }
}

impl Stream for ChatStream {
    type Item = BullpenResult<StreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
