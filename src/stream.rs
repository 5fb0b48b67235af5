//! Streaming decode loop shared by every provider.
//!
//! [`SseDecoder`] turns a raw HTTP body into line-framed events: providers stream
//! newline-delimited frames, optionally prefixed with `data: ` and optionally
//! terminated by a `data: [DONE]` sentinel (plain stream closure is an equally valid
//! ending). [`ResponseStream`] layers per-chunk JSON decoding on top and guarantees
//! that every exit path (sentinel, end of input, read failure, decode failure)
//! delivers exactly one terminal marker before the stream ends.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use log::debug;

use crate::error::LLMError;
use crate::http::HttpBodyStream;
use crate::types::{CompletionResponse, ResponseError};

const STREAM_END_SENTINEL: &str = "data: [DONE]";
const DATA_PREFIX: &str = "data: ";

/// One decoded event frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Payload of one frame, prefix stripped.
    Data(String),
    /// The stream ended, via sentinel or end of input.
    Done,
}

/// Normalizes a provider byte stream into [`SseEvent`] values.
///
/// One line is one frame: surrounding whitespace is trimmed, blank lines are skipped
/// without emitting anything, and chunks are delivered in exactly wire order.
pub struct SseDecoder {
    body: HttpBodyStream,
    buffer: Vec<u8>,
    pending: VecDeque<SseEvent>,
    provider: &'static str,
    stream_closed: bool,
    done_emitted: bool,
}

impl SseDecoder {
    /// Wraps a raw HTTP body stream and prepares it for decoding.
    pub fn new(body: HttpBodyStream, provider: &'static str) -> Self {
        Self {
            body,
            buffer: Vec::new(),
            pending: VecDeque::new(),
            provider,
            stream_closed: false,
            done_emitted: false,
        }
    }

    fn handle_line(&mut self, line: &[u8]) -> Result<(), LLMError> {
        let text = std::str::from_utf8(line).map_err(|err| LLMError::Decode {
            provider: self.provider,
            message: format!("invalid UTF-8 in stream chunk: {err}"),
        })?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }
        if trimmed == STREAM_END_SENTINEL {
            self.mark_done();
            return Ok(());
        }
        let payload = trimmed.strip_prefix(DATA_PREFIX).unwrap_or(trimmed);
        self.pending.push_back(SseEvent::Data(payload.to_string()));
        Ok(())
    }

    fn mark_done(&mut self) {
        if !self.done_emitted {
            self.done_emitted = true;
            self.pending.push_back(SseEvent::Done);
        }
    }

    fn drain_line(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
        buffer
            .iter()
            .position(|b| *b == b'\n')
            .map(|pos| buffer.drain(..=pos).collect())
    }
}

impl Stream for SseDecoder {
    type Item = Result<SseEvent, LLMError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(event) = this.pending.pop_front() {
                let finished = event == SseEvent::Done;
                if finished {
                    this.stream_closed = true;
                }
                return Poll::Ready(Some(Ok(event)));
            }
            if this.stream_closed {
                return Poll::Ready(None);
            }

            match this.body.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.buffer.extend_from_slice(&bytes);
                    while let Some(line) = Self::drain_line(&mut this.buffer) {
                        if let Err(err) = this.handle_line(&line) {
                            this.stream_closed = true;
                            return Poll::Ready(Some(Err(err)));
                        }
                        if this.done_emitted {
                            break;
                        }
                    }
                }
                Poll::Ready(Some(Err(err))) => {
                    this.stream_closed = true;
                    return Poll::Ready(Some(Err(err)));
                }
                Poll::Ready(None) => {
                    // End of input is the expected termination when the sentinel never
                    // arrives; a trailing unterminated line still counts as a frame.
                    if !this.buffer.is_empty() {
                        let line: Vec<u8> = this.buffer.drain(..).collect();
                        if let Err(err) = this.handle_line(&line) {
                            this.stream_closed = true;
                            return Poll::Ready(Some(Err(err)));
                        }
                    }
                    this.mark_done();
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Decodes [`SseEvent`] frames into canonical completion chunks.
///
/// The mapping closure parses one frame payload into a [`CompletionResponse`]; its
/// failures surface as a `json_unmarshal_error` terminal marker followed by the
/// error itself, and read failures as a `byte_read_error` marker likewise. Observers
/// therefore always see a clean termination signal, never a silent drop.
pub struct ResponseStream<F> {
    events: SseDecoder,
    map: F,
    pending: VecDeque<Result<CompletionResponse, LLMError>>,
    status: u16,
    finished: bool,
}

impl<F> ResponseStream<F>
where
    F: FnMut(&str) -> Result<CompletionResponse, LLMError>,
{
    /// Builds the chunk stream over a decoded event feed.
    pub fn new(events: SseDecoder, status: u16, map: F) -> Self {
        Self {
            events,
            map,
            pending: VecDeque::new(),
            status,
            finished: false,
        }
    }
}

impl<F> Stream for ResponseStream<F>
where
    F: FnMut(&str) -> Result<CompletionResponse, LLMError> + Send + Unpin,
{
    type Item = Result<CompletionResponse, LLMError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(item) = this.pending.pop_front() {
            return Poll::Ready(Some(item));
        }
        if this.finished {
            return Poll::Ready(None);
        }

        match Pin::new(&mut this.events).poll_next(cx) {
            Poll::Ready(Some(Ok(SseEvent::Data(payload)))) => match (this.map)(&payload) {
                Ok(mut chunk) => {
                    chunk.status_code = this.status;
                    Poll::Ready(Some(Ok(chunk)))
                }
                Err(err) => {
                    this.finished = true;
                    let marker = CompletionResponse::stream_failure(
                        ResponseError::JSON_UNMARSHAL_ERROR,
                        err.to_string(),
                        this.status,
                    );
                    this.pending.push_back(Err(err));
                    Poll::Ready(Some(Ok(marker)))
                }
            },
            Poll::Ready(Some(Ok(SseEvent::Done))) => {
                this.finished = true;
                debug!("stream terminated cleanly");
                Poll::Ready(Some(Ok(CompletionResponse::end_of_stream(this.status))))
            }
            Poll::Ready(Some(Err(err))) => {
                this.finished = true;
                let marker = CompletionResponse::stream_failure(
                    ResponseError::BYTE_READ_ERROR,
                    err.to_string(),
                    this.status,
                );
                this.pending.push_back(Err(err));
                Poll::Ready(Some(Ok(marker)))
            }
            Poll::Ready(None) => {
                // The decoder always emits Done first; reaching this arm means it was
                // already consumed, so just close.
                this.finished = true;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Drains a streaming body into text, for non-OK statuses whose remaining bytes hold
/// a single whole error response.
pub(crate) async fn collect_stream_text(
    mut body: HttpBodyStream,
    provider: &'static str,
) -> Result<String, LLMError> {
    use futures_util::StreamExt;

    let mut bytes = Vec::new();
    while let Some(chunk) = body.next().await {
        bytes.extend_from_slice(&chunk?);
    }
    String::from_utf8(bytes).map_err(|err| LLMError::Decode {
        provider,
        message: format!("failed to decode stream error body: {err}"),
    })
}
