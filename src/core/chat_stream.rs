use std::error::Error as StdError;
use std::fmt;

use futures_util::StreamExt;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::utils::url::construct_endpoint_url;

pub const ASK_ROUTE: &str = "ask";

/// Messages emitted by a running stream. `End` and `Error` are terminal;
/// exactly one of them is sent per stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamMessage {
    /// Headers arrived with a success status; body chunks follow.
    Started,
    Chunk(String),
    Error(String),
    End,
}

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Debug)]
pub enum StreamError {
    /// The request could not be sent or the body could not be read.
    Transport(reqwest::Error),
    /// The endpoint answered with a non-success status.
    Status(reqwest::StatusCode),
    /// The body was not valid UTF-8.
    Decode(DecodeError),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Transport(err) => write!(f, "request failed: {err}"),
            StreamError::Status(status) => write!(f, "HTTP error! status: {status}"),
            StreamError::Decode(err) => write!(f, "{err}"),
        }
    }
}

impl StdError for StreamError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            StreamError::Transport(err) => Some(err),
            StreamError::Status(_) => None,
            StreamError::Decode(err) => Some(err),
        }
    }
}

impl From<DecodeError> for StreamError {
    fn from(err: DecodeError) -> Self {
        StreamError::Decode(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// An invalid byte sequence at this offset of the whole body.
    Invalid { offset: usize },
    /// The body ended inside a multi-byte character.
    Truncated { pending: usize },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::Invalid { offset } => {
                write!(f, "invalid UTF-8 in response body at byte {offset}")
            }
            DecodeError::Truncated { pending } => {
                write!(f, "response body ended inside a character ({pending} dangling bytes)")
            }
        }
    }
}

impl StdError for DecodeError {}

/// Incremental UTF-8 decoder. Bytes of a character split across chunk
/// boundaries are held back until the rest arrives.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
    consumed: usize,
}

impl Utf8StreamDecoder {
    pub fn decode(&mut self, bytes: &[u8]) -> Result<String, DecodeError> {
        self.pending.extend_from_slice(bytes);
        let valid_len = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            Err(err) => match err.error_len() {
                // Incomplete trailing sequence: keep it for the next chunk.
                None => err.valid_up_to(),
                Some(_) => {
                    return Err(DecodeError::Invalid {
                        offset: self.consumed + err.valid_up_to(),
                    })
                }
            },
        };

        let rest = self.pending.split_off(valid_len);
        let decoded = std::mem::replace(&mut self.pending, rest);
        self.consumed += decoded.len();
        String::from_utf8(decoded).map_err(|_| DecodeError::Invalid {
            offset: self.consumed,
        })
    }

    pub fn finish(self) -> Result<(), DecodeError> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(DecodeError::Truncated {
                pending: self.pending.len(),
            })
        }
    }
}

pub struct StreamParams {
    pub client: reqwest::Client,
    pub endpoint: String,
    pub question: String,
    pub stream_id: u64,
}

#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let stream_id = params.stream_id;
            match run_stream(params, &tx).await {
                Ok(()) => {
                    debug!(stream_id, "stream finished");
                    let _ = tx.send((StreamMessage::End, stream_id));
                }
                Err(err) => {
                    error!(stream_id, error = %err, "error fetching assistant response");
                    let _ = tx.send((StreamMessage::Error(err.to_string()), stream_id));
                }
            }
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: StreamMessage, stream_id: u64) {
        let _ = self.tx.send((message, stream_id));
    }
}

async fn run_stream(
    params: StreamParams,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
) -> Result<(), StreamError> {
    let StreamParams {
        client,
        endpoint,
        question,
        stream_id,
    } = params;

    let url = construct_endpoint_url(&endpoint, ASK_ROUTE);
    debug!(stream_id, %url, "sending question");
    let response = client
        .post(url)
        .json(&AskRequest {
            question: &question,
        })
        .send()
        .await
        .map_err(StreamError::Transport)?;

    let status = response.status();
    if !status.is_success() {
        return Err(StreamError::Status(status));
    }
    let _ = tx.send((StreamMessage::Started, stream_id));

    let mut body = response.bytes_stream();
    let mut decoder = Utf8StreamDecoder::default();
    while let Some(chunk) = body.next().await {
        let bytes = chunk.map_err(StreamError::Transport)?;
        let text = decoder.decode(&bytes)?;
        if !text.is_empty() {
            let _ = tx.send((StreamMessage::Chunk(text), stream_id));
        }
    }
    decoder.finish()?;
    Ok(())
}
