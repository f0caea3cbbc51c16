use reqwest::Client;

use crate::core::chat_stream::StreamParams;

/// Connection details for the assistant endpoint plus stream bookkeeping.
pub struct SessionContext {
    pub client: Client,
    pub endpoint: String,
    pub current_stream_id: u64,
}

impl SessionContext {
    pub fn new(endpoint: String, client: Client) -> Self {
        Self {
            client,
            endpoint,
            current_stream_id: 0,
        }
    }

    pub fn is_current_stream(&self, stream_id: u64) -> bool {
        self.current_stream_id == stream_id
    }

    /// Retire the running stream so its remaining messages are ignored.
    pub fn retire_stream(&mut self) {
        self.current_stream_id += 1;
    }

    /// Parameters for a new stream; later messages from older streams are
    /// dropped.
    pub fn stream_parameters(&mut self, question: String) -> StreamParams {
        self.retire_stream();
        StreamParams {
            client: self.client.clone(),
            endpoint: self.endpoint.clone(),
            question,
            stream_id: self.current_stream_id,
        }
    }
}
