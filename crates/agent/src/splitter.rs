//! Splitter processor: classifies a message and splits it into categories.
//!
//! Each part is sent with the splitter instructions and a fresh history;
//! parts of an oversized row are merged back by [`combine`]. A call never
//! fails: upstream errors and unusable replies come back as error-shaped
//! `SplitResult`s carrying the text they were produced from.

use std::sync::Arc;

use serde_json::Value;
use splitscore_core::message::{History, Message};
use splitscore_core::provider::{Provider, ProviderRequest};
use splitscore_core::{ProcessError, SplitResult};
use tracing::{debug, info, warn};

use crate::chunker::Chunker;
use crate::combiner::combine;
use crate::prompts::SPLITTER_INSTRUCTIONS;
use crate::reply;

/// Characters of a message shown in progress logs.
const PREVIEW_CHARS: usize = 50;

pub struct SplitterAgent {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    instructions: String,
    chunker: Chunker,
}

impl SplitterAgent {
    /// Create a splitter using the built-in instructions at temperature 0.
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, chunker: Chunker) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            instructions: SPLITTER_INSTRUCTIONS.trim().to_string(),
            chunker,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Replace the system instructions.
    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Split one part of a message.
    ///
    /// The part and the model's reply are appended to `history`; the request
    /// carries the system instructions followed by the whole history.
    pub async fn process(&self, part: &str, history: &mut History) -> SplitResult {
        history.push(Message::user(part));
        let request = ProviderRequest::new(
            self.model.as_str(),
            history.with_system(&self.instructions),
            self.temperature,
        );

        let reply = match self.provider.complete(request).await {
            Ok(response) => response.message,
            Err(e) => {
                let err = ProcessError::from(e);
                warn!(error = %err, "Splitter call failed");
                return SplitResult::failed(part, err.to_string());
            }
        };

        debug!(reply = %reply.content, "Raw splitter reply");
        let content = reply.content.clone();
        history.push(reply);

        match parse_split(&content) {
            Ok(mut result) => {
                result.original_message = Some(part.to_string());
                result
            }
            Err(e) => {
                warn!(error = %e, "Unusable splitter reply");
                SplitResult::malformed(part, e.to_string(), content)
            }
        }
    }

    /// Split a whole input row, chunking it first if it is over budget.
    pub async fn process_row(&self, text: &str) -> SplitResult {
        let parts = self.chunker.split(text);
        if let [only] = parts.as_slice() {
            return self.process(only, &mut History::new()).await;
        }

        let mut results = Vec::with_capacity(parts.len());
        for (index, part) in parts.iter().enumerate() {
            debug!(part = index + 1, of = parts.len(), "Processing part");
            results.push(self.process(part, &mut History::new()).await);
        }
        combine(text, results)
    }

    /// Split every row in order. Always returns one result per row.
    pub async fn process_all<S: AsRef<str>>(&self, rows: &[S]) -> Vec<SplitResult> {
        let total = rows.len();
        let mut results = Vec::with_capacity(total);

        for (index, row) in rows.iter().enumerate() {
            let text = row.as_ref();
            info!("Processing message {}/{}: {}...", index + 1, total, preview(text));
            let result = self.process_row(text).await;
            if let Some(err) = &result.error {
                warn!(row = index + 1, error = %err, "Message could not be split");
            }
            results.push(result);
        }

        results
    }
}

/// Decode a reply into a `SplitResult`.
fn parse_split(content: &str) -> Result<SplitResult, ProcessError> {
    let map = reply::parse_object(content)?;
    serde_json::from_value(Value::Object(map))
        .map_err(|e| ProcessError::Schema(format!("unexpected split result shape: {e}")))
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}
