//! Shared test helpers for processor tests.

use splitscore_core::error::ProviderError;
use splitscore_core::message::Message;
use splitscore_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use std::sync::Mutex;

use crate::tokens::TokenCounter;

/// Counts one token per character, so budgets read as character limits.
pub struct CharCounter;

impl TokenCounter for CharCounter {
    fn count(&self, text: &str) -> usize {
        text.chars().count()
    }
}

/// A mock provider that returns a sequence of scripted replies.
///
/// Each call to `complete` returns the next reply in the queue and records
/// the request it was given. Panics if more calls are made than replies
/// provided.
pub struct SequentialMockProvider {
    replies: Mutex<Vec<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(replies: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Successful text replies, in order.
    pub fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(make_text_response(t))).collect())
    }

    /// A provider that answers once with `text`.
    pub fn single_text(text: &str) -> Self {
        Self::texts(&[text])
    }

    /// A provider whose only call fails with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let mut requests = self.requests.lock().unwrap();
        let replies = self.replies.lock().unwrap();
        let index = requests.len();

        if index >= replies.len() {
            panic!(
                "SequentialMockProvider: no more replies (call #{}, have {})",
                index,
                replies.len()
            );
        }

        requests.push(request);
        replies[index].clone()
    }
}

/// Create a simple text response.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}
