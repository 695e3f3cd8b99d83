//! Scripted `CompletionClient` for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm_client::{CompletionClient, CompletionError};

pub struct StubCompletion {
    reply: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl StubCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every call fails as a safety block would.
    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for StubCompletion {
    async fn generate(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().ok_or(CompletionError::Blocked {
            reason: "SAFETY".to_string(),
        })
    }
}
