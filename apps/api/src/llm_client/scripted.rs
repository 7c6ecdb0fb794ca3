//! Scripted `ModelCapability` for tests — replays canned replies, records prompts.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{CallOptions, LlmError, ModelCapability};

#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn replying(replies: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
            prompts: Mutex::default(),
        }
    }

    pub fn failing(error: LlmError) -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(error)])),
            prompts: Mutex::default(),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelCapability for ScriptedModel {
    async fn complete(
        &self,
        prompt: &str,
        _system: &str,
        _options: CallOptions,
    ) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}
