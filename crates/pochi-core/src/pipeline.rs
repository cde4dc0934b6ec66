//! Shared completion path: normalize → load persona → call upstream.

use crate::adapters::IntoHistory;
use crate::anthropic_bridge::{AnthropicBridge, ChatCompletion};
use crate::config::ProxyConfig;
use crate::conversation::normalize;
use crate::error::{ConfigError, UpstreamError};
use crate::persona::PersonaLoader;
use std::sync::Arc;

#[derive(Clone)]
pub struct ChatPipeline {
    completion: Arc<dyn ChatCompletion>,
    persona: PersonaLoader,
    base_prompt: String,
}

impl ChatPipeline {
    pub fn new(
        completion: Arc<dyn ChatCompletion>,
        persona: PersonaLoader,
        base_prompt: impl Into<String>,
    ) -> Self {
        Self {
            completion,
            persona,
            base_prompt: base_prompt.into(),
        }
    }

    /// Wire an [`AnthropicBridge`] and a [`PersonaLoader`] from config.
    /// Fails with [`ConfigError::MissingApiKey`] when no key is set.
    pub fn from_config(cfg: &ProxyConfig) -> Result<Self, ConfigError> {
        let bridge = AnthropicBridge::from_config(cfg)?;
        let persona = PersonaLoader::new(cfg.persona_dir.clone(), cfg.persona_fragments.clone())
            .with_fallback(cfg.persona_fallback_dir.clone());
        tracing::info!(
            model = %bridge.model(),
            persona_dir = %persona.current_dir().display(),
            "chat pipeline ready"
        );
        Ok(Self::new(
            Arc::new(bridge),
            persona,
            cfg.system_prompt.clone(),
        ))
    }

    pub async fn system_prompt(&self) -> String {
        format!("{}{}", self.base_prompt, self.persona.load().await)
    }

    pub async fn complete<R: IntoHistory>(&self, request: R) -> Result<String, UpstreamError> {
        let history = normalize(request.into_history());
        let system = self.system_prompt().await;
        self.completion.complete(&system, &history).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{LegacyChatRequest, WebChatRequest};
    use crate::conversation::ConversationTurn;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, Vec<ConversationTurn>)>>,
    }

    #[async_trait]
    impl ChatCompletion for Recorder {
        async fn complete(
            &self,
            system: &str,
            history: &[ConversationTurn],
        ) -> Result<String, UpstreamError> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), history.to_vec()));
            Ok("stub".to_string())
        }
    }

    fn pipeline(dir: &std::path::Path, recorder: Arc<Recorder>) -> ChatPipeline {
        ChatPipeline::new(
            recorder,
            PersonaLoader::with_default_fragments(dir),
            "You are Pochi.",
        )
    }

    #[tokio::test]
    async fn web_request_is_normalized_before_upstream() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = Arc::new(Recorder::default());
        let req: WebChatRequest = serde_json::from_str(
            r#"{"messages":[{"role":"system","content":"x"},{"role":"user","content":"hi"},{"role":"assistant","content":"yo"}]}"#,
        )
        .unwrap();

        let reply = pipeline(dir.path(), recorder.clone()).complete(req).await.unwrap();
        assert_eq!(reply, "stub");

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].1,
            vec![ConversationTurn::user("hi"), ConversationTurn::assistant("yo")]
        );
    }

    #[tokio::test]
    async fn system_prompt_is_base_plus_persona() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("IDENTITY.md"), "bear").unwrap();
        let recorder = Arc::new(Recorder::default());

        pipeline(dir.path(), recorder.clone())
            .complete(LegacyChatRequest {
                message: "hello".to_string(),
                session: Some("abc".to_string()),
            })
            .await
            .unwrap();

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(calls[0].0, "You are Pochi.\n\n--- IDENTITY.md ---\nbear");
        assert_eq!(calls[0].1, vec![ConversationTurn::user("hello")]);
    }

    #[test]
    fn from_config_without_key_fails() {
        assert!(matches!(
            ChatPipeline::from_config(&ProxyConfig::default()),
            Err(ConfigError::MissingApiKey)
        ));
    }
}
