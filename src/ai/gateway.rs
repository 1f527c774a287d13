use crate::ai::transport::HttpTransport;
use crate::ai::wire::{self, AppIdentity};
use crate::ai::{GenerationResult, Purpose};
use crate::config::Config;
use crate::error::{BcError, Result};
use crate::registry::{CredentialStore, ProviderConfig};
use std::time::Duration;

/// 완성된 프롬프트를 provider에 보내고 응답을 정규화
///
/// 호출당 한 번만 시도하며 재시도하지 않습니다.
pub struct ProviderGateway {
    transport: Box<dyn HttpTransport>,
    credentials: CredentialStore,
    app: AppIdentity,
    command_timeout: Duration,
    script_timeout: Duration,
}

impl ProviderGateway {
    pub fn new(
        transport: Box<dyn HttpTransport>,
        credentials: CredentialStore,
        config: &Config,
    ) -> Self {
        Self {
            transport,
            credentials,
            app: AppIdentity {
                referer: config.app_referer.clone(),
                title: config.app_title.clone(),
            },
            command_timeout: config.timeout_for(Purpose::Command),
            script_timeout: config.timeout_for(Purpose::Script),
        }
    }

    pub fn timeout_for(&self, purpose: Purpose) -> Duration {
        match purpose {
            Purpose::Command => self.command_timeout,
            Purpose::Script => self.script_timeout,
        }
    }

    pub async fn invoke(&self, provider: &ProviderConfig, prompt: &str) -> GenerationResult {
        self.call(provider, prompt).await.into()
    }

    async fn call(&self, provider: &ProviderConfig, prompt: &str) -> Result<String> {
        let api_key = self
            .credentials
            .resolve(&provider.key_file)
            .ok_or_else(|| BcError::CredentialMissing(self.credentials.path_for(&provider.key_file)))?;

        let request = provider.wire_format.encode(
            &provider.model,
            prompt,
            provider.purpose,
            &api_key,
            &self.app,
        );
        let timeout = self.timeout_for(provider.purpose);

        tracing::debug!(
            provider = %provider.name,
            model = %provider.model,
            wire_format = provider.wire_format.as_str(),
            timeout_secs = timeout.as_secs(),
            "sending request"
        );

        let reply = self
            .transport
            .post_json(&provider.url, &request.headers, &request.body, timeout)
            .await?;

        if !reply.is_success() {
            tracing::debug!(status = reply.status, body = %reply.body, "provider returned an error");
            let detail = wire::error_message(&reply.body)
                .unwrap_or_else(|| reply.body.trim().to_string());
            return Err(BcError::ProviderError(format!(
                "API error ({}): {}",
                reply.status, detail
            )));
        }

        let text = provider.wire_format.decode(&reply.body)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(BcError::ProviderError(
                "API returned an empty response".to_string(),
            ));
        }

        Ok(text.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::transport::mock::MockTransport;
    use crate::ai::wire::WireFormat;
    use std::fs;
    use tempfile::TempDir;

    fn provider(purpose: Purpose, wire_format: WireFormat) -> ProviderConfig {
        ProviderConfig {
            purpose,
            name: "test".to_string(),
            url: "https://llm.example.invalid/v1/chat/completions".to_string(),
            model: "test-model".to_string(),
            token_limit: 32_000,
            key_file: "api/test_key.txt".to_string(),
            wire_format,
        }
    }

    fn keyed_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("api")).unwrap();
        fs::write(dir.path().join("api/test_key.txt"), "sk-test\n").unwrap();
        dir
    }

    fn gateway(dir: &TempDir, transport: &MockTransport) -> ProviderGateway {
        let config = Config::load_from(dir.path()).unwrap();
        ProviderGateway::new(
            Box::new(transport.clone()),
            CredentialStore::new(dir.path()),
            &config,
        )
    }

    #[tokio::test]
    async fn test_success_returns_trimmed_text() {
        let dir = keyed_dir();
        let transport = MockTransport::replying(
            200,
            r#"{"choices":[{"message":{"content":"  find . -size +100M\n"}}]}"#,
        );

        let result = gateway(&dir, &transport)
            .invoke(&provider(Purpose::Command, WireFormat::Plain), "find files over 100MB")
            .await;

        assert_eq!(result, GenerationResult::success("find . -size +100M"));

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].url, "https://llm.example.invalid/v1/chat/completions");
        assert_eq!(calls[0].timeout, Duration::from_secs(30));
        assert!(calls[0]
            .headers
            .contains(&("Authorization".to_string(), "Bearer sk-test".to_string())));
    }

    #[tokio::test]
    async fn test_error_status_with_provider_message() {
        let dir = keyed_dir();
        let transport = MockTransport::replying(401, r#"{"error":{"message":"invalid key"}}"#);

        let result = gateway(&dir, &transport)
            .invoke(&provider(Purpose::Command, WireFormat::Plain), "find files")
            .await;

        assert!(!result.success);
        assert!(result.payload.contains("401"));
        assert!(result.payload.contains("invalid key"));
    }

    #[tokio::test]
    async fn test_error_status_with_raw_body() {
        let dir = keyed_dir();
        let transport = MockTransport::replying(503, "upstream overloaded");

        let result = gateway(&dir, &transport)
            .invoke(&provider(Purpose::Command, WireFormat::Plain), "x")
            .await;

        assert!(!result.success);
        assert!(result.payload.contains("503"));
        assert!(result.payload.contains("upstream overloaded"));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let dir = keyed_dir();
        let transport = MockTransport::replying(200, "not json at all");

        let result = gateway(&dir, &transport)
            .invoke(&provider(Purpose::Command, WireFormat::Plain), "x")
            .await;

        assert!(!result.success);
        assert!(result.payload.contains("Failed to parse API response"));
    }

    #[tokio::test]
    async fn test_missing_credential_skips_network() {
        let dir = TempDir::new().unwrap();
        let transport = MockTransport::replying(200, "{}");

        let result = gateway(&dir, &transport)
            .invoke(&provider(Purpose::Command, WireFormat::Plain), "x")
            .await;

        assert!(!result.success);
        assert!(result.payload.contains("test_key.txt"));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let dir = keyed_dir();
        let transport = MockTransport::failing("operation timed out");

        let result = gateway(&dir, &transport)
            .invoke(&provider(Purpose::Script, WireFormat::Plain), "x")
            .await;

        assert!(!result.success);
        assert!(result.payload.contains("operation timed out"));
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_script_uses_content_blocks_and_long_timeout() {
        let dir = keyed_dir();
        let transport = MockTransport::replying(
            200,
            r#"{"choices":[{"message":{"content":[{"type":"text","text":"echo "},{"type":"text","text":"done"}]}}]}"#,
        );

        let result = gateway(&dir, &transport)
            .invoke(&provider(Purpose::Script, WireFormat::ContentBlocks), "say done")
            .await;

        assert_eq!(result, GenerationResult::success("echo done"));

        let call = &transport.calls()[0];
        assert_eq!(call.timeout, Duration::from_secs(120));
        assert_eq!(call.body["messages"][0]["content"][0]["text"], "say done");
        assert!(call
            .headers
            .iter()
            .any(|(key, value)| key == "X-Title" && value == "Bash-Copilot"));
    }

    #[tokio::test]
    async fn test_empty_reply_is_failure() {
        let dir = keyed_dir();
        let transport = MockTransport::replying(200, r#"{"choices":[{"message":{"content":"   "}}]}"#);

        let result = gateway(&dir, &transport)
            .invoke(&provider(Purpose::Command, WireFormat::Plain), "x")
            .await;

        assert!(!result.success);
        assert!(result.payload.contains("empty"));
    }
}
