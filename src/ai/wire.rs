//! chat-completion provider의 요청/응답 형식
//!
//! 모든 provider는 같은 chat-completion 프로토콜의 변형을 사용합니다. 차이는
//! 프롬프트를 감싸는 방식과 일부 헤더뿐이라 닫힌 enum으로 표현합니다.
//! 새 형식은 variant 추가로 지원하며, gateway는 provider 이름으로 분기하지 않습니다.

use crate::ai::Purpose;
use crate::error::{BcError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// `content`가 프롬프트 문자열 그대로
    #[default]
    Plain,
    /// `content`가 타입이 있는 블록 목록. 애플리케이션 식별 헤더도 추가
    ContentBlocks,
}

/// 식별 헤더가 필요한 형식에 보내는 애플리케이션 정보
#[derive(Debug, Clone)]
pub struct AppIdentity {
    pub referer: String,
    pub title: String,
}

/// 전송 준비가 끝난 요청
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl WireFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireFormat::Plain => "plain",
            WireFormat::ContentBlocks => "content_blocks",
        }
    }

    pub fn encode(
        &self,
        model: &str,
        prompt: &str,
        purpose: Purpose,
        api_key: &str,
        app: &AppIdentity,
    ) -> WireRequest {
        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), format!("Bearer {}", api_key)),
        ];

        let content = match self {
            WireFormat::Plain => Value::String(prompt.to_string()),
            WireFormat::ContentBlocks => {
                headers.push(("HTTP-Referer".to_string(), app.referer.clone()));
                headers.push(("X-Title".to_string(), app.title.clone()));
                json!([{ "type": "text", "text": prompt }])
            }
        };

        let body = json!({
            "model": model,
            "messages": [{ "role": "user", "content": content }],
            "temperature": purpose.temperature(),
            "max_tokens": purpose.max_tokens(),
        });

        WireRequest { headers, body }
    }

    /// 2xx 응답 본문에서 텍스트 추출
    ///
    /// 두 형식 모두 문자열과 블록 응답을 모두 받습니다.
    pub fn decode(&self, body: &str) -> Result<String> {
        let response: ChatResponse = serde_json::from_str(body)
            .map_err(|_| BcError::ProviderError("Failed to parse API response".to_string()))?;

        let content = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| {
                BcError::ProviderError("API response format is invalid".to_string())
            })?;

        Ok(content.into_text())
    }
}

/// 2xx가 아닌 응답 본문에서 provider 에러 메시지 추출
pub fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    match value.get("error")? {
        Value::String(message) => Some(message.clone()),
        error => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<MessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl MessageContent {
    fn into_text(self) -> String {
        match self {
            MessageContent::Text(text) => text,
            MessageContent::Blocks(blocks) => blocks
                .into_iter()
                .filter(|block| block.kind == "text")
                .filter_map(|block| block.text)
                .collect(),
        }
    }
}
