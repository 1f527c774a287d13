pub mod assembler;
pub mod gateway;
pub mod history;
pub mod prompt_template;
pub mod response_processor;
pub mod tokens;
pub mod transport;
pub mod wire;

use crate::error::{BcError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 요청이 원하는 출력 종류
///
/// purpose마다 활성 provider, 프롬프트 템플릿, 샘플링 파라미터, 타임아웃이 따로 있습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Command,
    Script,
}

impl Purpose {
    pub const ALL: [Purpose; 2] = [Purpose::Command, Purpose::Script];

    pub fn as_str(&self) -> &'static str {
        match self {
            Purpose::Command => "command",
            Purpose::Script => "script",
        }
    }

    /// 요청에 포함되는 temperature
    pub fn temperature(&self) -> f64 {
        match self {
            Purpose::Command => 0.1,
            Purpose::Script => 0.2,
        }
    }

    /// 응답 길이 상한 (max_tokens)
    pub fn max_tokens(&self) -> u32 {
        match self {
            Purpose::Command => 200,
            Purpose::Script => 4000,
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Purpose {
    type Err = BcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "command" => Ok(Purpose::Command),
            "script" => Ok(Purpose::Script),
            other => Err(BcError::ConfigError(format!(
                "unknown purpose: {}\nsupported purposes: command, script",
                other
            ))),
        }
    }
}

/// provider 호출 한 번의 정규화된 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub success: bool,
    /// 성공이면 생성된 텍스트, 실패면 에러 설명
    pub payload: String,
}

impl GenerationResult {
    pub fn success(payload: impl Into<String>) -> Self {
        Self {
            success: true,
            payload: payload.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: message.into(),
        }
    }
}

impl From<Result<String>> for GenerationResult {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(text) => Self::success(text),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}
