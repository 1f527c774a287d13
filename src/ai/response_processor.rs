use crate::ai::prompt_template::SCRIPT_NAME_MARKER;
use once_cell::sync::Lazy;
use regex::Regex;

/// 사전 컴파일된 정규표현식 (```bash / ```sh 코드 블록)
static CODE_BLOCK_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:bash|sh)[^\n]*\n(.*?)```").unwrap());

/// 스크립트 이름 최대 길이
pub const MAX_SCRIPT_NAME_LEN: usize = 20;

/// 스크립트 응답에서 분리한 이름 힌트와 본문
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPayload {
    /// 정제된 이름 (2글자 미만이면 None)
    pub name: Option<String>,
    pub body: String,
}

/// provider 응답을 후처리하는 공통 모듈
pub struct ResponseProcessor;

impl ResponseProcessor {
    /// 스크립트 응답을 이름 힌트와 실행할 본문으로 분리
    ///
    /// # Examples
    /// ```
    /// use bcopilot::ai::response_processor::ResponseProcessor;
    ///
    /// let payload = ResponseProcessor::process_script(
    ///     "[SCRIPT_NAME: backup_db]\n```bash\npg_dump app > app.sql\n```",
    /// );
    /// assert_eq!(payload.name.as_deref(), Some("backup_db"));
    /// assert_eq!(payload.body, "pg_dump app > app.sql");
    /// ```
    pub fn process_script(raw: &str) -> ScriptPayload {
        let (name, rest) = Self::split_script_name(raw);
        ScriptPayload {
            name,
            body: Self::extract_script_body(&rest),
        }
    }

    /// `[SCRIPT_NAME: ...]` 마커를 찾아 이름을 정제하고 마커까지의 텍스트를 제거
    ///
    /// 닫는 괄호가 없으면 원본을 그대로 돌려줍니다.
    pub fn split_script_name(raw: &str) -> (Option<String>, String) {
        let Some(marker_at) = raw.find(SCRIPT_NAME_MARKER) else {
            return (None, raw.to_string());
        };

        let name_start = marker_at + SCRIPT_NAME_MARKER.len();
        let Some(close) = raw[name_start..].find(']') else {
            return (None, raw.to_string());
        };
        let name_end = name_start + close;

        let name: String = raw[name_start..name_end]
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .map(|c| c.to_ascii_lowercase())
            .take(MAX_SCRIPT_NAME_LEN)
            .collect();

        let rest = raw[name_end + 1..].trim().to_string();
        let name = if name.len() >= 2 { Some(name) } else { None };

        (name, rest)
    }

    /// ```bash / ```sh 코드 블록이 있으면 그 내용만, 없으면 원본 그대로
    pub fn extract_script_body(text: &str) -> String {
        match CODE_BLOCK_REGEX.captures(text) {
            Some(caps) => caps.get(1).map_or("", |m| m.as_str()).trim().to_string(),
            None => text.to_string(),
        }
    }

    /// 단일 명령어 응답 정리: 코드 블록으로 감싼 경우 내용만 꺼냄
    pub fn clean_command(raw: &str) -> String {
        match CODE_BLOCK_REGEX.captures(raw) {
            Some(caps) => {
                let inner = caps.get(1).map_or("", |m| m.as_str()).trim();
                if inner.is_empty() {
                    raw.trim().to_string()
                } else {
                    inner.to_string()
                }
            }
            None => raw.trim().to_string(),
        }
    }
}
