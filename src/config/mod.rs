use crate::ai::Purpose;
use crate::error::{BcError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 설정 디렉토리를 덮어쓰는 환경 변수
pub const HOME_ENV: &str = "BCOPILOT_HOME";

/// bcopilot 사용자 설정
///
/// 설정 파일은 `~/.bcopilot/config.toml`에 저장됩니다 (`BCOPILOT_HOME`으로 변경 가능).
/// provider 레지스트리(`models.yaml`)와 API 키 파일도 같은 디렉토리 아래에 있습니다.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// 히스토리 파일 경로 (미지정시 설정 디렉토리의 history.log)
    #[serde(default)]
    pub history_path: Option<String>,

    /// 모델 응답과 시스템 프롬프트용으로 예약하는 토큰 수
    #[serde(default = "default_reserve_tokens")]
    pub reserve_tokens: usize,

    /// 이 값을 넘으면 사용자 확인을 받음
    #[serde(default = "default_warn_threshold")]
    pub warn_threshold: usize,

    /// 환경 컨텍스트용 토큰 추정치
    #[serde(default = "default_context_allowance")]
    pub context_allowance: usize,

    /// 사용자 쿼리용 토큰 추정치
    #[serde(default = "default_query_allowance")]
    pub query_allowance: usize,

    /// 단일 명령어 생성 타임아웃 (초)
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// 스크립트 생성 타임아웃 (초)
    #[serde(default = "default_script_timeout")]
    pub script_timeout_secs: u64,

    /// content_blocks provider에 보내는 HTTP-Referer
    #[serde(default = "default_app_referer")]
    pub app_referer: String,

    /// content_blocks provider에 보내는 X-Title
    #[serde(default = "default_app_title")]
    pub app_title: String,

    /// 설정 디렉토리 (파일에 저장하지 않음)
    #[serde(skip)]
    pub dir: PathBuf,
}

fn default_reserve_tokens() -> usize {
    2000
}

fn default_warn_threshold() -> usize {
    6000
}

fn default_context_allowance() -> usize {
    500
}

fn default_query_allowance() -> usize {
    200
}

fn default_command_timeout() -> u64 {
    30
}

fn default_script_timeout() -> u64 {
    120
}

fn default_app_referer() -> String {
    "https://bash-copilot.local".to_string()
}

fn default_app_title() -> String {
    "Bash-Copilot".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_path: None,
            reserve_tokens: default_reserve_tokens(),
            warn_threshold: default_warn_threshold(),
            context_allowance: default_context_allowance(),
            query_allowance: default_query_allowance(),
            command_timeout_secs: default_command_timeout(),
            script_timeout_secs: default_script_timeout(),
            app_referer: default_app_referer(),
            app_title: default_app_title(),
            dir: Self::config_dir(),
        }
    }
}

impl Config {
    /// 설정 디렉토리 경로 (`BCOPILOT_HOME` 우선)
    pub fn config_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(HOME_ENV) {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".bcopilot")
    }

    /// 기본 설정 디렉토리에서 로드
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_dir())
    }

    /// 지정한 디렉토리의 config.toml에서 로드 (없으면 기본값 사용)
    pub fn load_from(dir: &Path) -> Result<Self> {
        let config_path = dir.join("config.toml");

        if !config_path.exists() {
            return Ok(Self {
                dir: dir.to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)?;
        let mut config: Config =
            toml::from_str(&content).map_err(|e| BcError::TomlError(e.to_string()))?;
        config.dir = dir.to_path_buf();

        tracing::debug!(path = %config_path.display(), "loaded config");
        Ok(config)
    }

    /// provider 레지스트리 파일 경로
    pub fn registry_path(&self) -> PathBuf {
        self.dir.join("models.yaml")
    }

    /// 히스토리 파일 경로
    pub fn history_file(&self) -> PathBuf {
        match &self.history_path {
            Some(path) => PathBuf::from(path),
            None => self.dir.join("history.log"),
        }
    }

    /// purpose별 요청 타임아웃
    pub fn timeout_for(&self, purpose: Purpose) -> Duration {
        match purpose {
            Purpose::Command => Duration::from_secs(self.command_timeout_secs),
            Purpose::Script => Duration::from_secs(self.script_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.reserve_tokens, 2000);
        assert_eq!(config.warn_threshold, 6000);
        assert_eq!(config.context_allowance, 500);
        assert_eq!(config.query_allowance, 200);
        assert_eq!(config.timeout_for(Purpose::Command), Duration::from_secs(30));
        assert_eq!(config.timeout_for(Purpose::Script), Duration::from_secs(120));
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(dir.path()).unwrap();

        assert_eq!(config.dir, dir.path());
        assert_eq!(config.registry_path(), dir.path().join("models.yaml"));
        assert_eq!(config.history_file(), dir.path().join("history.log"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("config.toml"),
            "warn_threshold = 9000\nhistory_path = \"/var/tmp/bc.log\"\n",
        )
        .unwrap();

        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config.warn_threshold, 9000);
        assert_eq!(config.reserve_tokens, 2000);
        assert_eq!(config.history_file(), PathBuf::from("/var/tmp/bc.log"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "reserve_tokens = \"lots\"").unwrap();

        let result = Config::load_from(dir.path());
        assert!(matches!(result, Err(BcError::TomlError(_))));
    }
}
