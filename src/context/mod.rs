pub mod attachments;

use std::env;
use std::fs;

pub use attachments::{read_attachments, Attachment};

/// 프롬프트에 들어가는 실행 환경 정보
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentFacts {
    pub current_directory: String,
    pub username: String,
    pub hostname: String,
    pub os_version: String,
}

const UNKNOWN: &str = "unknown";

impl EnvironmentFacts {
    /// 현재 실행 환경의 컨텍스트 정보를 수집
    ///
    /// 어떤 항목도 실패하지 않으며, 알 수 없는 값은 "unknown"이 됩니다.
    pub fn probe() -> Self {
        let current_directory = env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| UNKNOWN.to_string());

        Self {
            current_directory,
            username: probe_username(),
            hostname: probe_hostname(),
            os_version: probe_os_version(),
        }
    }
}

fn probe_username() -> String {
    ["USER", "LOGNAME", "USERNAME"]
        .iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn probe_hostname() -> String {
    let from_files = ["/proc/sys/kernel/hostname", "/etc/hostname"]
        .iter()
        .filter_map(|path| fs::read_to_string(path).ok())
        .map(|content| content.trim().to_string())
        .find(|name| !name.is_empty());

    from_files
        .or_else(|| env::var("HOSTNAME").ok().filter(|h| !h.trim().is_empty()))
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn probe_os_version() -> String {
    fs::read_to_string("/etc/os-release")
        .ok()
        .and_then(|content| parse_pretty_name(&content))
        .unwrap_or_else(|| env::consts::OS.to_string())
}

/// /etc/os-release의 PRETTY_NAME 값 추출
fn parse_pretty_name(os_release: &str) -> Option<String> {
    os_release
        .lines()
        .find_map(|line| line.strip_prefix("PRETTY_NAME="))
        .map(|value| value.trim().trim_matches('"').to_string())
        .filter(|value| !value.is_empty())
}
