use crate::ai::Purpose;
use crate::error::Result;
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// 히스토리 항목 (성공한 생성만 기록)
#[derive(Debug, Clone)]
pub struct HistoryRecord {
    /// 생성 시간
    pub timestamp: DateTime<Local>,
    /// command 또는 script
    pub kind: Purpose,
    /// 사용자 쿼리
    pub query: String,
    /// 프롬프트에 포함된 파일 이름
    pub attachments: Vec<String>,
    /// 생성 결과
    pub result: String,
    /// 저장된 스크립트 경로 (script 항목만)
    pub artifact: Option<PathBuf>,
}

impl HistoryRecord {
    /// 텍스트 로그 형식으로 변환
    pub fn render(&self) -> String {
        let mut entry = format!(
            "\n=== {} [{}] ===\nQuery: {}\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.kind,
            self.query
        );

        if !self.attachments.is_empty() {
            entry.push_str(&format!("Files: {}\n", self.attachments.join(", ")));
        }

        entry.push_str(&format!("Result: {}\n", self.result));

        if let (Purpose::Script, Some(path)) = (self.kind, &self.artifact) {
            entry.push_str(&format!("Script: {}\n", path.display()));
        }

        entry.push_str(&"=".repeat(60));
        entry.push('\n');
        entry
    }
}

/// 추가 전용 히스토리 로그
///
/// 읽기 기능은 없습니다. 항목 하나당 append 한 번으로 기록합니다.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    file_path: PathBuf,
}

impl HistoryLog {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// 새 항목을 파일 끝에 추가
    pub fn append(&self, record: &HistoryRecord) -> Result<()> {
        if let Some(parent) = self.file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        file.write_all(record.render().as_bytes())?;

        Ok(())
    }
}
