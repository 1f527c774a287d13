//! 생성된 스크립트를 실행 가능한 파일로 저장

use crate::ai::response_processor::ResponseProcessor;
use crate::error::Result;
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// 디스크에 저장된 스크립트
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptArtifact {
    /// 충돌 접미사(`_1`, `_2` ...)를 포함한 파일 이름
    pub name: String,
    pub path: PathBuf,
}

pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 현재 작업 디렉토리에 저장하는 writer
    pub fn in_current_dir() -> Result<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    /// 응답에서 이름과 스크립트 본문을 추출해 `<dir>/<name>.sh`로 저장 (권한 0755)
    ///
    /// 기존 파일은 절대 덮어쓰지 않습니다. 쓰기에 실패하면 만든 파일을 지웁니다.
    pub fn write(&self, script_text: &str, query: &str) -> Result<ScriptArtifact> {
        let now = Local::now();
        let payload = ResponseProcessor::process_script(script_text);
        let base_name = payload
            .name
            .unwrap_or_else(|| format!("script_{}", now.format("%Y%m%d_%H%M%S")));

        let (name, path, file) = self.create_unique(&base_name)?;
        fill(&path, file, &render(&payload.body, query, now))?;

        tracing::info!(path = %path.display(), "script written");
        Ok(ScriptArtifact { name, path })
    }

    /// `name.sh`, `name_1.sh`, `name_2.sh` ... 순서로 create-new 시도
    fn create_unique(&self, base_name: &str) -> Result<(String, PathBuf, File)> {
        let mut counter = 0usize;
        loop {
            let name = if counter == 0 {
                base_name.to_string()
            } else {
                format!("{}_{}", base_name, counter)
            };
            let path = self.dir.join(format!("{}.sh", name));

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((name, path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => counter += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// 방금 만든 파일에 내용을 쓰고 실행 권한 부여. 실패하면 파일 삭제
fn fill(path: &Path, mut file: impl Write, content: &str) -> Result<()> {
    let written = file
        .write_all(content.as_bytes())
        .and_then(|_| file.flush());
    drop(file);

    if let Err(e) = written.and_then(|_| set_executable(path)) {
        if let Err(remove_err) = fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %remove_err, "failed to remove partial script");
        }
        return Err(e.into());
    }

    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

fn render(body: &str, query: &str, now: DateTime<Local>) -> String {
    let query = query.replace(['\r', '\n'], " ");
    let mut content = format!(
        "#!/bin/bash\n\n# Generated by bcopilot\n# Generated at: {}\n# Query: {}\n\n{}",
        now.format("%Y-%m-%d %H:%M:%S"),
        query,
        body
    );
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content
}
