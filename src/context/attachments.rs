use crate::error::{BcError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 프롬프트에 내용이 포함되는 파일
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// 사용자가 입력한 (또는 glob으로 확장된) 이름
    pub name: String,
    pub content: String,
}

/// 요청된 파일을 모두 읽음. 하나라도 실패하면 전체 실패
///
/// `*`, `?`, `[`가 들어간 인자는 glob 패턴으로 확장하고 정렬합니다.
/// 아무것도 매치되지 않으면 없는 파일과 똑같이 에러입니다.
pub fn read_attachments(paths: &[PathBuf]) -> Result<Vec<Attachment>> {
    let mut attachments = Vec::new();

    for path in paths {
        for file in expand(path)? {
            let content = fs::read_to_string(&file).map_err(|e| BcError::AttachmentReadError {
                path: file.clone(),
                reason: e.to_string(),
            })?;

            tracing::debug!(file = %file.display(), bytes = content.len(), "attached file");
            attachments.push(Attachment {
                name: file.display().to_string(),
                content,
            });
        }
    }

    Ok(attachments)
}

fn expand(path: &Path) -> Result<Vec<PathBuf>> {
    let pattern = path.to_string_lossy();
    if !pattern.contains(['*', '?', '[']) {
        return Ok(vec![path.to_path_buf()]);
    }

    let read_error = |reason: String| BcError::AttachmentReadError {
        path: path.to_path_buf(),
        reason,
    };

    let mut matches = glob::glob(&pattern)
        .map_err(|e| read_error(e.to_string()))?
        .map(|entry| entry.map_err(|e| read_error(e.to_string())))
        .collect::<Result<Vec<_>>>()?;
    matches.retain(|p| p.is_file());
    matches.sort();

    if matches.is_empty() {
        return Err(read_error("no files match this pattern".to_string()));
    }

    Ok(matches)
}
