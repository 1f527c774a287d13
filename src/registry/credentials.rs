use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// 텍스트 파일에서 provider API 키를 읽음
///
/// 상대 경로는 `root`(설정 디렉토리) 기준입니다.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    root: Option<PathBuf>,
}

impl CredentialStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn path_for(&self, key_file: &str) -> PathBuf {
        let path = Path::new(key_file);
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// 공백을 제거한 키 반환. 파일이 없거나 읽을 수 없거나 비어 있으면 `None`
    /// (치명적인지는 호출하는 쪽이 판단)
    pub fn resolve(&self, key_file: &str) -> Option<String> {
        let path = self.path_for(key_file);
        match fs::read_to_string(&path) {
            Ok(content) => {
                let secret = content.trim();
                if secret.is_empty() {
                    tracing::warn!(path = %path.display(), "API key file is empty");
                    None
                } else {
                    Some(secret.to_string())
                }
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "API key file not readable");
                None
            }
        }
    }

    /// 키 파일이 없을 때만 `secret` 저장
    ///
    /// 파일을 썼으면 `true`
    pub fn write(&self, key_file: &str, secret: &str) -> Result<bool> {
        let path = self.path_for(key_file);
        if path.exists() {
            return Ok(false);
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, format!("{}\n", secret.trim()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_trims_whitespace() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("api")).unwrap();
        fs::write(dir.path().join("api/demo_key.txt"), "  sk-demo-123 \n\n").unwrap();

        let store = CredentialStore::new(dir.path());
        assert_eq!(store.resolve("api/demo_key.txt"), Some("sk-demo-123".to_string()));
    }

    #[test]
    fn test_missing_or_blank_is_none() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blank.txt"), "   \n").unwrap();

        let store = CredentialStore::new(dir.path());
        assert_eq!(store.resolve("nope.txt"), None);
        assert_eq!(store.resolve("blank.txt"), None);
    }

    #[test]
    fn test_absolute_path_ignores_root() {
        let dir = TempDir::new().unwrap();
        let key = dir.path().join("abs_key.txt");
        fs::write(&key, "secret").unwrap();

        let store = CredentialStore::new("/definitely/not/here");
        assert_eq!(store.path_for(key.to_str().unwrap()), key);
        assert_eq!(store.resolve(key.to_str().unwrap()), Some("secret".to_string()));
    }

    #[test]
    fn test_write_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path());

        assert!(store.write("api/new_key.txt", "first").unwrap());
        assert!(!store.write("api/new_key.txt", "second").unwrap());
        assert_eq!(store.resolve("api/new_key.txt"), Some("first".to_string()));
    }
}
