use super::RegistryDocument;
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// provider 레지스트리 저장소
///
/// 항상 문서 전체를 읽고 씁니다. 부분 갱신이나 동시 수정 병합은 없습니다.
pub trait RegistryStore {
    /// 아직 저장된 적이 없으면 `None`
    fn load(&self) -> Result<Option<RegistryDocument>>;

    fn save(&self, document: &RegistryDocument) -> Result<()>;

    /// `config show`에 표시할 위치
    fn location(&self) -> String;
}

/// 설정 디렉토리의 `models.yaml`
#[derive(Debug, Clone)]
pub struct YamlFileStore {
    path: PathBuf,
}

impl YamlFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RegistryStore for YamlFileStore {
    fn load(&self) -> Result<Option<RegistryDocument>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        let document: RegistryDocument = serde_yaml::from_str(&content)?;
        tracing::debug!(path = %self.path.display(), "loaded provider registry");
        Ok(Some(document))
    }

    fn save(&self, document: &RegistryDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(document)?;
        fs::write(&self.path, yaml)?;
        tracing::debug!(path = %self.path.display(), "saved provider registry");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// 메모리 저장소. clone끼리 같은 문서를 공유
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    document: Arc<Mutex<Option<RegistryDocument>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(document: RegistryDocument) -> Self {
        Self {
            document: Arc::new(Mutex::new(Some(document))),
        }
    }

    /// 현재 저장된 문서
    pub fn snapshot(&self) -> Option<RegistryDocument> {
        self.document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl RegistryStore for MemoryStore {
    fn load(&self) -> Result<Option<RegistryDocument>> {
        Ok(self.snapshot())
    }

    fn save(&self, document: &RegistryDocument) -> Result<()> {
        *self
            .document
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(document.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "(in memory)".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_store_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = YamlFileStore::new(dir.path().join("models.yaml"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_yaml_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = YamlFileStore::new(dir.path().join("nested").join("models.yaml"));

        let document = RegistryDocument::default();
        store.save(&document).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, document);

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("command:"));
        assert!(text.contains("provider: siliconflow"));
        assert!(text.contains("token_limit: 180000"));
    }

    #[test]
    fn test_yaml_without_wire_format_defaults_to_plain() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models.yaml");
        fs::write(
            &path,
            r#"
command:
  provider: local
  models:
    local:
      url: http://localhost:8080/v1/chat/completions
      model: llama
      token_limit: 8000
      key_file: api/local_key.txt
script:
  provider: local
  models:
    local:
      url: http://localhost:8080/v1/chat/completions
      model: llama
      token_limit: 8000
      key_file: api/local_key.txt
"#,
        )
        .unwrap();

        let document = YamlFileStore::new(&path).load().unwrap().unwrap();
        let entry = &document.command.models["local"];
        assert_eq!(entry.wire_format, crate::ai::wire::WireFormat::Plain);
        assert_eq!(entry.token_limit, 8000);
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let other = store.clone();
        assert!(store.load().unwrap().is_none());

        other.save(&RegistryDocument::default()).unwrap();
        assert!(store.snapshot().is_some());
    }
}
