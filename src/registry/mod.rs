//! provider 레지스트리: purpose별로 어떤 원격 백엔드를 쓸지 관리
//!
//! 레지스트리는 호출마다 [`RegistryStore`]에서 한 번 로드해 필요한 곳에 직접 넘깁니다.
//! 변경할 때마다 전체 문서를 다시 쓰고, 저장이 성공한 뒤에만 메모리 사본을 바꿉니다.

pub mod credentials;
pub mod store;

pub use credentials::CredentialStore;
pub use store::{MemoryStore, RegistryStore, YamlFileStore};

use crate::ai::wire::WireFormat;
use crate::ai::Purpose;
use crate::error::{BcError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 저장되는 provider 접속 정보
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEntry {
    pub url: String,
    pub model: String,
    pub token_limit: usize,
    pub key_file: String,
    #[serde(default)]
    pub wire_format: WireFormat,
}

/// purpose 하나의 활성 provider 이름과 등록된 provider 전체
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurposeSection {
    pub provider: String,
    #[serde(default)]
    pub models: BTreeMap<String, ProviderEntry>,
}

/// 저장되는 레지스트리 전체
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryDocument {
    pub command: PurposeSection,
    pub script: PurposeSection,
}

impl Default for RegistryDocument {
    fn default() -> Self {
        let siliconflow = ProviderEntry {
            url: "https://api.siliconflow.cn/v1/chat/completions".to_string(),
            model: "Pro/deepseek-ai/DeepSeek-V3".to_string(),
            token_limit: 128_000,
            key_file: "api/siliconflow_key.txt".to_string(),
            wire_format: WireFormat::Plain,
        };
        let openrouter = ProviderEntry {
            url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "anthropic/claude-3.7-sonnet".to_string(),
            token_limit: 180_000,
            key_file: "api/openrouter_key.txt".to_string(),
            wire_format: WireFormat::ContentBlocks,
        };

        Self {
            command: PurposeSection {
                provider: "siliconflow".to_string(),
                models: BTreeMap::from([("siliconflow".to_string(), siliconflow)]),
            },
            script: PurposeSection {
                provider: "openrouter".to_string(),
                models: BTreeMap::from([("openrouter".to_string(), openrouter)]),
            },
        }
    }
}

impl RegistryDocument {
    pub fn section(&self, purpose: Purpose) -> &PurposeSection {
        match purpose {
            Purpose::Command => &self.command,
            Purpose::Script => &self.script,
        }
    }

    fn section_mut(&mut self, purpose: Purpose) -> &mut PurposeSection {
        match purpose {
            Purpose::Command => &mut self.command,
            Purpose::Script => &mut self.script,
        }
    }
}

/// 특정 purpose로 조회한 provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub purpose: Purpose,
    pub name: String,
    pub url: String,
    pub model: String,
    pub token_limit: usize,
    pub key_file: String,
    pub wire_format: WireFormat,
}

impl ProviderConfig {
    fn from_entry(purpose: Purpose, name: &str, entry: &ProviderEntry) -> Self {
        Self {
            purpose,
            name: name.to_string(),
            url: entry.url.clone(),
            model: entry.model.clone(),
            token_limit: entry.token_limit,
            key_file: entry.key_file.clone(),
            wire_format: entry.wire_format,
        }
    }
}

/// `add_or_replace`가 provider를 등록할 대상
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ProviderTarget {
    Command,
    Script,
    Both,
}

impl ProviderTarget {
    pub fn purposes(&self) -> &'static [Purpose] {
        match self {
            ProviderTarget::Command => &[Purpose::Command],
            ProviderTarget::Script => &[Purpose::Script],
            ProviderTarget::Both => &Purpose::ALL,
        }
    }
}

/// provider 등록 입력
///
/// 레지스트리를 건드리기 전에 전체를 한 번에 검증합니다.
#[derive(Debug, Clone)]
pub struct ProviderDraft {
    pub name: String,
    pub url: String,
    pub model: String,
    pub token_limit: usize,
    pub key_file: Option<String>,
    pub wire_format: WireFormat,
}

impl ProviderDraft {
    /// 키 파일 미지정시 기본 경로
    pub fn default_key_file(name: &str) -> String {
        format!("api/{}_key.txt", name)
    }

    /// 모든 필드를 검사하고 문제를 한꺼번에 보고
    pub fn validate(&self) -> Result<(String, ProviderEntry)> {
        let mut problems = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            problems.push("provider name must not be empty".to_string());
        } else if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            problems.push(format!(
                "provider name '{}' may only contain letters, digits, '-', '_' and '.'",
                name
            ));
        }

        let url = self.url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            problems.push(format!("endpoint URL '{}' must start with http:// or https://", url));
        }

        let model = self.model.trim();
        if model.is_empty() {
            problems.push("model name must not be empty".to_string());
        }

        if self.token_limit == 0 {
            problems.push("token limit must be greater than 0".to_string());
        }

        let key_file = match self.key_file.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => path.to_string(),
            _ => Self::default_key_file(name),
        };

        if !problems.is_empty() {
            return Err(BcError::ConfigError(format!(
                "invalid provider: {}",
                problems.join("; ")
            )));
        }

        Ok((
            name.to_string(),
            ProviderEntry {
                url: url.to_string(),
                model: model.to_string(),
                token_limit: self.token_limit,
                key_file,
                wire_format: self.wire_format,
            },
        ))
    }
}

/// `config set` 대상 분리 (예: `command.siliconflow`)
pub fn parse_set_target(target: &str) -> Result<(Purpose, String)> {
    let (purpose, provider) = target.split_once('.').ok_or_else(|| {
        BcError::ConfigError(format!(
            "invalid target '{}': expected 'command.<provider>' or 'script.<provider>'",
            target
        ))
    })?;

    let provider = provider.trim();
    if provider.is_empty() {
        return Err(BcError::ConfigError(format!(
            "invalid target '{}': provider name is missing",
            target
        )));
    }

    Ok((purpose.parse()?, provider.to_string()))
}

pub struct Registry {
    document: RegistryDocument,
    store: Box<dyn RegistryStore>,
    credentials: CredentialStore,
}

impl Registry {
    /// 저장소에서 로드. 비어 있으면 기본 provider 사용
    pub fn load(store: Box<dyn RegistryStore>, credentials: CredentialStore) -> Result<Self> {
        let document = match store.load()? {
            Some(document) => document,
            None => {
                tracing::debug!("no provider registry found, using built-in defaults");
                RegistryDocument::default()
            }
        };

        Ok(Self {
            document,
            store,
            credentials,
        })
    }

    pub fn document(&self) -> &RegistryDocument {
        &self.document
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    pub fn active_name(&self, purpose: Purpose) -> &str {
        &self.document.section(purpose).provider
    }

    pub fn active(&self, purpose: Purpose) -> Result<ProviderConfig> {
        let section = self.document.section(purpose);
        let entry = section.models.get(&section.provider).ok_or_else(|| {
            BcError::ConfigError(format!(
                "active {} provider '{}' is not in the registry",
                purpose, section.provider
            ))
        })?;

        Ok(ProviderConfig::from_entry(purpose, &section.provider, entry))
    }

    /// `purpose`에 등록된 provider 전체 (이름순)
    pub fn providers(&self, purpose: Purpose) -> Vec<ProviderConfig> {
        self.document
            .section(purpose)
            .models
            .iter()
            .map(|(name, entry)| ProviderConfig::from_entry(purpose, name, entry))
            .collect()
    }

    pub fn set_active(&mut self, purpose: Purpose, name: &str) -> Result<()> {
        if !self.document.section(purpose).models.contains_key(name) {
            return Err(BcError::ConfigError(format!(
                "unknown {} provider: {}",
                purpose, name
            )));
        }

        let mut document = self.document.clone();
        document.section_mut(purpose).provider = name.to_string();
        self.commit(document)?;

        tracing::info!(%purpose, provider = name, "active provider changed");
        Ok(())
    }

    pub fn add_or_replace(&mut self, target: ProviderTarget, draft: &ProviderDraft) -> Result<()> {
        let (name, entry) = draft.validate()?;

        let mut document = self.document.clone();
        for purpose in target.purposes() {
            document
                .section_mut(*purpose)
                .models
                .insert(name.clone(), entry.clone());
        }
        self.commit(document)?;

        tracing::info!(provider = %name, ?target, "provider registered");
        Ok(())
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn resolve_credential(&self, key_file: &str) -> Option<String> {
        self.credentials.resolve(key_file)
    }

    fn commit(&mut self, document: RegistryDocument) -> Result<()> {
        self.store.save(&document)?;
        self.document = document;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_registry() -> (Registry, MemoryStore) {
        let store = MemoryStore::new();
        let registry = Registry::load(Box::new(store.clone()), CredentialStore::default()).unwrap();
        (registry, store)
    }

    fn draft(name: &str) -> ProviderDraft {
        ProviderDraft {
            name: name.to_string(),
            url: "https://api.deepseek.com/v1/chat/completions".to_string(),
            model: "deepseek-chat".to_string(),
            token_limit: 64_000,
            key_file: None,
            wire_format: WireFormat::Plain,
        }
    }

    #[test]
    fn test_defaults_when_store_empty() {
        let (registry, store) = memory_registry();

        let command = registry.active(Purpose::Command).unwrap();
        assert_eq!(command.name, "siliconflow");
        assert_eq!(command.token_limit, 128_000);
        assert_eq!(command.wire_format, WireFormat::Plain);

        let script = registry.active(Purpose::Script).unwrap();
        assert_eq!(script.name, "openrouter");
        assert_eq!(script.wire_format, WireFormat::ContentBlocks);

        // 로드만으로는 저장하지 않음
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_active_missing_entry_is_config_error() {
        let mut document = RegistryDocument::default();
        document.command.provider = "ghost".to_string();
        let store = MemoryStore::with_document(document);

        let registry = Registry::load(Box::new(store), CredentialStore::default()).unwrap();
        assert!(matches!(
            registry.active(Purpose::Command),
            Err(BcError::ConfigError(_))
        ));
        assert!(registry.active(Purpose::Script).is_ok());
    }

    #[test]
    fn test_set_active_unknown_keeps_previous() {
        let (mut registry, store) = memory_registry();

        let result = registry.set_active(Purpose::Command, "nonexistent");
        assert!(matches!(result, Err(BcError::ConfigError(_))));
        assert_eq!(registry.active_name(Purpose::Command), "siliconflow");
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_set_active_persists() {
        let (mut registry, store) = memory_registry();
        registry
            .add_or_replace(ProviderTarget::Command, &draft("deepseek"))
            .unwrap();

        registry.set_active(Purpose::Command, "deepseek").unwrap();
        assert_eq!(registry.active(Purpose::Command).unwrap().model, "deepseek-chat");

        let saved = store.snapshot().unwrap();
        assert_eq!(saved.command.provider, "deepseek");
        assert_eq!(saved.script.provider, "openrouter");
    }

    #[test]
    fn test_provider_is_per_purpose() {
        let (mut registry, _) = memory_registry();
        registry
            .add_or_replace(ProviderTarget::Command, &draft("deepseek"))
            .unwrap();

        assert!(registry.set_active(Purpose::Script, "deepseek").is_err());
        assert_eq!(registry.active_name(Purpose::Script), "openrouter");
    }

    #[test]
    fn test_add_both_and_replace() {
        let (mut registry, store) = memory_registry();
        registry
            .add_or_replace(ProviderTarget::Both, &draft("deepseek"))
            .unwrap();

        assert_eq!(registry.providers(Purpose::Command).len(), 2);
        assert_eq!(registry.providers(Purpose::Script).len(), 2);

        let mut updated = draft("deepseek");
        updated.token_limit = 32_000;
        updated.key_file = Some("keys/ds.txt".to_string());
        registry
            .add_or_replace(ProviderTarget::Script, &updated)
            .unwrap();

        let saved = store.snapshot().unwrap();
        assert_eq!(saved.script.models["deepseek"].token_limit, 32_000);
        assert_eq!(saved.script.models["deepseek"].key_file, "keys/ds.txt");
        assert_eq!(saved.command.models["deepseek"].token_limit, 64_000);
        assert_eq!(
            saved.command.models["deepseek"].key_file,
            "api/deepseek_key.txt"
        );
    }

    #[test]
    fn test_invalid_draft_never_persisted() {
        let (mut registry, store) = memory_registry();
        let bad = ProviderDraft {
            name: "has space".to_string(),
            url: "ftp://example.com".to_string(),
            model: " ".to_string(),
            token_limit: 0,
            key_file: None,
            wire_format: WireFormat::Plain,
        };

        let err = registry
            .add_or_replace(ProviderTarget::Both, &bad)
            .unwrap_err()
            .to_string();
        assert!(err.contains("provider name"));
        assert!(err.contains("http://"));
        assert!(err.contains("model name"));
        assert!(err.contains("token limit"));

        assert!(store.snapshot().is_none());
        assert_eq!(registry.providers(Purpose::Command).len(), 1);
    }

    #[test]
    fn test_parse_set_target() {
        assert_eq!(
            parse_set_target("command.siliconflow").unwrap(),
            (Purpose::Command, "siliconflow".to_string())
        );
        assert_eq!(
            parse_set_target("script.my.provider").unwrap(),
            (Purpose::Script, "my.provider".to_string())
        );
        assert!(parse_set_target("siliconflow").is_err());
        assert!(parse_set_target("command.").is_err());
        assert!(parse_set_target("both.x").is_err());
    }

    #[test]
    fn test_target_purposes() {
        assert_eq!(ProviderTarget::Command.purposes(), &[Purpose::Command]);
        assert_eq!(ProviderTarget::Both.purposes(), &Purpose::ALL);
    }
}
