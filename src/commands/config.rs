use crate::ai::Purpose;
use crate::cli::ConfigAction;
use crate::error::Result;
use crate::registry::{parse_set_target, ProviderDraft, ProviderTarget, Registry};
use colored::*;

/// `bcopilot config ...` 처리
pub fn execute(registry: &mut Registry, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", show(registry));
            Ok(())
        }
        ConfigAction::Set { target } => set(registry, &target),
        ConfigAction::AddProvider {
            name,
            purpose,
            url,
            model,
            token_limit,
            key_file,
            wire_format,
            api_key,
        } => {
            let draft = ProviderDraft {
                name,
                url,
                model,
                token_limit,
                key_file,
                wire_format,
            };
            add_provider(registry, purpose, &draft, api_key.as_deref())
        }
        ConfigAction::ListProviders => {
            print!("{}", list_providers(registry));
            Ok(())
        }
    }
}

/// 현재 활성 provider 요약
pub fn show(registry: &Registry) -> String {
    let mut out = format!("{} {}\n", "Registry:".cyan(), registry.location());

    for purpose in Purpose::ALL {
        match registry.active(purpose) {
            Ok(provider) => {
                let key_state = if registry.resolve_credential(&provider.key_file).is_some() {
                    "found".green()
                } else {
                    "missing".red()
                };
                out.push_str(&format!(
                    "\n[{}]\n  provider:    {}\n  model:       {}\n  url:         {}\n  token limit: {}\n  wire format: {}\n  key file:    {} ({})\n",
                    purpose,
                    provider.name.green(),
                    provider.model,
                    provider.url,
                    provider.token_limit,
                    provider.wire_format.as_str(),
                    registry.credentials().path_for(&provider.key_file).display(),
                    key_state
                ));
            }
            Err(e) => {
                out.push_str(&format!("\n[{}]\n  {}\n", purpose, e.to_string().red()));
            }
        }
    }

    out
}

/// `<purpose>.<provider>`로 활성 provider 변경
pub fn set(registry: &mut Registry, target: &str) -> Result<()> {
    let (purpose, name) = parse_set_target(target)?;
    registry.set_active(purpose, &name)?;

    println!(
        "{} {} provider is now {}",
        "✓".green(),
        purpose,
        name.green()
    );
    Ok(())
}

/// provider 등록, 필요하면 API 키 파일도 생성
pub fn add_provider(
    registry: &mut Registry,
    target: ProviderTarget,
    draft: &ProviderDraft,
    api_key: Option<&str>,
) -> Result<()> {
    registry.add_or_replace(target, draft)?;

    let name = draft.name.trim();
    let key_file = registry
        .document()
        .section(target.purposes()[0])
        .models
        .get(name)
        .map(|entry| entry.key_file.clone())
        .unwrap_or_else(|| ProviderDraft::default_key_file(name));
    let key_path = registry.credentials().path_for(&key_file);

    println!("{} provider {} registered", "✓".green(), name.green());

    match api_key {
        Some(secret) => {
            if registry.credentials().write(&key_file, secret)? {
                println!("  API key saved to {}", key_path.display());
            } else {
                println!(
                    "  {} {} already exists, left unchanged",
                    "[!]".yellow(),
                    key_path.display()
                );
            }
        }
        None => {
            if registry.resolve_credential(&key_file).is_none() {
                println!(
                    "  {} put the API key in {}",
                    "[!]".yellow(),
                    key_path.display()
                );
            }
        }
    }

    Ok(())
}

/// 등록된 provider 목록 (활성 provider는 `*` 표시)
pub fn list_providers(registry: &Registry) -> String {
    let mut out = String::new();

    for purpose in Purpose::ALL {
        out.push_str(&format!("[{}]\n", purpose));
        let active = registry.active_name(purpose);

        for provider in registry.providers(purpose) {
            let marker = if provider.name == active { "*" } else { " " };
            out.push_str(&format!(
                "  {} {:<16} {} ({} tokens)\n",
                marker,
                provider.name,
                provider.model,
                provider.token_limit
            ));
        }
        out.push('\n');
    }

    out
}
