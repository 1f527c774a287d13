use crate::ai::assembler::BudgetGate;
use colored::*;
use dialoguer::Confirm;

/// 큰 프롬프트를 보내기 전에 사용자 확인을 받는 게이트
pub struct ConfirmPrompt;

impl ConfirmPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConfirmPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl BudgetGate for ConfirmPrompt {
    fn confirm(&self, estimated_tokens: usize, threshold: usize) -> bool {
        // stdout은 결과 출력용이므로 stderr 사용
        eprintln!(
            "\n{} estimated prompt size is {} tokens (warning threshold {}).",
            "[!] Warning:".yellow().bold(),
            estimated_tokens.to_string().yellow(),
            threshold
        );
        eprintln!("    Large prompts may lead to high API costs.");

        // TTY가 없는 등 프롬프트가 실패하면 거절로 처리
        Confirm::new()
            .with_prompt("Continue?")
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}
