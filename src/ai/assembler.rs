use crate::ai::prompt_template::PromptTemplate;
use crate::ai::tokens;
use crate::ai::Purpose;
use crate::config::Config;
use crate::context::{Attachment, EnvironmentFacts};
use crate::error::{BcError, Result};
use crate::registry::ProviderConfig;

/// 프롬프트 하나를 만드는 데 필요한 입력 (호출당 한 번 생성)
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub query: String,
    pub purpose: Purpose,
    pub environment: EnvironmentFacts,
    pub attachments: Vec<Attachment>,
}

impl GenerationRequest {
    pub fn attachment_names(&self) -> Vec<String> {
        self.attachments.iter().map(|a| a.name.clone()).collect()
    }
}

/// 추정 토큰이 경고 임계값을 넘을 때 전송 전에 확인하는 게이트
pub trait BudgetGate {
    /// `false`면 호출 중단
    fn confirm(&self, estimated_tokens: usize, threshold: usize) -> bool;
}

/// 항상 승인하는 게이트 (`--yes`, 테스트)
pub struct AutoApprove;

impl BudgetGate for AutoApprove {
    fn confirm(&self, _estimated_tokens: usize, _threshold: usize) -> bool {
        true
    }
}

/// 토큰 예산 설정 ([`Config`]에서 가져옴)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetSettings {
    pub reserve_tokens: usize,
    pub warn_threshold: usize,
    pub context_allowance: usize,
    pub query_allowance: usize,
}

impl From<&Config> for BudgetSettings {
    fn from(config: &Config) -> Self {
        Self {
            reserve_tokens: config.reserve_tokens,
            warn_threshold: config.warn_threshold,
            context_allowance: config.context_allowance,
            query_allowance: config.query_allowance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt {
    pub text: String,
    /// 기본 할당량 + 첨부 파일별 추정치
    pub estimated_tokens: usize,
    /// provider 한도 - 예약분
    pub available_tokens: usize,
}

pub struct PromptAssembler {
    settings: BudgetSettings,
}

impl PromptAssembler {
    pub fn new(settings: BudgetSettings) -> Self {
        Self { settings }
    }

    /// 응답 예약분을 뺀 프롬프트 예산
    pub fn available_tokens(&self, provider: &ProviderConfig) -> usize {
        provider
            .token_limit
            .saturating_sub(self.settings.reserve_tokens)
    }

    /// 모든 예산 판단에 쓰는 누적 추정치
    pub fn estimate_total(&self, request: &GenerationRequest) -> usize {
        let fixed = self.settings.context_allowance + self.settings.query_allowance;
        request
            .attachments
            .iter()
            .map(|attachment| {
                let cost = tokens::estimate(&attachment.content);
                tracing::info!(file = %attachment.name, tokens = cost, "including file content");
                cost
            })
            .fold(fixed, |total, cost| total + cost)
    }

    /// 최종 프롬프트 생성. 실패하면 아무것도 전송하지 않음
    ///
    /// 하드 예산을 경고 게이트보다 먼저 검사합니다.
    pub fn assemble(
        &self,
        request: &GenerationRequest,
        provider: &ProviderConfig,
        gate: &dyn BudgetGate,
    ) -> Result<AssembledPrompt> {
        let estimated = self.estimate_total(request);
        let available = self.available_tokens(provider);

        if estimated > available {
            return Err(BcError::BudgetExceeded {
                estimated,
                available,
                excess: estimated - available,
                model: provider.model.clone(),
                ceiling: provider.token_limit,
            });
        }

        if estimated > self.settings.warn_threshold
            && !gate.confirm(estimated, self.settings.warn_threshold)
        {
            return Err(BcError::UserCancelled);
        }

        let mut text = PromptTemplate::render(request.purpose, &request.query, &request.environment);
        text.push_str(&PromptTemplate::attachments(request.purpose, &request.attachments));

        tracing::debug!(estimated, available, chars = text.len(), "prompt assembled");

        Ok(AssembledPrompt {
            text,
            estimated_tokens: estimated,
            available_tokens: available,
        })
    }
}
