use crate::ai::assembler::{AutoApprove, BudgetGate, GenerationRequest, PromptAssembler};
use crate::ai::gateway::ProviderGateway;
use crate::ai::history::{HistoryLog, HistoryRecord};
use crate::ai::response_processor::ResponseProcessor;
use crate::ai::transport::ReqwestTransport;
use crate::ai::Purpose;
use crate::artifact::{ArtifactWriter, ScriptArtifact};
use crate::config::Config;
use crate::context::{read_attachments, EnvironmentFacts};
use crate::error::{BcError, Result};
use crate::registry::Registry;
use crate::ui::{create_spinner, hidden_spinner, ConfirmPrompt};
use chrono::Local;
use colored::*;
use std::path::PathBuf;

/// 성공한 호출의 결과물
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Command(String),
    Script(ScriptArtifact),
}

/// 요청 하나를 registry → assembler → gateway → writer 순서로 처리
pub struct Orchestrator<'a> {
    registry: &'a Registry,
    assembler: PromptAssembler,
    gateway: ProviderGateway,
    artifacts: ArtifactWriter,
    history: HistoryLog,
    gate: &'a dyn BudgetGate,
    show_progress: bool,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        registry: &'a Registry,
        config: &Config,
        gateway: ProviderGateway,
        artifacts: ArtifactWriter,
        gate: &'a dyn BudgetGate,
    ) -> Self {
        Self {
            registry,
            assembler: PromptAssembler::new(config.into()),
            gateway,
            artifacts,
            history: HistoryLog::new(config.history_file()),
            gate,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub async fn run(&self, request: &GenerationRequest) -> Result<Outcome> {
        let provider = self.registry.active(request.purpose)?;
        let prompt = self.assembler.assemble(request, &provider, self.gate)?;

        let spinner = if self.show_progress {
            create_spinner(&match request.purpose {
                Purpose::Command => "Processing request...".to_string(),
                Purpose::Script => format!(
                    "Generating script with {}, this may take a minute or two...",
                    provider.model
                ),
            })
        } else {
            hidden_spinner()
        };
        let result = self.gateway.invoke(&provider, &prompt.text).await;
        spinner.finish_and_clear();

        if !result.success {
            return Err(BcError::GenerationFailed(result.payload));
        }

        match request.purpose {
            Purpose::Command => {
                let command = ResponseProcessor::clean_command(&result.payload);
                self.record(request, &command, None);
                Ok(Outcome::Command(command))
            }
            Purpose::Script => {
                let artifact = self.artifacts.write(&result.payload, &request.query)?;
                self.record(request, &result.payload, Some(artifact.path.clone()));
                Ok(Outcome::Script(artifact))
            }
        }
    }

    fn record(&self, request: &GenerationRequest, result: &str, artifact: Option<PathBuf>) {
        let record = HistoryRecord {
            timestamp: Local::now(),
            kind: request.purpose,
            query: request.query.clone(),
            attachments: request.attachment_names(),
            result: result.to_string(),
            artifact,
        };

        if let Err(e) = self.history.append(&record) {
            tracing::warn!(path = %self.history.path().display(), error = %e, "failed to write history");
        }
    }
}

/// 커맨드라인에서 받은 옵션
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub query: String,
    pub purpose: Purpose,
    pub files: Vec<PathBuf>,
    pub assume_yes: bool,
}

/// 서브커맨드 없는 기본 호출 진입점
pub async fn execute(config: &Config, registry: &Registry, options: GenerateOptions) -> Result<()> {
    let attachments = read_attachments(&options.files)?;

    let request = GenerationRequest {
        query: options.query,
        purpose: options.purpose,
        environment: EnvironmentFacts::probe(),
        attachments,
    };

    let gate: Box<dyn BudgetGate> = if options.assume_yes {
        Box::new(AutoApprove)
    } else {
        Box::new(ConfirmPrompt::new())
    };

    let gateway = ProviderGateway::new(
        Box::new(ReqwestTransport::new()?),
        registry.credentials().clone(),
        config,
    );

    let orchestrator = Orchestrator::new(
        registry,
        config,
        gateway,
        ArtifactWriter::in_current_dir()?,
        gate.as_ref(),
    )
    .with_progress(true);

    match orchestrator.run(&request).await? {
        Outcome::Command(command) => {
            println!("{}", command.green());
        }
        Outcome::Script(artifact) => {
            println!("\n{} {}", "Script created:".cyan(), artifact.path.display());
            println!("You can run it with:");
            println!("{}", artifact.path.display().to_string().green());
        }
    }

    Ok(())
}
