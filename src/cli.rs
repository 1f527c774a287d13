use crate::ai::wire::WireFormat;
use crate::ai::Purpose;
use crate::registry::ProviderTarget;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bcopilot")]
#[command(version)]
#[command(about = "Turn natural-language requests into bash commands and scripts", long_about = None)]
#[command(args_conflicts_with_subcommands = true, disable_help_subcommand = true)]
pub struct Cli {
    /// 자연어 요청 (예: "find files larger than 100MB")
    pub query: Vec<String>,

    /// 명령어 대신 실행 가능한 스크립트 파일 생성
    #[arg(short = 's', long)]
    pub script: bool,

    /// 참고할 파일 (반복 또는 쉼표 구분, glob 패턴 지원)
    #[arg(short = 'f', long = "file", value_name = "PATH", value_delimiter = ',')]
    pub files: Vec<PathBuf>,

    /// 큰 프롬프트 경고 없이 바로 전송
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// 디버그 로그 출력 (stderr)
    #[arg(short = 'd', long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 프로바이더 설정 관리
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// purpose별 활성 provider 표시
    Show,

    /// 활성 provider 변경 (예: `command.siliconflow`)
    Set {
        /// <purpose>.<provider>
        target: String,
    },

    /// provider 등록 또는 교체
    AddProvider {
        #[arg(long)]
        name: String,

        #[arg(long, value_enum)]
        purpose: ProviderTarget,

        /// chat-completions 엔드포인트 URL
        #[arg(long)]
        url: String,

        #[arg(long)]
        model: String,

        #[arg(long, default_value_t = 100_000)]
        token_limit: usize,

        /// API 키 파일 경로, 설정 디렉토리 기준 (기본값 api/<name>_key.txt)
        #[arg(long)]
        key_file: Option<String>,

        #[arg(long, value_enum, default_value_t = WireFormat::Plain)]
        wire_format: WireFormat,

        /// 키 파일이 없으면 이 키로 생성
        #[arg(long)]
        api_key: Option<String>,
    },

    /// 등록된 provider 목록
    ListProviders,
}

impl Cli {
    pub fn query_text(&self) -> String {
        self.query.join(" ")
    }

    pub fn purpose(&self) -> Purpose {
        if self.script {
            Purpose::Script
        } else {
            Purpose::Command
        }
    }
}
