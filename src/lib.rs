//! bcopilot: 자연어 요청을 bash 명령어와 스크립트로 변환
//!
//! `main.rs`는 인자 파싱과 모듈 연결만 담당합니다. 나머지는 모두 라이브러리에 있어서
//! 터미널이나 네트워크 없이 테스트할 수 있습니다.

pub mod ai;
pub mod artifact;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod registry;
pub mod ui;
