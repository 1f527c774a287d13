pub mod config;
pub mod generate;

pub use generate::{execute as execute_generate, GenerateOptions, Orchestrator, Outcome};
