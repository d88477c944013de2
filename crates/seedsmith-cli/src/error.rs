use thiserror::Error;

use seedsmith_core::Error as CoreError;
use seedsmith_generate::GenerationError;
use seedsmith_plan::{PlanError, ValidationReport};

use crate::workspace::WorkspaceError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("workspace error: {0}")]
    Workspace(#[from] WorkspaceError),
    #[error("core error: {0}")]
    Core(#[from] CoreError),
    #[error("plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("plan rejected with {} error(s)", .0.errors.len())]
    PlanRejected(ValidationReport),
    #[error("insertion failed: {0}")]
    Insertion(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("logging error: {0}")]
    Logging(String),
}
