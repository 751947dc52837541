use crate::machine::MachineError;
use thiserror::Error;

pub mod lister;
pub mod wlst;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error(transparent)]
    Machine(#[from] MachineError),
    #[error("writing deployment listing failed: {0}")]
    Write(#[from] std::io::Error),
    #[error("deployment record field '{field}' is unavailable")]
    Unavailable { field: &'static str },
    #[error("management console session is already closed")]
    Closed,
    #[error("wlst script exited with status {exit_status}: {stderr}")]
    ScriptFailed { exit_status: u32, stderr: String },
    #[error("wlst output did not contain '{marker}'")]
    MissingMarker { marker: &'static str },
}

/// One deployed application as reported by the administration console. Both
/// reads can fail, the record only holds what the console handed back.
pub trait DeploymentRecord {
    fn name(&self) -> Result<&str, ConsoleError>;
    fn absolute_source_path(&self) -> Result<&str, ConsoleError>;
}

/// An active administrative session against a WebLogic domain. Passed
/// explicitly so callers (and tests) control its lifetime.
pub trait ManagementSession {
    type Record: DeploymentRecord;

    async fn app_deployments(&mut self) -> Result<Vec<Self::Record>, ConsoleError>;
    async fn disconnect(&mut self) -> Result<(), ConsoleError>;
}
