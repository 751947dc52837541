use thiserror::Error;

pub mod ssh;

#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: u32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

#[derive(Error, Debug)]
pub enum MachineError {
    #[error("ssh transport error: {0}")]
    Ssh(#[from] russh::Error),
    #[error("ssh key error: {0}")]
    Key(#[from] russh::keys::Error),
    #[error("sftp error: {0}")]
    Sftp(#[from] russh_sftp::client::error::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("authentication failed for user {user}")]
    AuthenticationFailed { user: String },
    #[error("channel closed before `{cmd}` reported an exit status")]
    MissingExitStatus { cmd: String },
    #[error("command `{cmd}` exited with status {exit_status}: {stderr}")]
    CommandFailed {
        cmd: String,
        exit_status: u32,
        stderr: String,
    },
}

pub trait Machine {
    async fn exec(&self, cmd: &str) -> Result<CommandOutput, MachineError>;
    async fn upload(&self, remote_path: &str, contents: &[u8]) -> Result<(), MachineError>;
    async fn close(&self) -> Result<(), MachineError>;
}

/// Run a command, retrying once under `sudo` when the remote side reports a
/// permission denial. A `grep` pipeline exiting 1 found no lines and is an
/// empty success, not a failure.
pub async fn run_with_sudo<M: Machine>(machine: &M, cmd: &str) -> Result<String, MachineError> {
    let mut output = machine.exec(cmd).await?;
    if !output.success() && output.stderr.contains("Permission denied") {
        output = machine.exec(&format!("sudo {cmd}")).await?;
    }
    if output.success() {
        return Ok(output.stdout);
    }
    if output.exit_status == 1 && cmd.contains("grep") {
        return Ok(String::new());
    }
    Err(MachineError::CommandFailed {
        cmd: cmd.to_string(),
        exit_status: output.exit_status,
        stderr: output.stderr,
    })
}
