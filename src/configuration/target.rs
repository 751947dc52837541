use serde::Deserialize;
use std::fmt::{Debug, Formatter};

pub const DEFAULT_SSH_PORT: u16 = 22;

#[derive(Deserialize, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SSHIdentityConfiguration {
    Key { path: String },
    Password { value: String },
}

impl Debug for SSHIdentityConfiguration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Key { path } => f.debug_struct("Key").field("path", path).finish(),
            Self::Password { .. } => f
                .debug_struct("Password")
                .field("value", &"<redacted>")
                .finish(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct TargetConfiguration {
    pub host: String,
    #[serde(default = "default_ssh_port")]
    pub port: u16,
    pub user: String,
    pub identity: SSHIdentityConfiguration,
}

fn default_ssh_port() -> u16 {
    DEFAULT_SSH_PORT
}
