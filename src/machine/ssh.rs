use crate::configuration::target::{SSHIdentityConfiguration, TargetConfiguration};
use crate::machine::{CommandOutput, Machine, MachineError};
use russh::client::{AuthResult, Handle};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey};
use russh::{ChannelMsg, Disconnect, Preferred, client};
use russh_sftp::client::SftpSession;
use russh_sftp::protocol::OpenFlags;
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;

pub struct SSHHandler;

impl client::Handler for SSHHandler {
    type Error = russh::Error;

    // Host keys are not pinned; discovery targets live inside a managed
    // network.
    async fn check_server_key(
        &mut self,
        _server_public_key: &PublicKey,
    ) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

pub struct SSHMachine {
    configuration: TargetConfiguration,
    handle: Handle<SSHHandler>,
}

impl SSHMachine {
    pub async fn connect(configuration: TargetConfiguration) -> Result<Self, MachineError> {
        let config = Arc::new(client::Config {
            inactivity_timeout: Some(Duration::from_secs(5)),
            preferred: Preferred {
                kex: Cow::Owned(vec![
                    russh::kex::CURVE25519_PRE_RFC_8731,
                    russh::kex::EXTENSION_SUPPORT_AS_CLIENT,
                ]),
                ..Default::default()
            },
            ..Default::default()
        });
        let handle = client::connect(
            config,
            (configuration.host.clone(), configuration.port),
            SSHHandler,
        )
        .await?;

        Ok(Self {
            configuration,
            handle,
        })
    }

    pub async fn authenticate(&mut self) -> Result<(), MachineError> {
        let result = match self.configuration.identity.clone() {
            SSHIdentityConfiguration::Key { path } => {
                let key = russh::keys::load_secret_key(path, None)?;
                let key = PrivateKeyWithHashAlg::new(Arc::new(key), None);
                self.handle
                    .authenticate_publickey(self.configuration.user.clone(), key)
                    .await?
            }
            SSHIdentityConfiguration::Password { value } => {
                self.handle
                    .authenticate_password(self.configuration.user.clone(), value)
                    .await?
            }
        };

        match result {
            AuthResult::Success => Ok(()),
            AuthResult::Failure { .. } => Err(MachineError::AuthenticationFailed {
                user: self.configuration.user.clone(),
            }),
        }
    }

    pub fn host(&self) -> &str {
        &self.configuration.host
    }
}

impl Machine for SSHMachine {
    async fn exec(&self, cmd: &str) -> Result<CommandOutput, MachineError> {
        let mut channel = self.handle.channel_open_session().await?;
        channel.exec(true, cmd).await?;

        let mut output = CommandOutput::default();
        let mut exit_status = None;
        loop {
            let Some(msg) = channel.wait().await else {
                break;
            };
            match msg {
                ChannelMsg::Data { ref data } => {
                    output.stdout.push_str(&String::from_utf8_lossy(data));
                }
                ChannelMsg::ExtendedData { ref data, ext: 1 } => {
                    output.stderr.push_str(&String::from_utf8_lossy(data));
                }
                ChannelMsg::ExitStatus { exit_status: status } => {
                    // more data may still arrive after the status
                    exit_status = Some(status);
                }
                _ => {}
            }
        }

        output.exit_status = exit_status.ok_or_else(|| MachineError::MissingExitStatus {
            cmd: cmd.to_string(),
        })?;
        Ok(output)
    }

    async fn upload(&self, remote_path: &str, contents: &[u8]) -> Result<(), MachineError> {
        let channel = self.handle.channel_open_session().await?;
        channel.request_subsystem(true, "sftp").await?;

        let sftp = SftpSession::new(channel.into_stream()).await?;
        let mut remote = sftp
            .open_with_flags(
                remote_path,
                OpenFlags::WRITE | OpenFlags::CREATE | OpenFlags::TRUNCATE,
            )
            .await?;
        remote.write_all(contents).await?;
        remote.shutdown().await?;

        Ok(())
    }

    async fn close(&self) -> Result<(), MachineError> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "english")
            .await?;
        Ok(())
    }
}
