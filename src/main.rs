use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wlsdiscover::configuration::console::{
    ConsoleConfiguration, DEFAULT_CONSOLE_PORT, DEFAULT_CONSOLE_USERNAME,
};
use wlsdiscover::configuration::target::{
    DEFAULT_SSH_PORT, SSHIdentityConfiguration, TargetConfiguration,
};
use wlsdiscover::configuration::{ConfigurationError, DiscoveryConfiguration, OutputConfiguration};
use wlsdiscover::discovery::DiscoveryExecutor;
use wlsdiscover::report::{OutputFormat, ReportWriter};

/// Discover deployed applications on a remote WebLogic Server
#[derive(Parser, Debug)]
#[command(name = "wlsdiscover")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Target server to be discovered
    #[arg(long)]
    server: Option<String>,

    /// The ssh port, default 22
    #[arg(long)]
    port: Option<u16>,

    /// Username for ssh login
    #[arg(long)]
    username: Option<String>,

    /// Password for ssh login
    #[arg(long)]
    password: Option<String>,

    /// Private key file for ssh login, used instead of --password
    #[arg(long)]
    identity_file: Option<String>,

    /// Username for the weblogic console login, default weblogic
    #[arg(long)]
    console_username: Option<String>,

    /// Password for the weblogic console login
    #[arg(long)]
    console_password: Option<String>,

    /// Port of the weblogic admin console, default 7001
    #[arg(long)]
    console_port: Option<u16>,

    /// File name for the report, default console
    #[arg(long)]
    file: Option<PathBuf>,

    /// Output format, default json
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// TOML configuration file; explicit flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let configuration = resolve_configuration(cli)?;

    let executor = DiscoveryExecutor::new(configuration.clone());
    let apps = {
        let mut stdout = io::stdout().lock();
        executor
            .discover(&mut stdout)
            .await
            .context("discovery failed")?
    };

    if apps.is_empty() {
        println!(
            "no weblogic app discovered from {}",
            configuration.target.host
        );
        return Ok(());
    }

    ReportWriter::new(configuration.output.format, configuration.output.file)
        .write(&apps)
        .context("failed to write report")?;

    Ok(())
}

fn resolve_configuration(cli: Cli) -> Result<DiscoveryConfiguration, ConfigurationError> {
    let file = cli
        .config
        .as_deref()
        .map(DiscoveryConfiguration::from_file)
        .transpose()?;
    merge_configuration(cli, file)
}

/// Explicit flags win; the configuration file fills the gaps; built-in
/// defaults cover the rest.
fn merge_configuration(
    cli: Cli,
    file: Option<DiscoveryConfiguration>,
) -> Result<DiscoveryConfiguration, ConfigurationError> {
    let (file_target, file_console, file_output) = match file {
        Some(configuration) => (
            Some(configuration.target),
            Some(configuration.console),
            Some(configuration.output),
        ),
        None => (None, None, None),
    };

    let identity = if let Some(path) = cli.identity_file {
        Some(SSHIdentityConfiguration::Key { path })
    } else if let Some(value) = cli.password {
        Some(SSHIdentityConfiguration::Password { value })
    } else {
        file_target.as_ref().map(|t| t.identity.clone())
    };

    let target = TargetConfiguration {
        host: cli
            .server
            .or_else(|| file_target.as_ref().map(|t| t.host.clone()))
            .ok_or(ConfigurationError::Missing { name: "server" })?,
        port: cli
            .port
            .or_else(|| file_target.as_ref().map(|t| t.port))
            .unwrap_or(DEFAULT_SSH_PORT),
        user: cli
            .username
            .or_else(|| file_target.as_ref().map(|t| t.user.clone()))
            .ok_or(ConfigurationError::Missing { name: "username" })?,
        identity: identity.ok_or(ConfigurationError::Missing {
            name: "password or identity-file",
        })?,
    };

    let console = ConsoleConfiguration {
        username: cli
            .console_username
            .or_else(|| file_console.as_ref().map(|c| c.username.clone()))
            .unwrap_or_else(|| DEFAULT_CONSOLE_USERNAME.to_string()),
        password: cli
            .console_password
            .or_else(|| file_console.as_ref().map(|c| c.password.clone()))
            .ok_or(ConfigurationError::Missing {
                name: "console-password",
            })?,
        port: cli
            .console_port
            .or_else(|| file_console.as_ref().map(|c| c.port))
            .unwrap_or(DEFAULT_CONSOLE_PORT),
    };

    let output = OutputConfiguration {
        file: cli
            .file
            .or_else(|| file_output.as_ref().and_then(|o| o.file.clone())),
        format: cli
            .format
            .or_else(|| file_output.as_ref().map(|o| o.format))
            .unwrap_or_default(),
    };

    Ok(DiscoveryConfiguration {
        target,
        console,
        output,
    })
}
