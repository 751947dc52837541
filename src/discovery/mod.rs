use crate::configuration::DiscoveryConfiguration;
use crate::console::wlst::{self, WlstSession};
use crate::console::{ConsoleError, DeploymentRecord, lister};
use crate::discovery::process::{KIB, MIB, ProcessError, ServerProcess};
use crate::machine::ssh::SSHMachine;
use crate::machine::{Machine, MachineError, run_with_sudo};
use crate::report::DiscoveredApp;
use crate::util;
use chrono::DateTime;
use std::io::Write;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub mod commands;
pub mod process;

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error(transparent)]
    Machine(#[from] MachineError),
    #[error(transparent)]
    Console(#[from] ConsoleError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("process {pid} does not carry a -Dweblogic.home= option")]
    MissingWeblogicHome { pid: u32 },
}

/// Runs the whole discovery pass against one target host.
pub struct DiscoveryExecutor {
    configuration: DiscoveryConfiguration,
}

impl DiscoveryExecutor {
    pub fn new(configuration: DiscoveryConfiguration) -> Self {
        Self { configuration }
    }

    /// Connect, discover, disconnect. Deployment listing blocks are written
    /// to `out` as they are produced; the returned rows feed the report.
    pub async fn discover<W: Write>(&self, out: &mut W) -> Result<Vec<DiscoveredApp>, DiscoveryError> {
        info!(server = %self.configuration.target.host, "going to discover weblogic apps");
        let mut machine = SSHMachine::connect(self.configuration.target.clone()).await?;
        machine.authenticate().await?;
        info!(server = %machine.host(), "connected to target server");

        let result = self.discover_on(&machine, out).await;

        if let Err(error) = machine.close().await {
            warn!(%error, "failed to close ssh connection");
        }
        result
    }

    pub async fn discover_on<M: Machine, W: Write>(
        &self,
        machine: &M,
        out: &mut W,
    ) -> Result<Vec<DiscoveredApp>, DiscoveryError> {
        info!("scanning weblogic process");
        let scan = run_with_sudo(machine, commands::PROCESS_SCAN).await?;
        let processes = ServerProcess::scan(&scan)?;
        info!(count = processes.len(), "weblogic process scan finished");

        let Some(process) = processes.first() else {
            info!("no weblogic process detected");
            return Ok(Vec::new());
        };
        info!(pid = process.pid(), uid = process.uid(), "begin to discover process");

        let scratch_name = format!("discover_weblogic_{}", Uuid::new_v4());
        let scratch_dir = util::clean_output(
            &run_with_sudo(machine, &commands::create_scratch_dir(&scratch_name)).await?,
        );
        debug!(%scratch_dir, "created scratch directory");

        let result = self.discover_process(machine, process, &scratch_dir, out).await;

        if let Err(error) = run_with_sudo(machine, &commands::remove_scratch_dir(&scratch_dir)).await
        {
            warn!(%error, %scratch_dir, "failed to remove scratch directory");
        }
        result
    }

    async fn discover_process<M: Machine, W: Write>(
        &self,
        machine: &M,
        process: &ServerProcess,
        scratch_dir: &str,
        out: &mut W,
    ) -> Result<Vec<DiscoveredApp>, DiscoveryError> {
        let weblogic_server_name = process.weblogic_name().unwrap_or_default().to_string();
        let oracle_home = process
            .oracle_home()
            .ok_or(DiscoveryError::MissingWeblogicHome {
                pid: process.pid(),
            })?
            .to_string();
        debug!(
            %weblogic_server_name,
            %oracle_home,
            java_home = process.java_home(),
            "derived process layout"
        );

        let console = &self.configuration.console;
        let domain_home =
            wlst::discover_domain_home(machine, &oracle_home, scratch_dir, console).await?;
        info!(%domain_home, "resolved domain home");

        let mut session = WlstSession::establish(
            machine,
            console.clone(),
            domain_home.clone(),
            scratch_dir.to_string(),
        );
        let deployments = lister::list_deployments(&mut session, out).await?;
        info!(count = deployments.len(), "total number of applications detected");

        if deployments.is_empty() {
            return Ok(Vec::new());
        }

        let os_name = probe(machine, &[commands::OS_NAME, commands::ORACLE_OS_NAME], "os name").await;
        let os_version = probe(
            machine,
            &[commands::OS_VERSION, commands::ORACLE_OS_VERSION],
            "os version",
        )
        .await;
        let jdk_cmd = commands::jdk_version(process.java_cmd());
        let runtime_jdk_version = probe(machine, &[jdk_cmd.as_str()], "jdk version").await;
        let total_memory = probe(machine, &[commands::TOTAL_MEMORY], "total memory")
            .await
            .and_then(|value| value.parse::<u64>().ok())
            .map(|kib| kib * KIB);
        let jvm_memory_mb = match process.configured_heap_bytes(total_memory) {
            Ok(bytes) => bytes.map(|b| b / MIB),
            Err(error) => {
                warn!(%error, "cannot determine jvm heap");
                None
            }
        };
        let version_cmd = commands::weblogic_version(&domain_home);
        let weblogic_version = probe(machine, &[version_cmd.as_str()], "weblogic version")
            .await
            .as_deref()
            .and_then(find_weblogic_version);

        let mut apps = Vec::with_capacity(deployments.len());
        for deployment in &deployments {
            let app_name = deployment.name()?.to_string();
            let app_file_location = deployment.absolute_source_path()?.to_string();
            let stat_cmd = commands::last_modified(&app_file_location);
            let last_modified_time = probe(machine, &[stat_cmd.as_str()], "last modified time")
                .await
                .and_then(|value| value.parse::<i64>().ok())
                .and_then(|epoch| DateTime::from_timestamp(epoch, 0));
            info!(app = %app_name, path = %app_file_location, "found app");

            apps.push(DiscoveredApp {
                server: self.configuration.target.host.clone(),
                app_name,
                app_file_location,
                server_type: "weblogic".to_string(),
                weblogic_server_name: weblogic_server_name.clone(),
                weblogic_version: weblogic_version.clone(),
                runtime_jdk_version: runtime_jdk_version.clone(),
                os_name: os_name.clone(),
                os_version: os_version.clone(),
                jvm_memory_mb,
                last_modified_time,
                oracle_home: oracle_home.clone(),
                domain_home: domain_home.clone(),
            });
        }

        Ok(apps)
    }
}

/// Try each command in turn, keeping the first non-empty output.
async fn probe<M: Machine>(machine: &M, cmds: &[&str], what: &str) -> Option<String> {
    for cmd in cmds {
        match run_with_sudo(machine, cmd).await {
            Ok(output) if !output.trim().is_empty() => return Some(util::clean_output(&output)),
            Ok(_) => {}
            Err(error) => debug!(%error, what, "probe command failed"),
        }
    }
    None
}

fn find_weblogic_version(output: &str) -> Option<String> {
    output
        .split("WebLogic Server ")
        .nth(1)?
        .split_whitespace()
        .next()
        .map(str::to_string)
}
