use crate::configuration::console::ConsoleConfiguration;
use crate::console::{ConsoleError, DeploymentRecord, ManagementSession};
use crate::machine::Machine;
use regex::Regex;
use std::sync::LazyLock;

const LIST_APP_DEPLOYMENTS: &str = include_str!("scripts/list_app_deployments.py");
const DISCOVER_DOMAIN_HOME: &str = include_str!("scripts/discover_domain_home.py");

const DOMAIN_HOME_MARKER: &str = "The domain_home is:";

static DEPLOYMENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"application_name is: (.*?); absolute_path is: (.*?);").expect("deployment pattern")
});

static DOMAIN_HOME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"The domain_home is:\s+(.+)").expect("domain home pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WlstDeployment {
    name: String,
    absolute_source_path: String,
}

impl DeploymentRecord for WlstDeployment {
    fn name(&self) -> Result<&str, ConsoleError> {
        Ok(&self.name)
    }

    fn absolute_source_path(&self) -> Result<&str, ConsoleError> {
        Ok(&self.absolute_source_path)
    }
}

/// Administrative session backed by WLST runs on the target host. Scripts
/// are staged into the per-run scratch directory, prefixed with a
/// `connect(...)` line, and executed through the domain's environment.
pub struct WlstSession<'a, M: Machine> {
    machine: &'a M,
    credential: ConsoleConfiguration,
    domain_home: String,
    scratch_dir: String,
    staged_script: Option<String>,
    closed: bool,
}

impl<'a, M: Machine> WlstSession<'a, M> {
    pub fn establish(
        machine: &'a M,
        credential: ConsoleConfiguration,
        domain_home: String,
        scratch_dir: String,
    ) -> Self {
        Self {
            machine,
            credential,
            domain_home,
            scratch_dir,
            staged_script: None,
            closed: false,
        }
    }
}

impl<M: Machine> ManagementSession for WlstSession<'_, M> {
    type Record = WlstDeployment;

    async fn app_deployments(&mut self) -> Result<Vec<WlstDeployment>, ConsoleError> {
        if self.closed {
            return Err(ConsoleError::Closed);
        }

        let script_path = format!("{}/list_app_deployments.py", self.scratch_dir);
        let script = format!(
            "{}\n{}",
            connect_preamble(&self.credential),
            LIST_APP_DEPLOYMENTS
        );
        self.machine.upload(&script_path, script.as_bytes()).await?;
        self.staged_script = Some(script_path.clone());

        let command = format!(
            ". {}/bin/setDomainEnv.sh; java $WLST_ARGS weblogic.WLST {}",
            self.domain_home, script_path
        );
        let output = self.machine.exec(&command).await?;
        if !output.success() {
            return Err(ConsoleError::ScriptFailed {
                exit_status: output.exit_status,
                stderr: output.stderr,
            });
        }

        Ok(extract_deployments(&output.stdout))
    }

    async fn disconnect(&mut self) -> Result<(), ConsoleError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Some(path) = self.staged_script.take() {
            self.machine.exec(&format!("rm -f {path}")).await?;
        }
        Ok(())
    }
}

/// Resolve the domain home by running a WLST script against the admin
/// console through the Oracle home's `wlst.sh`.
pub async fn discover_domain_home<M: Machine>(
    machine: &M,
    oracle_home: &str,
    scratch_dir: &str,
    credential: &ConsoleConfiguration,
) -> Result<String, ConsoleError> {
    let script_path = format!("{scratch_dir}/discover_domain_home.py");
    let script = format!("{}\n{}", connect_preamble(credential), DISCOVER_DOMAIN_HOME);
    machine.upload(&script_path, script.as_bytes()).await?;

    let command = format!(
        "cd {scratch_dir}; export Oracle_Home={oracle_home}; \
         bash $Oracle_Home/oracle_common/common/bin/wlst.sh {script_path}"
    );
    let output = machine.exec(&command).await?;
    if !output.success() {
        return Err(ConsoleError::ScriptFailed {
            exit_status: output.exit_status,
            stderr: output.stderr,
        });
    }

    extract_domain_home(&output.stdout)
}

fn connect_preamble(credential: &ConsoleConfiguration) -> String {
    format!(
        "connect('{}','{}','t3://localhost:{}')",
        credential.username, credential.password, credential.port
    )
}

fn extract_deployments(output: &str) -> Vec<WlstDeployment> {
    DEPLOYMENT_PATTERN
        .captures_iter(output)
        .map(|captures| WlstDeployment {
            name: captures[1].to_string(),
            absolute_source_path: captures[2].to_string(),
        })
        .collect()
}

fn extract_domain_home(output: &str) -> Result<String, ConsoleError> {
    DOMAIN_HOME_PATTERN
        .captures(output)
        .map(|captures| captures[1].trim().to_string())
        .ok_or(ConsoleError::MissingMarker {
            marker: DOMAIN_HOME_MARKER,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::console::ConsoleConfiguration;

    fn credential() -> ConsoleConfiguration {
        ConsoleConfiguration {
            username: "weblogic".to_string(),
            password: "welcome1".to_string(),
            port: 7001,
        }
    }

    #[test]
    fn builds_connect_preamble() {
        assert_eq!(
            connect_preamble(&credential()),
            "connect('weblogic','welcome1','t3://localhost:7001')"
        );
    }

    #[test]
    fn extracts_deployments_in_captured_order() {
        let output = "\
Initializing WebLogic Scripting Tool (WLST) ...
-----------------------------------------
application_name is: shoppingcart; absolute_path is: /opt/apps/shoppingcart.ear;
-----------------------------------------
-----------------------------------------
application_name is: inventory; absolute_path is: /opt/apps/inventory.war;
-----------------------------------------
Disconnected from weblogic server: AdminServer
";
        let deployments = extract_deployments(output);
        assert_eq!(
            deployments,
            vec![
                WlstDeployment {
                    name: "shoppingcart".to_string(),
                    absolute_source_path: "/opt/apps/shoppingcart.ear".to_string(),
                },
                WlstDeployment {
                    name: "inventory".to_string(),
                    absolute_source_path: "/opt/apps/inventory.war".to_string(),
                },
            ]
        );
    }

    #[test]
    fn extracts_nothing_from_an_empty_domain() {
        let output = "Initializing WebLogic Scripting Tool (WLST) ...\n";
        assert!(extract_deployments(output).is_empty());
    }

    #[test]
    fn extracts_domain_home() {
        let output = "Connecting to t3://localhost:7001 ...\nThe domain_home is: /opt/domains/base_domain\n";
        assert_eq!(
            extract_domain_home(output).unwrap(),
            "/opt/domains/base_domain"
        );
    }

    #[test]
    fn missing_domain_home_marker_is_an_error() {
        let error = extract_domain_home("no marker here").unwrap_err();
        assert!(matches!(error, ConsoleError::MissingMarker { .. }));
    }

    #[test]
    fn embedded_scripts_drive_the_expected_mbeans() {
        assert!(LIST_APP_DEPLOYMENTS.contains("cmo.getAppDeployments()"));
        assert!(LIST_APP_DEPLOYMENTS.contains("getAbsoluteSourcePath()"));
        assert!(LIST_APP_DEPLOYMENTS.trim_end().ends_with("disconnect()"));
        assert!(DISCOVER_DOMAIN_HOME.contains(DOMAIN_HOME_MARKER));
        assert!(DISCOVER_DOMAIN_HOME.trim_end().ends_with("disconnect()"));
    }
}
