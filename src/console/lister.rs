use crate::console::{ConsoleError, DeploymentRecord, ManagementSession};
use std::io::Write;

const SEPARATOR: &str = "-----------------------------------------";

/// List every deployed application of the session's domain and print one
/// block per deployment, in the order the console reported them:
///
/// ```text
/// -----------------------------------------
/// application_name is: <name>; absolute_path is: <path>;
/// -----------------------------------------
/// ```
///
/// The session is disconnected once, after the loop. A record whose name or
/// path cannot be read aborts the listing before any part of its block is
/// written, and the session is left connected for the error to propagate.
pub async fn list_deployments<S, W>(
    session: &mut S,
    out: &mut W,
) -> Result<Vec<S::Record>, ConsoleError>
where
    S: ManagementSession,
    W: Write,
{
    let deployments = session.app_deployments().await?;
    for deployment in &deployments {
        let name = deployment.name()?;
        let path = deployment.absolute_source_path()?;
        writeln!(out, "{SEPARATOR}")?;
        writeln!(out, "application_name is: {name}; absolute_path is: {path};")?;
        writeln!(out, "{SEPARATOR}")?;
    }
    session.disconnect().await?;
    Ok(deployments)
}
