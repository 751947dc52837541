use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

#[derive(ValueEnum, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON report
    #[default]
    Json,
    /// CSV report, one row per application
    Csv,
    /// Deployment listing blocks only, no report
    Text,
}

/// One discovered application, enriched with what the host and the admin
/// console revealed about it.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredApp {
    pub server: String,
    pub app_name: String,
    pub app_file_location: String,
    pub server_type: String,
    pub weblogic_server_name: String,
    pub weblogic_version: Option<String>,
    pub runtime_jdk_version: Option<String>,
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub jvm_memory_mb: Option<u64>,
    pub last_modified_time: Option<DateTime<Utc>>,
    pub oracle_home: String,
    pub domain_home: String,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("failed to open report file {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write csv report: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub struct ReportWriter {
    format: OutputFormat,
    file: Option<PathBuf>,
}

impl ReportWriter {
    pub fn new(format: OutputFormat, file: Option<PathBuf>) -> Self {
        Self { format, file }
    }

    pub fn write(&self, apps: &[DiscoveredApp]) -> Result<(), ReportError> {
        if self.format == OutputFormat::Text {
            return Ok(());
        }
        match &self.file {
            Some(path) => {
                let file = File::create(path).map_err(|source| ReportError::Open {
                    path: path.clone(),
                    source,
                })?;
                self.render(apps, file)
            }
            None => self.render(apps, io::stdout().lock()),
        }
    }

    fn render<W: Write>(&self, apps: &[DiscoveredApp], mut writer: W) -> Result<(), ReportError> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut writer, apps)?;
                writeln!(writer)?;
                Ok(())
            }
            OutputFormat::Csv => {
                let mut csv_writer = csv::Writer::from_writer(writer);
                for app in apps {
                    csv_writer.serialize(app)?;
                }
                csv_writer.flush()?;
                Ok(())
            }
            OutputFormat::Text => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> DiscoveredApp {
        DiscoveredApp {
            server: "wls1.example.com".to_string(),
            app_name: "shoppingcart".to_string(),
            app_file_location: "/opt/apps/shoppingcart.ear".to_string(),
            server_type: "weblogic".to_string(),
            weblogic_server_name: "AdminServer".to_string(),
            weblogic_version: Some("14.1.1.0.0".to_string()),
            runtime_jdk_version: Some("11.0.22".to_string()),
            os_name: Some("ol".to_string()),
            os_version: Some("8.9".to_string()),
            jvm_memory_mb: Some(2048),
            last_modified_time: DateTime::from_timestamp(1700000000, 0),
            oracle_home: "/opt/oracle".to_string(),
            domain_home: "/opt/domains/base_domain".to_string(),
        }
    }

    #[test]
    fn json_report_uses_camel_case_fields() {
        let writer = ReportWriter::new(OutputFormat::Json, None);
        let mut buffer = Vec::new();
        writer.render(&[app()], &mut buffer).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        let row = &value[0];
        assert_eq!(row["appName"], "shoppingcart");
        assert_eq!(row["appFileLocation"], "/opt/apps/shoppingcart.ear");
        assert_eq!(row["weblogicServerName"], "AdminServer");
        assert_eq!(row["jvmMemoryMb"], 2048);
        assert_eq!(row["serverType"], "weblogic");
    }

    #[test]
    fn csv_report_has_a_header_and_one_row_per_app() {
        let writer = ReportWriter::new(OutputFormat::Csv, None);
        let mut buffer = Vec::new();
        writer.render(&[app(), app()], &mut buffer).unwrap();

        let rendered = String::from_utf8(buffer).unwrap();
        let mut lines = rendered.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("server,appName,appFileLocation"));
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn text_format_writes_no_report() {
        let writer = ReportWriter::new(OutputFormat::Text, None);
        let mut buffer = Vec::new();
        writer.render(&[app()], &mut buffer).unwrap();
        assert!(buffer.is_empty());
    }
}
