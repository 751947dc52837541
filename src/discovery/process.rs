use thiserror::Error;

const JAVA_CMD: &str = "java";
const JVM_OPTION_XMX: &str = "-Xmx";
const JVM_OPTION_MAX_RAM_PERCENTAGE: &str = "-XX:MaxRAMPercentage";
const WEBLOGIC_NAME: &str = "-Dweblogic.Name=";
const WEBLOGIC_HOME: &str = "-Dweblogic.home=";
const WLSERVER_SUFFIX: &str = "/wlserver/server";

pub const KIB: u64 = 1024;
pub const MIB: u64 = KIB * 1024;
pub const GIB: u64 = MIB * 1024;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to parse pid from process line: {line}")]
    Pid { line: String },
    #[error("failed to parse uid from process line: {line}")]
    Uid { line: String },
    #[error("cannot locate java command in scanned process options")]
    NoJavaCommand,
    #[error("failed to parse {option} value: {value}")]
    JvmOption {
        option: &'static str,
        value: String,
    },
}

/// One running WebLogic Server JVM as reported by the process scan.
#[derive(Debug, Clone)]
pub struct ServerProcess {
    pid: u32,
    uid: u32,
    java_cmd: String,
    options: Vec<String>,
}

impl ServerProcess {
    /// Parse one `ps axo pid,uid,cmd` line: pid, uid, then everything up to
    /// the first token ending in `java` is ps noise, the rest are options.
    pub fn parse(line: &str) -> Result<Self, ProcessError> {
        let splits: Vec<&str> = line.split_whitespace().collect();
        let pid = splits
            .first()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| ProcessError::Pid {
                line: line.to_string(),
            })?;
        let uid = splits
            .get(1)
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| ProcessError::Uid {
                line: line.to_string(),
            })?;
        let java = splits
            .iter()
            .skip(2)
            .position(|split| split.ends_with(JAVA_CMD))
            .map(|index| index + 2)
            .ok_or(ProcessError::NoJavaCommand)?;

        Ok(Self {
            pid,
            uid,
            java_cmd: splits[java].to_string(),
            options: splits[java + 1..].iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn scan(output: &str) -> Result<Vec<Self>, ProcessError> {
        output
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(Self::parse)
            .collect()
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn java_cmd(&self) -> &str {
        &self.java_cmd
    }

    pub fn weblogic_name(&self) -> Option<&str> {
        self.option_value(WEBLOGIC_NAME)
    }

    pub fn weblogic_home(&self) -> Option<&str> {
        self.option_value(WEBLOGIC_HOME)
    }

    pub fn java_home(&self) -> &str {
        self.java_cmd
            .strip_suffix("/bin/java")
            .unwrap_or(&self.java_cmd)
    }

    pub fn oracle_home(&self) -> Option<&str> {
        self.weblogic_home()
            .map(|home| home.strip_suffix(WLSERVER_SUFFIX).unwrap_or(home))
    }

    /// Heap configured for this JVM. `-Xmx` wins over `-XX:MaxRAMPercentage`;
    /// the percentage needs the host's total memory to mean anything.
    pub fn configured_heap_bytes(
        &self,
        total_memory_bytes: Option<u64>,
    ) -> Result<Option<u64>, ProcessError> {
        for option in &self.options {
            if let Some(value) = option.strip_prefix(JVM_OPTION_XMX) {
                return parse_ram(value).map(Some);
            }
        }

        for option in &self.options {
            if let Some(value) = option
                .strip_prefix(JVM_OPTION_MAX_RAM_PERCENTAGE)
                .and_then(|v| v.strip_prefix('='))
            {
                let Some(total) = total_memory_bytes else {
                    return Ok(None);
                };
                let percent: f64 =
                    value.parse().map_err(|_| ProcessError::JvmOption {
                        option: JVM_OPTION_MAX_RAM_PERCENTAGE,
                        value: value.to_string(),
                    })?;
                return Ok(Some((total as f64 * percent / 100.0).round() as u64));
            }
        }

        Ok(None)
    }

    fn option_value(&self, prefix: &str) -> Option<&str> {
        self.options
            .iter()
            .find_map(|option| option.strip_prefix(prefix))
    }
}

fn parse_ram(value: &str) -> Result<u64, ProcessError> {
    let error = || ProcessError::JvmOption {
        option: JVM_OPTION_XMX,
        value: value.to_string(),
    };

    let trimmed = value.trim();
    let boundary = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(boundary);
    let amount: u64 = digits.parse().map_err(|_| error())?;
    let multiplier = match suffix.to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => KIB,
        "m" | "mb" | "mib" => MIB,
        "g" | "gb" | "gib" => GIB,
        _ => return Err(error()),
    };

    Ok(amount * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCAN_LINE: &str = "  4321 1000 /opt/jdk-11/bin/java -server -Xmx512m \
        -Dweblogic.Name=AdminServer -Dweblogic.home=/opt/oracle/wlserver/server \
        weblogic.Server";

    #[test]
    fn parses_a_scan_line() {
        let process = ServerProcess::parse(SCAN_LINE).unwrap();
        assert_eq!(process.pid(), 4321);
        assert_eq!(process.uid(), 1000);
        assert_eq!(process.java_cmd(), "/opt/jdk-11/bin/java");
        assert_eq!(process.weblogic_name(), Some("AdminServer"));
        assert_eq!(
            process.weblogic_home(),
            Some("/opt/oracle/wlserver/server")
        );
    }

    #[test]
    fn derives_homes() {
        let process = ServerProcess::parse(SCAN_LINE).unwrap();
        assert_eq!(process.java_home(), "/opt/jdk-11");
        assert_eq!(process.oracle_home(), Some("/opt/oracle"));
    }

    #[test]
    fn scan_skips_blank_lines() {
        let output = format!("\n{SCAN_LINE}\n   \n");
        let processes = ServerProcess::scan(&output).unwrap();
        assert_eq!(processes.len(), 1);
    }

    #[test]
    fn scan_of_empty_output_is_empty() {
        assert!(ServerProcess::scan("").unwrap().is_empty());
    }

    #[test]
    fn line_without_java_command_is_rejected() {
        let error = ServerProcess::parse("4321 1000 /usr/bin/python server.py").unwrap_err();
        assert!(matches!(error, ProcessError::NoJavaCommand));
    }

    #[test]
    fn xmx_takes_priority_over_percentage() {
        let process = ServerProcess::parse(
            "1 0 /usr/bin/java -Xmx2g -XX:MaxRAMPercentage=50.0 weblogic.Server",
        )
        .unwrap();
        assert_eq!(
            process.configured_heap_bytes(Some(8 * GIB)).unwrap(),
            Some(2 * GIB)
        );
    }

    #[test]
    fn percentage_applies_to_total_memory() {
        let process =
            ServerProcess::parse("1 0 /usr/bin/java -XX:MaxRAMPercentage=25.0 weblogic.Server")
                .unwrap();
        assert_eq!(
            process.configured_heap_bytes(Some(8 * GIB)).unwrap(),
            Some(2 * GIB)
        );
        assert_eq!(process.configured_heap_bytes(None).unwrap(), None);
    }

    #[test]
    fn unconfigured_heap_is_none() {
        let process = ServerProcess::parse("1 0 /usr/bin/java weblogic.Server").unwrap();
        assert_eq!(process.configured_heap_bytes(Some(GIB)).unwrap(), None);
    }

    #[test]
    fn parses_ram_suffixes() {
        assert_eq!(parse_ram("512m").unwrap(), 512 * MIB);
        assert_eq!(parse_ram("2G").unwrap(), 2 * GIB);
        assert_eq!(parse_ram("16k").unwrap(), 16 * KIB);
        assert_eq!(parse_ram("1048576").unwrap(), 1048576);
        assert!(parse_ram("12x").is_err());
        assert!(parse_ram("").is_err());
    }
}
