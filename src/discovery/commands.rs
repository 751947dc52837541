//! Command lines issued on the target host.

pub const PROCESS_SCAN: &str = "ps axo pid,uid,cmd|grep weblogic.Server| grep -v grep";

pub const TOTAL_MEMORY: &str = "cat /proc/meminfo | grep MemTotal | awk '{print $2}'";

pub const OS_NAME: &str = "grep '^ID=' /etc/os-release | awk -F= '{print $2}'";
pub const OS_VERSION: &str = "grep '^VERSION_ID=' /etc/os-release | awk -F= '{print $2}'";
pub const ORACLE_OS_NAME: &str = "cat /etc/oracle-release | awk '{print $1}'";
pub const ORACLE_OS_VERSION: &str = "cat /etc/oracle-release | awk '{print $3}'";

pub fn jdk_version(java_cmd: &str) -> String {
    format!(r#"{java_cmd} -version 2>&1 | head -n 1 | awk -F '"' '{{print $2}}'"#)
}

pub fn last_modified(path: &str) -> String {
    format!("stat -c %Y {path}")
}

pub fn weblogic_version(domain_home: &str) -> String {
    format!(". {domain_home}/bin/setDomainEnv.sh; java weblogic.version -verbose")
}

pub fn create_scratch_dir(name: &str) -> String {
    format!("mkdir {name}; cd {name}; pwd")
}

pub fn remove_scratch_dir(path: &str) -> String {
    format!("rm -rf {path}/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jdk_version_pipes_through_awk() {
        assert_eq!(
            jdk_version("/opt/jdk/bin/java"),
            r#"/opt/jdk/bin/java -version 2>&1 | head -n 1 | awk -F '"' '{print $2}'"#
        );
    }

    #[test]
    fn scratch_dir_commands_round_trip() {
        assert_eq!(
            create_scratch_dir("discover_weblogic_x"),
            "mkdir discover_weblogic_x; cd discover_weblogic_x; pwd"
        );
        assert_eq!(
            remove_scratch_dir("/home/oracle/discover_weblogic_x"),
            "rm -rf /home/oracle/discover_weblogic_x/"
        );
    }
}
