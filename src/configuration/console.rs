use serde::Deserialize;
use std::fmt::{Debug, Formatter};

pub const DEFAULT_CONSOLE_USERNAME: &str = "weblogic";
pub const DEFAULT_CONSOLE_PORT: u16 = 7001;

/// Credential for the WebLogic administration console, used to build the
/// `connect(...)` call handed to WLST on the target host.
#[derive(Deserialize, Clone)]
pub struct ConsoleConfiguration {
    #[serde(default = "default_console_username")]
    pub username: String,
    pub password: String,
    #[serde(default = "default_console_port")]
    pub port: u16,
}

impl Debug for ConsoleConfiguration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleConfiguration")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("port", &self.port)
            .finish()
    }
}

fn default_console_username() -> String {
    DEFAULT_CONSOLE_USERNAME.to_string()
}

fn default_console_port() -> u16 {
    DEFAULT_CONSOLE_PORT
}
