//! Discover deployed applications on a remote WebLogic Server host: connect
//! over SSH, locate the server process, query the administration console via
//! WLST and report each deployment's name and absolute source path.

pub mod configuration;
pub mod console;
pub mod discovery;
pub mod machine;
pub mod report;
pub mod util;
