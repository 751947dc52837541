/// Normalize single-value command output: strip surrounding whitespace and
/// any quoting the remote shell or /etc files carry.
pub fn clean_output(raw: &str) -> String {
    raw.trim().replace(['"', '\''], "")
}
