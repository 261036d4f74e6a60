pub mod init;
pub mod policy;
pub mod redact;
pub mod resolve_key;
pub mod verify;

use anyhow::Context;

/// Read a JSON argument given either as a file path or inline.
pub fn read_json_arg(arg: &str) -> anyhow::Result<serde_json::Value> {
    let path = std::path::Path::new(arg);
    let json_str = if path.exists() {
        std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?
    } else {
        arg.to_string()
    };
    serde_json::from_str(&json_str).map_err(|e| anyhow::anyhow!("invalid JSON: {}", e))
}
