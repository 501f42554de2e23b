//! Default values for fleetsync configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Name of the configuration file looked up when `--config` is not given.
pub const DEFAULT_CONFIG_FILENAME: &str = "fleetsync.yaml";

/// Directory under the master directory holding the overlay tree.
pub const OVERLAY_DIRNAME: &str = "overlay";

/// Directory under the master directory holding the delete tree.
pub const DELETE_DIRNAME: &str = "delete";

/// Default upper bound on parallel worker processes.
pub const NUM_PROC: usize = 16;

/// Returns the configuration path used when none is given.
///
/// This can be overridden by the `--config` CLI flag or the
/// `FLEETSYNC_CONFIG` environment variable.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILENAME)
}

/// Returns the name of the node running this process.
///
/// Falls back to `localhost` if the host name cannot be determined.
pub fn local_nodename() -> String {
    let mut buf = [0u8; 256];
    // SAFETY: the buffer is valid for `buf.len()` bytes and gethostname
    // writes at most that many.
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr().cast(), buf.len()) };
    if rc != 0 {
        return "localhost".to_string();
    }
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    let name = String::from_utf8_lossy(&buf[..len]);
    // short name only
    match name.split('.').next() {
        Some(short) if !short.is_empty() => short.to_string(),
        _ => "localhost".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_path() {
        assert_eq!(default_config_path(), PathBuf::from("fleetsync.yaml"));
    }

    #[test]
    fn test_local_nodename_is_short() {
        let name = local_nodename();
        assert!(!name.is_empty());
        assert!(!name.contains('.'));
    }
}
