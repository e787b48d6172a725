//! Extension configuration, read from the plugin config the host supplies.

use crate::bridge::HostBridge;

/// Runtime settings for the extension kit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdkConfig {
    /// `EnvFilter` directives for the log layer (default: `info`).
    pub log_filter: String,
    /// Log every outgoing command envelope at info level (default: true).
    pub log_commands: bool,
    /// Upper bound for a single socket read, in bytes (default: 1024).
    pub socket_read_limit: u64,
    /// Host process id, when the host provides one.
    pub pid: Option<u32>,
}

impl Default for EdkConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            log_commands: true,
            socket_read_limit: 1024,
            pid: None,
        }
    }
}

impl EdkConfig {
    /// Build config from the host's plugin config.
    ///
    /// Missing keys and unparseable values fall back to defaults.
    pub fn from_bridge(bridge: &dyn HostBridge) -> Self {
        let defaults = Self::default();
        let get = |key: &str| match bridge.config(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, "failed to read plugin config: {e}");
                None
            }
        };

        Self {
            log_filter: get("log_filter")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.log_filter),
            log_commands: parse_or::<bool>(
                "log_commands",
                get("log_commands").map(|v| v.to_ascii_lowercase()),
            )
            .unwrap_or(defaults.log_commands),
            socket_read_limit: parse_or("socket_read_limit", get("socket_read_limit"))
                .filter(|limit| *limit > 0)
                .unwrap_or(defaults.socket_read_limit),
            pid: parse_or("pid", get("pid")),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key = %key, value = %raw, "ignoring unparseable config value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockHost;

    #[test]
    fn test_default_config() {
        let config = EdkConfig::default();
        assert_eq!(config.log_filter, "info");
        assert!(config.log_commands);
        assert_eq!(config.socket_read_limit, 1024);
        assert_eq!(config.pid, None);
    }

    #[test]
    fn test_from_bridge_without_values() {
        let host = MockHost::new();
        assert_eq!(EdkConfig::from_bridge(&host), EdkConfig::default());
    }

    #[test]
    fn test_from_bridge_reads_values() {
        let host = MockHost::new()
            .with_config("log_filter", "moosync_edk=debug")
            .with_config("log_commands", "FALSE")
            .with_config("socket_read_limit", "4096")
            .with_config("pid", "4242");
        let config = EdkConfig::from_bridge(&host);
        assert_eq!(config.log_filter, "moosync_edk=debug");
        assert!(!config.log_commands);
        assert_eq!(config.socket_read_limit, 4096);
        assert_eq!(config.pid, Some(4242));
    }

    #[test]
    fn test_from_bridge_bad_values_fall_back() {
        let host = MockHost::new()
            .with_config("socket_read_limit", "lots")
            .with_config("pid", "-1")
            .with_config("log_filter", "  ");
        let config = EdkConfig::from_bridge(&host);
        assert_eq!(config.socket_read_limit, 1024);
        assert_eq!(config.pid, None);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_log_commands_only_accepts_booleans() {
        let host = MockHost::new().with_config("log_commands", "no");
        assert!(EdkConfig::from_bridge(&host).log_commands);

        let host = MockHost::new().with_config("log_commands", "0");
        assert!(EdkConfig::from_bridge(&host).log_commands);

        let host = MockHost::new().with_config("log_commands", " false ");
        assert!(!EdkConfig::from_bridge(&host).log_commands);
    }

    #[test]
    fn test_zero_read_limit_falls_back() {
        let host = MockHost::new().with_config("socket_read_limit", "0");
        assert_eq!(EdkConfig::from_bridge(&host).socket_read_limit, 1024);
    }
}
