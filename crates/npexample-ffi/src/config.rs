//! Logging configuration read from the browser process environment.

/// Default filter directive when `NPEXAMPLE_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Where plugin logs go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `EnvFilter` directives, e.g. `"npexample=debug"`.
    pub filter: String,
    /// Forward events to the system log.
    pub syslog: bool,
    /// Also write formatted events to the browser's stderr.
    pub stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            syslog: true,
            stderr: false,
        }
    }
}

impl LogConfig {
    /// Load from `NPEXAMPLE_LOG`, `NPEXAMPLE_SYSLOG` and `NPEXAMPLE_STDERR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            filter: lookup("NPEXAMPLE_LOG")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.filter),
            syslog: lookup("NPEXAMPLE_SYSLOG")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.syslog),
            stderr: lookup("NPEXAMPLE_STDERR")
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.stderr),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
