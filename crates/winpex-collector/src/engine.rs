use std::{fmt, str::FromStr};

use winpex_common::error::WinpexError;

/// Which acquisition mechanism collectors use for performance counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PerfCounterEngine {
    /// Decode snapshot blobs of named performance objects.
    #[default]
    Legacy,
    /// Query named counters through a handle opened at build time.
    Direct,
}

impl PerfCounterEngine {
    /// Parses `value`, falling back to the default engine when it is not
    /// recognised.
    pub fn parse_or_default(value: &str) -> Self {
        value.parse().unwrap_or_else(|err: WinpexError| {
            let fallback = Self::default();
            tracing::warn!(error = %err, fallback = %fallback, "unrecognised perf counter engine");
            fallback
        })
    }
}

impl fmt::Display for PerfCounterEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "legacy"),
            Self::Direct => write!(f, "direct"),
        }
    }
}

impl FromStr for PerfCounterEngine {
    type Err = WinpexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "direct" | "pdh" => Ok(Self::Direct),
            other => Err(WinpexError::InvalidArgument(format!(
                "unknown perf counter engine: {other}"
            ))),
        }
    }
}
