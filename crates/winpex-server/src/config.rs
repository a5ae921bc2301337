use std::{path::PathBuf, time::Duration};

use clap::Parser;
use winpex_collector::PerfCounterEngine;
use winpex_common::error::{Result, WinpexError};

/// Environment variable consulted when `--perf-counters.engine` is not given.
pub const ENGINE_ENV: &str = "WINPEX_PERF_COUNTERS_ENGINE";

#[derive(Parser, Debug, Clone)]
#[command(name = "winpex", about = "Prometheus exporter for Windows performance counters")]
pub struct Cli {
    #[arg(long = "web.listen-address", default_value = "0.0.0.0:9182")]
    pub listen_address: String,

    #[arg(long = "telemetry.path", default_value = "/metrics")]
    pub telemetry_path: String,

    /// Comma separated list of collectors to enable.
    #[arg(long = "collectors.enabled", default_value = "dhcp")]
    pub collectors_enabled: String,

    /// Performance counter engine: `legacy` or `direct`.
    #[arg(long = "perf-counters.engine")]
    pub perf_counters_engine: Option<String>,

    /// Directory holding `<object>.json` performance object snapshots.
    #[arg(long = "perfdata.dir", default_value = "./perfdata")]
    pub perfdata_dir: PathBuf,

    /// Seconds subtracted from the scraper's timeout header.
    #[arg(long = "scrape.timeout-margin", default_value_t = 0.5)]
    pub scrape_timeout_margin: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExporterConfig {
    pub listen_address: String,
    pub telemetry_path: String,
    pub collectors: Vec<String>,
    pub engine: PerfCounterEngine,
    pub perfdata_dir: PathBuf,
    pub timeout_margin: Duration,
}

impl ExporterConfig {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        Self::resolve(cli, std::env::var(ENGINE_ENV).ok())
    }

    /// Merges the command line with the engine read from the environment.
    /// The command line wins when both are set.
    pub fn resolve(cli: Cli, env_engine: Option<String>) -> Result<Self> {
        let engine = cli
            .perf_counters_engine
            .or(env_engine)
            .map(|value| PerfCounterEngine::parse_or_default(&value))
            .unwrap_or_default();

        if !cli.telemetry_path.starts_with('/') {
            return Err(WinpexError::InvalidArgument(format!(
                "telemetry path must start with '/': {}",
                cli.telemetry_path
            )));
        }
        if cli.telemetry_path == crate::router::HEALTH_PATH {
            return Err(WinpexError::InvalidArgument(format!(
                "telemetry path collides with {}",
                crate::router::HEALTH_PATH
            )));
        }

        let timeout_margin = Duration::try_from_secs_f64(cli.scrape_timeout_margin).map_err(|_| {
            WinpexError::InvalidArgument(format!(
                "scrape timeout margin must be a non-negative number of seconds: {}",
                cli.scrape_timeout_margin
            ))
        })?;

        Ok(Self {
            listen_address: cli.listen_address,
            telemetry_path: cli.telemetry_path,
            collectors: parse_collector_list(&cli.collectors_enabled)?,
            engine,
            perfdata_dir: cli.perfdata_dir,
            timeout_margin,
        })
    }
}

fn parse_collector_list(value: &str) -> Result<Vec<String>> {
    let mut collectors: Vec<String> = Vec::new();
    for name in value
        .split(',')
        .map(|name| name.trim().to_ascii_lowercase())
        .filter(|name| !name.is_empty())
    {
        if !collectors.contains(&name) {
            collectors.push(name);
        }
    }

    if collectors.is_empty() {
        return Err(WinpexError::InvalidArgument(
            "--collectors.enabled must name at least one collector".to_string(),
        ));
    }
    Ok(collectors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("winpex").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let config = ExporterConfig::resolve(cli(&[]), None).unwrap();

        assert_eq!(config.listen_address, "0.0.0.0:9182");
        assert_eq!(config.telemetry_path, "/metrics");
        assert_eq!(config.collectors, vec!["dhcp".to_string()]);
        assert_eq!(config.engine, PerfCounterEngine::Legacy);
        assert_eq!(config.perfdata_dir, PathBuf::from("./perfdata"));
        assert_eq!(config.timeout_margin, Duration::from_millis(500));
    }

    #[test]
    fn engine_flag_overrides_environment() {
        let config = ExporterConfig::resolve(
            cli(&["--perf-counters.engine", "direct"]),
            Some("legacy".to_string()),
        )
        .unwrap();
        assert_eq!(config.engine, PerfCounterEngine::Direct);

        let config = ExporterConfig::resolve(cli(&[]), Some("direct".to_string())).unwrap();
        assert_eq!(config.engine, PerfCounterEngine::Direct);
    }

    #[test]
    fn unrecognised_engine_falls_back_to_legacy() {
        let config = ExporterConfig::resolve(cli(&["--perf-counters.engine", "wmi"]), None).unwrap();

        assert_eq!(config.engine, PerfCounterEngine::Legacy);
    }

    #[test]
    fn collector_list_is_trimmed_and_deduplicated() {
        let config =
            ExporterConfig::resolve(cli(&["--collectors.enabled", " DHCP, ,dhcp"]), None).unwrap();
        assert_eq!(config.collectors, vec!["dhcp".to_string()]);

        let err = ExporterConfig::resolve(cli(&["--collectors.enabled", " , "]), None).unwrap_err();
        assert!(matches!(err, WinpexError::InvalidArgument(_)));
    }

    #[test]
    fn rejects_invalid_paths_and_margins() {
        assert!(ExporterConfig::resolve(cli(&["--telemetry.path", "metrics"]), None).is_err());
        assert!(ExporterConfig::resolve(cli(&["--telemetry.path", "/health"]), None).is_err());
        assert!(ExporterConfig::resolve(cli(&["--scrape.timeout-margin=-1"]), None).is_err());
        assert!(ExporterConfig::resolve(cli(&["--scrape.timeout-margin=NaN"]), None).is_err());

        let err =
            ExporterConfig::resolve(cli(&["--scrape.timeout-margin=1e30"]), None).unwrap_err();
        assert!(matches!(err, WinpexError::InvalidArgument(_)));
    }
}
