use crate::config::toml_config::SpectatorConfig;
use crate::config::Config;
use crate::core::registry::Registry;
use crate::domain::meter_type::MeterType;
use crate::utils::error::{Result, SpectatorError};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "spectator")]
#[command(about = "Send and inspect SpectatorD protocol lines")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output location (memory, udp, unix, udp://host:port, unix:///path)
    #[arg(long, global = true)]
    pub location: Option<String>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record one measurement through a meter
    Send(SendArgs),
    /// Print protocol lines received on a socket
    Listen(ListenArgs),
    /// Load and validate the configuration file
    CheckConfig,
}

#[derive(Debug, Clone, Args)]
pub struct SendArgs {
    /// Meter type symbol: A c d g m C U D T t
    #[arg(short = 't', long = "type", value_parser = parse_meter_type)]
    pub meter_type: MeterType,

    #[arg(short, long)]
    pub name: String,

    /// Tag as key=value, may be repeated
    #[arg(long = "tag", value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,

    /// Gauge TTL in seconds
    #[arg(long)]
    pub ttl: Option<u32>,

    /// Value to record; `now` is accepted for age gauges
    #[arg(long, allow_hyphen_values = true)]
    pub value: String,
}

#[derive(Debug, Clone, Args)]
pub struct ListenArgs {
    /// Location to bind, e.g. udp://127.0.0.1:1234
    #[arg(long = "bind", default_value = "udp://127.0.0.1:1234")]
    pub bind: String,

    /// Print each line as JSON
    #[arg(long)]
    pub json: bool,

    /// Stop after this many lines
    #[arg(long)]
    pub count: Option<usize>,
}

fn parse_meter_type(value: &str) -> std::result::Result<MeterType, String> {
    let mut chars = value.chars();
    let meter_type = match (chars.next(), chars.next()) {
        (Some(c), None) => MeterType::from_symbol(c),
        _ => MeterType::ALL.iter().copied().find(|t| t.name() == value),
    };
    meter_type.ok_or_else(|| format!("unknown meter type '{}'", value))
}

fn parse_tag(value: &str) -> std::result::Result<(String, String), String> {
    match value.split_once('=') {
        Some((k, v)) if !k.is_empty() && !v.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("tag '{}' must look like key=value", value)),
    }
}

impl CliConfig {
    /// 組合設定檔與命令列參數，命令列的 --location 優先
    pub fn load_config(&self) -> Result<Config> {
        let mut file_config = match &self.config {
            Some(path) => SpectatorConfig::from_file(path)?,
            None => SpectatorConfig::default(),
        };
        if let Some(location) = &self.location {
            file_config.writer.location = location.clone();
        }
        file_config.into_config()
    }
}

impl SendArgs {
    fn invalid_value(&self, expected: &str) -> SpectatorError {
        SpectatorError::InvalidConfigValueError {
            field: "value".to_string(),
            value: self.value.clone(),
            reason: format!("{} expects {}", self.meter_type, expected),
        }
    }

    fn float(&self) -> Result<f64> {
        self.value
            .parse::<f64>()
            .map_err(|_| self.invalid_value("a number"))
    }

    fn int(&self) -> Result<i64> {
        self.value
            .parse::<i64>()
            .map_err(|_| self.invalid_value("an integer"))
    }

    /// Emits the measurement through the matching meter.
    pub fn emit(&self, registry: &Registry) -> Result<()> {
        let tags: Vec<(&str, &str)> = self
            .tags
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        let name = self.name.as_str();

        match self.meter_type {
            MeterType::AgeGauge => {
                let g = registry.age_gauge(name, &tags);
                if self.value == "now" {
                    g.now();
                } else {
                    g.set(self.float()?);
                }
            }
            MeterType::Counter => registry.counter(name, &tags).add(self.float()?),
            MeterType::DistributionSummary => {
                registry.distribution_summary(name, &tags).record(self.int()?)
            }
            MeterType::Gauge => registry.gauge(name, &tags, self.ttl).set(self.float()?),
            MeterType::MaxGauge => registry.max_gauge(name, &tags).set(self.float()?),
            MeterType::MonotonicCounter => {
                registry.monotonic_counter(name, &tags).set(self.float()?)
            }
            MeterType::MonotonicCounterUint => {
                let amount = self
                    .value
                    .parse::<u64>()
                    .map_err(|_| self.invalid_value("an unsigned integer"))?;
                registry.monotonic_counter_uint(name, &tags).set(amount)
            }
            MeterType::PercentileDistributionSummary => {
                registry.pct_distribution_summary(name, &tags).record(self.int()?)
            }
            MeterType::PercentileTimer => registry.pct_timer(name, &tags).record(self.float()?),
            MeterType::Timer => registry.timer(name, &tags).record(self.float()?),
        }

        tracing::debug!("Sent {} measurement for {}", self.meter_type, self.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::writer_config::{WriterConfig, MEMORY};

    fn memory_registry() -> Registry {
        let writer_config = WriterConfig::resolve(MEMORY, None).unwrap();
        Registry::new(Config::with_env_lookup(writer_config, &[], |_| None)).unwrap()
    }

    fn send(args: &[&str]) -> SendArgs {
        let mut argv = vec!["spectator", "send"];
        argv.extend_from_slice(args);
        match CliConfig::parse_from(argv).command {
            Command::Send(send) => send,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_send_command() {
        let args = send(&["-t", "g", "-n", "temp", "--tag", "room=lab", "--ttl", "30", "--value", "-4.5"]);
        assert_eq!(args.meter_type, MeterType::Gauge);
        assert_eq!(args.tags, vec![("room".to_string(), "lab".to_string())]);
        assert_eq!(args.ttl, Some(30));
        assert_eq!(args.value, "-4.5");

        let by_name = send(&["--type", "percentile_timer", "-n", "x", "--value", "1"]);
        assert_eq!(by_name.meter_type, MeterType::PercentileTimer);
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(CliConfig::try_parse_from(["spectator", "send", "-t", "x", "-n", "a", "--value", "1"]).is_err());
        assert!(CliConfig::try_parse_from(["spectator", "send", "-t", "c", "-n", "a", "--tag", "novalue", "--value", "1"]).is_err());
    }

    #[test]
    fn test_emit_formats_lines() {
        let registry = memory_registry();
        let memory = registry.memory_writer().unwrap();

        send(&["-t", "c", "-n", "hits", "--tag", "app=web", "--value", "3"]).emit(&registry).unwrap();
        assert_eq!(memory.last_line(), "c:hits,app=web:3.000000\n");

        send(&["-t", "g", "-n", "temp", "--ttl", "30", "--value", "21.5"]).emit(&registry).unwrap();
        assert_eq!(memory.last_line(), "g,30:temp:21.500000\n");

        send(&["-t", "A", "-n", "last_run", "--value", "now"]).emit(&registry).unwrap();
        assert_eq!(memory.last_line(), "A:last_run:0\n");

        send(&["-t", "U", "-n", "total", "--value", "7"]).emit(&registry).unwrap();
        assert_eq!(memory.last_line(), "U:total:7\n");
    }

    #[test]
    fn test_emit_rejects_wrong_value_kind() {
        let registry = memory_registry();
        assert!(send(&["-t", "d", "-n", "size", "--value", "1.5"]).emit(&registry).is_err());
        assert!(send(&["-t", "U", "-n", "total", "--value", "-1"]).emit(&registry).is_err());
        assert!(send(&["-t", "c", "-n", "hits", "--value", "many"]).emit(&registry).is_err());
        assert!(registry.memory_writer().unwrap().is_empty());
    }

    #[test]
    fn test_global_flags() {
        let cli = CliConfig::parse_from(["spectator", "check-config", "--json-logs", "-v", "-c", "s.toml"]);
        assert!(cli.json_logs);
        assert!(cli.verbose);
        assert_eq!(cli.config.as_deref(), Some("s.toml"));
        assert!(matches!(cli.command, Command::CheckConfig));
    }

    #[test]
    fn test_listen_defaults() {
        let cli = CliConfig::parse_from(["spectator", "listen", "--count", "3"]);
        match cli.command {
            Command::Listen(args) => {
                assert_eq!(args.bind, "udp://127.0.0.1:1234");
                assert_eq!(args.count, Some(3));
                assert!(!args.json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
