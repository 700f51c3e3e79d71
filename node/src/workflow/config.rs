use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::Path;
use std::time::Duration;
use trackcore::processing::{ExtrapolationConfig, FinalCalcConfig};

use crate::generator::profile::GeneratorConfig;

/// A named multicast stream one hop publishes on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub name: String,
    pub group: Ipv4Addr,
    pub port: u16,
}

impl ChannelConfig {
    pub fn new(name: &str, group: Ipv4Addr, port: u16) -> Self {
        Self {
            name: name.to_string(),
            group,
            port,
        }
    }

    pub fn target(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.group, self.port)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelSet {
    pub source: ChannelConfig,
    pub delay: ChannelConfig,
    #[serde(rename = "final")]
    pub final_calc: ChannelConfig,
}

impl Default for ChannelSet {
    fn default() -> Self {
        Self {
            source: ChannelConfig::new("source", Ipv4Addr::new(239, 1, 1, 1), 9001),
            delay: ChannelConfig::new("delay", Ipv4Addr::new(239, 1, 1, 2), 9002),
            final_calc: ChannelConfig::new("final", Ipv4Addr::new(239, 1, 1, 5), 9595),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Local interface for group membership and outgoing multicast.
    pub interface: Ipv4Addr,
    pub ttl: u32,
    pub loopback: bool,
    pub read_timeout_ms: u64,
}

impl TransportConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms.max(1))
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            interface: Ipv4Addr::UNSPECIFIED,
            ttl: 1,
            loopback: true,
            read_timeout_ms: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Serve the latency report over HTTP while listening.
    pub serve: bool,
    pub bind: SocketAddr,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            serve: false,
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub channels: ChannelSet,
    pub transport: TransportConfig,
    pub source: GeneratorConfig,
    pub extrapolation: ExtrapolationConfig,
    pub final_calc: FinalCalcConfig,
    pub listen: ListenConfig,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .validate()
            .with_context(|| format!("checking workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Rejects values the generator and final hop cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        let source = &self.source;
        anyhow::ensure!(
            source.max_speed_mps.is_finite(),
            "source.max_speed_mps must be finite, got {}",
            source.max_speed_mps
        );
        anyhow::ensure!(
            source.max_altitude_m.is_finite(),
            "source.max_altitude_m must be finite, got {}",
            source.max_altitude_m
        );
        anyhow::ensure!(
            !self.final_calc.high_velocity_mps.is_nan(),
            "final_calc.high_velocity_mps must be a number"
        );
        Ok(())
    }

    pub fn from_args(tracks: usize, bursts: usize, seed: u64) -> Self {
        Self {
            source: GeneratorConfig {
                tracks,
                bursts,
                seed,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_keeps_default_channels() {
        let cfg = WorkflowConfig::from_args(4, 2, 9);
        assert_eq!(cfg.source.tracks, 4);
        assert_eq!(cfg.channels.final_calc.target().to_string(), "239.1.1.5:9595");
        assert_eq!(cfg.extrapolation.samples, 25);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"channels:\n  delay:\n    name: processed\n    group: 239.1.1.9\n    port: 9100\n\
transport:\n  ttl: 4\nsource:\n  tracks: 3\nextrapolation:\n  samples: 10\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.channels.delay.name, "processed");
        assert_eq!(cfg.channels.delay.port, 9100);
        assert_eq!(cfg.channels.source, ChannelSet::default().source);
        assert_eq!(cfg.transport.ttl, 4);
        assert!(cfg.transport.loopback);
        assert_eq!(cfg.source.tracks, 3);
        assert_eq!(cfg.extrapolation.samples, 10);
        assert_eq!(cfg.extrapolation.interval_us, 5_000);
    }

    #[test]
    fn bundled_config_parses() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../config/relay.yaml");
        let cfg = WorkflowConfig::load(path).unwrap();
        let expected = WorkflowConfig {
            source: GeneratorConfig {
                bursts: 0,
                seed: 42,
                ..Default::default()
            },
            listen: ListenConfig {
                serve: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(cfg, expected);
    }

    #[test]
    fn config_load_rejects_infinite_speed_limit() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"source:\n  max_speed_mps: .inf\n").unwrap();
        let path = temp.into_temp_path();
        let err = WorkflowConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("checking workflow config"));
        assert!(format!("{:#}", err).contains("max_speed_mps must be finite"));
    }

    #[test]
    fn config_load_reads_final_thresholds() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"final_calc:\n  max_data_age_us: 250000\n").unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.final_calc.max_data_age_us, 250_000);
        assert_eq!(cfg.final_calc.high_velocity_mps, 100.0);
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = WorkflowConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("reading workflow config"));
    }
}
