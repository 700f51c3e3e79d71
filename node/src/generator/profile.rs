use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use trackcore::model::{EcefVector, TrackData};

/// WGS-84 equatorial radius in metres.
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Configuration for generating synthetic track updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub tracks: usize,
    /// Number of update rounds; 0 keeps publishing until stopped.
    pub bursts: usize,
    pub interval_ms: u64,
    pub seed: u64,
    pub max_altitude_m: f64,
    pub max_speed_mps: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tracks: 8,
            bursts: 1,
            interval_ms: 1_000,
            seed: 0,
            max_altitude_m: 12_000.0,
            max_speed_mps: 340.0,
        }
    }
}

/// Seeded producer of valid track updates, one per configured track id.
pub struct TrackGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl TrackGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// One update per track, all stamped with `update_time`.
    pub fn next_burst(&mut self, update_time: i64) -> Vec<TrackData> {
        (1..=self.config.tracks)
            .filter_map(|index| i32::try_from(index).ok())
            .map(|track_id| {
                let position = self.random_position();
                let velocity = self.random_velocity();
                TrackData::new(track_id, position, velocity).with_times(update_time, update_time)
            })
            .collect()
    }

    fn random_position(&mut self) -> EcefVector {
        let latitude = self.rng.gen_range(-PI / 2.0..PI / 2.0);
        let longitude = self.rng.gen_range(-PI..PI);
        let altitude = self.rng.gen_range(0.0..=finite_or_zero(self.config.max_altitude_m));
        let radius = EARTH_RADIUS_M + altitude;
        EcefVector::new(
            radius * latitude.cos() * longitude.cos(),
            radius * latitude.cos() * longitude.sin(),
            radius * latitude.sin(),
        )
    }

    fn random_velocity(&mut self) -> EcefVector {
        let limit = finite_or_zero(self.config.max_speed_mps) / 3f64.sqrt();
        if limit == 0.0 {
            return EcefVector::default();
        }
        EcefVector::new(
            self.rng.gen_range(-limit..=limit),
            self.rng.gen_range(-limit..=limit),
            self.rng.gen_range(-limit..=limit),
        )
    }
}

/// Non-negative finite bound for a sampling range; anything else samples zero.
fn finite_or_zero(limit: f64) -> f64 {
    if limit.is_finite() {
        limit.abs()
    } else {
        0.0
    }
}
