use serde::{Deserialize, Serialize};

use crate::math::kinematics::{KinematicsHelper, MAX_SPEED_MPS};

/// Cartesian triple in the Earth-centered, Earth-fixed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EcefVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl EcefVector {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// First validity condition a telemetry record fails.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Violation {
    #[error("track id {0} is not positive")]
    NonPositiveTrackId(i32),
    #[error("{0} is not finite")]
    NonFinite(&'static str),
    #[error("{field} is negative ({value})")]
    NegativeTimestamp { field: &'static str, value: i64 },
    #[error("velocity magnitude {0} m/s exceeds sanity bound")]
    ExcessiveVelocity(f64),
}

/// One tracked object at one instant, as emitted by the source hop.
///
/// Positions are metres and velocities metres per second, both ECEF.
/// Timestamps are microseconds since the UNIX epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackData {
    pub track_id: i32,
    pub position: EcefVector,
    pub velocity: EcefVector,
    pub update_time: i64,
    pub original_update_time: i64,
    pub first_hop_sent_time: i64,
}

impl TrackData {
    pub fn new(track_id: i32, position: EcefVector, velocity: EcefVector) -> Self {
        Self {
            track_id,
            position,
            velocity,
            update_time: 0,
            original_update_time: 0,
            first_hop_sent_time: 0,
        }
    }

    pub fn with_times(mut self, original_update_time: i64, update_time: i64) -> Self {
        self.original_update_time = original_update_time;
        self.update_time = update_time;
        self
    }

    /// Classifies the record, naming the first failed condition.
    pub fn validate(&self) -> Result<(), Violation> {
        if self.track_id <= 0 {
            return Err(Violation::NonPositiveTrackId(self.track_id));
        }
        let components = [
            ("position.x", self.position.x),
            ("position.y", self.position.y),
            ("position.z", self.position.z),
            ("velocity.x", self.velocity.x),
            ("velocity.y", self.velocity.y),
            ("velocity.z", self.velocity.z),
        ];
        if let Some((field, _)) = components.iter().find(|(_, value)| !value.is_finite()) {
            return Err(Violation::NonFinite(*field));
        }
        for (field, value) in [
            ("update_time", self.update_time),
            ("original_update_time", self.original_update_time),
            ("first_hop_sent_time", self.first_hop_sent_time),
        ] {
            if value < 0 {
                return Err(Violation::NegativeTimestamp { field, value });
            }
        }
        let speed = KinematicsHelper::magnitude(&self.velocity);
        if speed > MAX_SPEED_MPS {
            return Err(Violation::ExcessiveVelocity(speed));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}
