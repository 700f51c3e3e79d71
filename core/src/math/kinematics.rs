use crate::model::EcefVector;

/// Velocity sanity bound: 1000 times the speed of light, in m/s.
pub const MAX_SPEED_MPS: f64 = 299_792_458_000.0;

pub struct KinematicsHelper;

impl KinematicsHelper {
    /// Euclidean norm of an ECEF vector. Overflows to infinity rather than panicking.
    pub fn magnitude(vector: &EcefVector) -> f64 {
        (vector.x * vector.x + vector.y * vector.y + vector.z * vector.z).sqrt()
    }

    /// Constant-velocity propagation of `position` by `seconds`.
    pub fn propagate(position: &EcefVector, velocity: &EcefVector, seconds: f64) -> EcefVector {
        EcefVector::new(
            position.x + velocity.x * seconds,
            position.y + velocity.y * seconds,
            position.z + velocity.z * seconds,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_of_pythagorean_triple() {
        assert_eq!(KinematicsHelper::magnitude(&EcefVector::new(2.0, 3.0, 6.0)), 7.0);
        assert_eq!(KinematicsHelper::magnitude(&EcefVector::default()), 0.0);
    }

    #[test]
    fn magnitude_overflows_to_infinity() {
        let huge = EcefVector::new(f64::MAX, f64::MAX, 0.0);
        assert!(KinematicsHelper::magnitude(&huge).is_infinite());
    }

    #[test]
    fn propagate_moves_along_velocity() {
        let moved = KinematicsHelper::propagate(
            &EcefVector::new(1000.0, 2000.0, 3000.0),
            &EcefVector::new(100.0, -200.0, 0.0),
            0.5,
        );
        assert_eq!(moved, EcefVector::new(1050.0, 1900.0, 3000.0));
    }
}
