pub mod kinematics;

pub use kinematics::KinematicsHelper;
