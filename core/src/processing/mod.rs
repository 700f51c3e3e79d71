pub mod extrapolator;
pub mod final_calc;
pub mod relay;

pub use extrapolator::{extrapolate, ExtrapolationConfig, TrackExtrapolator};
pub use final_calc::{calculate_final_delay, FinalCalcConfig, FinalCalculatorService};
pub use relay::{stamp_first_hop, RelayService};
