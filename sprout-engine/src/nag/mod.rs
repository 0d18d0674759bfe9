mod driver;
mod state;

pub use driver::NagDriver;
pub use state::{
    micro_interval_ms, on_alarm_fired, Effect, FireOutcome, NagPhase, Step,
    HOURLY_THRESHOLD_MS, MICRO_INTERVAL_LONG_MS, MICRO_INTERVAL_SHORT_MS, MICRO_LOOP_TIMEOUT_MS,
};
