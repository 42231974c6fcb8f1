mod maths_utils;
mod perf;
mod time_utils;

pub use time_utils::{TimeUtils, epoch_ms_to_utc, format_duration};

pub(crate) use maths_utils::{finite_or, pct_change, period_returns};
