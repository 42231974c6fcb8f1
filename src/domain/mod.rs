// Domain types and value objects
mod candle;
mod pair_interval;

pub use candle::{Candle, CandleType};
pub use pair_interval::PairInterval;
