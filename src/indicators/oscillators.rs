pub mod rsi;

pub use rsi::{RSI_ZERO_LOSS, rsi};
