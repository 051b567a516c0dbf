pub mod ma;
pub mod macd;

pub use ma::{exponential_moving_average, moving_average};
pub use macd::{MacdOutput, macd};
