pub mod atr;
pub mod bollinger_bands;
pub mod realized;

pub use atr::{atr, true_range};
pub use bollinger_bands::{BollingerBandsOutput, bollinger_bands};
pub use realized::rolling_volatility;
