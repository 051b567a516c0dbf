//! Technical indicators over daily price history.
//!
//! Every function is pure and returns a column aligned index-for-index with
//! its input. Positions without enough history are `None`; that state
//! propagates through composed indicators and is never zero-filled.

pub mod momentum;
pub mod oscillators;
pub mod returns;
pub mod series;
pub mod trend;
pub mod volatility;
pub mod volume;

pub use series::Series;
