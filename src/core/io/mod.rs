mod read;

pub use read::*;

pub mod write;
pub use write::*;
