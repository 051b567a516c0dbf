pub mod io;
pub mod market;
