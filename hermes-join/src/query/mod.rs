//! Document iteration and per-segment filters

mod docset;
mod filter;

pub use docset::*;
pub use filter::*;
