//! Join aggregation: collect, replay, and bucket output

mod bucket;
mod config;
mod driver;
mod join;
mod result;

#[cfg(test)]
mod tests;

pub use bucket::*;
pub use config::*;
pub use driver::*;
pub use join::*;
pub use result::*;
