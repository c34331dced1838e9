#![forbid(unsafe_code)]

pub mod model;
pub mod score;
pub mod similarity;
pub mod time;

pub use time::Clock;
