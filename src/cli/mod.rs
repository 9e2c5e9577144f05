pub mod rate;
pub mod setup;
