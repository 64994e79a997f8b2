pub mod config;
pub mod normalize;
