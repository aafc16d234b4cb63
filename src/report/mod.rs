//! Report output for script mode.

pub mod generator;

pub use generator::save_report;
