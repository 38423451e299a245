//! Shared wire and configuration types for corral.

pub mod ca;
pub mod config;
