// Core infrastructure modules
pub mod config;
pub mod core;

// Feature-specific modules
pub mod cli;
pub mod demo;
pub mod fixtures;
pub mod repository;

#[cfg(test)]
pub mod test_utils;
