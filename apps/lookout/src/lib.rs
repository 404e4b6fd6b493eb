pub mod commands;
pub mod config;
pub mod host;
pub mod session;
pub mod sources;
pub mod telemetry;
pub mod terminal;
pub mod zones;
