pub mod actor;
pub mod api;
pub mod config;
pub mod instrumentation;
pub mod troop;
