pub mod api;
pub mod config;
pub mod core;
pub mod leads;
