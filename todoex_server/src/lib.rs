//! HTTP transport and process bootstrap for the todoex service.

pub mod api;
pub mod config;
pub mod logging;
