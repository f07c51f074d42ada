//! Library entry for hostupd exposing the gateway, update logic and page
//! controller for the binary and integration tests.

pub mod app;
pub mod config;
pub mod gateway;
pub mod logic;
pub mod state;
pub mod util;
