//! Facta AI agent bridge — shared types, forwarder, agent endpoint, and
//! registry client used by the CLI.

pub mod agent;
pub mod config;
pub mod forwarder;
pub mod registry;
