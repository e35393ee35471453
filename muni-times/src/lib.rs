//! SF Muni arrival board.
//!
//! Polls the NextBus prediction feed for a configured set of stops and
//! routes, normalizes each response into a sorted schedule and serves the
//! latest one to displays.

pub mod config;
pub mod domain;
pub mod monitor;
pub mod nextbus;
pub mod web;
