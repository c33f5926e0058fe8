//! Wheel API: the local HTTP surface of the weighted wheel draw engine.
//!
//! One process serves one session. Every route reads or mutates the shared
//! [`state::AppState`]; starting a spin also schedules its settlement.

pub mod config;
pub mod error;
pub mod routes;
pub mod settle;
pub mod state;
