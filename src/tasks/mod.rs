//! Background tasks module
//! 
//! This module contains the countdown engine that runs alongside the HTTP server.

pub mod timer_engine;

// Re-export main types
pub use timer_engine::{TimerEngine, TICK_INTERVAL};
