//! Background Tasks Module
//!
//! # Tasks
//! - Memory pressure: clears the memory tier when the host signals low memory
//!
//! Expiration is lazy, so there is no periodic sweep.

mod memory_pressure;

pub use memory_pressure::{spawn_memory_pressure_task, MemoryPressure};
