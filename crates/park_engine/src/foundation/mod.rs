//! Foundation module - shared building blocks
//!
//! Vector aliases for field kinds, generational handles for the scene arenas,
//! and `env_logger` setup.

pub mod math;
pub mod collections;
pub mod logging;
