//! Per-step data handed to component hooks

use rand::rngs::StdRng;

/// Simulation clock and random source passed to component hooks
#[derive(Debug)]
pub struct StepContext<'a> {
    /// Seconds advanced by this step (0 for start and stop)
    pub delta_time: f32,
    /// Simulated seconds elapsed since the scene started playing
    pub elapsed: f32,
    /// Steps completed since the scene started playing
    pub step_count: u64,
    /// Scene random source, seeded from the scene seed on start
    pub rng: &'a mut StdRng,
}
