//! Synthesis configuration.
//!
//! A small tunable surface: a plain struct with a `Default` impl rather
//! than a builder.

/// Tunables for a synthesis run.
#[derive(Debug, Clone)]
pub struct SynthesisConfig {
    /// Per-atom solver step budget in milliseconds, passed through to
    /// Z3's own `timeout` parameter. A trip is treated as *unsat* and
    /// synthesis continues to the next atom.
    pub solver_timeout_ms: u32,

    /// Minimum significant digits when rendering real witnesses as
    /// decimal strings.
    pub real_precision: u32,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            solver_timeout_ms: 10_000,
            real_precision: 10,
        }
    }
}
