/// Displacement strategy selectable at construction.
///
/// `BfsDisplacer` and `RandomWalkDisplacer` (see [`crate::displace`]) are
/// the concrete implementations; this enum only names the pair of
/// choices. The engine itself is generic over the displacer type, so
/// this enum is informational rather than a runtime dispatch tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplacerKind {
    Bfs,
    RandomWalk,
}

impl Default for DisplacerKind {
    fn default() -> Self {
        DisplacerKind::Bfs
    }
}

/// Runtime-tunable knobs of a `DysectEngine`.
///
/// `B` (bucket size), `T` (subtable count) and `h` (hash fan-out) are not
/// present here: all three are fixed for the lifetime of a table and
/// already appear in its type signature (`DysectEngine<const B, const T,
/// const H, K, V, D>`), so folding them into this struct as well would
/// just duplicate state that can go out of sync with the type. What
/// *can* legitimately vary at runtime without touching the type stays
/// here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Size-constraint factor α; must be strictly greater than 1.0.
    pub alpha: f64,
    /// Maximum displacement chain length before a displacer gives up.
    pub step_budget: u32,
    /// On displacer failure, grow once and retry rather than surfacing
    /// failure to the caller.
    pub fix_errors: bool,
    /// Seed for the hash primitive and, if applicable, the random-walk
    /// displacer's PRNG.
    pub seed: u64,
}

impl EngineConfig {
    pub fn new(alpha: f64) -> Self {
        assert!(alpha > 1.0, "size constraint factor alpha must exceed 1.0");
        Self {
            alpha,
            ..Self::default()
        }
    }

    pub fn with_step_budget(mut self, step_budget: u32) -> Self {
        self.step_budget = step_budget;
        self
    }

    pub fn with_fix_errors(mut self, fix_errors: bool) -> Self {
        self.fix_errors = fix_errors;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            alpha: 1.1,
            step_budget: 256,
            fix_errors: true,
            seed: 0x5bd1_e995_dead_beef,
        }
    }
}
