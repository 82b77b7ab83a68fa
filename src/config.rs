//! Engine configuration
//!
//! The starting balance is a product constant shared by every agent; it is
//! carried here explicitly (not buried as a literal) so the aggregation and
//! equity-curve code can be tuned and tested against different values.

/// Configuration for the performance aggregation engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Paper balance every agent starts with, in quote currency
    pub starting_equity: f64,
    /// Length of the per-agent recent-trades preview
    pub recent_trades: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_equity: 10_000.0,
            recent_trades: 5,
        }
    }
}

impl EngineConfig {
    /// Default config with env overrides (STARTING_EQUITY)
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(equity) = std::env::var("STARTING_EQUITY")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
        {
            config.starting_equity = equity;
        }
        config
    }
}
