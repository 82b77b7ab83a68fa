//! Equity curve builder
//!
//! Folds one agent's trade history into an account-equity time series
//! anchored at the shared starting balance. Closed trades move the running
//! total at their close time; open positions only show up in the final
//! mark-to-market point.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Trade;

/// One point on an agent's equity curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// Unix seconds
    pub time: i64,
    pub value: f64,
}

/// Build the equity curve for one agent.
///
/// `trades` must be in chronological `opened_at` order (the ledger read
/// guarantees this). `unrealized_pnl` is the summed live pnl of the
/// agent's open positions and lands only in the final point at `now`.
///
/// The emitted times are non-decreasing: close times are clamped to the
/// latest time emitted so far, since a trade opened later can settle
/// earlier than its predecessor. Values are not clamped at zero; an agent
/// that loses more than the starting balance shows a negative curve.
pub fn build_equity_curve(
    trades: &[Trade],
    unrealized_pnl: f64,
    now: DateTime<Utc>,
    starting_equity: f64,
) -> Vec<EquityPoint> {
    let Some(first) = trades.first() else {
        return Vec::new();
    };

    let mut curve = Vec::with_capacity(trades.len() + 2);

    // Flat lead-in so the rendered curve never starts mid-air
    let anchor = first.opened_at - Duration::seconds(60);
    curve.push(EquityPoint {
        time: anchor.timestamp(),
        value: starting_equity,
    });

    let mut running = starting_equity;
    let mut last_time = anchor.timestamp();

    for trade in trades {
        if !trade.status.is_closed() {
            continue;
        }
        let Some(pnl) = trade.pnl else { continue };

        running += pnl;
        let time = trade
            .closed_at
            .map(|t| t.timestamp())
            .unwrap_or(last_time)
            .max(last_time);
        curve.push(EquityPoint {
            time,
            value: running,
        });
        last_time = time;
    }

    curve.push(EquityPoint {
        time: now.timestamp().max(last_time),
        value: running + unrealized_pnl,
    });

    curve
}
