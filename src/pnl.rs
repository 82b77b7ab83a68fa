//! PnL calculator
//!
//! Pure math, no side effects. `size` is notional and already
//! leverage-adjusted, so no leverage factor appears here.

use crate::types::{Side, Trade};

/// Signed profit/loss in quote currency for a position marked at
/// `current_price`.
///
/// Long:  (current - entry) / entry * size
/// Short: (entry - current) / entry * size
pub fn calculate_pnl(side: Side, entry_price: f64, current_price: f64, size: f64) -> f64 {
    let price_change = match side {
        Side::Long => (current_price - entry_price) / entry_price,
        Side::Short => (entry_price - current_price) / entry_price,
    };
    price_change * size
}

/// Mark-to-market pnl for one trade, or None when either price is not
/// strictly positive (a zero entry would make the math blow up, a zero
/// mark means the oracle gave us garbage).
pub fn unrealized_pnl(trade: &Trade, current_price: f64) -> Option<f64> {
    if trade.entry_price <= 0.0 || current_price <= 0.0 {
        return None;
    }
    Some(calculate_pnl(
        trade.side,
        trade.entry_price,
        current_price,
        trade.size,
    ))
}

/// Pnl as a percentage of the collateral backing the trade; 0 when the
/// collateral itself is 0 (old ledger rows), never NaN.
pub fn pnl_percent(pnl: f64, collateral: f64) -> f64 {
    if collateral <= 0.0 {
        0.0
    } else {
        pnl / collateral * 100.0
    }
}
