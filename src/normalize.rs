//! Trade normalizer
//!
//! The ledger has been written by more than one ingestion path: the older
//! one stored a boolean long-flag and no open timestamp, the newer one
//! stores explicit `side`/`opened_at`. Historical rows may also predate
//! numeric columns entirely. This mapping is total: every raw row becomes
//! a canonical `Trade`, missing numerics default to 0, and nothing panics.

use chrono::{DateTime, Utc};

use crate::types::{RawTrade, Side, Trade, TradeStatus};

/// Map one raw ledger row into the canonical trade shape
pub fn normalize_trade(raw: RawTrade) -> Trade {
    let side = resolve_side(raw.side.as_deref(), raw.is_long);
    let status = parse_status(raw.status.as_deref());
    // Explicit open timestamp wins; fall back to row creation, then epoch
    // so undated rows sort first instead of failing.
    let opened_at = raw
        .opened_at
        .or(raw.created_at)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

    Trade {
        id: raw.id,
        agent_id: raw.agent_id,
        pair: raw.pair,
        side,
        status,
        entry_price: raw.entry_price.unwrap_or(0.0),
        exit_price: raw.exit_price,
        size: raw.size.unwrap_or(0.0),
        collateral: raw.collateral.unwrap_or(0.0),
        leverage: raw.leverage.unwrap_or(0.0),
        pnl: raw.pnl,
        fees: raw.fees.unwrap_or(0.0),
        opened_at,
        closed_at: raw.closed_at,
    }
}

fn resolve_side(side: Option<&str>, is_long: Option<bool>) -> Side {
    match side.map(|s| s.to_lowercase()).as_deref() {
        Some("long") => Side::Long,
        Some("short") => Side::Short,
        // Boolean fallback: is_long -> Long, everything else Short
        _ => {
            if is_long == Some(true) {
                Side::Long
            } else {
                Side::Short
            }
        }
    }
}

fn parse_status(s: Option<&str>) -> TradeStatus {
    match s.map(|s| s.to_lowercase()).as_deref() {
        Some("closed") => TradeStatus::Closed,
        Some("liquidated") => TradeStatus::Liquidated,
        _ => TradeStatus::Open,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw() -> RawTrade {
        RawTrade {
            id: "t1".to_string(),
            agent_id: "a1".to_string(),
            pair: "ETH/USD".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_explicit_side_wins_over_flag() {
        let trade = normalize_trade(RawTrade {
            side: Some("SHORT".to_string()),
            is_long: Some(true),
            ..raw()
        });
        assert_eq!(trade.side, Side::Short);
    }

    #[test]
    fn test_is_long_fallback() {
        let trade = normalize_trade(RawTrade {
            is_long: Some(true),
            ..raw()
        });
        assert_eq!(trade.side, Side::Long);

        // No side information at all resolves to short
        let trade = normalize_trade(raw());
        assert_eq!(trade.side, Side::Short);
    }

    #[test]
    fn test_opened_at_fallback_chain() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let opened = Utc.with_ymd_and_hms(2024, 3, 2, 9, 30, 0).unwrap();

        let trade = normalize_trade(RawTrade {
            opened_at: Some(opened),
            created_at: Some(created),
            ..raw()
        });
        assert_eq!(trade.opened_at, opened);

        let trade = normalize_trade(RawTrade {
            created_at: Some(created),
            ..raw()
        });
        assert_eq!(trade.opened_at, created);

        let trade = normalize_trade(raw());
        assert_eq!(trade.opened_at, DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_missing_numerics_default_to_zero() {
        let trade = normalize_trade(raw());
        assert_eq!(trade.entry_price, 0.0);
        assert_eq!(trade.size, 0.0);
        assert_eq!(trade.collateral, 0.0);
        assert_eq!(trade.leverage, 0.0);
        assert_eq!(trade.fees, 0.0);
        assert_eq!(trade.pnl, None);
        assert_eq!(trade.exit_price, None);
    }

    #[test]
    fn test_status_defaults_to_open() {
        assert_eq!(normalize_trade(raw()).status, TradeStatus::Open);
        let trade = normalize_trade(RawTrade {
            status: Some("LIQUIDATED".to_string()),
            ..raw()
        });
        assert_eq!(trade.status, TradeStatus::Liquidated);
        assert!(trade.status.is_closed());
    }
}
