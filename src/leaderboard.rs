//! Leaderboard aggregator
//!
//! Folds the full trade ledger into ranked per-agent performance. Pure
//! over its inputs: the ledger rows, the resolved price map and the clock
//! are all passed in, so the whole aggregation is deterministic and
//! directly testable.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::config::EngineConfig;
use crate::equity::build_equity_curve;
use crate::pnl;
use crate::types::{
    Agent, EnrichedTrade, LeaderboardEntry, LeaderboardStats, Trade, TradeStatus,
};

/// Distinct pairs across all open trades, in first-seen order.
/// This is the one batch handed to the price resolver per request.
pub fn open_pairs(trades: &[Trade]) -> Vec<String> {
    let mut pairs = Vec::new();
    for trade in trades {
        if trade.status == TradeStatus::Open && !pairs.contains(&trade.pair) {
            pairs.push(trade.pair.clone());
        }
    }
    pairs
}

/// Attach live-market context to a trade. Only open trades are enriched;
/// an open trade whose pair did not resolve keeps null market fields.
pub fn enrich_trade(trade: &Trade, prices: &HashMap<String, f64>) -> EnrichedTrade {
    let (current_price, unrealized_pnl) = if trade.status == TradeStatus::Open {
        let price = prices.get(&trade.pair).copied();
        let unrealized = price.and_then(|p| pnl::unrealized_pnl(trade, p));
        (price, unrealized)
    } else {
        (None, None)
    };

    EnrichedTrade {
        trade: trade.clone(),
        current_price,
        unrealized_pnl,
        unrealized_pnl_pct: unrealized_pnl.map(|u| pnl::pnl_percent(u, trade.collateral)),
    }
}

/// Build the ranked leaderboard plus dataset-wide stats.
///
/// `trades` must be ordered by `opened_at` ascending so equity curves come
/// out deterministic. Sorting is stable, so agents tied on equity keep
/// their input order.
pub fn build_leaderboard(
    agents: &[Agent],
    trades: &[Trade],
    prices: &HashMap<String, f64>,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> (Vec<LeaderboardEntry>, LeaderboardStats) {
    let mut by_agent: HashMap<&str, Vec<&Trade>> = HashMap::new();
    for trade in trades {
        by_agent.entry(trade.agent_id.as_str()).or_default().push(trade);
    }

    let mut entries: Vec<LeaderboardEntry> = agents
        .iter()
        .map(|agent| {
            let agent_trades = by_agent
                .get(agent.id.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            compute_entry(agent, agent_trades, prices, now, config)
        })
        .collect();

    entries.sort_by(|a, b| b.equity.partial_cmp(&a.equity).unwrap_or(Ordering::Equal));
    for (i, entry) in entries.iter_mut().enumerate() {
        entry.rank = (i + 1) as u32;
    }

    let stats = LeaderboardStats {
        total_trades: trades.len() as u32,
        total_volume: trades.iter().map(|t| t.size).sum(),
        active_agents: agents
            .iter()
            .filter(|a| by_agent.contains_key(a.id.as_str()))
            .count() as u32,
        total_agents: agents.len() as u32,
    };

    (entries, stats)
}

fn compute_entry(
    agent: &Agent,
    trades: &[&Trade],
    prices: &HashMap<String, f64>,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> LeaderboardEntry {
    let closed_pnls: Vec<f64> = trades
        .iter()
        .filter(|t| t.status.is_closed())
        .filter_map(|t| t.pnl)
        .collect();

    let realized_pnl: f64 = closed_pnls.iter().sum();
    let total_fees: f64 = trades.iter().map(|t| t.fees).sum();
    let wins = closed_pnls.iter().filter(|&&p| p > 0.0).count() as u32;
    let losses = closed_pnls.len() as u32 - wins;

    let win_rate = if closed_pnls.is_empty() {
        0.0
    } else {
        wins as f64 / closed_pnls.len() as f64 * 100.0
    };

    // Floor/ceiling at 0: a one-sided history never reports a spurious
    // extreme on the other side
    let biggest_win = closed_pnls.iter().copied().fold(0.0_f64, f64::max);
    let biggest_loss = closed_pnls.iter().copied().fold(0.0_f64, f64::min);

    // Unresolved pairs contribute 0 here; the enriched trade view keeps
    // their current price null
    let unrealized_pnl: f64 = trades
        .iter()
        .filter(|t| t.status == TradeStatus::Open)
        .filter_map(|t| {
            prices
                .get(&t.pair)
                .and_then(|price| pnl::unrealized_pnl(t, *price))
        })
        .sum();

    let open_positions = trades
        .iter()
        .filter(|t| t.status == TradeStatus::Open)
        .count() as u32;

    let equity = config.starting_equity + realized_pnl + unrealized_pnl;
    let roi = (equity - config.starting_equity) / config.starting_equity * 100.0;

    let owned: Vec<Trade> = trades.iter().map(|&t| t.clone()).collect();
    let equity_curve = build_equity_curve(&owned, unrealized_pnl, now, config.starting_equity);

    let recent_trades: Vec<EnrichedTrade> = trades
        .iter()
        .rev()
        .take(config.recent_trades)
        .map(|t| enrich_trade(t, prices))
        .collect();

    LeaderboardEntry {
        rank: 0, // assigned after the sort
        agent_id: agent.id.clone(),
        name: agent.name.clone(),
        personality: agent.personality.clone(),
        equity,
        roi,
        realized_pnl,
        unrealized_pnl,
        total_fees,
        win_rate,
        wins,
        losses,
        biggest_win,
        biggest_loss,
        sharpe_ratio: sharpe_ratio(&closed_pnls),
        trades_count: trades.len() as u32,
        open_positions,
        recent_trades,
        equity_curve,
    }
}

/// Mean over sample stddev of closed pnls. With fewer than two samples, or
/// identical samples, the stddev is undefined/zero and the denominator
/// falls back to 1 so the ratio degrades to the mean.
fn sharpe_ratio(pnls: &[f64]) -> f64 {
    if pnls.is_empty() {
        return 0.0;
    }
    let n = pnls.len() as f64;
    let mean = pnls.iter().sum::<f64>() / n;

    let stddev = if pnls.len() < 2 {
        1.0
    } else {
        let variance = pnls.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / (n - 1.0);
        let sd = variance.sqrt();
        if sd > 0.0 {
            sd
        } else {
            1.0
        }
    };

    mean / stddev
}
