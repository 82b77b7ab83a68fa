use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::equity::EquityPoint;

/// Trade direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

/// Trade lifecycle status. Transitions are one-directional:
/// Open -> Closed | Liquidated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
    Liquidated,
}

impl TradeStatus {
    /// Liquidations settle like closes: they carry an exit price and a
    /// realized pnl.
    pub fn is_closed(&self) -> bool {
        matches!(self, TradeStatus::Closed | TradeStatus::Liquidated)
    }
}

/// Canonical trade record, after normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub agent_id: String,
    /// Instrument symbol, e.g. "BTC/USD"
    pub pair: String,
    pub side: Side,
    pub status: TradeStatus,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    /// Notional size in quote currency, already leverage-adjusted
    pub size: f64,
    /// Margin backing the position
    pub collateral: f64,
    /// Informational only; size already reflects leverage
    pub leverage: f64,
    /// Realized pnl, present once closed
    pub pnl: Option<f64>,
    pub fees: f64,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Raw ledger row. Ingestion paths disagree on field names and older rows
/// predate some columns, so everything beyond identity is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTrade {
    pub id: String,
    pub agent_id: String,
    pub pair: String,
    pub side: Option<String>,
    /// Boolean fallback used by one ingestion path instead of `side`
    pub is_long: Option<bool>,
    pub status: Option<String>,
    pub entry_price: Option<f64>,
    pub exit_price: Option<f64>,
    pub size: Option<f64>,
    pub collateral: Option<f64>,
    pub leverage: Option<f64>,
    pub pnl: Option<f64>,
    pub fees: Option<f64>,
    pub opened_at: Option<DateTime<Utc>>,
    /// Row-creation fallback for `opened_at`
    pub created_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
}

/// Trading agent identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    /// Free-form risk-style label ("degen", "conservative", ...)
    pub personality: String,
}

/// Trade enriched with live-market context. For open trades whose pair
/// resolved, `current_price`/`unrealized_pnl` are populated; an unresolved
/// pair keeps them null so "no price" stays distinguishable from flat pnl.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedTrade {
    #[serde(flatten)]
    pub trade: Trade,
    pub current_price: Option<f64>,
    pub unrealized_pnl: Option<f64>,
    /// Unrealized pnl as a percentage of collateral; 0 when collateral is 0
    pub unrealized_pnl_pct: Option<f64>,
}

/// One agent's row on the leaderboard
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub agent_id: String,
    pub name: String,
    pub personality: String,
    /// starting equity + realized + unrealized; the ranking key
    pub equity: f64,
    /// Percentage return on starting equity
    pub roi: f64,
    pub realized_pnl: f64,
    pub unrealized_pnl: f64,
    pub total_fees: f64,
    /// wins / closed * 100; 0 when no closed trades
    pub win_rate: f64,
    pub wins: u32,
    pub losses: u32,
    /// Floored at 0: an agent with only losing trades has no biggest win
    pub biggest_win: f64,
    /// Ceilinged at 0
    pub biggest_loss: f64,
    /// mean(closed pnl) / sample stddev; degrades to the mean when the
    /// stddev is undefined
    pub sharpe_ratio: f64,
    pub trades_count: u32,
    pub open_positions: u32,
    pub recent_trades: Vec<EnrichedTrade>,
    pub equity_curve: Vec<EquityPoint>,
}

/// Dataset-wide aggregates
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardStats {
    pub total_trades: u32,
    /// Sum of notional size over all trades, all agents
    pub total_volume: f64,
    /// Agents with at least one trade
    pub active_agents: u32,
    pub total_agents: u32,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub live_prices: HashMap<String, f64>,
    pub stats: LeaderboardStats,
}

#[derive(Debug, Serialize)]
pub struct TradesResponse {
    pub trades: Vec<EnrichedTrade>,
    pub live_prices: HashMap<String, f64>,
}

/// Query parameters for GET /trades
#[derive(Debug, Default, Deserialize)]
pub struct TradeQuery {
    pub agent_id: Option<String>,
    pub status: Option<TradeStatus>,
    pub limit: Option<u32>,
}

/// API response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn err(msg: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
