use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::db::TradeFilter;
use crate::leaderboard::{build_leaderboard, enrich_trade, open_pairs};
use crate::oracle::resolve_prices;
use crate::state::AppState;
use crate::types::{
    ApiResponse, EnrichedTrade, LeaderboardResponse, Trade, TradeQuery, TradesResponse,
};

/// GET /leaderboard - ranked agents with full performance stats
pub async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<LeaderboardResponse>>, (StatusCode, Json<ApiResponse<()>>)> {
    // Ledger failures are fatal for the request; there is no partial
    // leaderboard to serve
    let agents = state.db.list_agents().map_err(ledger_error)?;
    let trades = state
        .db
        .list_trades(&TradeFilter::default())
        .map_err(ledger_error)?;

    // One batched oracle call shared by every agent
    let pairs = open_pairs(&trades);
    let live_prices = resolve_prices(&state.oracle, &pairs).await;

    let (leaderboard, stats) =
        build_leaderboard(&agents, &trades, &live_prices, Utc::now(), &state.config);

    Ok(Json(ApiResponse::ok(LeaderboardResponse {
        leaderboard,
        live_prices,
        stats,
    })))
}

/// GET /trades - filtered trade list, open trades enriched with live marks
pub async fn get_trades(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TradeQuery>,
) -> Result<Json<ApiResponse<TradesResponse>>, (StatusCode, Json<ApiResponse<()>>)> {
    let filter = TradeFilter {
        agent_id: query.agent_id,
        status: query.status,
    };
    let trades = state.db.list_trades(&filter).map_err(ledger_error)?;
    let trades = most_recent(trades, query.limit);

    let pairs = open_pairs(&trades);
    let live_prices = resolve_prices(&state.oracle, &pairs).await;

    let enriched: Vec<EnrichedTrade> = trades
        .iter()
        .map(|t| enrich_trade(t, &live_prices))
        .collect();

    Ok(Json(ApiResponse::ok(TradesResponse {
        trades: enriched,
        live_prices,
    })))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "leaderboard-engine",
        "version": "0.1.0"
    }))
}

/// Newest-first view of a chronologically-ascending trade list. The limit
/// caps the recent end of the history, not the oldest rows.
fn most_recent(mut trades: Vec<Trade>, limit: Option<u32>) -> Vec<Trade> {
    trades.reverse();
    if let Some(limit) = limit {
        trades.truncate(limit as usize);
    }
    trades
}

fn ledger_error(e: rusqlite::Error) -> (StatusCode, Json<ApiResponse<()>>) {
    tracing::error!("Ledger read failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::err("Ledger unavailable")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_trade;
    use crate::types::{RawTrade, Trade};
    use chrono::{TimeZone, Utc};

    fn trade(id: &str, opened_hour: u32) -> Trade {
        normalize_trade(RawTrade {
            id: id.to_string(),
            agent_id: "a".to_string(),
            pair: "BTC/USD".to_string(),
            opened_at: Some(Utc.with_ymd_and_hms(2024, 6, 1, opened_hour, 0, 0).unwrap()),
            ..Default::default()
        })
    }

    #[test]
    fn test_most_recent_limit_keeps_newest() {
        // Ledger order is oldest-first; the limit must keep the newest end
        let trades = vec![trade("t1", 1), trade("t2", 2), trade("t3", 3)];
        let view = most_recent(trades, Some(2));

        let ids: Vec<&str> = view.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t3", "t2"]);
    }

    #[test]
    fn test_most_recent_without_limit_reverses_all() {
        let trades = vec![trade("t1", 1), trade("t2", 2)];
        let view = most_recent(trades, None);
        let ids: Vec<&str> = view.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1"]);
    }

    #[test]
    fn test_most_recent_limit_larger_than_set() {
        let view = most_recent(vec![trade("t1", 1)], Some(10));
        assert_eq!(view.len(), 1);
    }
}
