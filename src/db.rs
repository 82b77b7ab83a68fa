//! SQLite ledger boundary
//!
//! The trade ledger is owned by the surrounding trading service; this
//! layer is the engine's read interface plus the write helpers the
//! ingestion path (and the tests) use. Reads come back as `RawTrade` rows
//! and go through the normalizer, so schema drift between ingestion
//! generations stays contained here.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::Mutex;
use uuid::Uuid;

use crate::normalize::normalize_trade;
use crate::types::{Agent, RawTrade, Trade, TradeStatus};

/// Filters for ledger trade reads
#[derive(Debug, Default, Clone)]
pub struct TradeFilter {
    pub agent_id: Option<String>,
    pub status: Option<TradeStatus>,
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn new(path: &str) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_tables()?;
        Ok(db)
    }

    pub fn in_memory() -> rusqlite::Result<Self> {
        Self::new(":memory:")
    }

    fn init_tables(&self) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();

        conn.execute_batch(
            r#"
            -- Agents table
            CREATE TABLE IF NOT EXISTS agents (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                personality TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            );

            -- Trades table. Most columns are nullable: rows written by the
            -- first ingestion generation carry is_long/created_at only.
            CREATE TABLE IF NOT EXISTS trades (
                id TEXT PRIMARY KEY,
                agent_id TEXT NOT NULL,
                pair TEXT NOT NULL,
                side TEXT,
                is_long INTEGER,
                status TEXT,
                entry_price REAL,
                exit_price REAL,
                size REAL,
                collateral REAL,
                leverage REAL,
                pnl REAL,
                fees REAL,
                opened_at TEXT,
                created_at TEXT NOT NULL,
                closed_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_trades_agent ON trades(agent_id);
            CREATE INDEX IF NOT EXISTS idx_trades_status ON trades(status);
            CREATE INDEX IF NOT EXISTS idx_trades_opened ON trades(opened_at);
        "#,
        )?;

        Ok(())
    }

    // ========== Agent Operations ==========

    pub fn save_agent(&self, agent: &Agent) -> rusqlite::Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO agents (id, name, personality, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                agent.id,
                agent.name,
                agent.personality,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn list_agents(&self) -> rusqlite::Result<Vec<Agent>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id, name, personality FROM agents ORDER BY created_at, id")?;

        let agents = stmt
            .query_map([], |row| {
                Ok(Agent {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    personality: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(agents)
    }

    // ========== Trade Operations ==========

    /// Insert one ledger row as-written by an ingestion path. Absent
    /// fields stay NULL in the row and are defaulted at read time. Rows
    /// arriving without an id get a fresh v4 id; the minted id is
    /// returned either way.
    pub fn insert_trade(&self, raw: &RawTrade) -> rusqlite::Result<String> {
        let id = if raw.id.is_empty() {
            Uuid::new_v4().to_string()
        } else {
            raw.id.clone()
        };

        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"INSERT OR REPLACE INTO trades
               (id, agent_id, pair, side, is_long, status, entry_price, exit_price,
                size, collateral, leverage, pnl, fees, opened_at, created_at, closed_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)"#,
            params![
                id,
                raw.agent_id,
                raw.pair,
                raw.side,
                raw.is_long.map(|b| b as i32),
                raw.status,
                raw.entry_price,
                raw.exit_price,
                raw.size,
                raw.collateral,
                raw.leverage,
                raw.pnl,
                raw.fees,
                raw.opened_at.map(|t| t.to_rfc3339()),
                raw.created_at.unwrap_or_else(Utc::now).to_rfc3339(),
                raw.closed_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(id)
    }

    /// Read trades in chronological open order (the order the curve
    /// builder requires), already normalized to the canonical shape.
    pub fn list_trades(&self, filter: &TradeFilter) -> rusqlite::Result<Vec<Trade>> {
        let conn = self.conn.lock().unwrap();

        let mut sql = String::from(
            "SELECT id, agent_id, pair, side, is_long, status, entry_price, exit_price, \
             size, collateral, leverage, pnl, fees, opened_at, created_at, closed_at \
             FROM trades WHERE 1=1",
        );
        let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(agent_id) = &filter.agent_id {
            sql.push_str(&format!(" AND agent_id = ?{}", args.len() + 1));
            args.push(Box::new(agent_id.clone()));
        }
        if let Some(status) = filter.status {
            sql.push_str(&format!(" AND LOWER(COALESCE(status, 'open')) = ?{}", args.len() + 1));
            let status_str = match status {
                TradeStatus::Open => "open",
                TradeStatus::Closed => "closed",
                TradeStatus::Liquidated => "liquidated",
            };
            args.push(Box::new(status_str.to_string()));
        }
        // Mirror the normalizer's opened_at fallback so sort order and
        // normalized timestamps agree
        sql.push_str(" ORDER BY COALESCE(opened_at, created_at), id");

        let mut stmt = conn.prepare(&sql)?;
        let params: Vec<&dyn rusqlite::ToSql> = args.iter().map(|a| a.as_ref()).collect();

        let mut trades = Vec::new();
        let mut rows = stmt.query(params.as_slice())?;
        while let Some(row) = rows.next()? {
            trades.push(normalize_trade(row_to_raw_trade(row)?));
        }

        Ok(trades)
    }
}

fn row_to_raw_trade(row: &rusqlite::Row) -> rusqlite::Result<RawTrade> {
    Ok(RawTrade {
        id: row.get(0)?,
        agent_id: row.get(1)?,
        pair: row.get(2)?,
        side: row.get(3)?,
        is_long: row.get::<_, Option<i32>>(4)?.map(|v| v != 0),
        status: row.get(5)?,
        entry_price: row.get(6)?,
        exit_price: row.get(7)?,
        size: row.get(8)?,
        collateral: row.get(9)?,
        leverage: row.get(10)?,
        pnl: row.get(11)?,
        fees: row.get(12)?,
        opened_at: parse_time(row.get(13)?),
        created_at: parse_time(row.get(14)?),
        closed_at: parse_time(row.get(15)?),
    })
}

fn parse_time(value: Option<String>) -> Option<DateTime<Utc>> {
    value
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
