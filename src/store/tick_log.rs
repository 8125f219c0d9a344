//! CSV tick history and plan snapshot export

use serde::Serialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::{Money, Plan, TickResult};

/// One row of `ticks.csv`
#[derive(Debug, Clone, Serialize)]
struct TickRow<'a> {
    ts_iso: String,
    symbol: &'a str,
    cap: Money,
    hb: Money,
    lb: Money,
    band_pct: f64,
    levels_total: usize,
    levels_pending: usize,
    levels_placed: usize,
    levels_filled: usize,
    placed_buys: usize,
    placed_sells: usize,
    qty_per_level: Money,
    available_usdt: Money,
    leverage: u32,
    sum_buy_prices: Money,
}

/// Append-only CSV history, one row per completed tick
#[derive(Debug, Clone)]
pub struct TickLog {
    path: PathBuf,
}

impl TickLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a row; the header is written when the file is new or empty
    pub fn append(&self, result: &TickResult, plan: &Plan) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }

        let needs_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);

        let stats = plan.stats();
        writer.serialize(TickRow {
            ts_iso: result.timestamp.to_rfc3339(),
            symbol: result.symbol.as_str(),
            cap: result.cap,
            hb: result.high_bound,
            lb: result.low_bound,
            band_pct: result.band_pct,
            levels_total: stats.total,
            levels_pending: stats.pending,
            levels_placed: stats.placed,
            levels_filled: stats.filled,
            placed_buys: result.placed_buys,
            placed_sells: result.placed_sells,
            qty_per_level: result.quantity,
            available_usdt: result.available_margin,
            leverage: result.leverage,
            sum_buy_prices: result.sum_buy_prices,
        })?;
        writer
            .flush()
            .map_err(|e| StoreError::io(&self.path, e))
    }
}

/// One row of the plan snapshot
#[derive(Debug, Serialize)]
struct SnapshotRow<'a> {
    ts_iso: &'a str,
    symbol: &'a str,
    idx: usize,
    side: &'static str,
    price: Money,
    status: &'static str,
    #[serde(rename = "orderId")]
    order_id: &'a str,
}

/// Write every level of `plan` to `path`, replacing any previous snapshot
pub fn export_snapshot(plan: &Plan, path: &Path) -> Result<usize, StoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }

    let ts = chrono::Utc::now().to_rfc3339();
    let mut writer = csv::Writer::from_path(path)?;
    for (idx, level) in plan.levels().iter().enumerate() {
        writer.serialize(SnapshotRow {
            ts_iso: &ts,
            symbol: plan.symbol.as_str(),
            idx,
            side: level.side().as_str(),
            price: level.price(),
            status: level.status().as_str(),
            order_id: level.order_id().unwrap_or(""),
        })?;
    }
    writer.flush().map_err(|e| StoreError::io(path, e))?;
    Ok(plan.levels().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::plan::generate;
    use crate::Symbol;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn sample_plan() -> Plan {
        generate(
            &Symbol::new("BTCUSDT"),
            Money::from_i64(90000),
            Money::from_i64(100000),
            Money::from_i64(110000),
            10,
            0.6,
        )
        .unwrap()
    }

    fn sample_result() -> TickResult {
        TickResult {
            timestamp: Utc::now(),
            symbol: Symbol::new("BTCUSDT"),
            cap: Money::new(dec!(98765.4)),
            high_bound: Money::new(dec!(98666.63)),
            low_bound: Money::new(dec!(95706.63)),
            band_pct: 3.0,
            quantity: Money::new(dec!(0.0147)),
            placed_buys: 2,
            placed_sells: 0,
            filled_this_tick: 0,
            available_margin: Money::from_i64(1000),
            leverage: 3,
            sum_buy_prices: Money::from_i64(194000),
        }
    }

    #[test]
    fn test_header_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = TickLog::new(dir.path().join("logs").join("ticks.csv"));
        let plan = sample_plan();

        log.append(&sample_result(), &plan).unwrap();
        log.append(&sample_result(), &plan).unwrap();

        let contents = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "ts_iso,symbol,cap,hb,lb,band_pct,levels_total,levels_pending,levels_placed,levels_filled,placed_buys,placed_sells,qty_per_level,available_usdt,leverage,sum_buy_prices"
        );
        assert!(lines[1].contains(",BTCUSDT,98765.4,98666.63,95706.63,3.0,10,10,0,0,2,0,0.0147,1000,3,194000"));
    }

    #[test]
    fn test_snapshot_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan_snapshot.csv");
        let mut plan = sample_plan();
        plan.level_mut(0).unwrap().mark_placed("abc");

        let rows = export_snapshot(&plan, &path).unwrap();
        assert_eq!(rows, 10);

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(
            headers.iter().collect::<Vec<_>>(),
            vec!["ts_iso", "symbol", "idx", "side", "price", "status", "orderId"]
        );
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 10);
        assert_eq!(&records[0][3], "BUY");
        assert_eq!(&records[0][5], "PLACED");
        assert_eq!(&records[0][6], "abc");
        assert_eq!(&records[9][4], "110000");
        assert_eq!(&records[9][6], "");
    }
}
