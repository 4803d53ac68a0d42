//! Rendering of computed statistics.

use std::io::{self, Write};

use serde::Serialize;

use crate::error::Result;
use crate::stats::AlphaBeta;

/// One row of output: a security measured against a benchmark
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub symbol: String,
    pub benchmark: String,
    pub alpha: f64,
    pub beta: f64,
    pub observations: usize,
}

impl StatsReport {
    pub fn new(symbol: impl Into<String>, benchmark: impl Into<String>, stats: AlphaBeta) -> Self {
        Self {
            symbol: symbol.into(),
            benchmark: benchmark.into(),
            alpha: stats.alpha,
            beta: stats.beta,
            observations: stats.observations,
        }
    }
}

/// Sink for computed statistics
pub trait Reporter: Send {
    fn report(&mut self, rows: &[StatsReport]) -> Result<()>;
}

/// Plain text table written to any writer, stdout by default
pub struct ConsoleReporter<W: Write = io::Stdout> {
    writer: W,
}

impl ConsoleReporter {
    pub fn stdout() -> Self {
        Self { writer: io::stdout() }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::stdout()
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

const HEADERS: [&str; 5] = ["stock", "benchmark", "beta", "alpha", "n"];

fn format_rows(rows: &[StatsReport]) -> Vec<[String; 5]> {
    rows.iter()
        .map(|row| {
            [
                row.symbol.clone(),
                row.benchmark.clone(),
                format!("{:.6}", row.beta),
                format!("{:.6}", row.alpha),
                row.observations.to_string(),
            ]
        })
        .collect()
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn report(&mut self, rows: &[StatsReport]) -> Result<()> {
        let cells = format_rows(rows);

        let mut widths = HEADERS.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let header: Vec<String> = HEADERS
            .iter()
            .zip(widths)
            .map(|(h, w)| format!("{:>w$}", h, w = w))
            .collect();
        writeln!(self.writer, "{}", header.join("  "))?;

        for row in &cells {
            let line: Vec<String> = row
                .iter()
                .zip(widths)
                .map(|(cell, w)| format!("{:>w$}", cell, w = w))
                .collect();
            writeln!(self.writer, "{}", line.join("  "))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
