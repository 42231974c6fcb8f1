//! Human-facing output for finished runs: terminal tables, CSV, SVG.

mod csv;
mod svg;
mod table;

pub use {
    csv::CsvReport,
    svg::{SvgOptions, equity_svg},
    table::{comparison_table, stats_table, trades_table},
};
