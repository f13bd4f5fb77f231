//! Terminal dashboard for the xổ số API: draw lookup, statistics and the
//! rule-based analysis views, with per-view filters remembered on disk.
pub mod app;
pub mod client;
pub mod display;
pub mod filters;
pub mod format;
pub mod models;
pub mod views;
