//! Live system monitor: samples `/proc`-style counters and renders them as a
//! terminal dashboard.

pub mod action;
pub mod app;
pub mod config;
pub mod dashboard;
pub mod event;
pub mod format;
pub mod logging;
pub mod system;
pub mod terminal;
pub mod ui;
