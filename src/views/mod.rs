//! Terminal renditions of the dashboard cards.

pub mod average;
pub mod chart;
pub mod news;
pub mod quotes;
pub mod slippage;
pub mod ui;
