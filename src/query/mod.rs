//! Query / Trend Layer: a small, pure read API over the store. Each query
//! is one SQL statement plus post-processing; nothing here is stateful
//! beyond the store itself.

mod agents;
mod server;
mod trend;

pub use agents::tokens_per_hour;
pub use server::{network_average, network_sparkline, recent_server_metrics, server_averages};
pub use trend::{trend, Trend};

pub use crate::common::sparkline;
