//! # Analysis Client
//!
//! Scoring service connectivity for the screening view:
//! - `AnalysisService` trait over `/predict`, `/explain`, `/macro-risk`
//! - reqwest-backed HTTP implementation
//! - Per-row dispatcher with generation tokens and cancellation
//! - Prometheus request metrics
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │     AnalysisDispatcher (ViewState reducer)   │
//! └────────────┬─────────────────────────────────┘
//!              │ Dispatch / Cancel
//! ┌────────────▼─────────────────────────────────┐
//! │   AnalysisService  ──►  HttpAnalysisClient   │
//! └────────────┬─────────────────────────────────┘
//!              │ POST JSON
//! ┌────────────▼─────────────────────────────────┐
//! │              Scoring service                 │
//! └──────────────────────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unused_qualifications)]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod metrics;
pub mod service;

pub use config::ClientConfig;
pub use dispatcher::{AnalysisDispatcher, ToggleOutcome};
pub use error::{Error, Result};
pub use http::HttpAnalysisClient;
pub use metrics::{ClientMetrics, Outcome};
pub use service::AnalysisService;

/// Default scoring service base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default request timeout (seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 30;
