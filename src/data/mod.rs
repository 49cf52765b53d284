//! Data layer: core types, loading, filtering and derived views.
//!
//! Architecture:
//! ```text
//!  .csv / .xlsx / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader  │  parse file → StudentDataset (typed, validated)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter  │  program ∧ campus ∧ term window → filtered indices
//!   └──────────┘
//!        │
//!        ├──▶ risk     needs-advising column
//!        ├──▶ metrics  KPIs
//!        ├──▶ charts   group mean / term mean
//!        ├──▶ stats    missing values, descriptive stats
//!        └──▶ export   filtered CSV
//! ```
//!
//! `view` runs the whole chain in one call.

pub mod charts;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod metrics;
pub mod model;
pub mod risk;
pub mod stats;
pub mod view;
