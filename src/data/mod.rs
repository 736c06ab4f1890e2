//! Data layer: photometry tables and the light-curve stages.
//!
//! Architecture:
//! ```text
//!  identifiers.csv          measurements.tsv
//!        │                        │
//!        ▼                        │
//!   ┌──────────┐                  │
//!   │  schema   │  ids → MAG_/ERR_ columns
//!   └──────────┘                  │
//!        │                        ▼
//!        └──────────────►┌──────────┐
//!                        │  loader   │  typed rows, sorted by epoch
//!                        └──────────┘
//!                              │
//!                              ▼
//!                        ┌──────────┐
//!                        │  filter   │  one subset per band
//!                        └──────────┘
//!                              │
//!                              ▼
//!                        ┌───────────┐
//!                        │ aggregate  │  one row per night (optional)
//!                        └───────────┘
//!                              │
//!                              ▼
//!                      ┌──────────────┐
//!                      │ differential  │  comparison mean − subject
//!                      └──────────────┘
//! ```
//! `pipeline` composes the stages; `config` holds the run options.

pub mod aggregate;
pub mod config;
pub mod differential;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod schema;
pub mod stats;
