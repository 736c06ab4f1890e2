//! Differential photometry light curves.
//!
//! The [`data`] module holds the whole computation: column schema, table
//! loading, filter partitioning, night averaging and differential series.
//! The viewer binary only renders what [`data::pipeline`] produces.

pub mod data;
