//! Persistence for collected article records.

pub mod dataset;
