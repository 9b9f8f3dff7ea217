//! Macro utilities for building keyed collections

pub mod collections;
