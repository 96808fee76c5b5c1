//! Database handle and result fetching
//!
//! This module contains the fetch seam, the named-placeholder binding
//! layer, and the PostgreSQL implementation.

pub mod bind;
pub mod postgres;
pub mod traits;
