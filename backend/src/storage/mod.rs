//! # Storage Module
//!
//! Handles all data persistence for babylog.
//!
//! The domain layer only sees the traits in [`traits`]. The shipped
//! implementation keeps one directory per baby with a YAML profile and CSV
//! tables (see [`csv`]); [`feed::SleepCheckFeed`] layers live snapshot
//! subscriptions on top of any sleep check store.
//!
//! Writes replace whole files through a temp file and rename, and every
//! read-modify-write cycle holds the connection's lock, so concurrent
//! requests in one process never interleave partial tables.

pub mod csv;
pub mod feed;
pub mod traits;

pub use feed::SleepCheckFeed;
pub use traits::*;
