//! Embedded schema scripts.
//!
//! The two scripts live under `sql/` as static assets and are embedded at
//! compile time. The persistent script runs once per store file; the
//! ephemeral script runs at every open against the attached `:memory:`
//! database, which is how the temporary partition starts empty.

/// Creates the durable tables, indexes, and seed rows.
pub(crate) const PERSISTENT_SCHEMA: &str = include_str!("../../sql/schema.sql");

/// Creates the volatile partition in the attached `cache` database.
pub(crate) const EPHEMERAL_SCHEMA: &str = include_str!("../../sql/schema_cache.sql");

/// Version recorded by the persistent schema's `info` table.
pub(crate) const SCHEMA_VERSION: &str = "1";
