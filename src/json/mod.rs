//! Purpose: Own the untyped JSON tree seam shared by the decode engine.
//! Exports: `value` module with the tree aliases, kind names, and snapshots.
//! Role: Single place that knows the tree comes from `serde_json`.
//! Invariants: The engine only reads trees handed to it; nothing here mutates them.
//! Invariants: Text parsing stays with the caller; no parser entrypoints live here.

pub mod value;
