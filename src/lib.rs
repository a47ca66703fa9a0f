//! Purpose: Decode typed values out of untyped JSON trees addressed by dotted key paths.
//! Exports: `api` (stable surface), `core` (engine internals), `json` (value model seam).
//! Role: Library crate; callers parse JSON themselves and hand over a `serde_json` object.
//! Invariants: Decoding is synchronous and never mutates the tree it reads.
//! Invariants: Collection item failures always go through an explicit recovery policy.
pub mod api;
pub mod core;
pub mod json;
