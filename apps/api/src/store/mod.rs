//! Tenant-scoped persistence — the single point of entry for all SQL.
//!
//! ARCHITECTURAL RULE: no other module may touch the `documents` or
//! `analyses` tables. Every function here takes the caller's [`OwnerId`] and
//! compiles the ownership filter into the query itself, so there is no code
//! path that returns rows a caller does not own. Absence after filtering is
//! `None` / zero rows; callers surface that as `NotFound`, which is
//! indistinguishable from "exists but belongs to someone else".

pub mod analyses;
pub mod documents;
