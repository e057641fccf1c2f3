//! Journal domain model.
//!
//! # Responsibility
//! - Define the persisted record shapes (daily entry, quarterly review).
//! - Define canonical identifiers keying those records.
//!
//! # Invariants
//! - At most one record per identifier within a namespace.
//! - Records are replaced wholesale; there is no field-level merge.

pub mod daily_entry;
pub mod ids;
pub mod quarterly_review;
pub mod record;
