//! QuickVote domain logic.
//!
//! Everything in this crate is pure: no database access, no I/O. The
//! persistence layer (`quickvote-db`) and the HTTP layer (`quickvote-api`)
//! feed rows in and serialize results out.

pub mod access;
pub mod answers;
pub mod error;
pub mod export;
pub mod notify;
pub mod roles;
pub mod statistics;
pub mod status;
pub mod survey;
pub mod types;
