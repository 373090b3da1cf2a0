//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - `FromRow` + `Serialize` entity structs matching database rows
//! - `Deserialize` + `Validate` create DTOs for inserts
//! - `Deserialize` update DTOs (all `Option` fields) for patches

pub mod dashboard;
pub mod lookup;
pub mod notification;
pub mod question;
pub mod response;
pub mod survey;
pub mod template;
