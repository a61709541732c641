//! Supporting infrastructure.
//!
//! - **Error Handling** ([`errors`]): terminal and per-candidate error types

pub mod errors;
