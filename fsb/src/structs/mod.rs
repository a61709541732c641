//! Data structures shared by the probing and demuxing stages.
//!
//! Contains the static signature table, the candidate description handed to
//! decoders, and the MPEG frame header used to describe frame-synced audio.

pub mod candidate;
pub mod mpeg;
pub mod signature;
