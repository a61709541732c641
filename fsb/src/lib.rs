#![doc = include_str!("../README.md")]
//!
//! ## Technical Overview
//!
//! Heuristic locator for audio streams embedded in FSB-style sound banks.
//!
//! ### Container Model
//!
//! The outer bank layout is treated as undocumented. The only assumption is
//! that a complete OGG, RIFF/WAVE, FLAC or frame-synced MPEG stream sits
//! somewhere inside it, possibly followed by padding, metadata or another
//! stream.
//!
//! ### Probing Order
//!
//! 1. `OggS`
//! 2. `RIFF`, corroborated by `WAVE` within 128 bytes
//! 3. `fLaC`
//! 4. MPEG frame sync (`0xFF`, top three bits of the next byte set)
//!
//! A candidate's segment ends at the next foreign signature (`OggS`, `RIFF`,
//! `fLaC` or `ID3`) or at the end of the container.
//!
//! ### Decoding
//!
//! Decoding is delegated to a [`DecodeCapability`](process::capability::DecodeCapability).
//! A failed decode moves on to the next candidate; only running out of
//! candidates is reported.
//!
//! ## Quick Start
//!
//! ```rust
//! use fsb::process::{EXAMPLE_DATA, demux::ContainerDemuxer};
//!
//! let demuxer = ContainerDemuxer::default();
//!
//! for candidate in demuxer.probe(EXAMPLE_DATA) {
//!     let bytes = candidate.slice(EXAMPLE_DATA);
//!     println!("{candidate}: {} bytes, {}", bytes.len(), candidate.format.mime_type());
//! }
//! ```

/// Probing and demuxing.
///
/// 1. **Search** ([`process::index`]): exact signature search and segment
///    boundaries.
///
/// 2. **Probing** ([`process::probe`]): ordered candidate generators.
///
/// 3. **Demuxing** ([`process::demux`]): decode attempts with fallback through
///    a [`process::capability::DecodeCapability`].
pub mod process;

/// Data structures describing signatures and candidates.
///
/// - **Signatures** ([`structs::signature`]): static magic byte table
/// - **Candidates** ([`structs::candidate`]): format and byte range guesses
/// - **MPEG** ([`structs::mpeg`]): frame sync detection and header fields
pub mod structs;

/// Utility functions and supporting infrastructure.
///
/// - **Error Handling** ([`utils::errors`]): Error types
pub mod utils;
