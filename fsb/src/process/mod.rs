/// Byte-pattern search over a container.
///
/// Provides [`find`](index::find) and the [`SignatureIndex`](index::SignatureIndex),
/// which also computes where a candidate's segment ends.
pub mod index;

/// Candidate generation.
///
/// Provides one [`CandidateGenerator`](probe::CandidateGenerator) per format and
/// the ordered [`Prober`](probe::Prober) that chains them.
pub mod probe;

/// The external decoder interface.
///
/// Provides the [`DecodeCapability`](capability::DecodeCapability) trait and a
/// closure adapter.
pub mod capability;

/// Fallback loop over candidates.
///
/// Provides the [`ContainerDemuxer`](demux::ContainerDemuxer) and its
/// [`DemuxOptions`](demux::DemuxOptions).
pub mod demux;

/// A minimal FSB5-style bank holding one 8 kHz mono PCM WAV stream at offset 16.
pub const EXAMPLE_DATA: &[u8] = &[
    0x46, 0x53, 0x42, 0x35, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x52, 0x49, 0x46, 0x46, 0x2C, 0x00, 0x00, 0x00, 0x57, 0x41, 0x56, 0x45, 0x66, 0x6D, 0x74, 0x20,
    0x10, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x40, 0x1F, 0x00, 0x00, 0x80, 0x3E, 0x00, 0x00,
    0x02, 0x00, 0x10, 0x00, 0x64, 0x61, 0x74, 0x61, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10,
    0x00, 0x20, 0x00, 0x10,
];
