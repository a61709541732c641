use crate::structs::candidate::{Candidate, StreamFormat};

/// Terminal outcome of an extraction call.
#[derive(thiserror::Error, Debug)]
pub enum DemuxError {
    #[error(
        "Unsupported FSB contents: no decodable embedded stream found (probed {probed}; {attempts} decode attempt(s) failed). \
         FSB banks may carry codecs such as FMOD ADPCM, XMA or Vorbis headers stripped by FMOD, \
         which must be transcoded with an external tool before playback.",
        probed = format_list(.formats),
        attempts = .attempted.len()
    )]
    Exhausted {
        formats: Vec<StreamFormat>,
        attempted: Vec<Candidate>,
    },
}

impl DemuxError {
    /// Candidates that reached the decoder before the call gave up.
    pub fn attempted(&self) -> &[Candidate] {
        match self {
            DemuxError::Exhausted { attempted, .. } => attempted,
        }
    }
}

fn format_list(formats: &[StreamFormat]) -> String {
    formats
        .iter()
        .map(StreamFormat::name)
        .collect::<Vec<_>>()
        .join("/")
}

/// Per-candidate probe and decode outcomes. These drive the fallback loop and
/// are logged, never returned to the caller.
#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    #[error("No known signature or MPEG frame sync found in {0} bytes")]
    NoSignatureFound(usize),

    #[error("RIFF at {offset:#x} has no WAVE marker within {window} bytes, ignoring")]
    FalsePositiveRejected { offset: usize, window: usize },

    #[error("Decoding {candidate} failed: {reason:#}")]
    DecodeAttemptFailed {
        candidate: Candidate,
        reason: anyhow::Error,
    },
}

#[derive(thiserror::Error, Debug)]
pub enum MpegHeaderError {
    #[error("MPEG frame header needs 4 bytes, got {0}")]
    Truncated(usize),

    #[error("Missing frame sync: read {0:#05X}")]
    NoSync(u16),

    #[error("Reserved MPEG version")]
    ReservedVersion,

    #[error("Reserved MPEG layer")]
    ReservedLayer,

    #[error("Invalid bitrate index {0}")]
    BadBitrate(u8),

    #[error("Invalid sample rate index {0}")]
    BadSampleRate(u8),
}

#[test]
fn exhausted_message() {
    let err = DemuxError::Exhausted {
        formats: StreamFormat::PRIORITY.to_vec(),
        attempted: vec![],
    };
    let msg = err.to_string();
    assert!(msg.contains("OGG/WAV/FLAC/MPEG"));
    assert!(msg.contains("0 decode attempt(s)"));
    assert!(msg.contains("ADPCM"));
    assert!(msg.contains("XMA"));
    assert!(msg.contains("external tool"));
}
