//! Probe results: which sub-format was matched and where its bytes live.

use std::fmt::Display;
use std::ops::Range;

use crate::structs::signature::SignatureKind;

/// Audio sub-formats the demuxer knows how to locate.
///
/// Variants are listed in default probing priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamFormat {
    Ogg,
    Wave,
    Flac,
    Mpeg,
}

impl StreamFormat {
    /// Default probing order. MPEG is last because its frame sync is the
    /// weakest evidence.
    pub const PRIORITY: [StreamFormat; 4] = [
        StreamFormat::Ogg,
        StreamFormat::Wave,
        StreamFormat::Flac,
        StreamFormat::Mpeg,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StreamFormat::Ogg => "OGG",
            StreamFormat::Wave => "WAV",
            StreamFormat::Flac => "FLAC",
            StreamFormat::Mpeg => "MPEG",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            StreamFormat::Ogg => "audio/ogg",
            StreamFormat::Wave => "audio/wav",
            StreamFormat::Flac => "audio/flac",
            StreamFormat::Mpeg => "audio/mpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            StreamFormat::Ogg => "ogg",
            StreamFormat::Wave => "wav",
            StreamFormat::Flac => "flac",
            StreamFormat::Mpeg => "mp3",
        }
    }

    /// Signature that starts a stream of this format, if it has one.
    ///
    /// The same signature is skipped when looking for the end of the segment,
    /// so consecutive Ogg pages do not split an Ogg stream.
    pub fn signature_kind(&self) -> Option<SignatureKind> {
        match self {
            StreamFormat::Ogg => Some(SignatureKind::Ogg),
            StreamFormat::Wave => Some(SignatureKind::Riff),
            StreamFormat::Flac => Some(SignatureKind::Flac),
            StreamFormat::Mpeg => None,
        }
    }
}

impl Display for StreamFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A tentative `(format, start, end)` guess awaiting decode confirmation.
///
/// `start < end <= container.len()` always holds for candidates produced by
/// [`Prober`](crate::process::probe::Prober).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    pub format: StreamFormat,
    pub start: usize,
    pub end: usize,
}

impl Candidate {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Borrows the candidate's bytes out of the container it was probed from.
    pub fn slice<'a>(&self, container: &'a [u8]) -> &'a [u8] {
        &container[self.range()]
    }
}

impl Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} @ {:#x}..{:#x} ({} bytes)",
            self.format,
            self.start,
            self.end,
            self.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_hints() {
        let mimes: Vec<_> = StreamFormat::PRIORITY
            .iter()
            .map(StreamFormat::mime_type)
            .collect();
        assert_eq!(mimes, ["audio/ogg", "audio/wav", "audio/flac", "audio/mpeg"]);
        assert_eq!(StreamFormat::Wave.signature_kind(), Some(SignatureKind::Riff));
        assert_eq!(StreamFormat::Mpeg.signature_kind(), None);
    }

    #[test]
    fn candidate_slice() {
        let container = b"..OggS....";
        let candidate = Candidate {
            format: StreamFormat::Ogg,
            start: 2,
            end: 10,
        };
        assert_eq!(candidate.len(), 8);
        assert_eq!(&candidate.slice(container)[..4], b"OggS");
        assert_eq!(candidate.to_string(), "OGG @ 0x2..0xa (8 bytes)");
    }
}
