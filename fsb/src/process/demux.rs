use std::fmt::Display;

use log::{debug, info, warn};

use crate::process::capability::DecodeCapability;
use crate::process::index::{BoundaryPolicy, SignatureIndex};
use crate::process::probe::Prober;
use crate::structs::candidate::{Candidate, StreamFormat};
use crate::utils::errors::{DemuxError, ProbeError};

/// Upper bound (exclusive, relative to `RIFF`) for the start of the
/// corroborating `WAVE` marker.
pub const DEFAULT_WAVE_WINDOW: usize = 128;

/// Tunables for probing and slicing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemuxOptions {
    /// Formats to probe, highest priority first. Duplicates are ignored.
    pub formats: Vec<StreamFormat>,
    /// A `RIFF` match needs `WAVE` to start within this many bytes.
    pub wave_window: usize,
    /// Occurrences of each format handed to the decoder before moving on.
    pub max_occurrences: usize,
    /// Segment boundary for OGG, WAV and FLAC candidates.
    pub boundary: BoundaryPolicy,
    /// Segment boundary for MPEG frame-sync candidates.
    pub mpeg_boundary: BoundaryPolicy,
    /// Pass the matched format to the decoder as a hint.
    pub mime_hints: bool,
}

impl Default for DemuxOptions {
    fn default() -> Self {
        Self {
            formats: StreamFormat::PRIORITY.to_vec(),
            wave_window: DEFAULT_WAVE_WINDOW,
            max_occurrences: 1,
            boundary: BoundaryPolicy::NextSignature,
            mpeg_boundary: BoundaryPolicy::NextSignature,
            mime_hints: true,
        }
    }
}

impl DemuxOptions {
    /// Probe order with duplicates removed.
    pub fn probe_order(&self) -> Vec<StreamFormat> {
        let mut order = Vec::with_capacity(self.formats.len());
        for format in &self.formats {
            if !order.contains(format) {
                order.push(*format);
            }
        }
        order
    }
}

/// Progress of a single extraction call.
///
/// ```text
/// Idle -> Probing(f) -> Decoding(c) -> Success(c)
///                                   -> Failed(c) -> Decoding(next) | Probing(next f) | Exhausted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemuxState {
    Idle,
    Probing(StreamFormat),
    Decoding(Candidate),
    Failed(Candidate),
    Success(Candidate),
    Exhausted,
}

impl DemuxState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DemuxState::Success(_) | DemuxState::Exhausted)
    }
}

impl Display for DemuxState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemuxState::Idle => write!(f, "idle"),
            DemuxState::Probing(format) => write!(f, "probing {format}"),
            DemuxState::Decoding(candidate) => write!(f, "decoding {candidate}"),
            DemuxState::Failed(candidate) => write!(f, "failed {candidate}"),
            DemuxState::Success(candidate) => write!(f, "decoded {candidate}"),
            DemuxState::Exhausted => write!(f, "exhausted"),
        }
    }
}

/// Outcome of one decode attempt.
#[derive(Debug)]
pub enum Attempt<T> {
    Decoded(T),
    Continue(ProbeError),
}

/// A successfully decoded embedded stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub candidate: Candidate,
    pub audio: T,
    /// Candidates that failed to decode before this one.
    pub failed_attempts: usize,
}

/// Locates embedded audio streams and drives decode attempts with fallback.
///
/// The demuxer holds no per-call state; one instance can serve any number of
/// concurrent extractions.
///
/// # Example
///
/// ```rust
/// use fsb::process::EXAMPLE_DATA;
/// use fsb::process::capability::decode_fn;
/// use fsb::process::demux::ContainerDemuxer;
/// use fsb::structs::candidate::StreamFormat;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> anyhow::Result<()> {
/// let demuxer = ContainerDemuxer::default();
/// let decoder = decode_fn(|data: &[u8], hint| Ok((data.len(), hint)));
///
/// let extracted = demuxer.extract(EXAMPLE_DATA, &decoder).await?;
/// assert_eq!(extracted.candidate.format, StreamFormat::Wave);
/// assert_eq!(extracted.audio, (52, Some(StreamFormat::Wave)));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContainerDemuxer {
    index: SignatureIndex,
    options: DemuxOptions,
}

impl ContainerDemuxer {
    pub fn new(options: DemuxOptions) -> Self {
        Self {
            index: SignatureIndex::default(),
            options,
        }
    }

    pub fn options(&self) -> &DemuxOptions {
        &self.options
    }

    /// Lists candidates in attempt order without decoding.
    pub fn probe<'a>(&self, container: &'a [u8]) -> Prober<'a> {
        Prober::new(container, self.index, &self.options)
    }

    /// Hands one candidate's bytes to the decoder.
    pub async fn attempt<C>(
        &self,
        container: &[u8],
        candidate: Candidate,
        capability: &C,
    ) -> Attempt<C::Output>
    where
        C: DecodeCapability + ?Sized,
    {
        let hint = self.options.mime_hints.then_some(candidate.format);

        match capability.decode(candidate.slice(container), hint).await {
            Ok(audio) => Attempt::Decoded(audio),
            Err(reason) => Attempt::Continue(ProbeError::DecodeAttemptFailed { candidate, reason }),
        }
    }

    /// Decodes the first candidate the capability accepts.
    pub async fn extract<C>(
        &self,
        container: &[u8],
        capability: &C,
    ) -> Result<Extracted<C::Output>, DemuxError>
    where
        C: DecodeCapability + ?Sized,
    {
        self.extract_observed(container, capability, |_| {}).await
    }

    /// [`extract`](Self::extract), reporting every state transition to
    /// `observe`.
    pub async fn extract_observed<C, F>(
        &self,
        container: &[u8],
        capability: &C,
        mut observe: F,
    ) -> Result<Extracted<C::Output>, DemuxError>
    where
        C: DecodeCapability + ?Sized,
        F: FnMut(DemuxState),
    {
        observe(DemuxState::Idle);

        let prober = self.probe(container);
        let formats = prober.formats();
        let mut attempted = Vec::new();

        for generator in prober.into_generators() {
            observe(DemuxState::Probing(generator.format()));

            for candidate in generator {
                debug!("Trying {candidate}");
                observe(DemuxState::Decoding(candidate));

                match self.attempt(container, candidate, capability).await {
                    Attempt::Decoded(audio) => {
                        info!("Decoded embedded {candidate}");
                        observe(DemuxState::Success(candidate));

                        return Ok(Extracted {
                            candidate,
                            audio,
                            failed_attempts: attempted.len(),
                        });
                    }
                    Attempt::Continue(error) => {
                        warn!("{error}");
                        observe(DemuxState::Failed(candidate));
                        attempted.push(candidate);
                    }
                }
            }
        }

        if attempted.is_empty() {
            warn!("{}", ProbeError::NoSignatureFound(container.len()));
        }
        observe(DemuxState::Exhausted);

        Err(DemuxError::Exhausted { formats, attempted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::capability::decode_fn;
    use anyhow::anyhow;

    fn container_with(len: usize, marks: &[(usize, &[u8])]) -> Vec<u8> {
        let mut data = vec![0u8; len];
        for &(offset, bytes) in marks {
            data[offset..offset + bytes.len()].copy_from_slice(bytes);
        }
        data
    }

    #[tokio::test]
    async fn state_transitions() {
        let data = container_with(256, &[(10, b"OggS"), (100, b"fLaC")]);
        let decoder = decode_fn(|_: &[u8], hint| match hint {
            Some(StreamFormat::Flac) => Ok(()),
            _ => Err(anyhow!("not flac")),
        });

        let mut states = Vec::new();
        let result = ContainerDemuxer::default()
            .extract_observed(&data, &decoder, |state| states.push(state))
            .await;
        assert!(result.is_ok());

        let ogg = Candidate { format: StreamFormat::Ogg, start: 10, end: 100 };
        let flac = Candidate { format: StreamFormat::Flac, start: 100, end: 256 };
        assert_eq!(
            states,
            [
                DemuxState::Idle,
                DemuxState::Probing(StreamFormat::Ogg),
                DemuxState::Decoding(ogg),
                DemuxState::Failed(ogg),
                DemuxState::Probing(StreamFormat::Wave),
                DemuxState::Probing(StreamFormat::Flac),
                DemuxState::Decoding(flac),
                DemuxState::Success(flac),
            ]
        );
        assert!(states.last().is_some_and(DemuxState::is_terminal));
    }

    #[tokio::test]
    async fn exhausted_reports_attempts() {
        let data = container_with(256, &[(10, b"OggS"), (200, &[0xFF, 0xF3])]);
        let decoder = decode_fn(|_: &[u8], _| -> anyhow::Result<()> { Err(anyhow!("no codec")) });

        let mut last = DemuxState::Idle;
        let err = ContainerDemuxer::default()
            .extract_observed(&data, &decoder, |state| last = state)
            .await
            .unwrap_err();

        assert_eq!(last, DemuxState::Exhausted);
        let DemuxError::Exhausted { formats, attempted } = &err;
        assert_eq!(formats, &StreamFormat::PRIORITY);
        assert_eq!(
            attempted.iter().map(|c| c.format).collect::<Vec<_>>(),
            [StreamFormat::Ogg, StreamFormat::Mpeg]
        );
        assert!(err.to_string().contains("2 decode attempt(s) failed"));
    }

    #[tokio::test]
    async fn hints_can_be_disabled() {
        let data = container_with(64, &[(0, b"fLaC")]);
        let decoder = decode_fn(|_: &[u8], hint| Ok(hint));

        let extracted = ContainerDemuxer::default().extract(&data, &decoder).await.unwrap();
        assert_eq!(extracted.audio, Some(StreamFormat::Flac));

        let demuxer = ContainerDemuxer::new(DemuxOptions {
            mime_hints: false,
            ..DemuxOptions::default()
        });
        let extracted = demuxer.extract(&data, &decoder).await.unwrap();
        assert_eq!(extracted.audio, None);
    }

    #[tokio::test]
    async fn retries_next_occurrence() {
        let data = container_with(512, &[(0, b"OggS"), (200, b"OggS")]);
        let decoder = decode_fn(|data: &[u8], _| {
            if data.len() > 400 {
                Err(anyhow!("garbage before the real stream"))
            } else {
                Ok(data.len())
            }
        });

        let err = ContainerDemuxer::default().extract(&data, &decoder).await.unwrap_err();
        assert_eq!(err.attempted().len(), 1);

        let demuxer = ContainerDemuxer::new(DemuxOptions {
            max_occurrences: 4,
            ..DemuxOptions::default()
        });
        let extracted = demuxer.extract(&data, &decoder).await.unwrap();
        assert_eq!(extracted.candidate.start, 200);
        assert_eq!(extracted.audio, 312);
        assert_eq!(extracted.failed_attempts, 1);
    }

    #[test]
    fn probe_order_dedups() {
        let options = DemuxOptions {
            formats: vec![StreamFormat::Mpeg, StreamFormat::Mpeg, StreamFormat::Ogg],
            ..DemuxOptions::default()
        };
        assert_eq!(options.probe_order(), [StreamFormat::Mpeg, StreamFormat::Ogg]);
    }
}
