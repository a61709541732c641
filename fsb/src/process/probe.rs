use log::debug;

use crate::process::demux::DemuxOptions;
use crate::process::index::{BoundaryPolicy, SignatureIndex};
use crate::structs::candidate::{Candidate, StreamFormat};
use crate::structs::mpeg::find_frame_sync;
use crate::structs::signature::SignatureKind;
use crate::utils::errors::ProbeError;

/// Offset of the `WAVE` marker search relative to a `RIFF` match.
const WAVE_SEARCH_SKIP: usize = 4;

/// Yields the candidates of a single format, lowest offset first.
///
/// Each occurrence is searched after the previous one, up to the per-format
/// occurrence budget. `RIFF` matches without a nearby `WAVE` marker are
/// skipped and do not consume the budget.
#[derive(Debug, Clone)]
pub struct CandidateGenerator<'a> {
    format: StreamFormat,
    container: &'a [u8],
    index: SignatureIndex,
    cursor: usize,
    remaining: usize,
    wave_window: usize,
    boundary: BoundaryPolicy,
    rejected: usize,
}

impl<'a> CandidateGenerator<'a> {
    pub fn new(
        format: StreamFormat,
        container: &'a [u8],
        index: SignatureIndex,
        options: &DemuxOptions,
    ) -> Self {
        let boundary = match format {
            StreamFormat::Mpeg => options.mpeg_boundary,
            _ => options.boundary,
        };

        Self {
            format,
            container,
            index,
            cursor: 0,
            remaining: options.max_occurrences.max(1),
            wave_window: options.wave_window,
            boundary,
            rejected: 0,
        }
    }

    pub fn format(&self) -> StreamFormat {
        self.format
    }

    /// Number of `RIFF` matches rejected so far for lacking a `WAVE` marker.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    fn next_start(&mut self) -> Option<usize> {
        match self.format {
            StreamFormat::Ogg => self.index.find(self.container, SignatureKind::Ogg, self.cursor),
            StreamFormat::Flac => self.index.find(self.container, SignatureKind::Flac, self.cursor),
            StreamFormat::Wave => self.next_riff(),
            StreamFormat::Mpeg => find_frame_sync(self.container, self.cursor),
        }
    }

    fn next_riff(&mut self) -> Option<usize> {
        loop {
            let start = self.index.find(self.container, SignatureKind::Riff, self.cursor)?;

            let corroborated = self
                .index
                .find_within(
                    self.container,
                    SignatureKind::Wave,
                    start + WAVE_SEARCH_SKIP,
                    start.saturating_add(self.wave_window),
                )
                .is_some();

            if corroborated {
                return Some(start);
            }

            let error = ProbeError::FalsePositiveRejected {
                offset: start,
                window: self.wave_window,
            };
            debug!("{error}");

            self.rejected += 1;
            self.cursor = start + 1;
        }
    }
}

impl Iterator for CandidateGenerator<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let Some(start) = self.next_start() else {
            self.remaining = 0;
            return None;
        };

        self.cursor = start + 1;
        self.remaining -= 1;

        let end = self.index.segment_end(
            self.container,
            start,
            self.format.signature_kind(),
            self.boundary,
        );

        let candidate = Candidate {
            format: self.format,
            start,
            end,
        };
        debug!("Found {candidate}");

        Some(candidate)
    }
}

/// Ordered list of candidate generators, one per probed format.
///
/// Iterating a `Prober` yields every candidate in priority order without
/// decoding anything, which is what dry runs and diagnostics use. The
/// demuxer walks [`generators`](Prober::into_generators) instead so it can
/// report which format is being probed.
///
/// # Example
///
/// ```rust
/// use fsb::process::EXAMPLE_DATA;
/// use fsb::process::demux::ContainerDemuxer;
/// use fsb::structs::candidate::StreamFormat;
///
/// let demuxer = ContainerDemuxer::default();
/// let candidates: Vec<_> = demuxer.probe(EXAMPLE_DATA).collect();
///
/// assert_eq!(candidates.len(), 1);
/// assert_eq!(candidates[0].format, StreamFormat::Wave);
/// assert_eq!(candidates[0].start, 16);
/// assert_eq!(candidates[0].end, EXAMPLE_DATA.len());
/// ```
#[derive(Debug, Clone)]
pub struct Prober<'a> {
    generators: Vec<CandidateGenerator<'a>>,
    current: usize,
}

impl<'a> Prober<'a> {
    pub fn new(container: &'a [u8], index: SignatureIndex, options: &DemuxOptions) -> Self {
        let generators = options
            .probe_order()
            .into_iter()
            .map(|format| CandidateGenerator::new(format, container, index, options))
            .collect();

        Self {
            generators,
            current: 0,
        }
    }

    pub fn formats(&self) -> Vec<StreamFormat> {
        self.generators.iter().map(CandidateGenerator::format).collect()
    }

    pub fn into_generators(self) -> Vec<CandidateGenerator<'a>> {
        self.generators
    }
}

impl Iterator for Prober<'_> {
    type Item = Candidate;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(generator) = self.generators.get_mut(self.current) {
            if let Some(candidate) = generator.next() {
                return Some(candidate);
            }
            self.current += 1;
        }
        None
    }
}
