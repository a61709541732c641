use log::trace;

use crate::structs::signature::{
    BOUNDARY_SIGNATURES, MIN_SIGNATURE_LEN, SIGNATURES, Signature, SignatureKind,
};

/// Returns the lowest index `i >= from` where `container[i..]` starts with
/// `pattern`.
///
/// Returns `None` when there is no such index, including when
/// `from + pattern.len()` runs past the end of the container.
///
/// # Example
///
/// ```rust
/// use fsb::process::index::find;
///
/// let data = b"junkOggS..OggS";
/// assert_eq!(find(data, b"OggS", 0), Some(4));
/// assert_eq!(find(data, b"OggS", 5), Some(10));
/// assert_eq!(find(data, b"OggS", 11), None);
/// ```
pub fn find(container: &[u8], pattern: &[u8], from: usize) -> Option<usize> {
    find_within(container, pattern, from, usize::MAX)
}

/// Like [`find`], but only accepts matches starting before `until`.
pub fn find_within(container: &[u8], pattern: &[u8], from: usize, until: usize) -> Option<usize> {
    // one past the last admissible start offset
    let last = (container.len() + 1).checked_sub(pattern.len())?.min(until);
    if from >= last {
        return None;
    }

    if pattern.is_empty() {
        return Some(from);
    }

    container[from..last + pattern.len() - 1]
        .windows(pattern.len())
        .position(|window| window == pattern)
        .map(|i| from + i)
}

/// How far a candidate's segment reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Stop at the next boundary signature of a different kind.
    #[default]
    NextSignature,
    /// Run to the end of the container.
    ContainerEnd,
}

/// Exact byte-pattern search over a container using the static signature
/// table.
#[derive(Debug, Clone, Copy)]
pub struct SignatureIndex {
    signatures: &'static [Signature],
    boundaries: &'static [Signature],
}

impl Default for SignatureIndex {
    fn default() -> Self {
        Self {
            signatures: &SIGNATURES,
            boundaries: &BOUNDARY_SIGNATURES,
        }
    }
}

impl SignatureIndex {
    pub fn signatures(&self) -> &'static [Signature] {
        self.signatures
    }

    /// First occurrence of the signature `kind` at or after `from`.
    pub fn find(&self, container: &[u8], kind: SignatureKind, from: usize) -> Option<usize> {
        find(container, kind.signature().bytes, from)
    }

    /// First occurrence of `kind` starting in `from..until`.
    pub fn find_within(
        &self,
        container: &[u8],
        kind: SignatureKind,
        from: usize,
        until: usize,
    ) -> Option<usize> {
        find_within(container, kind.signature().bytes, from, until)
    }

    /// Nearest boundary signature strictly after `start + MIN_SIGNATURE_LEN`,
    /// skipping `exclude`.
    pub fn next_boundary(
        &self,
        container: &[u8],
        start: usize,
        exclude: Option<SignatureKind>,
    ) -> Option<(usize, SignatureKind)> {
        let from = start.saturating_add(MIN_SIGNATURE_LEN + 1);

        self.boundaries
            .iter()
            .filter(|sig| Some(sig.kind) != exclude)
            .filter_map(|sig| find(container, sig.bytes, from).map(|offset| (offset, sig.kind)))
            .min_by_key(|&(offset, _)| offset)
    }

    /// End offset (exclusive) of the segment starting at `start`.
    ///
    /// Always greater than `start` when `start < container.len()`.
    pub fn segment_end(
        &self,
        container: &[u8],
        start: usize,
        exclude: Option<SignatureKind>,
        policy: BoundaryPolicy,
    ) -> usize {
        if policy == BoundaryPolicy::ContainerEnd {
            return container.len();
        }

        match self.next_boundary(container, start, exclude) {
            Some((offset, kind)) => {
                trace!("Segment at {start:#x} ends at {kind} marker {offset:#x}");
                offset
            }
            None => container.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container_with(len: usize, marks: &[(usize, &str)]) -> Vec<u8> {
        let mut data = vec![0u8; len];
        for (offset, bytes) in marks {
            data[*offset..*offset + bytes.len()].copy_from_slice(bytes.as_bytes());
        }
        data
    }

    #[test]
    fn find_edges() {
        let data = b"abcOggS";
        assert_eq!(find(data, b"OggS", 0), Some(3));
        assert_eq!(find(data, b"OggS", 3), Some(3));
        assert_eq!(find(data, b"OggS", 4), None);
        assert_eq!(find(data, b"OggS", 7), None);
        assert_eq!(find(data, b"OggS", 100), None);
        assert_eq!(find(data, b"OggSOggS", 0), None);
        assert_eq!(find(&[], b"OggS", 0), None);
        assert_eq!(find(data, b"", 2), Some(2));
        assert_eq!(find(data, b"", 7), Some(7));
        assert_eq!(find(data, b"", 8), None);
        assert_eq!(find(data, b"c", 0), Some(2));
    }

    #[test]
    fn find_within_window() {
        let data = container_with(300, &[(127, "WAVE"), (200, "WAVE")]);
        assert_eq!(find_within(&data, b"WAVE", 4, 128), Some(127));
        assert_eq!(find_within(&data, b"WAVE", 4, 127), None);
        assert_eq!(find_within(&data, b"WAVE", 128, 1000), Some(200));
        assert_eq!(find_within(&data, b"WAVE", 4, 0), None);
        assert_eq!(find_within(&data, b"WAVE", 300, 1000), None);
    }

    #[test]
    fn boundary_skips_own_kind() {
        let index = SignatureIndex::default();
        let data = container_with(1000, &[(0, "OggS"), (100, "OggS"), (600, "fLaC")]);

        assert_eq!(
            index.next_boundary(&data, 0, Some(SignatureKind::Ogg)),
            Some((600, SignatureKind::Flac))
        );
        assert_eq!(
            index.next_boundary(&data, 0, None),
            Some((100, SignatureKind::Ogg))
        );
        assert_eq!(
            index.segment_end(&data, 0, Some(SignatureKind::Ogg), BoundaryPolicy::NextSignature),
            600
        );
        assert_eq!(
            index.segment_end(&data, 0, None, BoundaryPolicy::ContainerEnd),
            1000
        );
        assert_eq!(
            index.segment_end(&data, 600, Some(SignatureKind::Flac), BoundaryPolicy::NextSignature),
            1000
        );
    }

    #[test]
    fn boundary_is_strictly_after_start() {
        let index = SignatureIndex::default();
        let flac = Some(SignatureKind::Flac);

        // ID3 at start + 3 is too close to count
        let data = container_with(64, &[(10, "fLaC"), (13, "ID3")]);
        assert_eq!(
            index.segment_end(&data, 10, flac, BoundaryPolicy::NextSignature),
            64
        );

        let data = container_with(64, &[(10, "fLaC"), (14, "ID3")]);
        assert_eq!(
            index.segment_end(&data, 10, flac, BoundaryPolicy::NextSignature),
            14
        );
    }

    #[test]
    fn wave_is_not_a_boundary() {
        let index = SignatureIndex::default();
        let data = container_with(64, &[(0, "RIFF"), (8, "WAVE")]);
        assert_eq!(index.next_boundary(&data, 0, Some(SignatureKind::Riff)), None);
    }
}
