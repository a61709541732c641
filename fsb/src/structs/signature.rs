//! Magic byte signatures of the sub-formats that can hide inside a container.
//!
//! ## Roles
//!
//! - **Primary**: `OggS`, `RIFF`, `fLaC` start a candidate stream.
//! - **Corroboration**: `WAVE` only confirms a nearby `RIFF`.
//! - **Boundary**: `OggS`, `RIFF`, `fLaC` and `ID3` terminate the segment of
//!   a preceding candidate.
//!
//! MPEG audio has no fixed signature; its frame sync is matched structurally,
//! see [`crate::structs::mpeg`].

use std::fmt::Display;

/// Identifies one entry of the static signature table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureKind {
    Ogg,
    Riff,
    Wave,
    Flac,
    Id3,
}

/// A named, immutable magic byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub kind: SignatureKind,
    pub name: &'static str,
    pub bytes: &'static [u8],
}

pub const OGG: Signature = Signature {
    kind: SignatureKind::Ogg,
    name: "OggS",
    bytes: b"OggS",
};

pub const RIFF: Signature = Signature {
    kind: SignatureKind::Riff,
    name: "RIFF",
    bytes: b"RIFF",
};

pub const WAVE: Signature = Signature {
    kind: SignatureKind::Wave,
    name: "WAVE",
    bytes: b"WAVE",
};

pub const FLAC: Signature = Signature {
    kind: SignatureKind::Flac,
    name: "fLaC",
    bytes: b"fLaC",
};

pub const ID3: Signature = Signature {
    kind: SignatureKind::Id3,
    name: "ID3",
    bytes: b"ID3",
};

/// Every registered signature, in probing priority order.
pub const SIGNATURES: [Signature; 5] = [OGG, RIFF, WAVE, FLAC, ID3];

/// Signatures whose next occurrence ends the segment of an earlier candidate.
pub const BOUNDARY_SIGNATURES: [Signature; 4] = [OGG, RIFF, FLAC, ID3];

/// Length of the shortest boundary signature.
pub const MIN_SIGNATURE_LEN: usize = {
    let mut min = usize::MAX;
    let mut i = 0;
    while i < BOUNDARY_SIGNATURES.len() {
        if BOUNDARY_SIGNATURES[i].bytes.len() < min {
            min = BOUNDARY_SIGNATURES[i].bytes.len();
        }
        i += 1;
    }
    min
};

impl SignatureKind {
    pub const fn signature(self) -> Signature {
        match self {
            SignatureKind::Ogg => OGG,
            SignatureKind::Riff => RIFF,
            SignatureKind::Wave => WAVE,
            SignatureKind::Flac => FLAC,
            SignatureKind::Id3 => ID3,
        }
    }

    pub fn is_boundary(self) -> bool {
        BOUNDARY_SIGNATURES.iter().any(|sig| sig.kind == self)
    }
}

impl Display for SignatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.signature().name)
    }
}

#[test]
fn signature_table() {
    assert_eq!(MIN_SIGNATURE_LEN, 3);
    assert!(SIGNATURES.iter().all(|sig| sig.kind.signature() == *sig));
    assert!(!SignatureKind::Wave.is_boundary());
    assert!(SignatureKind::Id3.is_boundary());
    assert_eq!(SignatureKind::Flac.to_string(), "fLaC");
}
