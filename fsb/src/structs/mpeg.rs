//! MPEG audio frame sync detection and header inspection.
//!
//! ## Frame Sync
//!
//! An MPEG audio frame starts with 11 set bits. Detection only checks the
//! first byte (`0xFF`) and the top three bits of the second byte, so any byte
//! pair can coincidentally match. That is why MPEG is probed last.
//!
//! ## Header Layout
//!
//! ```text
//! AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
//! A sync   B version  C layer  D protection
//! E bitrate F rate  G padding  H private
//! I mode   J mode ext  K copyright  L original  M emphasis
//! ```
//!
//! [`FrameHeader`] is diagnostic only. Whether a sync pair is a real stream is
//! decided by the decoder, never by header validity.

use std::fmt::Display;

use anyhow::{Result, bail};
use bitstream_io::{BigEndian, BitRead, BitReader};

use crate::utils::errors::MpegHeaderError;

/// Size of a frame header in bytes.
pub const HEADER_LEN: usize = 4;

/// Returns `true` when `b0 b1` look like the start of an MPEG frame.
#[inline(always)]
pub const fn is_frame_sync(b0: u8, b1: u8) -> bool {
    b0 == 0xFF && (b1 & 0xE0) == 0xE0
}

/// Offset of the first frame-sync byte pair at or after `from`.
pub fn find_frame_sync(container: &[u8], from: usize) -> Option<usize> {
    container
        .get(from..)?
        .windows(2)
        .position(|pair| is_frame_sync(pair[0], pair[1]))
        .map(|i| from + i)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegVersion {
    V1,
    V2,
    V25,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MpegLayer {
    I,
    II,
    III,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualChannel,
    Mono,
}

impl ChannelMode {
    pub fn channels(&self) -> u8 {
        match self {
            ChannelMode::Mono => 1,
            _ => 2,
        }
    }
}

const BITRATES_V1: [[u16; 15]; 3] = [
    [0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448],
    [0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384],
    [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320],
];

const BITRATES_V2: [[u16; 15]; 2] = [
    [0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256],
    [0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160],
];

const SAMPLE_RATES: [u32; 3] = [44100, 48000, 32000];

/// Decoded fields of a 32-bit MPEG audio frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: MpegVersion,
    pub layer: MpegLayer,
    pub protected: bool,
    /// kbit/s, `0` for free format.
    pub bitrate: u16,
    pub sample_rate: u32,
    pub padding: bool,
    pub channel_mode: ChannelMode,
}

impl FrameHeader {
    /// Parses the header at the start of `data`.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LEN {
            bail!(MpegHeaderError::Truncated(data.len()));
        }

        let mut reader: BitReader<&[u8], BigEndian> = BitReader::new(&data[..HEADER_LEN]);

        let sync: u16 = reader.read_unsigned_var(11)?;
        if sync != 0x7FF {
            bail!(MpegHeaderError::NoSync(sync));
        }

        let version = match reader.read_unsigned_var::<u8>(2)? {
            0b00 => MpegVersion::V25,
            0b10 => MpegVersion::V2,
            0b11 => MpegVersion::V1,
            _ => bail!(MpegHeaderError::ReservedVersion),
        };

        let layer = match reader.read_unsigned_var::<u8>(2)? {
            0b01 => MpegLayer::III,
            0b10 => MpegLayer::II,
            0b11 => MpegLayer::I,
            _ => bail!(MpegHeaderError::ReservedLayer),
        };

        let protected = !reader.read_bit()?;

        let bitrate_index: u8 = reader.read_unsigned_var(4)?;
        let bitrate = Self::bitrate(version, layer, bitrate_index)?;

        let rate_index: u8 = reader.read_unsigned_var(2)?;
        let Some(&base_rate) = SAMPLE_RATES.get(rate_index as usize) else {
            bail!(MpegHeaderError::BadSampleRate(rate_index));
        };
        let sample_rate = match version {
            MpegVersion::V1 => base_rate,
            MpegVersion::V2 => base_rate / 2,
            MpegVersion::V25 => base_rate / 4,
        };

        let padding = reader.read_bit()?;
        let _private = reader.read_bit()?;

        let channel_mode = match reader.read_unsigned_var::<u8>(2)? {
            0b00 => ChannelMode::Stereo,
            0b01 => ChannelMode::JointStereo,
            0b10 => ChannelMode::DualChannel,
            _ => ChannelMode::Mono,
        };

        Ok(Self {
            version,
            layer,
            protected,
            bitrate,
            sample_rate,
            padding,
            channel_mode,
        })
    }

    fn bitrate(version: MpegVersion, layer: MpegLayer, index: u8) -> Result<u16> {
        if index == 0xF {
            bail!(MpegHeaderError::BadBitrate(index));
        }

        let row = match (version, layer) {
            (MpegVersion::V1, MpegLayer::I) => &BITRATES_V1[0],
            (MpegVersion::V1, MpegLayer::II) => &BITRATES_V1[1],
            (MpegVersion::V1, MpegLayer::III) => &BITRATES_V1[2],
            (_, MpegLayer::I) => &BITRATES_V2[0],
            (_, _) => &BITRATES_V2[1],
        };

        Ok(row[index as usize])
    }

    pub fn samples_per_frame(&self) -> usize {
        match (self.layer, self.version) {
            (MpegLayer::I, _) => 384,
            (MpegLayer::II, _) | (MpegLayer::III, MpegVersion::V1) => 1152,
            (MpegLayer::III, _) => 576,
        }
    }

    /// Frame length in bytes including the header, `None` for free format.
    pub fn frame_len(&self) -> Option<usize> {
        if self.bitrate == 0 {
            return None;
        }

        let bitrate = self.bitrate as usize * 1000;
        let rate = self.sample_rate as usize;
        let padding = self.padding as usize;

        Some(match self.layer {
            MpegLayer::I => (12 * bitrate / rate + padding) * 4,
            _ => self.samples_per_frame() / 8 * bitrate / rate + padding,
        })
    }
}

impl Display for FrameHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let version = match self.version {
            MpegVersion::V1 => "1",
            MpegVersion::V2 => "2",
            MpegVersion::V25 => "2.5",
        };
        let layer = match self.layer {
            MpegLayer::I => "I",
            MpegLayer::II => "II",
            MpegLayer::III => "III",
        };
        write!(
            f,
            "MPEG-{version} Layer {layer}, {} kbit/s, {} Hz, {:?}",
            self.bitrate, self.sample_rate, self.channel_mode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_scan() {
        assert!(is_frame_sync(0xFF, 0xFB));
        assert!(is_frame_sync(0xFF, 0xE0));
        assert!(!is_frame_sync(0xFF, 0xDF));
        assert!(!is_frame_sync(0xFE, 0xFF));

        let data = [0x00, 0xFF, 0x10, 0xFF, 0xF3, 0x00];
        assert_eq!(find_frame_sync(&data, 0), Some(3));
        assert_eq!(find_frame_sync(&data, 4), None);
        assert_eq!(find_frame_sync(&data, 100), None);

        // last byte pair
        assert_eq!(find_frame_sync(&[0x00, 0xFF, 0xE2], 0), Some(1));
    }

    #[test]
    fn parse_layer3_header() -> Result<()> {
        // MPEG-1 Layer III, 128 kbit/s, 44.1 kHz, joint stereo, no CRC
        let header = FrameHeader::parse(&[0xFF, 0xFB, 0x90, 0x64])?;
        assert_eq!(header.version, MpegVersion::V1);
        assert_eq!(header.layer, MpegLayer::III);
        assert!(!header.protected);
        assert_eq!(header.bitrate, 128);
        assert_eq!(header.sample_rate, 44100);
        assert_eq!(header.channel_mode, ChannelMode::JointStereo);
        assert_eq!(header.frame_len(), Some(417));
        assert_eq!(
            header.to_string(),
            "MPEG-1 Layer III, 128 kbit/s, 44100 Hz, JointStereo"
        );
        Ok(())
    }

    #[test]
    fn parse_mpeg2_mono() -> Result<()> {
        // MPEG-2 Layer III, 64 kbit/s, 22.05 kHz, mono
        let header = FrameHeader::parse(&[0xFF, 0xF3, 0x80, 0xC0])?;
        assert_eq!(header.version, MpegVersion::V2);
        assert_eq!(header.bitrate, 64);
        assert_eq!(header.sample_rate, 22050);
        assert_eq!(header.channel_mode.channels(), 1);
        assert_eq!(header.samples_per_frame(), 576);
        Ok(())
    }

    #[test]
    fn reject_invalid_headers() {
        assert!(FrameHeader::parse(&[0xFF, 0xFB]).is_err());
        assert!(FrameHeader::parse(&[0x00, 0x00, 0x00, 0x00]).is_err());
        // reserved version
        assert!(FrameHeader::parse(&[0xFF, 0xEB, 0x90, 0x00]).is_err());
        // reserved layer
        assert!(FrameHeader::parse(&[0xFF, 0xF9, 0x90, 0x00]).is_err());
        // bad bitrate index
        assert!(FrameHeader::parse(&[0xFF, 0xFB, 0xF0, 0x00]).is_err());
        // reserved sample rate
        assert!(FrameHeader::parse(&[0xFF, 0xFB, 0x9C, 0x00]).is_err());
    }
}
