use std::io::Cursor;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use log::{debug, trace};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use fsb::process::capability::DecodeCapability;
use fsb::structs::candidate::StreamFormat;

/// Interleaved PCM, 24-bit values held in `i32`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<i32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    pub fn frames(&self) -> u64 {
        match self.channels {
            0 => 0,
            channels => (self.samples.len() / channels as usize) as u64,
        }
    }
}

/// Decodes candidate segments in memory with Symphonia.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaCapability;

#[async_trait]
impl DecodeCapability for SymphoniaCapability {
    type Output = DecodedAudio;

    async fn decode(&self, data: &[u8], hint: Option<StreamFormat>) -> Result<DecodedAudio> {
        decode_segment(data, hint)
    }
}

fn format_hint(format: Option<StreamFormat>) -> Hint {
    let mut hint = Hint::new();
    if let Some(format) = format {
        hint.with_extension(format.extension());
        hint.mime_type(format.mime_type());
    }
    hint
}

/// Full-scale `i32` down to 24 bits.
fn to_24bit(sample: i32) -> i32 {
    sample >> 8
}

pub fn decode_segment(data: &[u8], format: Option<StreamFormat>) -> Result<DecodedAudio> {
    let source = Box::new(Cursor::new(data.to_vec())) as Box<dyn MediaSource>;
    let mss = MediaSourceStream::new(source, Default::default());

    let probed = symphonia::default::get_probe()
        .format(
            &format_hint(format),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .context("Unrecognized container")?;
    let mut reader = probed.format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| anyhow!("No audio track found"))?;
    let track_id = track.id;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("Unsupported codec")?;

    let mut audio = DecodedAudio {
        sample_rate: track.codec_params.sample_rate.unwrap_or(0),
        channels: track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .unwrap_or(0),
        ..DecodedAudio::default()
    };
    let mut buffer: Option<SampleBuffer<i32>> = None;
    let mut skipped = 0usize;

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            // chained streams; keep what we have
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                debug!("Stopping at unreadable packet: {e}");
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(e @ (SymphoniaError::DecodeError(_) | SymphoniaError::IoError(_))) => {
                trace!("Skipping corrupt packet: {e}");
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e).context("Decoder failed"),
        };

        let spec = *decoded.spec();
        audio.sample_rate = spec.rate;
        audio.channels = spec.channels.count() as u16;

        let needed = decoded.capacity() * spec.channels.count();
        if buffer.as_ref().is_some_and(|buf| buf.capacity() < needed) {
            buffer = None;
        }
        let buf = buffer.get_or_insert_with(|| SampleBuffer::new(decoded.capacity() as u64, spec));
        buf.copy_interleaved_ref(decoded);
        audio
            .samples
            .extend(buf.samples().iter().copied().map(to_24bit));
    }

    if skipped > 0 {
        debug!("Skipped {skipped} undecodable packet(s)");
    }
    if audio.samples.is_empty() || audio.channels == 0 {
        bail!("No audio frames decoded");
    }

    debug!(
        "Decoded {} frames, {} ch @ {} Hz",
        audio.frames(),
        audio.channels,
        audio.sample_rate
    );
    Ok(audio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byteorder::WriteBytesLe;

    fn pcm16_wav(sample_rate: u32, channels: u16, samples: &[i16]) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let block_align = channels * 2;

        let mut wav = Vec::new();
        wav.extend_from_slice(b"RIFF");
        (36 + data_len).write_le(&mut wav);
        wav.extend_from_slice(b"WAVEfmt ");
        16u32.write_le(&mut wav);
        1u16.write_le(&mut wav);
        channels.write_le(&mut wav);
        sample_rate.write_le(&mut wav);
        (sample_rate * block_align as u32).write_le(&mut wav);
        block_align.write_le(&mut wav);
        16u16.write_le(&mut wav);
        wav.extend_from_slice(b"data");
        data_len.write_le(&mut wav);
        samples.iter().for_each(|s| s.write_le(&mut wav));
        wav
    }

    #[test]
    fn decodes_embedded_wave() -> Result<()> {
        let wav = pcm16_wav(8000, 2, &[0, 0, 0x100, -0x100, 0x7FFF, -0x8000]);

        let audio = decode_segment(&wav, Some(StreamFormat::Wave))?;
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.frames(), 3);
        assert_eq!(audio.samples[2], 0x100 << 8);
        assert_eq!(audio.samples[5], -0x8000 << 8);
        Ok(())
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(decode_segment(&[0u8; 256], None).is_err());
        assert!(decode_segment(b"OggS\0\0\0\0", Some(StreamFormat::Ogg)).is_err());
        assert!(decode_segment(&[], Some(StreamFormat::Flac)).is_err());
    }

    #[test]
    fn frames_without_channels() {
        let audio = DecodedAudio {
            samples: vec![1, 2, 3],
            ..DecodedAudio::default()
        };
        assert_eq!(audio.frames(), 0);
    }
}
