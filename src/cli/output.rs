use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;

use super::command::AudioFormat;
use crate::wav::WAVWriter;

pub fn create_path_with_extension(base_path: &Path, expected_ext: &str) -> PathBuf {
    match base_path.extension() {
        Some(existing_ext) if existing_ext == expected_ext => base_path.to_path_buf(),
        Some(_) => {
            let file_name = base_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            base_path.with_file_name(format!("{file_name}.{expected_ext}"))
        }
        None => base_path.with_extension(expected_ext),
    }
}

/// `base.<ext>` for a single segment, `base.<index>.<ext>` when numbering.
pub fn create_segment_path(base_path: &Path, extension: &str, index: Option<usize>) -> PathBuf {
    match index {
        Some(index) => create_path_with_extension(base_path, &format!("{index}.{extension}")),
        None => create_path_with_extension(base_path, extension),
    }
}

pub enum AudioWriter {
    Pcm(BufWriter<File>),
    Wav(WAVWriter<File>),
}

impl AudioWriter {
    pub fn create(
        base_path: &Path,
        format: AudioFormat,
        sample_rate: u32,
        channels: u16,
    ) -> Result<(Self, PathBuf)> {
        let path = create_path_with_extension(base_path, format.extension());
        let writer = match format {
            AudioFormat::Pcm => Self::create_pcm(&path)?,
            AudioFormat::Wav => Self::create_wav(&path, sample_rate, channels)?,
        };
        Ok((writer, path))
    }

    pub fn create_pcm(path: &Path) -> Result<Self> {
        let pcm_writer = BufWriter::new(File::create(path)?);
        Ok(AudioWriter::Pcm(pcm_writer))
    }

    pub fn create_wav(path: &Path, sample_rate: u32, channels: u16) -> Result<Self> {
        let mut wav_writer = WAVWriter::new(File::create(path)?);
        wav_writer.configure_audio_format(sample_rate, channels, 24)?;
        wav_writer.write_header()?;
        Ok(AudioWriter::Wav(wav_writer))
    }

    pub fn write_pcm_samples(&mut self, samples: &[i32]) -> Result<()> {
        match self {
            AudioWriter::Pcm(pcm_writer) => {
                for sample in samples {
                    pcm_writer.write_all(&sample.to_le_bytes()[..3])?;
                }
            }
            AudioWriter::Wav(wav_writer) => {
                wav_writer.write_pcm_24bit_as_packed(samples)?;
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Result<()> {
        match self {
            AudioWriter::Pcm(mut w) => w.flush()?,
            AudioWriter::Wav(mut w) => {
                w.finish()?;
                let stats = w.stats();
                log::debug!(
                    "WAV data: {} bytes, {} ch, {} Hz, {} bit",
                    stats.data_written,
                    stats.channels,
                    stats.sample_rate,
                    stats.bits_per_sample
                );
                w.into_inner()?.sync_all()?;
            }
        }
        Ok(())
    }
}
