use std::io::{self, BufWriter, Seek, SeekFrom, Write};

use fsbx_macros::ToBytes;

const WAVE_FORMAT_PCM: u16 = 1;
const FMT_CHUNK_LEN: u32 = 16;
/// Bytes between the RIFF size field and the first data byte.
const HEADER_TAIL_LEN: u32 = 4 + 8 + FMT_CHUNK_LEN + 8;

#[derive(ToBytes)]
struct RiffHeader {
    id: [u8; 4],
    size: u32,
    form: [u8; 4],
}

#[derive(ToBytes)]
struct FmtChunk {
    id: [u8; 4],
    size: u32,
    format_tag: u16,
    channels: u16,
    sample_rate: u32,
    byte_rate: u32,
    block_align: u16,
    bits_per_sample: u16,
}

#[derive(ToBytes)]
struct ChunkHeader {
    id: [u8; 4],
    size: u32,
}

/// RIFF/WAVE writer for packed 24-bit PCM audio.
pub struct WAVWriter<W: Write + Seek> {
    writer: BufWriter<W>,
    riff_size_position: u64,
    data_size_position: u64,
    data_written: u64,
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
}

impl<W: Write + Seek> WAVWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: BufWriter::new(writer),
            riff_size_position: 0,
            data_size_position: 0,
            data_written: 0,
            sample_rate: 48000,
            channels: 2,
            bits_per_sample: 24,
        }
    }

    pub fn configure_audio_format(
        &mut self,
        sample_rate: u32,
        channels: u16,
        bits_per_sample: u16,
    ) -> io::Result<()> {
        if self.data_written > 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Cannot change format after writing data",
            ));
        }
        if channels == 0 || bits_per_sample % 8 != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Unsupported PCM layout: {channels} ch, {bits_per_sample} bit"),
            ));
        }

        self.sample_rate = sample_rate;
        self.channels = channels;
        self.bits_per_sample = bits_per_sample;
        Ok(())
    }

    /// Writes the RIFF, fmt and data headers with placeholder sizes.
    pub fn write_header(&mut self) -> io::Result<()> {
        let block_align = self.channels * (self.bits_per_sample / 8);

        let riff = RiffHeader {
            id: *b"RIFF",
            size: 0,
            form: *b"WAVE",
        };
        let fmt = FmtChunk {
            id: *b"fmt ",
            size: FMT_CHUNK_LEN,
            format_tag: WAVE_FORMAT_PCM,
            channels: self.channels,
            sample_rate: self.sample_rate,
            byte_rate: self.sample_rate * block_align as u32,
            block_align,
            bits_per_sample: self.bits_per_sample,
        };
        let data = ChunkHeader {
            id: *b"data",
            size: 0,
        };

        let start = self.writer.stream_position()?;
        self.riff_size_position = start + 4;
        self.data_size_position = start + 8 + u64::from(HEADER_TAIL_LEN) - 4;

        self.writer
            .write_all(&crate::join_bytes_le!(riff, fmt, data))?;
        Ok(())
    }

    /// Writes `samples` (24-bit values held in `i32`) as packed little-endian.
    pub fn write_pcm_24bit_as_packed(&mut self, samples: &[i32]) -> io::Result<()> {
        for &sample in samples {
            let bytes = sample.to_le_bytes();
            self.writer.write_all(&bytes[0..3])?;
        }
        self.data_written += samples.len() as u64 * 3;
        Ok(())
    }

    /// Pads the data chunk and patches the size fields.
    pub fn finish(&mut self) -> io::Result<()> {
        let too_large = || {
            io::Error::new(
                io::ErrorKind::InvalidData,
                "Audio data exceeds the 4 GiB RIFF limit",
            )
        };

        let data_size = u32::try_from(self.data_written).map_err(|_| too_large())?;
        let padding = data_size % 2;
        if padding != 0 {
            self.writer.write_all(&[0])?;
        }

        let riff_size = HEADER_TAIL_LEN
            .checked_add(data_size)
            .and_then(|size| size.checked_add(padding))
            .ok_or_else(too_large)?;

        self.writer.flush()?;
        let end = self.writer.stream_position()?;

        self.writer.seek(SeekFrom::Start(self.data_size_position))?;
        self.writer.write_all(&data_size.to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(self.riff_size_position))?;
        self.writer.write_all(&riff_size.to_le_bytes())?;

        self.writer.seek(SeekFrom::Start(end))?;
        self.writer.flush()?;

        Ok(())
    }

    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }

    pub fn stats(&self) -> WAVStats {
        WAVStats {
            data_written: self.data_written,
            sample_rate: self.sample_rate,
            channels: self.channels,
            bits_per_sample: self.bits_per_sample,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WAVStats {
    pub data_written: u64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn u32_at(buffer: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            buffer[offset],
            buffer[offset + 1],
            buffer[offset + 2],
            buffer[offset + 3],
        ])
    }

    #[test]
    fn header_layout() -> io::Result<()> {
        let mut writer = WAVWriter::new(Cursor::new(Vec::new()));
        writer.configure_audio_format(48000, 2, 24)?;
        writer.write_header()?;

        let buffer = writer.into_inner()?.into_inner();

        assert_eq!(buffer.len(), 44);
        assert_eq!(&buffer[0..4], b"RIFF");
        assert_eq!(&buffer[8..16], b"WAVEfmt ");
        assert_eq!(u32_at(&buffer, 16), 16);
        assert_eq!(&buffer[20..24], &[1, 0, 2, 0]);
        assert_eq!(u32_at(&buffer, 24), 48000);
        assert_eq!(u32_at(&buffer, 28), 48000 * 6);
        assert_eq!(&buffer[32..36], &[6, 0, 24, 0]);
        assert_eq!(&buffer[36..40], b"data");

        Ok(())
    }

    #[test]
    fn sizes_patched_on_finish() -> io::Result<()> {
        let mut writer = WAVWriter::new(Cursor::new(Vec::new()));
        writer.configure_audio_format(8000, 1, 24)?;
        writer.write_header()?;

        writer.write_pcm_24bit_as_packed(&[0x123456, -1, 0x000001])?;
        assert_eq!(writer.stats().data_written, 9);
        writer.finish()?;

        let buffer = writer.into_inner()?.into_inner();

        // odd data chunk gets a pad byte
        assert_eq!(buffer.len(), 44 + 9 + 1);
        assert_eq!(u32_at(&buffer, 4), 36 + 9 + 1);
        assert_eq!(u32_at(&buffer, 40), 9);
        assert_eq!(&buffer[44..53], &[0x56, 0x34, 0x12, 0xFF, 0xFF, 0xFF, 0x01, 0, 0]);

        Ok(())
    }

    #[test]
    fn format_locked_after_data() -> io::Result<()> {
        let mut writer = WAVWriter::new(Cursor::new(Vec::new()));
        writer.write_header()?;
        writer.write_pcm_24bit_as_packed(&[0, 0])?;

        assert!(writer.configure_audio_format(44100, 1, 24).is_err());
        assert!(
            WAVWriter::new(Cursor::new(Vec::new()))
                .configure_audio_format(44100, 0, 24)
                .is_err()
        );
        Ok(())
    }
}
