use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};

/// Reads a container from a file, or from stdin when the path is "-".
pub struct InputReader {
    reader: Box<dyn Read>,
    is_pipe: bool,
}

impl InputReader {
    pub fn new<P: AsRef<Path>>(input_path: P) -> Result<Self> {
        let path = input_path.as_ref();
        let is_pipe = path.to_string_lossy() == "-";

        let reader: Box<dyn Read> = if is_pipe {
            Box::new(io::stdin().lock())
        } else {
            let file = File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        };

        Ok(Self { reader, is_pipe })
    }

    pub fn is_pipe(&self) -> bool {
        self.is_pipe
    }

    /// Containers are scanned as a whole, so everything is buffered.
    pub fn read_all(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        self.reader.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// Loads the whole container at `input_path`.
pub fn read_container<P: AsRef<Path>>(input_path: P) -> Result<Vec<u8>> {
    let mut reader = InputReader::new(&input_path)?;
    let data = reader.read_all()?;

    let source = if reader.is_pipe() {
        "stdin".to_string()
    } else {
        input_path.as_ref().display().to_string()
    };
    log::debug!("Read {} bytes from {source}", data.len());

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_reported() {
        let err = read_container("/nonexistent/bank.fsb").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/bank.fsb"));
    }

    #[test]
    fn reads_whole_file() -> Result<()> {
        let path = std::env::temp_dir().join(format!("fsbx-input-{}.bin", std::process::id()));
        std::fs::write(&path, b"FSB5OggS")?;

        let data = read_container(&path)?;
        std::fs::remove_file(&path)?;

        assert_eq!(data, b"FSB5OggS");
        Ok(())
    }
}
