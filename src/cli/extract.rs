use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use indicatif::MultiProgress;

use fsb::process::demux::ContainerDemuxer;
use fsb::structs::candidate::Candidate;

use super::command::{Cli, ExtractArgs};
use super::output::create_segment_path;
use super::progress;
use crate::config::resolve_options;
use crate::input::read_container;

pub fn cmd_extract(args: &ExtractArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Extracting raw segments: {}", args.input.display());

    let options = resolve_options(cli.config.as_deref())?;
    let container = read_container(&args.input)?;

    let candidates: Vec<Candidate> = if args.all {
        ContainerDemuxer::new(options).probe(&container).collect()
    } else {
        ContainerDemuxer::new(options)
            .probe(&container)
            .take(1)
            .collect()
    };

    if candidates.is_empty() {
        bail!(
            "No embedded stream signature found in {} ({} bytes)",
            args.input.display(),
            container.len()
        );
    }

    let pb = multi
        .map(|multi| progress::create_spinner(multi, "writing segments"))
        .transpose()?;

    let written = write_segments(&container, &candidates, &args.output_path, args.all)?;
    for (candidate, path) in candidates.iter().zip(&written) {
        progress::set_message(&pb, path.display().to_string());
        log::info!("{candidate} -> {}", path.display());
    }

    progress::finish(&pb, format!("{} segment(s) written", written.len()));
    Ok(())
}

/// Writes each candidate's byte range, numbering the files when `numbered`.
pub fn write_segments(
    container: &[u8],
    candidates: &[Candidate],
    base_path: &Path,
    numbered: bool,
) -> Result<Vec<PathBuf>> {
    candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let path = create_segment_path(
                base_path,
                candidate.format.extension(),
                numbered.then_some(index),
            );
            std::fs::write(&path, candidate.slice(container))?;
            Ok(path)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fsb::structs::candidate::StreamFormat;

    #[test]
    fn writes_numbered_segments() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("fsbx-extract-{}", std::process::id()));
        std::fs::create_dir_all(&dir)?;

        let container = b"....OggS-ogg-data...fLaC-flac-data";
        let candidates = [
            Candidate {
                format: StreamFormat::Ogg,
                start: 4,
                end: 20,
            },
            Candidate {
                format: StreamFormat::Flac,
                start: 20,
                end: container.len(),
            },
        ];

        let paths = write_segments(container, &candidates, &dir.join("bank"), true)?;
        assert_eq!(paths, [dir.join("bank.0.ogg"), dir.join("bank.1.flac")]);
        assert_eq!(std::fs::read(&paths[0])?, b"OggS-ogg-data...");
        assert_eq!(std::fs::read(&paths[1])?, b"fLaC-flac-data");

        let paths = write_segments(container, &candidates[..1], &dir.join("first"), false)?;
        assert_eq!(paths, [dir.join("first.ogg")]);

        std::fs::remove_dir_all(&dir)?;
        Ok(())
    }
}
