use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use fsb::process::demux::DemuxOptions;
use fsb::process::index::BoundaryPolicy;
use fsb::structs::candidate::StreamFormat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatName {
    Ogg,
    Wav,
    Flac,
    Mpeg,
}

impl From<FormatName> for StreamFormat {
    fn from(name: FormatName) -> Self {
        match name {
            FormatName::Ogg => StreamFormat::Ogg,
            FormatName::Wav => StreamFormat::Wave,
            FormatName::Flac => StreamFormat::Flac,
            FormatName::Mpeg => StreamFormat::Mpeg,
        }
    }
}

impl From<StreamFormat> for FormatName {
    fn from(format: StreamFormat) -> Self {
        match format {
            StreamFormat::Ogg => FormatName::Ogg,
            StreamFormat::Wave => FormatName::Wav,
            StreamFormat::Flac => FormatName::Flac,
            StreamFormat::Mpeg => FormatName::Mpeg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryName {
    NextSignature,
    ContainerEnd,
}

impl From<BoundaryName> for BoundaryPolicy {
    fn from(name: BoundaryName) -> Self {
        match name {
            BoundaryName::NextSignature => BoundaryPolicy::NextSignature,
            BoundaryName::ContainerEnd => BoundaryPolicy::ContainerEnd,
        }
    }
}

/// Demuxer tunables loaded from a YAML file. Absent keys keep their defaults.
///
/// ```yaml
/// formats: [ogg, wav, flac, mpeg]
/// wave_window: 128
/// max_occurrences: 1
/// boundary: next_signature
/// mpeg_boundary: container_end
/// mime_hints: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub formats: Option<Vec<FormatName>>,
    #[serde(default)]
    pub wave_window: Option<usize>,
    #[serde(default)]
    pub max_occurrences: Option<usize>,
    #[serde(default)]
    pub boundary: Option<BoundaryName>,
    #[serde(default)]
    pub mpeg_boundary: Option<BoundaryName>,
    #[serde(default)]
    pub mime_hints: Option<bool>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        // an empty document means "all defaults"
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(text)?)
    }

    pub fn demux_options(&self) -> Result<DemuxOptions> {
        let mut options = DemuxOptions::default();

        if let Some(formats) = &self.formats {
            if formats.is_empty() {
                bail!("formats must list at least one of ogg, wav, flac, mpeg");
            }
            options.formats = formats.iter().copied().map(StreamFormat::from).collect();
        }
        if let Some(window) = self.wave_window {
            // WAVE is searched from RIFF + 4
            if window <= 4 {
                bail!("wave_window must be greater than 4, got {window}");
            }
            options.wave_window = window;
        }
        if let Some(max) = self.max_occurrences {
            if max == 0 {
                bail!("max_occurrences must be at least 1");
            }
            options.max_occurrences = max;
        }
        if let Some(boundary) = self.boundary {
            options.boundary = boundary.into();
        }
        if let Some(boundary) = self.mpeg_boundary {
            options.mpeg_boundary = boundary.into();
        }
        if let Some(hints) = self.mime_hints {
            options.mime_hints = hints;
        }

        Ok(options)
    }
}

/// Options for this run: the config file if given, defaults otherwise.
pub fn resolve_options(path: Option<&Path>) -> Result<DemuxOptions> {
    match path {
        Some(path) => {
            let options = Config::load(path)?.demux_options()?;
            log::debug!("Loaded demux options from {}: {options:?}", path.display());
            Ok(options)
        }
        None => Ok(DemuxOptions::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_is_default() -> Result<()> {
        assert_eq!(Config::from_yaml("")?.demux_options()?, DemuxOptions::default());
        assert_eq!(Config::from_yaml("{}")?.demux_options()?, DemuxOptions::default());
        Ok(())
    }

    #[test]
    fn full_config() -> Result<()> {
        let config = Config::from_yaml(
            "formats: [mpeg, ogg]\n\
             wave_window: 256\n\
             max_occurrences: 3\n\
             boundary: container_end\n\
             mpeg_boundary: container_end\n\
             mime_hints: false\n",
        )?;
        let options = config.demux_options()?;

        assert_eq!(options.formats, [StreamFormat::Mpeg, StreamFormat::Ogg]);
        assert_eq!(options.wave_window, 256);
        assert_eq!(options.max_occurrences, 3);
        assert_eq!(options.boundary, BoundaryPolicy::ContainerEnd);
        assert_eq!(options.mpeg_boundary, BoundaryPolicy::ContainerEnd);
        assert!(!options.mime_hints);
        Ok(())
    }

    #[test]
    fn rejects_bad_values() -> Result<()> {
        assert!(Config::from_yaml("unknown_key: 1").is_err());
        assert!(Config::from_yaml("formats: [aac]").is_err());
        assert!(Config::from_yaml("formats: []")?.demux_options().is_err());
        assert!(Config::from_yaml("wave_window: 4")?.demux_options().is_err());
        assert!(Config::from_yaml("max_occurrences: 0")?.demux_options().is_err());
        Ok(())
    }

    #[test]
    fn format_names_round_trip_through_stream_format() {
        for format in StreamFormat::PRIORITY {
            assert_eq!(StreamFormat::from(FormatName::from(format)), format);
        }
    }
}
