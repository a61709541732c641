use anyhow::Result;
use indicatif::MultiProgress;
use serde::Serialize;

use fsb::process::demux::ContainerDemuxer;
use fsb::structs::candidate::{Candidate, StreamFormat};
use fsb::structs::mpeg::{FrameHeader, HEADER_LEN};

use super::command::{Cli, InfoArgs};
use super::progress;
use crate::config::{FormatName, resolve_options};
use crate::input::read_container;

#[derive(Debug, Serialize)]
struct InfoReport {
    input: String,
    size: usize,
    probed: Vec<FormatName>,
    rejected_riff: usize,
    candidates: Vec<CandidateReport>,
}

#[derive(Debug, Serialize)]
struct CandidateReport {
    format: FormatName,
    mime: &'static str,
    start: usize,
    end: usize,
    length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    mpeg: Option<MpegReport>,
}

#[derive(Debug, Serialize)]
struct MpegReport {
    header: String,
    bitrate_kbps: u16,
    sample_rate: u32,
    channels: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_len: Option<usize>,
}

impl CandidateReport {
    fn new(candidate: Candidate, container: &[u8]) -> Self {
        let mpeg = (candidate.format == StreamFormat::Mpeg)
            .then(|| inspect_mpeg(candidate, container))
            .flatten();

        Self {
            format: candidate.format.into(),
            mime: candidate.format.mime_type(),
            start: candidate.start,
            end: candidate.end,
            length: candidate.len(),
            mpeg,
        }
    }
}

fn inspect_mpeg(candidate: Candidate, container: &[u8]) -> Option<MpegReport> {
    let header = candidate.slice(container).get(..HEADER_LEN)?;

    match FrameHeader::parse(header) {
        Ok(header) => Some(MpegReport {
            header: header.to_string(),
            bitrate_kbps: header.bitrate,
            sample_rate: header.sample_rate,
            channels: header.channel_mode.channels(),
            frame_len: header.frame_len(),
        }),
        Err(e) => {
            log::debug!("Frame sync at {:#x} has no valid header: {e}", candidate.start);
            None
        }
    }
}

pub fn cmd_info(args: &InfoArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Probing container: {}", args.input.display());

    let options = resolve_options(cli.config.as_deref())?;
    let container = read_container(&args.input)?;

    let pb = multi
        .map(|multi| progress::create_spinner(multi, "probing"))
        .transpose()?;

    let prober = ContainerDemuxer::new(options).probe(&container);
    let probed = prober.formats();

    let mut candidates = Vec::new();
    let mut rejected_riff = 0;
    for mut generator in prober.into_generators() {
        progress::set_message(&pb, format!("probing {}", generator.format()));
        candidates.extend(
            generator
                .by_ref()
                .map(|candidate| CandidateReport::new(candidate, &container)),
        );
        rejected_riff += generator.rejected();
    }
    progress::finish(&pb, format!("{} candidate(s)", candidates.len()));

    let report = InfoReport {
        input: args.input.display().to_string(),
        size: container.len(),
        probed: probed.into_iter().map(FormatName::from).collect(),
        rejected_riff,
        candidates,
    };

    if args.yaml {
        print!("{}", serde_yaml_ng::to_string(&report)?);
    } else {
        print_report(&report);
    }

    if report.candidates.is_empty() {
        log::warn!("No embedded stream signature found");
    }

    Ok(())
}

fn print_report(report: &InfoReport) {
    println!();
    println!("Container Information");
    println!("=====================");
    println!();
    println!("Input                       {}", report.input);
    println!("Size                        {} bytes", report.size);
    println!(
        "Probed formats              {}",
        report
            .probed
            .iter()
            .map(|name| StreamFormat::from(*name).name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    if report.rejected_riff > 0 {
        println!(
            "Rejected RIFF markers       {} (no WAVE marker nearby)",
            report.rejected_riff
        );
    }
    println!();

    if report.candidates.is_empty() {
        println!("No embedded stream candidates found.");
        println!("The container may hold proprietary audio (FMOD ADPCM, XMA, ...).");
        return;
    }

    println!("Candidates (in decode order)");
    println!("----------------------------");
    for (index, candidate) in report.candidates.iter().enumerate() {
        println!(
            "{index:>3}  {:<5} {:#010x}..{:#010x} {:>10} bytes  {}",
            StreamFormat::from(candidate.format).name(),
            candidate.start,
            candidate.end,
            candidate.length,
            candidate.mime
        );
        if let Some(mpeg) = &candidate.mpeg {
            println!("     {}", mpeg.header);
        }
    }
    println!();
}
