use std::time::Instant;

use anyhow::Result;
use futures::executor::block_on;
use indicatif::MultiProgress;

use fsb::process::demux::{ContainerDemuxer, DemuxState, Extracted};

use super::command::{Cli, DecodeArgs};
use super::output::AudioWriter;
use super::progress;
use crate::config::resolve_options;
use crate::decoder::{DecodedAudio, SymphoniaCapability};
use crate::input::read_container;
use crate::timestamp::{frames_to_secs, time_str};

pub fn cmd_decode(args: &DecodeArgs, cli: &Cli, multi: Option<&MultiProgress>) -> Result<()> {
    log::info!("Decoding embedded audio: {}", args.input.display());

    let options = resolve_options(cli.config.as_deref())?;
    let container = read_container(&args.input)?;

    if let Some(ref path) = args.output_path {
        log::info!("Output path specified: {}", path.display());
    }

    let pb = multi
        .map(|multi| progress::create_spinner(multi, "probing"))
        .transpose()?;

    let demuxer = ContainerDemuxer::new(options);
    let start_time = Instant::now();

    let result = block_on(demuxer.extract_observed(
        &container,
        &SymphoniaCapability,
        |state: DemuxState| progress::set_message(&pb, state.to_string()),
    ));

    let extracted = match result {
        Ok(extracted) => extracted,
        Err(e) => {
            progress::finish(&pb, "no decodable stream");
            return Err(e.into());
        }
    };

    print_summary(&extracted);

    match &args.output_path {
        Some(base_path) => {
            let audio = &extracted.audio;
            let (mut writer, path) =
                AudioWriter::create(base_path, args.format, audio.sample_rate, audio.channels)?;
            writer.write_pcm_samples(&audio.samples)?;
            writer.finish()?;
            log::info!("Wrote {}", path.display());
        }
        None => log::info!("No output path given, stream was only checked for decodability"),
    }

    let duration = frames_to_secs(extracted.audio.frames(), extracted.audio.sample_rate);
    progress::finish(
        &pb,
        format!(
            "decoded {} | elapsed: {:.2}s",
            time_str(duration),
            start_time.elapsed().as_secs_f64()
        ),
    );
    log::info!("Decoding completed successfully");

    Ok(())
}

fn print_summary(extracted: &Extracted<DecodedAudio>) {
    let candidate = &extracted.candidate;
    let audio = &extracted.audio;

    println!();
    println!("Embedded Stream");
    println!("===============");
    println!();
    println!("Format                      {}", candidate.format);
    println!(
        "Byte range                  {:#x}..{:#x} ({} bytes)",
        candidate.start,
        candidate.end,
        candidate.len()
    );
    println!("Failed attempts             {}", extracted.failed_attempts);
    println!("Channels                    {}", audio.channels);
    println!("Sample rate                 {} Hz", audio.sample_rate);
    println!(
        "Duration                    {}",
        time_str(frames_to_secs(audio.frames(), audio.sample_rate))
    );
    println!();
}
