use std::time::Duration;

use anyhow::Result;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

pub fn create_spinner(multi: &MultiProgress, message: &str) -> Result<ProgressBar> {
    let pb = multi.add(ProgressBar::new_spinner());
    pb.set_style(ProgressStyle::with_template(
        "{spinner:.green} {msg} | elapsed: {elapsed_precise}",
    )?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message.to_string());
    Ok(pb)
}

pub fn set_message(pb: &Option<ProgressBar>, message: impl Into<String>) {
    if let Some(pb) = pb {
        pb.set_message(message.into());
    }
}

pub fn finish(pb: &Option<ProgressBar>, message: impl Into<String>) {
    if let Some(pb) = pb {
        pb.finish_with_message(message.into());
    }
}
