use anyhow::Result;
use chrono::TimeZone;
use std::env;
use std::fs;
use std::process::Command;
use vergen_gitcl::{Emitter, GitclBuilder};

fn main() -> Result<()> {
    // Generate git information
    let gitcl = GitclBuilder::default()
        .describe(true, true, Some("[0-9]*"))
        .build()?;

    let gitcl_res = Emitter::default()
        .idempotent()
        .fail_on_error()
        .add_instructions(&gitcl)
        .and_then(|emitter| emitter.emit());

    if let Err(e) = gitcl_res {
        eprintln!("error occurred while generating instructions: {e:?}");
        Emitter::default().idempotent().fail_on_error().emit()?;
        // --version reads this unconditionally
        println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE=unknown");
    }

    // Add build timestamp
    let now = match env::var("SOURCE_DATE_EPOCH") {
        Ok(val) => {
            let secs = val.parse::<i64>()?;
            chrono::Utc
                .timestamp_opt(secs, 0)
                .single()
                .ok_or_else(|| anyhow::anyhow!("SOURCE_DATE_EPOCH out of range: {secs}"))?
        }
        Err(_) => chrono::Utc::now(),
    };

    println!(
        "cargo:rustc-env=BUILD_TIMESTAMP={}",
        now.format("%Y-%m-%d %H:%M:%S UTC")
    );

    // Get fsb library version using cargo metadata
    let fsb_version = get_fsb_version_from_metadata().unwrap_or_else(|_| {
        read_fsb_version_fallback().unwrap_or_else(|_| "unknown".to_string())
    });
    println!("cargo:rustc-env=FSB_VERSION={fsb_version}");

    // Tell cargo to rerun this build script if the fsb Cargo.toml changes
    println!("cargo:rerun-if-changed=fsb/Cargo.toml");

    Ok(())
}

/// Get fsb version using cargo metadata (works with published and local dependencies)
fn get_fsb_version_from_metadata() -> Result<String> {
    let output = Command::new("cargo")
        .args(["metadata", "--format-version", "1"])
        .output()?;

    if !output.status.success() {
        anyhow::bail!("cargo metadata failed");
    }

    let metadata: serde_json::Value = serde_json::from_slice(&output.stdout)?;

    let version = metadata["packages"]
        .as_array()
        .into_iter()
        .flatten()
        .find(|package| package["name"].as_str() == Some("fsb"))
        .and_then(|package| package["version"].as_str());

    match version {
        Some(version) => Ok(version.to_string()),
        None => anyhow::bail!("fsb package not found in metadata"),
    }
}

/// Fallback: manually parse fsb/Cargo.toml
fn read_fsb_version_fallback() -> Result<String> {
    let toml_content = fs::read_to_string("fsb/Cargo.toml")?;

    for line in toml_content.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("version") {
            if let Some(value) = rest.trim_start().strip_prefix('=') {
                let version = value.trim().trim_matches('"').trim_matches('\'');
                return Ok(version.to_string());
            }
        }
    }

    anyhow::bail!("Could not find version in fsb/Cargo.toml");
}
