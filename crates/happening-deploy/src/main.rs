//! # happening-deploy
//!
//! Packages a local directory into a ZIP archive and uploads it to the
//! Happening deployment endpoint with a single HTTP POST.
//!
//! Files are collected recursively while skipping hidden entries, the running
//! executable and anything matched by the optional `.deployignore` file next
//! to the packaged directory root. The archive is written to a temporary
//! `_upload.zip` inside that directory and removed again once the HTTP
//! exchange has finished, whether the upload succeeded or not.

#![deny(missing_docs)]

use clap::Parser;
use commands::Cli;

/// ZIP archive creation from a collected file set.
mod archiver;

/// Recursive file collection with hidden-entry, self-binary and ignore filtering.
mod collector;

/// CLI surface and the deploy pipeline.
mod commands;

/// Deploy key, upload URL and directory resolution.
mod config;

/// `.deployignore` pattern compilation and matching.
mod filter;

/// Single-shot archive upload over HTTP.
mod uploader;

/// CLI entrypoint.
fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    commands::deploy(cli)?;

    Ok(())
}
