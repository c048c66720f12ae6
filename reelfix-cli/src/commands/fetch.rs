// ============================================================================
// reelfix-cli/src/commands/fetch.rs
// ============================================================================
//
// FETCH COMMAND: acquire every URL in the input text and deliver the results
//
// URLs are processed on a bounded rayon pool. Each one is acquired in its own
// scratch directory; while that directory still exists the artifact is checked
// against the transport's size limit and, if it fits, copied into the output
// directory. One URL failing never stops the others.
//
// KEY COMPONENTS:
// - run_fetch: entry point for `reelfix fetch`
// - deliver: size gate plus copy for one artifact
// - FetchSummary: per-run tallies that decide the exit code
// - install_interrupt_handler: turns SIGINT/SIGTERM into cancellation

// ---- External crate imports ----
use log::{debug, info, warn};
use reelfix_core::config::TransportMode;
use reelfix_core::{AcquisitionError, Artifact, CancelFlag, build_pipeline, delivery, format_bytes};

// ---- Standard library imports ----
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

// ---- Internal crate imports ----
use crate::cli::FetchArgs;
use crate::config::build_core_config;
use crate::error::{CliErrorContext, CliResult};
use crate::terminal;
use crate::urls::extract_urls;

/// Exit code used when a run is stopped by SIGINT or SIGTERM.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// What happened to one acquired artifact at the delivery step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered { path: PathBuf, size_bytes: u64 },
    TooLarge { size_bytes: u64, limit: String },
    CopyFailed(String),
}

/// Counts for the end-of-run summary.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchSummary {
    pub delivered: usize,
    pub too_large: usize,
    pub failed: usize,
}

impl FetchSummary {
    /// Oversize items are reported but do not fail the run.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, url: &str, outcome: &Result<Delivery, AcquisitionError>) {
        match outcome {
            Ok(Delivery::Delivered { path, size_bytes }) => {
                self.delivered += 1;
                terminal::print_success(&format!(
                    "{url} -> {} ({})",
                    path.display(),
                    format_bytes(*size_bytes)
                ));
            }
            Ok(Delivery::TooLarge { size_bytes, limit }) => {
                self.too_large += 1;
                terminal::print_warning(&format!(
                    "{url}: video too large ({}MB > {limit} limit)",
                    size_bytes / 1024 / 1024
                ));
            }
            Ok(Delivery::CopyFailed(message)) => {
                self.failed += 1;
                terminal::print_error(url, message, None);
            }
            Err(err) => {
                self.failed += 1;
                let hint = match err {
                    AcquisitionError::Download(_) => {
                        Some("Check the URL, or pass --cookies for content behind a login")
                    }
                    AcquisitionError::Transcode(_) => Some("Run `reelfix check` to verify ffmpeg"),
                    _ => None,
                };
                terminal::print_error(url, &err.to_string(), hint);
            }
        }
    }
}

/// `<dir>/<file_name>`, then `<stem>-1.<ext>`, `<stem>-2.<ext>` and so on.
fn destination_candidates(dir: &Path, file_name: &str) -> impl Iterator<Item = PathBuf> {
    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let ext = name.extension().map(|e| e.to_string_lossy().into_owned());
    let first = dir.join(file_name);
    let dir = dir.to_path_buf();
    std::iter::once(first).chain((1u32..).map(move |n| match &ext {
        Some(ext) => dir.join(format!("{stem}-{n}.{ext}")),
        None => dir.join(format!("{stem}-{n}")),
    }))
}

/// Creates the first free destination name and returns it with its handle.
///
/// The name is claimed with `create_new`, so concurrent workers delivering
/// files with the same name never share a destination.
pub fn claim_destination(dir: &Path, file_name: &str) -> io::Result<(PathBuf, File)> {
    for candidate in destination_candidates(dir, file_name) {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }
    }
    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free name for {file_name} in {}", dir.display()),
    ))
}

/// Applies the size gate and copies a fitting artifact into `output_dir`.
pub fn deliver(artifact: &Artifact, output_dir: &Path, transport: TransportMode) -> Delivery {
    if !delivery::fits(artifact.size_bytes, transport) {
        return Delivery::TooLarge {
            size_bytes: artifact.size_bytes,
            limit: delivery::limit_label(transport),
        };
    }

    let mut source = match File::open(&artifact.path) {
        Ok(file) => file,
        Err(e) => {
            return Delivery::CopyFailed(format!(
                "Failed to read {}: {e}",
                artifact.path.display()
            ));
        }
    };

    let file_name = artifact
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video.mp4".to_string());
    let (destination, mut target) = match claim_destination(output_dir, &file_name) {
        Ok(claimed) => claimed,
        Err(e) => {
            return Delivery::CopyFailed(format!(
                "Failed to create {file_name} in {}: {e}",
                output_dir.display()
            ));
        }
    };

    match io::copy(&mut source, &mut target) {
        Ok(_) => Delivery::Delivered {
            path: destination,
            size_bytes: artifact.size_bytes,
        },
        Err(e) => {
            drop(target);
            if let Err(rm) = fs::remove_file(&destination) {
                warn!("Failed to remove partial copy {}: {rm}", destination.display());
            }
            Delivery::CopyFailed(format!(
                "Failed to copy {} to {}: {e}",
                artifact.path.display(),
                destination.display()
            ))
        }
    }
}

/// Sets `cancel` on SIGINT or SIGTERM so in-flight tools are killed and
/// scratch directories removed. A second signal exits immediately.
pub fn install_interrupt_handler(cancel: &CancelFlag) {
    let trigger = cancel.clone();
    let result = ctrlc::set_handler(move || {
        if trigger.is_cancelled() {
            process::exit(INTERRUPTED_EXIT_CODE);
        }
        warn!("Interrupted; stopping in-flight downloads and cleaning up");
        trigger.cancel();
    });
    if let Err(e) = result {
        warn!("Could not install interrupt handler: {e}");
    }
}

/// Runs `reelfix fetch`.
pub fn run_fetch(args: FetchArgs, cancel: &CancelFlag) -> CliResult<FetchSummary> {
    let start = Instant::now();

    let urls = extract_urls(&args.text.join(" "));
    if urls.is_empty() {
        return Err(crate::cli_error!("No http(s) URLs found in the given text"));
    }

    fs::create_dir_all(&args.output_dir).cli_with_context(|| {
        format!("Failed to create output directory {}", args.output_dir.display())
    })?;

    let config = build_core_config(&args)?;
    let jobs = args.jobs.map(usize::from).unwrap_or_else(rayon::current_num_threads);

    terminal::print_section("Fetch");
    terminal::print_status("URLs", &urls.len().to_string(), true);
    terminal::print_status("Output", &args.output_dir.display().to_string(), false);
    terminal::print_status("Transport", &args.transport.to_string(), false);
    terminal::print_status("Size limit", &delivery::limit_label(args.transport), false);
    terminal::print_status("Mode", &config.decision.mode.to_string(), false);
    terminal::print_status("Jobs", &jobs.to_string(), false);
    for url in &urls {
        debug!("Queued {url}");
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| crate::cli_error!("Failed to build worker pool: {}", e))?;

    let pipeline = build_pipeline(config);
    let output_dir = args.output_dir.as_path();
    let transport = args.transport;

    terminal::print_processing(&format!("Acquiring {} URL(s)", urls.len()));
    let outcomes = pool.install(|| {
        pipeline.acquire_batch(&urls, transport, cancel, |url, artifact| {
            info!("{url}: artifact ready ({})", format_bytes(artifact.size_bytes));
            deliver(artifact, output_dir, transport)
        })
    });

    terminal::print_section("Results");
    let mut summary = FetchSummary::default();
    for (url, outcome) in urls.iter().zip(outcomes.iter()) {
        summary.record(url, outcome);
    }

    if cancel.is_cancelled() {
        terminal::print_warning("Interrupted; unfinished URLs were skipped");
    }

    terminal::print_section("Summary");
    terminal::print_status("Delivered", &summary.delivered.to_string(), true);
    terminal::print_status("Too large", &summary.too_large.to_string(), false);
    terminal::print_status("Failed", &summary.failed.to_string(), summary.failed > 0);
    terminal::print_status("Elapsed", &format!("{:.1}s", start.elapsed().as_secs_f64()), false);

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelfix_core::delivery::HOSTED_LIMIT_BYTES;
    use tempfile::tempdir;

    fn artifact_in(dir: &Path, name: &str, bytes: usize) -> Artifact {
        let path = dir.join(name);
        fs::write(&path, vec![7u8; bytes]).unwrap();
        Artifact {
            path,
            size_bytes: bytes as u64,
        }
    }

    #[test]
    fn test_deliver_copies_fitting_artifact() -> Result<(), Box<dyn std::error::Error>> {
        let work = tempdir()?;
        let out = tempdir()?;
        let artifact = artifact_in(work.path(), "clip.compat.mp4", 1024);

        let result = deliver(&artifact, out.path(), TransportMode::Hosted);
        let expected = out.path().join("clip.compat.mp4");
        assert_eq!(
            result,
            Delivery::Delivered {
                path: expected.clone(),
                size_bytes: 1024
            }
        );
        assert_eq!(fs::read(expected)?.len(), 1024);
        Ok(())
    }

    #[test]
    fn test_deliver_rejects_oversize_without_copying() -> Result<(), Box<dyn std::error::Error>> {
        let work = tempdir()?;
        let out = tempdir()?;
        let mut artifact = artifact_in(work.path(), "big.mp4", 16);
        artifact.size_bytes = HOSTED_LIMIT_BYTES + 1;

        let result = deliver(&artifact, out.path(), TransportMode::Hosted);
        assert_eq!(
            result,
            Delivery::TooLarge {
                size_bytes: HOSTED_LIMIT_BYTES + 1,
                limit: "50MB".to_string()
            }
        );
        assert_eq!(fs::read_dir(out.path())?.count(), 0);

        // The same file fits the local transport.
        assert!(matches!(
            deliver(&artifact, out.path(), TransportMode::Local),
            Delivery::Delivered { .. }
        ));
        Ok(())
    }

    #[test]
    fn test_deliver_reports_copy_failure() -> Result<(), Box<dyn std::error::Error>> {
        let out = tempdir()?;
        let artifact = Artifact {
            path: out.path().join("vanished.mp4"),
            size_bytes: 10,
        };
        assert!(matches!(
            deliver(&artifact, out.path(), TransportMode::Hosted),
            Delivery::CopyFailed(_)
        ));
        Ok(())
    }

    #[test]
    fn test_claim_destination_avoids_collisions() -> Result<(), Box<dyn std::error::Error>> {
        let out = tempdir()?;
        let (first, _) = claim_destination(out.path(), "a.mp4")?;
        assert_eq!(first, out.path().join("a.mp4"));

        fs::write(out.path().join("a-1.mp4"), b"x")?;
        let (next, _) = claim_destination(out.path(), "a.mp4")?;
        assert_eq!(next, out.path().join("a-2.mp4"));
        assert_eq!(fs::read(out.path().join("a-1.mp4"))?, b"x");

        fs::write(out.path().join("noext"), b"x")?;
        let (plain, _) = claim_destination(out.path(), "noext")?;
        assert_eq!(plain, out.path().join("noext-1"));
        Ok(())
    }

    #[test]
    fn test_concurrent_same_name_deliveries_do_not_overwrite()
    -> Result<(), Box<dyn std::error::Error>> {
        let out = tempdir()?;
        let works: Vec<_> = (0..8).map(|_| tempdir()).collect::<Result<_, _>>()?;
        let artifacts: Vec<Artifact> = works
            .iter()
            .enumerate()
            .map(|(i, work)| artifact_in(work.path(), "clip.mp4", 100 + i))
            .collect();

        let out_dir = out.path();
        let results: Vec<Delivery> = std::thread::scope(|scope| {
            let handles: Vec<_> = artifacts
                .iter()
                .map(|a| scope.spawn(move || deliver(a, out_dir, TransportMode::Hosted)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().expect("delivery thread panicked"))
                .collect()
        });

        let mut paths = std::collections::HashSet::new();
        for result in results {
            let (path, size_bytes) = match result {
                Delivery::Delivered { path, size_bytes } => (path, size_bytes),
                other => panic!("Expected a delivery, got {other:?}"),
            };
            assert_eq!(fs::read(&path)?.len() as u64, size_bytes);
            assert!(paths.insert(path));
        }
        assert_eq!(paths.len(), 8);
        assert_eq!(fs::read_dir(out.path())?.count(), 8);
        Ok(())
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = FetchSummary::default();
        summary.record(
            "https://a",
            &Ok(Delivery::TooLarge {
                size_bytes: 60 * 1024 * 1024,
                limit: "50MB".into(),
            }),
        );
        assert!(summary.all_succeeded());

        summary.record("https://b", &Err(AcquisitionError::Cancelled));
        assert_eq!(
            summary,
            FetchSummary {
                delivered: 0,
                too_large: 1,
                failed: 1
            }
        );
        assert!(!summary.all_succeeded());
    }

    #[test]
    fn test_run_fetch_without_urls_fails() {
        let args = match <crate::cli::Cli as clap::Parser>::parse_from([
            "reelfix",
            "fetch",
            "nothing to see here",
        ])
        .command
        {
            crate::cli::Commands::Fetch(args) => args,
            other => panic!("Expected Fetch command, got {other:?}"),
        };
        let err = run_fetch(args, &CancelFlag::new()).unwrap_err();
        assert!(err.to_string().contains("No http(s) URLs"));
    }
}
