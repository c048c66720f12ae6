use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use std::path::Path;
use std::process::Stdio;
use std::thread::sleep;
use std::time::{Duration, Instant};
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn reelfix_cmd() -> Command {
    let mut cmd = Command::cargo_bin("reelfix").expect("Failed to find reelfix binary");
    cmd.env("NO_COLOR", "1");
    for var in [
        "REELFIX_TRANSPORT",
        "REELFIX_TRANSCODE_MODE",
        "REELFIX_TEMP_DIR",
        "REELFIX_LOG_DIR",
        "YTDLP_TWITTER_API_ORDER",
        "YTDLP_COOKIES_FILE",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> Result<String, Box<dyn Error>> {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}"))?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path.to_string_lossy().into_owned())
}

/// Fake yt-dlp that writes clip.mp4 next to the -o template and reports it.
#[cfg(unix)]
const FAKE_YTDLP: &str = r#"out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "-o" ]; then out="$a"; fi
  prev="$a"
done
dir=$(dirname "$out")
printf 'fake video bytes' > "$dir/clip.mp4"
echo "reelfix-declared=$dir/clip.mp4"
echo "reelfix-final=$dir/clip.mp4"
"#;

#[cfg(unix)]
const FAKE_FFPROBE: &str = r#"echo '{"streams":[{"codec_name":"h264","width":1280,"height":720,"sample_aspect_ratio":"1:1","display_aspect_ratio":"16:9"}]}'
"#;

/// Fake ffmpeg that copies the -i input to the last argument.
#[cfg(unix)]
const FAKE_FFMPEG: &str = r#"in=""
prev=""
last=""
for a in "$@"; do
  if [ "$prev" = "-i" ]; then in="$a"; fi
  prev="$a"
  last="$a"
done
cp "$in" "$last"
"#;

#[test]
fn test_fetch_without_urls_fails() -> Result<(), Box<dyn Error>> {
    reelfix_cmd()
        .args(["fetch", "nothing to download here"])
        .assert()
        .failure()
        .stderr(contains("No http(s) URLs"));
    Ok(())
}

#[test]
fn test_plan_non_existent_file() -> Result<(), Box<dyn Error>> {
    reelfix_cmd()
        .args(["plan", "surely/this/does/not/exist/clip.mp4"])
        .assert()
        .failure()
        .stderr(contains("is not a file"));
    Ok(())
}

#[test]
fn test_check_reports_missing_tools() -> Result<(), Box<dyn Error>> {
    reelfix_cmd()
        .args([
            "check",
            "--ytdlp",
            "/nonexistent/yt-dlp",
            "--ffmpeg",
            "/nonexistent/ffmpeg",
            "--ffprobe",
            "/nonexistent/ffprobe",
        ])
        .assert()
        .failure()
        .stderr(contains("MISSING"));
    Ok(())
}

#[test]
fn test_invalid_mode_is_rejected() -> Result<(), Box<dyn Error>> {
    reelfix_cmd()
        .args(["fetch", "https://example.com/v", "--mode", "fastest"])
        .assert()
        .failure();
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_fetch_end_to_end_with_fake_tools() -> Result<(), Box<dyn Error>> {
    let tools = tempdir()?;
    let scratch = tempdir()?;
    let output = tempdir()?;
    let ytdlp = write_script(tools.path(), "yt-dlp", FAKE_YTDLP)?;
    let ffprobe = write_script(tools.path(), "ffprobe", FAKE_FFPROBE)?;
    let ffmpeg = write_script(tools.path(), "ffmpeg", FAKE_FFMPEG)?;

    reelfix_cmd()
        .args(["fetch", "check this https://example.com/watch/1 out"])
        .args(["--ytdlp", &ytdlp, "--ffprobe", &ffprobe, "--ffmpeg", &ffmpeg])
        .arg("--temp-dir")
        .arg(scratch.path())
        .arg("--output")
        .arg(output.path())
        .assert()
        .success()
        .stderr(contains("Delivered"));

    let delivered = output.path().join("clip.remux.mp4");
    assert_eq!(std::fs::read(&delivered)?, b"fake video bytes");
    // The per-request working directory is gone.
    assert_eq!(std::fs::read_dir(scratch.path())?.count(), 0);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_fetch_download_failure_exits_nonzero() -> Result<(), Box<dyn Error>> {
    let tools = tempdir()?;
    let scratch = tempdir()?;
    let output = tempdir()?;
    let ytdlp = write_script(
        tools.path(),
        "yt-dlp",
        "echo 'ERROR: Unsupported URL: https://example.com/nope' >&2\nexit 1\n",
    )?;

    reelfix_cmd()
        .args(["fetch", "https://example.com/nope", "--ytdlp", &ytdlp])
        .arg("--temp-dir")
        .arg(scratch.path())
        .arg("--output")
        .arg(output.path())
        .assert()
        .failure()
        .stderr(contains("Unsupported URL"));

    assert_eq!(std::fs::read_dir(output.path())?.count(), 0);
    assert_eq!(std::fs::read_dir(scratch.path())?.count(), 0);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_fetch_sigterm_kills_download_and_cleans_scratch() -> Result<(), Box<dyn Error>> {
    let tools = tempdir()?;
    let scratch = tempdir()?;
    let output = tempdir()?;
    let ytdlp = write_script(tools.path(), "yt-dlp", "exec sleep 20\n")?;

    let mut child = std::process::Command::new(env!("CARGO_BIN_EXE_reelfix"))
        .env("NO_COLOR", "1")
        .env_remove("REELFIX_LOG_DIR")
        .env_remove("RUST_LOG")
        .args(["fetch", "https://example.com/slow", "--ytdlp", &ytdlp])
        .arg("--temp-dir")
        .arg(scratch.path())
        .arg("--output")
        .arg(output.path())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    // Wait for the request's working directory, then give yt-dlp time to start.
    let deadline = Instant::now() + Duration::from_secs(10);
    while std::fs::read_dir(scratch.path())?.count() == 0 && Instant::now() < deadline {
        sleep(Duration::from_millis(50));
    }
    assert!(std::fs::read_dir(scratch.path())?.count() > 0);
    sleep(Duration::from_millis(500));

    let killed = std::process::Command::new("kill")
        .args(["-TERM", &child.id().to_string()])
        .status()?;
    assert!(killed.success());

    let deadline = Instant::now() + Duration::from_secs(10);
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            child.kill()?;
            child.wait()?;
            panic!("reelfix did not exit after SIGTERM");
        }
        sleep(Duration::from_millis(50));
    };

    assert_eq!(status.code(), Some(130));
    assert_eq!(std::fs::read_dir(scratch.path())?.count(), 0);
    assert_eq!(std::fs::read_dir(output.path())?.count(), 0);
    Ok(())
}
