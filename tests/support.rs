use std::ffi::OsStr;
use std::io::Write;
use std::process::{Command, Output, Stdio};

pub fn run_summary_cache<I, S>(args: I, stdin: Option<&str>) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_summary_cache_logged(args, stdin, None)
}

/// Runs the binary with `SUMMARY_CACHE_LOG` set to `log_filter` when given.
pub fn run_summary_cache_logged<I, S>(
    args: I,
    stdin: Option<&str>,
    log_filter: Option<&str>,
) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = summary_cache_bin()?;
    let mut command = Command::new(bin);
    command
        .args(args)
        .env("RUST_LOG", "error")
        .env_remove("SUMMARY_CACHE_LOG")
        .env_remove("SUMMARY_CACHE_MODE");
    if let Some(filter) = log_filter {
        command.env("SUMMARY_CACHE_LOG", filter);
    }
    let mut child = command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| format!("spawn summary-cache failed: {}", err))?;
    if let Some(mut pipe) = child.stdin.take() {
        if let Some(input) = stdin {
            // The process may exit on a config error before reading stdin.
            if let Err(err) = pipe.write_all(input.as_bytes()) {
                if err.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(format!("write stdin failed: {}", err));
                }
            }
        }
    }
    child
        .wait_with_output()
        .map_err(|err| format!("run summary-cache failed: {}", err))
}

pub fn stdout_lines(output: &Output) -> Result<Vec<String>, String> {
    if !output.status.success() {
        return Err(format!(
            "stdout: {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_owned)
        .collect())
}

fn summary_cache_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_summary-cache").map_or_else(
        || Err("CARGO_BIN_EXE_summary-cache missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
