use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};

/// Verify that the Docker CLI and its compose plugin are usable.
pub fn ensure_available(docker: &str) -> Result<()> {
    let status = Command::new(docker)
        .args(["compose", "version", "--short"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .with_context(|| format!("failed to invoke `{docker}`, is it installed and on PATH?"))?;

    if !status.success() {
        bail!("`{docker} compose` is not available (exit {status})");
    }
    Ok(())
}

/// Whether the caller's stdin is a terminal, so `docker exec` may allocate a TTY.
pub fn stdin_is_terminal() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: isatty() only inspects the descriptor and has no side effects.
        unsafe { libc::isatty(libc::STDIN_FILENO) == 1 }
    }

    #[cfg(not(unix))]
    {
        use std::io::IsTerminal;
        std::io::stdin().is_terminal()
    }
}
