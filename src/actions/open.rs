//! Opening files with the platform's default application.
//!
//! Fire-and-forget: the viewer is spawned on its own and a failure to launch
//! it is only logged. A detached thread waits on the child so it does not
//! linger as a zombie while the resolver keeps prompting.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};

#[cfg(target_os = "macos")]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(target_os = "windows")]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

/// Spawn `cmd` with null stdio and reap it on a background thread.
fn launch(mut cmd: Command) -> io::Result<JoinHandle<()>> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    Ok(thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => log::debug!("Opener exited with {}", status),
        Ok(_) => {}
        Err(e) => log::debug!("Could not wait for opener: {}", e),
    }))
}

/// Open `path` with the default application.
pub fn open_file(path: &Path) {
    match launch(opener(path)) {
        Ok(_) => log::debug!("Opened {}", path.display()),
        Err(e) => log::warn!("Could not open {}: {}", path.display(), e),
    }
}
