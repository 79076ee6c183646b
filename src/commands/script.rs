//! Executable handlers
//!
//! Each invocation spawns the executable, writes the input to its stdin
//! and returns its stdout. A non-zero exit is a handler failure carrying
//! stderr as the diagnostic detail.

use super::{Handler, HandlerFuture};
use crate::gateway::HandlerError;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

#[derive(Debug, Clone)]
pub struct ScriptHandler {
    name: String,
    path: PathBuf,
}

impl ScriptHandler {
    pub const fn new(name: String, path: PathBuf) -> Self {
        Self { name, path }
    }

    async fn invoke(self, input: Option<String>) -> Result<String, HandlerError> {
        let spawn_err = |e: std::io::Error| HandlerError::new(e.to_string(), self.path.display().to_string());

        let mut child = Command::new(&self.path)
            .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_err)?;

        // Feed stdin while stdout drains, or a chatty script fills its pipe and stalls
        let stdin = child.stdin.take();
        let feed = async move {
            let (Some(data), Some(mut stdin)) = (input, stdin) else {
                return Ok(());
            };
            match stdin.write_all(data.as_bytes()).await {
                // A script that exits without reading its input closes the pipe
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                result => result,
            }
        };

        let (fed, output) = tokio::join!(feed, child.wait_with_output());
        let output = output.map_err(spawn_err)?;
        fed.map_err(spawn_err)?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(HandlerError::new(
                format!("{} exited with {}", self.name, output.status),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }
}

impl Handler for ScriptHandler {
    fn run(&self, input: Option<String>) -> HandlerFuture {
        Box::pin(self.clone().invoke(input))
    }
}
