//! Spawning and stopping managed OS processes.
//!
//! The supervisor owns the processes it starts. Stop is SIGTERM first, then
//! SIGKILL after a bounded grace period, so a wedged service cannot hold the
//! supervisor loop hostage.

use meshwatch_types::{MeshError, MeshResult};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::config::ServiceDescriptor;

/// Handle to a process this supervisor spawned.
#[derive(Debug)]
pub struct ProcessHandle {
    pub pid: u32,
    child: Child,
}

impl ProcessHandle {
    /// Reap the child if it has already exited. Returns true while the
    /// process is still alive.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }
}

pub struct ProcessManager {
    stop_grace: Duration,
}

impl ProcessManager {
    pub fn new(stop_grace: Duration) -> Self {
        Self { stop_grace }
    }

    /// Spawn the service's start command in its declared working directory.
    /// Failures are reported as values; the policy engine counts them as
    /// failed restart attempts.
    pub fn start(&self, descriptor: &ServiceDescriptor) -> MeshResult<ProcessHandle> {
        let argv = &descriptor.command;
        if argv.is_empty() {
            return Err(MeshError::Process(format!(
                "service '{}' has no start command",
                descriptor.id
            )));
        }

        let mut command = Command::new(&argv[0]);
        command
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        if let Some(ref dir) = descriptor.working_dir {
            command.current_dir(dir);
        }

        let child = command.spawn().map_err(|e| {
            MeshError::Process(format!(
                "failed to spawn '{}' for service '{}': {}",
                argv[0], descriptor.id, e
            ))
        })?;

        let pid = child.id().ok_or_else(|| {
            MeshError::Process(format!(
                "service '{}' exited before a pid was assigned",
                descriptor.id
            ))
        })?;

        info!("Started service '{}' (pid {})", descriptor.id, pid);
        Ok(ProcessHandle { pid, child })
    }

    /// Terminate a spawned process: SIGTERM, wait out the grace period,
    /// SIGKILL if it is still around.
    pub async fn stop(&self, mut handle: ProcessHandle) -> MeshResult<()> {
        let pid = handle.pid;

        if !handle.is_running() {
            debug!("Process {} already exited", pid);
            return Ok(());
        }

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                warn!("SIGTERM to pid {} failed: {}", pid, e);
            }

            match tokio::time::timeout(self.stop_grace, handle.child.wait()).await {
                Ok(Ok(status)) => {
                    info!("Process {} exited with {}", pid, status);
                    return Ok(());
                }
                Ok(Err(e)) => {
                    return Err(MeshError::Process(format!(
                        "waiting on pid {} failed: {}",
                        pid, e
                    )));
                }
                Err(_) => {
                    warn!("Process {} ignored SIGTERM, killing", pid);
                }
            }
        }

        handle
            .child
            .kill()
            .await
            .map_err(|e| MeshError::Process(format!("failed to kill pid {}: {}", pid, e)))?;

        info!("Process {} killed", pid);
        Ok(())
    }
}
