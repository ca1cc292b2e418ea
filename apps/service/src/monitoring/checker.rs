use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Extra time granted to the ping process beyond its own reply timeout
const PROCESS_GRACE: Duration = Duration::from_secs(2);

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Reachability probe for a single endpoint
///
/// Implementations never fail: anything that prevents a positive answer
/// counts as unreachable.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, identifier: &str) -> bool;
}

/// Argument conventions of the platform `ping` utilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingFlavor {
    /// `ping -n 1 -w <millis>`
    Windows,
    /// iputils / busybox: `ping -c 1 -W <seconds>`
    Linux,
    /// macOS and the BSDs: `ping -c 1 -t <seconds>`
    Bsd,
}

impl PingFlavor {
    pub fn current() -> Self {
        if cfg!(windows) {
            PingFlavor::Windows
        } else if cfg!(any(target_os = "macos", target_os = "freebsd", target_os = "openbsd")) {
            PingFlavor::Bsd
        } else {
            PingFlavor::Linux
        }
    }

    /// Arguments for a single echo request to `identifier`
    pub fn args(self, identifier: &str, reply_timeout: Duration) -> Vec<String> {
        let seconds = reply_timeout.as_secs_f64().ceil().max(1.0) as u64;
        let (count_flag, timeout_flag, timeout_value) = match self {
            PingFlavor::Windows => ("-n", "-w", reply_timeout.as_millis().max(1).to_string()),
            PingFlavor::Linux => ("-c", "-W", seconds.to_string()),
            PingFlavor::Bsd => ("-c", "-t", seconds.to_string()),
        };
        vec![
            count_flag.to_string(),
            "1".to_string(),
            timeout_flag.to_string(),
            timeout_value,
            identifier.to_string(),
        ]
    }
}

/// Prober backed by the operating system's `ping` utility
#[derive(Debug, Clone)]
pub struct PingProber {
    program: String,
    flavor: PingFlavor,
    reply_timeout: Duration,
}

impl PingProber {
    pub fn new(reply_timeout: Duration) -> Self {
        Self { program: "ping".to_string(), flavor: PingFlavor::current(), reply_timeout }
    }

    /// Use a different executable, e.g. a full path to `ping`
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn command(&self, identifier: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(self.flavor.args(identifier, self.reply_timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);
        command
    }
}

#[async_trait]
impl Prober for PingProber {
    async fn probe(&self, identifier: &str) -> bool {
        if !is_probe_target(identifier) {
            warn!(ip = %identifier, "Refusing to ping malformed address");
            return false;
        }

        let status = timeout(self.reply_timeout + PROCESS_GRACE, self.command(identifier).status()).await;
        match status {
            Ok(Ok(status)) => {
                debug!(ip = %identifier, code = ?status.code(), "Ping finished");
                status.success()
            }
            Ok(Err(e)) => {
                warn!(ip = %identifier, program = %self.program, "Error pinging device: {}", e);
                false
            }
            Err(_) => {
                debug!(ip = %identifier, "Ping process timed out");
                false
            }
        }
    }
}

/// Addresses go to `ping` as a positional argument and must not parse as an option.
fn is_probe_target(identifier: &str) -> bool {
    !identifier.is_empty()
        && !identifier.starts_with('-')
        && !identifier.chars().any(|c| c.is_whitespace() || c.is_control())
}
