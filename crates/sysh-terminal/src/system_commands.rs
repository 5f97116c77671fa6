//! User, process, and clock commands: whoami, getpid, getppid, kill, time, gettimeofday.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use nix::sys::signal::{self, Signal};
use nix::unistd::{Pid, User};
use sysh_types::error::{Result, SyshError};

use crate::interpreter::{Command, Environment};
use crate::kind::CommandKind;

// ---------------------------------------------------------------------------
// whoami
// ---------------------------------------------------------------------------

pub(crate) struct WhoamiCmd;
impl Command for WhoamiCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Whoami
    }
    fn description(&self) -> &str {
        "Print the current user name"
    }
    fn usage(&self) -> &str {
        "whoami"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        let uid = nix::unistd::getuid();
        match User::from_uid(uid) {
            Ok(Some(user)) => env.emit(&format!("{}\n", user.name)),
            Ok(None) => env.emit(&format!("whoami: cannot find name for user ID {uid}\n")),
            Err(e) => {
                log::warn!("passwd lookup for uid {uid} failed: {e}");
                env.emit(&format!("whoami: cannot find name for user ID {uid}\n"))
            },
        }
    }
}

// ---------------------------------------------------------------------------
// getpid / getppid
// ---------------------------------------------------------------------------

pub(crate) struct GetpidCmd;
impl Command for GetpidCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Getpid
    }
    fn description(&self) -> &str {
        "Print this process id"
    }
    fn usage(&self) -> &str {
        "getpid"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        env.emit(&format!("{}\n", nix::unistd::getpid()))
    }
}

pub(crate) struct GetppidCmd;
impl Command for GetppidCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Getppid
    }
    fn description(&self) -> &str {
        "Print the parent process id"
    }
    fn usage(&self) -> &str {
        "getppid"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        env.emit(&format!("{}\n", nix::unistd::getppid()))
    }
}

// ---------------------------------------------------------------------------
// kill
// ---------------------------------------------------------------------------

pub(crate) struct KillCmd;
impl Command for KillCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Kill
    }
    fn description(&self) -> &str {
        "Send SIGTERM or SIGKILL to a process"
    }
    fn usage(&self) -> &str {
        "kill <pid> [-9|SIGKILL|-15|SIGTERM]"
    }
    fn arity(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        let Some(pid) = parse_pid(args[0]) else {
            return env.emit("kill: Invalid PID\n");
        };
        let sig = match args.get(1) {
            None => Signal::SIGTERM,
            Some(token) => match parse_signal(token) {
                Some(sig) => sig,
                None => return env.emit("kill: Unknown signal\n"),
            },
        };
        log::debug!("kill: sending {sig} to {pid}");
        signal::kill(pid, sig)?;
        Ok(())
    }
}

/// Only positive ids; 0 and negatives address process groups.
fn parse_pid(text: &str) -> Option<Pid> {
    text.parse::<i32>()
        .ok()
        .filter(|raw| *raw > 0)
        .map(Pid::from_raw)
}

fn parse_signal(token: &str) -> Option<Signal> {
    match token {
        "-9" | "SIGKILL" => Some(Signal::SIGKILL),
        "-15" | "SIGTERM" => Some(Signal::SIGTERM),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// time / gettimeofday
// ---------------------------------------------------------------------------

fn since_epoch() -> Result<Duration> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| SyshError::Command(format!("clock before epoch: {e}")))
}

pub(crate) struct TimeCmd;
impl Command for TimeCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Time
    }
    fn description(&self) -> &str {
        "Print Unix time in seconds"
    }
    fn usage(&self) -> &str {
        "time"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        let now = since_epoch()?;
        env.emit(&format!("{}\n", now.as_secs()))
    }
}

pub(crate) struct GettimeofdayCmd;
impl Command for GettimeofdayCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Gettimeofday
    }
    fn description(&self) -> &str {
        "Print wall-clock seconds and microseconds"
    }
    fn usage(&self) -> &str {
        "gettimeofday"
    }
    fn execute(&self, _args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        let now = since_epoch()?;
        env.emit(&format_timeval(now))
    }
}

fn format_timeval(now: Duration) -> String {
    format!("sec: {}, usec: {:06}\n", now.as_secs(), now.subsec_micros())
}
