//! Metadata and ownership commands: lstat, stat, fstat, chmod, chown.

use std::fs::{self, File, Metadata, Permissions};
use std::os::unix::fs::{MetadataExt, PermissionsExt};

use nix::unistd::{Gid, Group, Uid, User};
use sysh_types::error::Result;

use crate::interpreter::{Command, Environment};
use crate::kind::CommandKind;

// ---------------------------------------------------------------------------
// lstat / stat / fstat
// ---------------------------------------------------------------------------

/// One handler, three ways of obtaining the metadata.
pub(crate) struct StatCmd {
    kind: CommandKind,
}

impl StatCmd {
    /// `kind` selects the lookup: `Stat` follows links, `Fstat` opens the
    /// file first, anything else behaves as `lstat`.
    pub(crate) fn new(kind: CommandKind) -> Self {
        Self { kind }
    }

    fn metadata(&self, path: &str) -> Result<Metadata> {
        let meta = match self.kind {
            CommandKind::Stat => fs::metadata(path)?,
            // The descriptor is released when `file` drops at the end of this arm.
            CommandKind::Fstat => {
                let file = File::open(path)?;
                file.metadata()?
            },
            _ => fs::symlink_metadata(path)?,
        };
        Ok(meta)
    }
}

impl Command for StatCmd {
    fn kind(&self) -> CommandKind {
        self.kind
    }
    fn description(&self) -> &str {
        match self.kind {
            CommandKind::Stat => "Show file metadata, following symlinks",
            CommandKind::Fstat => "Show metadata of an opened file",
            _ => "Show file metadata without following symlinks",
        }
    }
    fn usage(&self) -> &str {
        match self.kind {
            CommandKind::Stat => "stat <path>",
            CommandKind::Fstat => "fstat <path>",
            _ => "lstat <path>",
        }
    }
    fn arity(&self) -> usize {
        1
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        let meta = self.metadata(args[0])?;
        env.emit(&format_record(args[0], &meta))
    }
}

fn format_record(path: &str, meta: &Metadata) -> String {
    let file_type = meta.file_type();
    let kind = if file_type.is_symlink() {
        "symbolic link"
    } else if file_type.is_dir() {
        "directory"
    } else if file_type.is_file() {
        "regular file"
    } else {
        "special file"
    };
    let mut lines = Vec::new();
    lines.push(format!("  File: {path}"));
    lines.push(format!("  Type: {kind}"));
    lines.push(format!("  Size: {}", meta.size()));
    lines.push(format!("   Uid: {}", meta.uid()));
    lines.push(format!("   Gid: {}", meta.gid()));
    lines.push(format!("  Mode: {:04o}", meta.mode() & 0o7777));
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

// ---------------------------------------------------------------------------
// chmod
// ---------------------------------------------------------------------------

pub(crate) struct ChmodCmd;
impl Command for ChmodCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Chmod
    }
    fn description(&self) -> &str {
        "Set permission bits"
    }
    fn usage(&self) -> &str {
        "chmod <octal-mode> <path...>"
    }
    fn arity(&self) -> usize {
        2
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        let Some(mode) = parse_mode(args[0]) else {
            return env.emit("chmod: Invalid mode\n");
        };
        for path in &args[1..] {
            fs::set_permissions(path, Permissions::from_mode(mode))?;
        }
        Ok(())
    }
}

fn parse_mode(text: &str) -> Option<u32> {
    u32::from_str_radix(text, 8)
        .ok()
        .filter(|mode| *mode <= 0o7777)
}

// ---------------------------------------------------------------------------
// chown
// ---------------------------------------------------------------------------

pub(crate) struct ChownCmd;
impl Command for ChownCmd {
    fn kind(&self) -> CommandKind {
        CommandKind::Chown
    }
    fn description(&self) -> &str {
        "Change file owner and group"
    }
    fn usage(&self) -> &str {
        "chown <owner>[:<group>] <path...>"
    }
    fn arity(&self) -> usize {
        2
    }
    fn execute(&self, args: &[&str], env: &mut Environment<'_>) -> Result<()> {
        let Some((owner, group)) = parse_owner(args[0]) else {
            return env.emit("chown: Invalid owner\n");
        };
        for path in &args[1..] {
            nix::unistd::chown(*path, owner, group)?;
        }
        Ok(())
    }
}

/// Parse `owner[:group]`. Either side may be a name or a numeric id; an
/// empty side leaves that id unchanged. At least one side must be given.
fn parse_owner(owner: &str) -> Option<(Option<Uid>, Option<Gid>)> {
    let (user_part, group_part) = match owner.split_once(':') {
        Some((user, group)) => (user, group),
        None => (owner, ""),
    };
    let uid = if user_part.is_empty() {
        None
    } else {
        Some(resolve_uid(user_part)?)
    };
    let gid = if group_part.is_empty() {
        None
    } else {
        Some(resolve_gid(group_part)?)
    };
    if uid.is_none() && gid.is_none() {
        return None;
    }
    Some((uid, gid))
}

fn resolve_uid(text: &str) -> Option<Uid> {
    if let Ok(raw) = text.parse::<u32>() {
        return Some(Uid::from_raw(raw));
    }
    User::from_name(text).ok().flatten().map(|user| user.uid)
}

fn resolve_gid(text: &str) -> Option<Gid> {
    if let Ok(raw) = text.parse::<u32>() {
        return Some(Gid::from_raw(raw));
    }
    Group::from_name(text).ok().flatten().map(|group| group.gid)
}
