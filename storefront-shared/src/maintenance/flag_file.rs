/// Boolean flag persisted in a `KEY=value` file
///
/// The file is the same kind of dotenv file the storefront reads at start-up,
/// so every other line in it must survive a write untouched: comments, blank
/// lines, other keys, ordering.
///
/// Known limitation: there is no file locking. Two concurrent writers can
/// overwrite each other's change.
///
/// # Example
///
/// ```no_run
/// use storefront_shared::maintenance::flag_file::FlagFile;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let flag = FlagFile::new(".env.local", "TEST_MODE");
/// flag.set(true)?;
/// assert!(flag.read()?);
/// # Ok(())
/// # }
/// ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A single boolean key in a dotenv-style file
#[derive(Debug, Clone)]
pub struct FlagFile {
    path: PathBuf,
    key: String,
}

impl FlagFile {
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            key: key.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current value; a missing file or key reads as `false`
    pub fn read(&self) -> io::Result<bool> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(e),
        };

        Ok(contents
            .lines()
            .find_map(|line| value_for_key(line, &self.key))
            .map(parse_bool)
            .unwrap_or(false))
    }

    /// Writes the flag, rewriting its line in place or appending it
    ///
    /// Only the first line carrying the key is rewritten; everything else is
    /// copied through verbatim.
    pub fn set(&self, value: bool) -> io::Result<()> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e),
        };

        let updated = rewrite(&contents, &self.key, value);
        fs::write(&self.path, updated)?;

        debug!(path = %self.path.display(), key = %self.key, value, "Flag written");
        Ok(())
    }
}

/// Returns the raw value if `line` assigns `key`
fn value_for_key<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let trimmed = line.trim_start();
    let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
    let (name, value) = trimmed.split_once('=')?;
    if name.trim() == key {
        Some(value)
    } else {
        None
    }
}

fn parse_bool(raw: &str) -> bool {
    let value = raw
        .split('#')
        .next()
        .unwrap_or("")
        .trim()
        .trim_matches(|c| c == '"' || c == '\'');
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

fn rewrite(contents: &str, key: &str, value: bool) -> String {
    let line_for_key = format!("{}={}", key, value);
    let mut replaced = false;
    let mut out = String::with_capacity(contents.len() + line_for_key.len() + 1);

    // split_inclusive keeps each line's own terminator (\n or \r\n)
    for line in contents.split_inclusive('\n') {
        let body = line.trim_end_matches(['\n', '\r']);
        match value_for_key(body, key) {
            Some(old) if !replaced => {
                // The old value is a suffix of the body; keep what precedes it
                // so indentation and an `export ` prefix survive.
                out.push_str(&body[..body.len() - old.len()]);
                out.push_str(if value { "true" } else { "false" });
                out.push_str(&line[body.len()..]);
                replaced = true;
            }
            _ => out.push_str(line),
        }
    }

    if !replaced {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push_str(&line_for_key);
        out.push('\n');
    }

    out
}
