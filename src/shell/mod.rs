//! Line-oriented command shell over a key registry.
//!
//! All state lives in [`ShellContext`]: the working directory used to
//! resolve key files, the [`Keyring`] with its active key, and one cached
//! [`Obfuscator`] per key name.
//!
//! | Command              | Effect                                     |
//! |----------------------|--------------------------------------------|
//! | `help`               | List commands                              |
//! | `pwd`                | Print the working directory                |
//! | `loadkeys <file>`    | Load a JSON key file                       |
//! | `listkeys`           | Name, algorithm and fingerprint per key    |
//! | `selectkey [name]`   | Select a key, or print the active one      |
//! | `obfuscate <id>`     | Obfuscate a 64-bit integer                 |
//! | `restore <text>`     | Restore an obfuscated string               |
//! | `exit` / `quit`      | Leave the shell                            |

mod keyfile;

pub use keyfile::KeyFile;

use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::crypto::{KeyId, Keyring, MacKeying};
use crate::error::Result;
use crate::obfuscate::{IdCodec, ObfuscationError, Obfuscator};

/// Prompt printed before each line
pub const PROMPT: &str = "whisper> ";

const NO_ACTIVE_KEY: &str = "No active key, select key first";
const OBFUSCATE_USAGE: &str = "Invalid args, Usage obfuscate <id: Long>";
const BAD_NUMBER: &str = "Invalid number format, Usage obfuscate <id: Long>";
const RESTORE_USAGE: &str = "Invalid args, Usage restore <text>";
const LOADKEYS_USAGE: &str = "Invalid args, Usage loadkeys <filename>";

const COMMANDS: &[(&str, &str)] = &[
    ("help", "list commands"),
    ("listkeys", "list loaded keys"),
    ("loadkeys", "load keys from json"),
    ("obfuscate", "obfuscate an integer id"),
    ("pwd", "print current working directory"),
    ("restore", "restore an obfuscated string"),
    ("selectkey", "select a key to use"),
    ("exit", "leave the shell"),
];

/// Result of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Normal output
    Print(String),
    /// Error output
    Error(String),
    /// Nothing to print
    Silent,
    /// Leave the shell
    Exit,
}

/// Shell state
#[derive(Debug)]
pub struct ShellContext {
    cwd: PathBuf,
    keyring: Keyring,
    keying: MacKeying,
    obfuscators: HashMap<KeyId, Obfuscator>,
}

impl ShellContext {
    /// Create a context resolving relative paths against `cwd`
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            keyring: Keyring::new(),
            keying: MacKeying::Shared,
            obfuscators: HashMap::new(),
        }
    }

    /// Use `keying` for obfuscators built from now on
    pub fn with_keying(mut self, keying: MacKeying) -> Self {
        self.keying = keying;
        self.obfuscators.clear();
        self
    }

    /// Working directory
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Loaded keys
    pub fn keyring(&self) -> &Keyring {
        &self.keyring
    }

    /// Load a key file, resolved against the working directory. Returns
    /// the number of keys it contained.
    pub fn load_keys(&mut self, file: &Path) -> Result<usize> {
        let path = self.cwd.join(file);
        let parsed = KeyFile::from_path(&path)?;
        let keys = parsed.decode_keys()?;
        if !parsed.legacy.is_empty() {
            tracing::debug!(count = parsed.legacy.len(), "ignoring legacy keys");
        }

        let count = keys.len();
        for (id, key) in keys {
            self.obfuscators.remove(&id);
            self.keyring.insert(id, key);
        }
        tracing::info!(path = %path.display(), count, "loaded keys");
        Ok(count)
    }

    /// Select the active key
    pub fn select_key(&mut self, name: &str) -> Result<()> {
        self.keyring
            .select(KeyId::new(name))
            .map_err(crate::crypto::CryptoError::from)?;
        Ok(())
    }

    /// Obfuscate with the active key
    pub fn obfuscate(&mut self, id: i64) -> Result<String> {
        Ok(self.active_obfuscator()?.obfuscate(id)?)
    }

    /// Restore with the active key
    pub fn restore(&mut self, text: &str) -> Result<i64> {
        Ok(self.active_obfuscator()?.restore(text)?)
    }

    fn active_obfuscator(&mut self) -> Result<&Obfuscator> {
        let (id, key) = self
            .keyring
            .active()
            .map_err(crate::crypto::CryptoError::from)?;
        if !self.obfuscators.contains_key(id) {
            let obfuscator = Obfuscator::with_keying(key.clone(), self.keying)?;
            self.obfuscators.insert(id.clone(), obfuscator);
        }
        Ok(&self.obfuscators[id])
    }

    /// Run one command line
    pub fn execute(&mut self, line: &str) -> Reply {
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            return Reply::Silent;
        };
        let arg = parts.next();
        tracing::debug!(command, "shell command");

        match command {
            "help" => Reply::Print(help_text()),
            "pwd" => Reply::Print(self.cwd.display().to_string()),
            "loadkeys" => self.cmd_loadkeys(arg),
            "listkeys" => Reply::Print(self.list_keys()),
            "selectkey" => self.cmd_selectkey(arg),
            "obfuscate" => self.cmd_obfuscate(arg),
            "restore" => self.cmd_restore(arg),
            "exit" | "quit" => Reply::Exit,
            other => Reply::Error(format!("Unknown command: {other}, type help")),
        }
    }

    fn cmd_loadkeys(&mut self, arg: Option<&str>) -> Reply {
        let Some(file) = arg else {
            return Reply::Error(LOADKEYS_USAGE.to_string());
        };
        match self.load_keys(Path::new(file)) {
            Ok(count) => Reply::Print(format!("Load {count} keys from {file}")),
            Err(e) => Reply::Error(e.to_string()),
        }
    }

    fn cmd_selectkey(&mut self, arg: Option<&str>) -> Reply {
        let Some(name) = arg else {
            let active = self
                .keyring
                .active_id()
                .map_or_else(|| "null".to_string(), |id| id.to_string());
            return Reply::Print(format!("active key: {active}"));
        };
        match self.keyring.select(KeyId::new(name)) {
            Ok(()) => Reply::Print(format!("active key: {name}")),
            Err(e) => Reply::Error(format!("ERROR: {e}")),
        }
    }

    fn cmd_obfuscate(&mut self, arg: Option<&str>) -> Reply {
        let Some(text) = arg else {
            return Reply::Error(OBFUSCATE_USAGE.to_string());
        };
        if self.keyring.active_id().is_none() {
            return Reply::Error(NO_ACTIVE_KEY.to_string());
        }
        let Ok(id) = text.parse::<i64>() else {
            return Reply::Error(BAD_NUMBER.to_string());
        };
        match self.obfuscate(id) {
            Ok(out) => Reply::Print(out),
            Err(e) => Reply::Error(e.to_string()),
        }
    }

    fn cmd_restore(&mut self, arg: Option<&str>) -> Reply {
        let Some(text) = arg else {
            return Reply::Error(RESTORE_USAGE.to_string());
        };
        if self.keyring.active_id().is_none() {
            return Reply::Error(NO_ACTIVE_KEY.to_string());
        }
        let obfuscator = match self.active_obfuscator() {
            Ok(obfuscator) => obfuscator,
            Err(e) => return Reply::Error(e.to_string()),
        };
        match obfuscator.restore(text) {
            Ok(id) => Reply::Print(id.to_string()),
            Err(ObfuscationError::BadSignature) => Reply::Error("Bad signature".to_string()),
            Err(_) => Reply::Error("Bad string format".to_string()),
        }
    }

    fn list_keys(&self) -> String {
        let mut out = String::from("name         algorithm    signature\n");
        out.push_str("------------------------------------");
        for (id, key) in self.keyring.iter() {
            out.push('\n');
            out.push_str(&format!(
                "{:<13}{:<13}{}",
                id.as_str(),
                key.algorithm().name(),
                key.fingerprint()
            ));
        }
        out
    }

    /// Read commands from `input` until EOF or `exit`
    pub fn run<R: BufRead, W: Write, E: Write>(
        &mut self,
        input: R,
        out: &mut W,
        err: &mut E,
        interactive: bool,
    ) -> std::io::Result<()> {
        let mut lines = input.lines();
        loop {
            if interactive {
                write!(out, "{PROMPT}")?;
                out.flush()?;
            }
            let Some(line) = lines.next() else {
                break;
            };
            match self.execute(&line?) {
                Reply::Print(text) => writeln!(out, "{text}")?,
                Reply::Error(text) => writeln!(err, "{text}")?,
                Reply::Silent => {}
                Reply::Exit => break,
            }
        }
        Ok(())
    }
}

fn help_text() -> String {
    COMMANDS
        .iter()
        .map(|(name, desc)| format!("{name:<12}{desc}"))
        .collect::<Vec<_>>()
        .join("\n")
}
