//! `oc` subcommands, flags, and the ordered option set that turns them into
//! argument tokens.

use std::fmt;

// ---------------------------------------------------------------------------
// Subcommand
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subcommand {
    Login,
    Logout,
    Whoami,
    Config,
    View,
    SetContext,
    CurrentContext,
}

impl Subcommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Subcommand::Login => "login",
            Subcommand::Logout => "logout",
            Subcommand::Whoami => "whoami",
            Subcommand::Config => "config",
            Subcommand::View => "view",
            Subcommand::SetContext => "set-context",
            Subcommand::CurrentContext => "current-context",
        }
    }
}

impl fmt::Display for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Flag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Server,
    Username,
    Password,
    Token,
    SkipTlsVerify,
    CertificateAuthority,
    Flatten,
    Minify,
    Current,
    Namespace,
}

impl Flag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flag::Server => "server",
            Flag::Username => "username",
            Flag::Password => "password",
            Flag::Token => "token",
            Flag::SkipTlsVerify => "insecure-skip-tls-verify",
            Flag::CertificateAuthority => "certificate-authority",
            Flag::Flatten => "flatten",
            Flag::Minify => "minify",
            Flag::Current => "current",
            Flag::Namespace => "namespace",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OptionSet
// ---------------------------------------------------------------------------

/// Ordered `Flag → value` mapping.
///
/// Some `oc` flags are position-sensitive relative to each other, so entries
/// are kept in insertion order. Re-inserting a flag replaces its value in
/// place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    entries: Vec<(Flag, Option<String>)>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `flag` to `value`. `None` keeps the entry but omits it from
    /// [`format`](Self::format).
    pub fn insert(&mut self, flag: Flag, value: Option<String>) -> &mut Self {
        match self.entries.iter_mut().find(|(f, _)| *f == flag) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((flag, value)),
        }
        self
    }

    pub fn with(mut self, flag: Flag, value: impl Into<String>) -> Self {
        self.insert(flag, Some(value.into()));
        self
    }

    /// Add a flag that is emitted without a value (`--flag`).
    pub fn with_bare(self, flag: Flag) -> Self {
        self.with(flag, "")
    }

    pub fn get(&self, flag: Flag) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == flag)
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Format into argument tokens: absent values are skipped, empty values
    /// become `--flag`, anything else `--flag=value`.
    ///
    /// Values are never quoted. Each token is handed to the process as its own
    /// argv element, so no shell ever interprets it.
    pub fn format(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|(flag, value)| {
                let value = value.as_deref()?;
                if value.is_empty() {
                    Some(format!("--{flag}"))
                } else {
                    Some(format!("--{flag}={value}"))
                }
            })
            .collect()
    }
}

impl FromIterator<(Flag, Option<String>)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (Flag, Option<String>)>>(iter: I) -> Self {
        let mut set = OptionSet::new();
        for (flag, value) in iter {
            set.insert(flag, value);
        }
        set
    }
}

/// Subcommand tokens followed by the formatted options.
pub fn command_args(subcommands: &[Subcommand], options: &OptionSet) -> Vec<String> {
    subcommands
        .iter()
        .map(|s| s.as_str().to_string())
        .chain(options.format())
        .collect()
}
