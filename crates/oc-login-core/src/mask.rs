//! Secret masking: a registry of literal values that must never show up in
//! our own log output, and a `tracing` writer that enforces it.

use std::io::{self, Write};
use std::sync::{Arc, PoisonError, RwLock};

use aho_corasick::{AhoCorasick, MatchKind};
use tracing_subscriber::fmt::MakeWriter;

/// Placeholder written in place of a registered secret.
pub const MASK: &str = "***";

/// Anything that can be told "from now on, hide this value".
pub trait SecretMasker {
    fn add_mask(&self, value: &str);
}

// ---------------------------------------------------------------------------
// SecretRegistry
// ---------------------------------------------------------------------------

/// Shared set of secret literals. Clones share the same set.
#[derive(Debug, Clone, Default)]
pub struct SecretRegistry {
    secrets: Arc<RwLock<Vec<String>>>,
}

impl SecretRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value`. Empty values and duplicates are ignored.
    pub fn register(&self, value: &str) {
        if value.is_empty() {
            return;
        }
        let mut secrets = self.secrets.write().unwrap_or_else(PoisonError::into_inner);
        if !secrets.iter().any(|s| s == value) {
            secrets.push(value.to_string());
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.secrets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|s| s == value)
    }

    pub fn len(&self) -> usize {
        self.secrets.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace every registered value in `input` with [`MASK`].
    pub fn redact(&self, input: &str) -> String {
        let secrets = self.secrets.read().unwrap_or_else(PoisonError::into_inner);
        if secrets.is_empty() {
            return input.to_string();
        }

        // Longest match first, so a secret that contains another is hidden whole.
        match AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .build(secrets.iter())
        {
            Ok(ac) => {
                let replacements = vec![MASK; ac.patterns_len()];
                ac.replace_all(input, &replacements)
            }
            Err(_) => secrets
                .iter()
                .fold(input.to_string(), |acc, secret| acc.replace(secret.as_str(), MASK)),
        }
    }
}

impl SecretMasker for SecretRegistry {
    fn add_mask(&self, value: &str) {
        self.register(value);
    }
}

/// Lets `oc` echoes and output be scrubbed with the same registrations.
impl oc_exec::Redact for SecretRegistry {
    fn redact(&self, text: &str) -> String {
        SecretRegistry::redact(self, text)
    }
}

// ---------------------------------------------------------------------------
// Redacting log writer
// ---------------------------------------------------------------------------

/// `MakeWriter` that runs each formatted log event through a
/// [`SecretRegistry`] before it reaches the underlying writer.
#[derive(Debug, Clone)]
pub struct RedactingMakeWriter<M> {
    registry: SecretRegistry,
    inner: M,
}

impl RedactingMakeWriter<fn() -> io::Stderr> {
    pub fn stderr(registry: SecretRegistry) -> Self {
        Self {
            registry,
            inner: io::stderr,
        }
    }
}

impl<M> RedactingMakeWriter<M> {
    pub fn new(registry: SecretRegistry, inner: M) -> Self {
        Self { registry, inner }
    }
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for RedactingMakeWriter<M> {
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new(self.registry.clone(), self.inner.make_writer())
    }
}

/// Buffers one log event and writes it, redacted, on flush or drop.
pub struct RedactingWriter<W: Write> {
    registry: SecretRegistry,
    inner: W,
    buf: Vec<u8>,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(registry: SecretRegistry, inner: W) -> Self {
        Self {
            registry,
            inner,
            buf: Vec::new(),
        }
    }

    fn emit(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let redacted = self.registry.redact(&String::from_utf8_lossy(&self.buf));
        self.buf.clear();
        self.inner.write_all(redacted.as_bytes())?;
        self.inner.flush()
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.emit()
    }
}

impl<W: Write> Drop for RedactingWriter<W> {
    fn drop(&mut self) {
        let _ = self.emit();
    }
}
