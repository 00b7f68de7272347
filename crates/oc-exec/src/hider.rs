use std::io::{self, Write};

/// Written to the real sink once the command line has been echoed.
pub const SUPPRESSION_MARKER: &str = "*** Suppressing command output\n";

/// Output sink that shows the command line (the first line) but hides
/// everything after it.
///
/// Hidden output is kept in memory so the caller can still use it, e.g. a
/// kubeconfig whose secrets have not been registered for masking yet.
#[derive(Debug)]
pub struct OutputHider<W: Write> {
    inner: W,
    echoed_cmd_line: bool,
    contents: Vec<u8>,
}

impl<W: Write> OutputHider<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            echoed_cmd_line: false,
            contents: Vec::new(),
        }
    }

    /// `true` once the first line terminator has passed through.
    pub fn is_suppressing(&self) -> bool {
        self.echoed_cmd_line
    }

    /// Everything captured after the command line.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.contents).into_owned()
    }

    /// Bytes captured after the command line.
    pub fn captured_len(&self) -> usize {
        self.contents.len()
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for OutputHider<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.echoed_cmd_line {
            self.contents.extend_from_slice(buf);
            return Ok(buf.len());
        }

        match buf.iter().position(|&b| b == b'\n') {
            None => self.inner.write_all(buf)?,
            Some(newline) => {
                let (cmd_line, rest) = buf.split_at(newline + 1);
                self.inner.write_all(cmd_line)?;
                self.inner.write_all(SUPPRESSION_MARKER.as_bytes())?;
                self.echoed_cmd_line = true;
                self.contents.extend_from_slice(rest);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
