//! Log output
//!
//! Logs go to stderr so stdout stays clean for piping. While the watch board
//! owns the terminal, log lines are held back and written out once the
//! screen is restored.

use parking_lot::{Mutex, const_mutex};
use std::io::{self, Write};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static STDERR: HeldWriter = HeldWriter::new();

/// Pass-through writer that can buffer instead
pub struct HeldWriter {
    /// `Some` while held
    held: Mutex<Option<Vec<u8>>>,
}

impl HeldWriter {
    pub const fn new() -> Self {
        HeldWriter {
            held: const_mutex(None),
        }
    }

    pub fn hold(&self) {
        let mut held = self.held.lock();
        if held.is_none() {
            *held = Some(Vec::new());
        }
    }

    pub fn is_held(&self) -> bool {
        self.held.lock().is_some()
    }

    /// Stop holding and flush anything buffered to `out`
    pub fn release_into<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let buffered = self.held.lock().take();
        if let Some(bytes) = buffered.filter(|b| !b.is_empty()) {
            out.write_all(&bytes)?;
            out.flush()?;
        }
        Ok(())
    }

    /// Buffer `buf` if held, otherwise write it to `out`
    pub fn write_or<W: Write>(&self, buf: &[u8], out: &mut W) -> io::Result<usize> {
        let mut held = self.held.lock();
        match held.as_mut() {
            Some(pending) => {
                pending.extend_from_slice(buf);
                Ok(buf.len())
            }
            None => out.write(buf),
        }
    }
}

impl Default for HeldWriter {
    fn default() -> Self {
        HeldWriter::new()
    }
}

struct LogWriter;

impl Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        STDERR.write_or(buf, &mut io::stderr())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

/// Holds log output back until dropped
pub struct StderrHold(());

impl Drop for StderrHold {
    fn drop(&mut self) {
        let _ = STDERR.release_into(&mut io::stderr());
    }
}

pub fn hold_stderr() -> StderrHold {
    STDERR.hold();
    StderrHold(())
}

/// `RUST_LOG` filter, `warn` by default
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(|| LogWriter))
        .with(filter)
        .init();
}
