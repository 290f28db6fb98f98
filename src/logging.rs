//! tracing subscriber for the browser: formatted lines go to `console.log`.

use std::io;

use tracing_subscriber::{
    EnvFilter, Registry, fmt, fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};

pub const DEFAULT_FILTER: &str = "open_wide=info";

/// Buffers one formatted event and hands it to the console on flush / drop.
#[derive(Default)]
pub struct ConsoleWriter {
    buf: Vec<u8>,
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&self.buf);
        emit(line.trim_end());
        self.buf.clear();
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}

#[cfg(target_arch = "wasm32")]
fn emit(line: &str) {
    web_sys::console::log_1(&wasm_bindgen::JsValue::from_str(line));
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(line: &str) {
    eprintln!("{line}");
}

#[derive(Clone, Copy, Default)]
pub struct MakeConsoleWriter;

impl<'a> MakeWriter<'a> for MakeConsoleWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::default()
    }
}

/// Install the global subscriber. `filter` uses `EnvFilter` syntax
/// (`trace|debug|info|warn|error|off`, optionally per target). A second call is
/// a no-op.
pub fn init(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    // the default timer reads SystemTime, which wasm32-unknown-unknown lacks
    let console_layer = fmt::layer()
        .without_time()
        .with_ansi(false)
        .with_target(true)
        .with_writer(MakeConsoleWriter);

    if Registry::default().with(env_filter).with(console_layer).try_init().is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn writer_clears_after_flush() {
        let mut w = ConsoleWriter::default();
        w.write_all(b"countdown started\n").unwrap();
        assert_eq!(w.buf.len(), 18);
        w.flush().unwrap();
        assert!(w.buf.is_empty());
    }

    #[test]
    fn init_twice_is_harmless() {
        init("debug");
        init("not a [valid filter");
        tracing::info!("still logging");
    }
}
