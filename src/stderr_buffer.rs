use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn buffer() -> MutexGuard<'static, Option<Vec<String>>> {
    // A panic while holding the lock leaves plain strings behind; keep using them
    BUFFER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Activate buffering. While active, log records are stored instead of
/// printed to stderr.
pub fn activate() {
    *buffer() = Some(Vec::new());
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    buffer().take().unwrap_or_default()
}

/// Store a message while buffering is active, otherwise print it to stderr
fn warn(msg: String) {
    let mut guard = buffer();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// Log target that routes every complete line through the buffer, so log
/// output never draws over the dashboard.
#[derive(Debug, Default)]
pub struct BufferedWriter {
    pending: Vec<u8>,
}

impl Write for BufferedWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(data);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            warn(String::from_utf8_lossy(&line[..line.len() - 1]).into_owned());
        }
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            warn(String::from_utf8_lossy(&rest).into_owned());
        }
        Ok(())
    }
}

/// Install the global logger. `RUST_LOG` wins over the default level, which
/// is `debug` with `--verbose` and `warn` otherwise.
pub fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .target(env_logger::Target::Pipe(Box::new(BufferedWriter::default())))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: the buffer is process-global state
    #[test]
    fn test_buffering_and_writer() {
        activate();
        warn(format!("first {}", 1));

        let mut writer = BufferedWriter::default();
        writer.write_all(b"[WARN] partial").unwrap();
        writer.write_all(b" line\n[INFO] next\n").unwrap();
        writer.write_all(b"tail").unwrap();
        writer.flush().unwrap();

        let messages = drain();
        assert_eq!(
            messages,
            vec!["first 1", "[WARN] partial line", "[INFO] next", "tail"]
        );
        assert!(drain().is_empty());
    }
}
