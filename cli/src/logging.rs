//! Logger setup: stderr, optionally teed into a rotated log file.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

const LOG_PREFIX: &str = "wrextract_";
const MAX_LOG_FILES: usize = 5;

/// Writes every record to stderr and to a log file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Initialize logging. With a log directory, records are also written to
/// a new timestamped file there; the path of that file is returned.
pub fn init(log_dir: Option<&Path>) -> io::Result<Option<PathBuf>> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));

    let log_file = match log_dir {
        Some(dir) => {
            let path = create_log_file(dir)?;
            let file = File::create(&path)?;
            builder
                .filter_level(log::LevelFilter::Info)
                .parse_default_env()
                .target(env_logger::Target::Pipe(Box::new(Tee { file })));
            Some(path)
        }
        None => None,
    };

    builder.init();
    Ok(log_file)
}

/// Prune old logs so that, with the new one, at most
/// [`MAX_LOG_FILES`] remain, and return the new log path.
fn create_log_file(dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;

    let mut existing = existing_logs(dir)?;
    existing.sort_by_key(|(_, modified)| *modified);
    while existing.len() >= MAX_LOG_FILES {
        let (oldest, _) = existing.remove(0);
        fs::remove_file(oldest)?;
    }

    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    Ok(dir.join(format!("{}{}.log", LOG_PREFIX, stamp)))
}

fn existing_logs(dir: &Path) -> io::Result<Vec<(PathBuf, std::time::SystemTime)>> {
    let mut logs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with(LOG_PREFIX) && name.ends_with(".log") {
            logs.push((entry.path(), entry.metadata()?.modified()?));
        }
    }
    Ok(logs)
}
