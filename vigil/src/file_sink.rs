//! The default file sink: one timestamped log file per worker lifetime,
//! with a stable `<prefix>.log` symlink pointing at the current file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::errors::{Error, Result};
use crate::record::LogRecord;
use crate::sink::Sink;

const ILLEGAL_PREFIX_CHARACTERS: &str = "/,|<>:#$%{}[]'\"^!?+* ";

pub struct FileSink {
    path: PathBuf,
    out: BufWriter<File>,
}

impl FileSink {
    /// Open `<directory>/<prefix>[.<logger_id>].YYYYMMDD-HHMMSS.log`,
    /// truncating any existing content, and write the file header.
    pub fn new(prefix: &str, directory: &str, logger_id: &str) -> Result<Self> {
        let prefix = sanitize_prefix(prefix)?;
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        let file_name = if logger_id.is_empty() {
            format!("{prefix}.{stamp}.log")
        } else {
            format!("{prefix}.{logger_id}.{stamp}.log")
        };
        let directory = if directory.is_empty() { "." } else { directory };
        let path = Path::new(directory).join(&file_name);
        let file = File::create(&path)?;
        let mut out = BufWriter::new(file);
        write_header(&mut out)?;
        out.flush()?;

        maintain_symlink(Path::new(directory).join(format!("{prefix}.log")), &file_name);
        let extra_link = crate::config::log_link();
        if !extra_link.is_empty() {
            maintain_symlink(PathBuf::from(extra_link), &file_name);
        }

        Ok(Self { path, out })
    }

    pub fn file_path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn receive(&mut self, record: LogRecord) {
        // I/O failures are this sink's concern alone; the worker is never
        // stalled or notified
        let _ = writeln!(self.out, "{record}");
        let _ = self.out.flush();
    }
}

fn write_header(out: &mut impl Write) -> Result<()> {
    let created = Local::now().format("%a %b %e %H:%M:%S %Y");
    writeln!(out, "\t\tvigil created log at: {created}")?;
    writeln!(
        out,
        "\t\tLOG format: [YYYY/MM/DD hh:mm:ss uuu* LEVEL FILE->FUNCTION:LINE] message"
    )?;
    writeln!(out, "\t\t(uuu*: microseconds fractions of the seconds value)")?;
    writeln!(out)?;
    Ok(())
}

/// Strip whitespace, path separators and colons, then reject prefixes that
/// are empty or still carry filename-hostile characters.
pub fn sanitize_prefix(raw: &str) -> Result<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '/' && *c != '\\' && *c != ':')
        .collect();
    if cleaned.is_empty() {
        return Err(Error::InvalidPrefix(raw.to_owned()));
    }
    if cleaned.chars().any(|c| ILLEGAL_PREFIX_CHARACTERS.contains(c)) {
        return Err(Error::InvalidPrefix(raw.to_owned()));
    }
    Ok(cleaned)
}

/// Point `link` at `target`, replacing whatever it pointed at before. Links
/// are convenience only, so failures are swallowed.
#[cfg(unix)]
fn maintain_symlink(link: PathBuf, target: &str) {
    let _ = std::fs::remove_file(&link);
    let _ = std::os::unix::fs::symlink(target, &link);
}

#[cfg(not(unix))]
fn maintain_symlink(_link: PathBuf, _target: &str) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_separators_and_whitespace() {
        assert_eq!(sanitize_prefix("my app/with:sep").unwrap(), "myappwithsep");
        assert_eq!(sanitize_prefix("plain-name_1.2").unwrap(), "plain-name_1.2");
    }

    #[test]
    fn sanitize_rejects_empty_and_illegal() {
        assert!(sanitize_prefix("   ").is_err());
        assert!(sanitize_prefix("bad{name}").is_err());
        assert!(sanitize_prefix("no|pipes").is_err());
        assert!(sanitize_prefix("no#hash").is_err());
    }
}
