use std::fs;
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;

use super::error::PersistenceError;

/// An append-only log of results stored as one pretty printed JSON array.
///
/// Every append reads the whole array, adds the new records at the end and
/// replaces the file. Only one writer per file is supported at a time.
#[derive(Debug, Clone)]
pub struct JsonLog<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonLog<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in the log, oldest first.
    /// A missing or empty file reads as an empty log.
    pub fn load_all(&self) -> Result<Vec<T>, PersistenceError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PersistenceError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&contents).map_err(|source| PersistenceError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    /// Append `records` after the existing ones.
    ///
    /// The new content is written to a temporary file next to the log and
    /// renamed over it, so a failure leaves the previous content in place.
    pub fn append(&self, records: &[T]) -> Result<(), PersistenceError> {
        log::info!("ℹ️ [JSON] Appending {} record(s) to {}", records.len(), self.path.display());

        let existing = self.load_all()?;
        if records.is_empty() {
            return Ok(());
        }

        let all: Vec<&T> = existing.iter().chain(records).collect();
        let encoded = serde_json::to_vec_pretty(&all)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|source| self.io_error(source))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|source| self.io_error(source))?;
        tmp.write_all(&encoded).map_err(|source| self.io_error(source))?;
        #[cfg(unix)]
        tmp.as_file()
            .set_permissions(self.store_permissions())
            .map_err(|source| self.io_error(source))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        Ok(())
    }

    /// Temporary files are created 0600; the log keeps its current mode,
    /// or 0644 when it is first created.
    #[cfg(unix)]
    fn store_permissions(&self) -> fs::Permissions {
        use std::os::unix::fs::PermissionsExt;

        fs::metadata(&self.path)
            .map(|m| m.permissions())
            .unwrap_or_else(|_| fs::Permissions::from_mode(0o644))
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::results::{DnsProbeResult, PingProbeResult};

    fn dns(server: &str, ms: u64) -> DnsProbeResult {
        DnsProbeResult::new(server, "google.com", Duration::from_millis(ms))
    }

    #[test]
    fn test_missing_store_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log: JsonLog<DnsProbeResult> = JsonLog::new(dir.path().join("dns_results.json"));
        assert!(log.load_all().expect("load").is_empty());
    }

    #[test]
    fn test_empty_file_is_empty_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ping_results.json");
        fs::write(&path, "").expect("write");

        let log: JsonLog<PingProbeResult> = JsonLog::new(&path);
        assert!(log.load_all().expect("load").is_empty());
    }

    #[test]
    fn test_appends_preserve_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = JsonLog::new(dir.path().join("nested").join("dns_results.json"));

        let first = vec![dns("1.1.1.1:53", 10), dns("8.8.8.8:53", 20)];
        let second = vec![dns("192.168.0.1:53", 3)];
        log.append(&first).expect("first append");
        log.append(&second).expect("second append");

        let loaded = log.load_all().expect("load");
        let expected: Vec<_> = first.into_iter().chain(second).collect();
        assert_eq!(loaded, expected);
    }

    #[test]
    fn test_written_file_is_pretty_json_array() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log = JsonLog::new(dir.path().join("ping_results.json"));
        log.append(&[PingProbeResult::new("192.168.0.1", Duration::from_micros(1500))])
            .expect("append");

        let contents = fs::read_to_string(log.path()).expect("read");
        assert!(contents.starts_with("[\n  {"));
        assert!(contents.contains("\"ResponseTime\": 1500000"));
        let server_pos = contents.find("\"Host\"").expect("Host");
        let time_pos = contents.find("\"Timestamp\"").expect("Timestamp");
        assert!(server_pos < time_pos);
    }

    #[test]
    fn test_malformed_store_fails_and_is_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dns_results.json");
        fs::write(&path, "this is not json").expect("write");

        let log: JsonLog<DnsProbeResult> = JsonLog::new(&path);
        assert!(matches!(log.load_all(), Err(PersistenceError::Malformed { .. })));
        assert!(matches!(
            log.append(&[dns("1.1.1.1:53", 10)]),
            Err(PersistenceError::Malformed { .. })
        ));
        assert_eq!(fs::read_to_string(&path).expect("read"), "this is not json");
    }

    #[cfg(unix)]
    #[test]
    fn test_new_store_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let log = JsonLog::new(dir.path().join("dns_results.json"));
        log.append(&[dns("1.1.1.1:53", 10)]).expect("append");

        let mode = fs::metadata(log.path()).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_append_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("dns_results.json");
        fs::write(&path, "[]").expect("write");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).expect("chmod");

        let log = JsonLog::new(&path);
        log.append(&[dns("8.8.8.8:53", 20)]).expect("append");

        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
        assert_eq!(log.load_all().expect("load").len(), 1);
    }
}
