use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Size-based rotating file writer with numbered backups.
///
/// When writing a line would push the active file past `max_bytes`, the
/// file is rotated: `app.log` becomes `app.log.1`, existing backups shift
/// up by one, and the backup beyond `backup_count` is discarded. With a
/// `backup_count` of zero the active file is truncated in place instead.
/// A `max_bytes` of zero disables rotation entirely.
pub struct RotatingFileWriter {
    path: PathBuf,
    max_bytes: u64,
    backup_count: usize,
    file: File,
    size: u64,
}

impl RotatingFileWriter {
    /// Open `path` for appending, picking up the size of any existing
    /// content so rotation accounting survives process restarts.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backup_count: usize) -> io::Result<Self> {
        let path = path.into();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();

        Ok(Self {
            path,
            max_bytes,
            backup_count,
            file,
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one complete line (terminator included), rotating first if
    /// the line would push the file past the size limit.
    pub fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        if self.should_rollover(line.len() as u64) {
            self.rollover()?;
        }
        self.file.write_all(line)?;
        self.size += line.len() as u64;
        Ok(())
    }

    fn should_rollover(&self, incoming: u64) -> bool {
        self.max_bytes > 0 && self.size + incoming >= self.max_bytes
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        PathBuf::from(format!("{}.{}", self.path.display(), index))
    }

    fn rollover(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backup_count > 0 {
            let oldest = self.backup_path(self.backup_count);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..self.backup_count).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            if self.path.exists() {
                fs::rename(&self.path, self.backup_path(1))?;
            }
        }

        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.size = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_append_without_rotation_below_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut writer = RotatingFileWriter::open(&path, 1024, 3).unwrap();

        writer.write_line(b"first\n").unwrap();
        writer.write_line(b"second\n").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "first\nsecond\n");
        assert!(!path.with_extension("log.1").exists());
    }

    #[test]
    fn rotation_shifts_backups_and_discards_the_oldest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut writer = RotatingFileWriter::open(&path, 16, 2).unwrap();

        // Each line is 10 bytes, so every second write rotates.
        for index in 0..6 {
            writer.write_line(format!("line-{:04}\n", index).as_bytes()).unwrap();
        }

        let backup_1 = PathBuf::from(format!("{}.1", path.display()));
        let backup_2 = PathBuf::from(format!("{}.2", path.display()));
        let backup_3 = PathBuf::from(format!("{}.3", path.display()));
        assert!(path.exists());
        assert!(backup_1.exists());
        assert!(backup_2.exists());
        assert!(!backup_3.exists(), "backup beyond the retention limit");

        // Newest backup holds the most recent rotated lines.
        let newest = fs::read_to_string(&backup_1).unwrap();
        let oldest = fs::read_to_string(&backup_2).unwrap();
        assert!(newest > oldest, "backups out of order: {newest:?} vs {oldest:?}");
    }

    #[test]
    fn zero_backup_count_truncates_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut writer = RotatingFileWriter::open(&path, 16, 0).unwrap();

        for index in 0..4 {
            writer.write_line(format!("line-{:04}\n", index).as_bytes()).unwrap();
        }

        assert!(!PathBuf::from(format!("{}.1", path.display())).exists());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.len() <= 16);
    }

    #[test]
    fn zero_max_bytes_disables_rotation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut writer = RotatingFileWriter::open(&path, 0, 3).unwrap();

        for index in 0..50 {
            writer.write_line(format!("line-{:04}\n", index).as_bytes()).unwrap();
        }

        assert!(!PathBuf::from(format!("{}.1", path.display())).exists());
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 50);
    }
}
