//! Crash-safe output files for encrypted and decrypted data.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::crypto::OsRandom;
use crate::crypto::random::random_bytes;

/// A file that is only ever replaced as a whole.
///
/// Readers see either the previous content or the new content, never a
/// partially written envelope.
#[derive(Debug, Clone)]
pub struct OutputFile {
    path: PathBuf,
}

impl OutputFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Writes `data` using atomic replace.
    ///
    /// 1. Write to a temporary file with a random name next to the target
    /// 2. fsync the temporary file
    /// 3. Replace the target with the temporary file
    /// 4. fsync the parent directory so the rename is persisted
    ///
    /// Creates parent directories if they don't exist.
    pub fn write(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.random_tmp_path()?;

        let mut tmp_file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
            .context("failed to create temporary file")?;

        tmp_file.write_all(data)?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        if let Err(e) = self.atomic_replace(&tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e);
        }

        #[cfg(not(target_os = "windows"))]
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            File::open(parent)?.sync_all()?;
        }

        tracing::debug!(path = %self.path.display(), bytes = data.len(), "wrote output file");
        Ok(())
    }

    /// `<file name>.tmp.<16 hex chars>` in the target's directory.
    fn random_tmp_path(&self) -> Result<PathBuf> {
        let suffix = hex::encode(random_bytes(&OsRandom, 8)?);

        let file_name = self
            .path
            .file_name()
            .context("output path has no file name")?
            .to_string_lossy();

        Ok(self.path.with_file_name(format!("{file_name}.tmp.{suffix}")))
    }

    /// Replaces the target with `ReplaceFileW`, or a plain move if the target
    /// does not exist yet.
    #[cfg(target_os = "windows")]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        use std::ffi::OsStr;
        use std::os::windows::ffi::OsStrExt;
        use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

        if !self.path.exists() {
            fs::rename(tmp_path, &self.path)?;
            return Ok(());
        }

        fn to_wide(s: &OsStr) -> Vec<u16> {
            s.encode_wide().chain(std::iter::once(0)).collect()
        }

        let target_w = to_wide(self.path.as_os_str());
        let tmp_w = to_wide(tmp_path.as_os_str());

        // SAFETY:
        // - Strings are valid UTF-16 and null-terminated
        // - Pointers remain valid during the call
        // - Windows does not retain the pointers after return
        let result = unsafe {
            ReplaceFileW(
                target_w.as_ptr(),
                tmp_w.as_ptr(),
                std::ptr::null(),
                REPLACEFILE_WRITE_THROUGH,
                std::ptr::null(),
                std::ptr::null(),
            )
        };

        if result == 0 {
            let err = std::io::Error::last_os_error();
            return Err(err).context("atomic replace failed");
        }

        Ok(())
    }

    /// `rename()` is atomic when both paths are on the same filesystem.
    #[cfg(not(target_os = "windows"))]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        fs::rename(tmp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.bin");

        let out = OutputFile::new(path.clone());
        assert!(!path.exists());
        out.write(b"envelope bytes").unwrap();

        assert!(path.exists());
        assert_eq!(fs::read(path).unwrap(), b"envelope bytes");
    }

    #[test]
    fn write_replaces_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.bin");

        let out = OutputFile::new(path.clone());
        out.write(b"first").unwrap();
        out.write(b"second").unwrap();

        assert_eq!(fs::read(path).unwrap(), b"second");
    }

    #[test]
    fn tmp_file_is_removed_after_success() {
        let dir = tempdir().unwrap();
        let out = OutputFile::new(dir.path().join("secret.bin"));
        out.write(b"data").unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        assert_eq!(entries, vec!["secret.bin"]);
    }

    #[test]
    fn tmp_names_are_unique_siblings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.bin");
        let out = OutputFile::new(path.clone());

        let a = out.random_tmp_path().unwrap();
        let b = out.random_tmp_path().unwrap();

        assert_ne!(a, b);
        assert_ne!(a, path);
        assert_eq!(a.parent(), path.parent());
    }

    #[test]
    fn parent_directory_is_created() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("secret.bin");

        OutputFile::new(nested.clone()).write(b"data").unwrap();

        assert!(nested.exists());
    }
}
