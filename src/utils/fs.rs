//! File system operations with atomic write guarantees.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Ensure a directory exists, creating it and any parents if necessary.
///
/// Idempotent: succeeds if the directory already exists.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            anyhow::bail!("Path exists but is not a directory: {}", path.display());
        }
        return Ok(());
    }
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    Ok(())
}

/// Atomically write bytes to a file using a write-then-rename strategy.
///
/// The content is written to a uniquely named temporary file in the target's
/// directory, synced to disk, and then renamed over the target path. Readers
/// never observe a partially written file, and an interrupted write leaves
/// the previous content (or absence) intact. Each call gets its own temp
/// file, so concurrent writes into the same directory never clobber each
/// other's in-flight data, even for final names sharing a stem.
///
/// Parent directories are created automatically.
///
/// # Examples
///
/// ```rust,no_run
/// use modsync::utils::fs::atomic_write;
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// atomic_write(Path::new("mods/example.jar"), b"bytes")?;
/// # Ok(())
/// # }
/// ```
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    let parent: PathBuf = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    ensure_dir(&parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(&parent)
        .with_context(|| format!("Failed to create temp file in: {}", parent.display()))?;

    temp.write_all(content)
        .with_context(|| format!("Failed to write temp file for: {}", path.display()))?;

    temp.as_file().sync_all().with_context(|| "Failed to sync file to disk")?;

    temp.persist(path).map_err(|e| {
        anyhow::anyhow!("Failed to rename temp file to {}: {}", path.display(), e.error)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_dir_creates_nested() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // Second call is a no-op
        ensure_dir(&nested).unwrap();
    }

    #[test]
    fn test_ensure_dir_rejects_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("f");
        fs::write(&file, "x").unwrap();
        assert!(ensure_dir(&file).is_err());
    }

    #[test]
    fn test_atomic_write_creates_parents_and_leaves_no_temp() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("sub/file.bin");
        atomic_write(&target, b"hello").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"hello");

        // Only the target file remains in its directory
        let entries: Vec<_> = fs::read_dir(target.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, ["file.bin"]);
    }

    #[test]
    fn test_atomic_write_overwrites() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("file.bin");
        atomic_write(&target, b"one").unwrap();
        atomic_write(&target, b"two").unwrap();
        assert_eq!(fs::read(&target).unwrap(), b"two");
    }

    #[test]
    fn test_concurrent_writes_with_shared_stem_do_not_collide() {
        // Two writers into one directory whose targets share a stem
        // (x.jar / x.zip) must never disturb each other's in-flight data.
        let temp = TempDir::new().unwrap();
        let jar = temp.path().join("x.jar");
        let zip = temp.path().join("x.zip");

        let handles: Vec<_> = [
            (jar.clone(), b"jar-bytes".to_vec()),
            (zip.clone(), b"zip-bytes".to_vec()),
        ]
        .into_iter()
        .map(|(path, bytes)| {
            std::thread::spawn(move || {
                for _ in 0..200 {
                    atomic_write(&path, &bytes).unwrap();
                }
            })
        })
        .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(fs::read(&jar).unwrap(), b"jar-bytes");
        assert_eq!(fs::read(&zip).unwrap(), b"zip-bytes");
    }
}
