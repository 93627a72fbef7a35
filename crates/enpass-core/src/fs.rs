//! Owner-only file helpers for the credential cache.
//!
//! Cache files live in shared directories such as `/tmp`, so nothing here
//! follows a symlink or writes through a predictable temp name.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tempfile::{Builder, PersistError};

/// Mode for every file the cache creates.
#[cfg(unix)]
const PRIVATE_MODE: u32 = 0o600;

/// Create `path` readable only by its owner, keeping existing contents.
///
/// An existing regular file has its permissions tightened through the open
/// handle. Anything else at `path`, a symlink included, is refused.
pub fn create_private(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(PRIVATE_MODE);
    }
    match options.open(path) {
        Ok(file) => return Ok(file),
        Err(err) if err.kind() != io::ErrorKind::AlreadyExists => return Err(err),
        Err(_) => {}
    }

    ensure_regular_file(path)?;
    let file = OpenOptions::new().write(true).open(path)?;
    set_private_permissions(&file)?;
    Ok(file)
}

/// Replace the contents of `path` through an owner-only temp file with a
/// random name in the same directory.
///
/// A symlink at `path` is replaced, never written through.
///
/// # Errors
///
/// Returns an error if the temp file cannot be written or moved into place;
/// the temp file is removed in that case.
pub fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = Builder::new().prefix(".enpasscli-").tempfile_in(dir)?;
    set_private_permissions(temp.as_file())?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;

    persist_with_fallback(temp.persist(path), path)
}

/// Persist that also works where the destination may not be replaced in place.
fn persist_with_fallback(result: Result<File, PersistError>, destination: &Path) -> io::Result<()> {
    let PersistError {
        error: initial_err,
        file,
    } = match result {
        Ok(_) => return Ok(()),
        Err(err) => err,
    };

    let _ = fs::remove_file(destination);
    file.persist(destination).map_err(|retry_err| {
        io::Error::new(
            retry_err.error.kind(),
            format!(
                "rename failed (initial: {}, retry: {})",
                initial_err, retry_err.error
            ),
        )
    })?;
    Ok(())
}

fn ensure_regular_file(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.file_type().is_file() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a regular file", path.display()),
        ))
    }
}

#[cfg(unix)]
fn set_private_permissions(file: &File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(PRIVATE_MODE))
}

#[cfg(not(unix))]
fn set_private_permissions(_file: &File) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_private_keeps_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store");
        fs::write(&path, b"existing").unwrap();

        create_private(&path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"existing");
    }

    #[test]
    fn test_write_private_replaces_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store");
        create_private(&path).unwrap();

        write_private(&path, b"first").unwrap();
        write_private(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_files_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("store");
        fs::write(&path, b"").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        create_private(&path).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);

        write_private(&path, b"data").unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_create_private_refuses_symlink() {
        use std::os::unix::fs::{symlink, PermissionsExt};

        let dir = tempdir().unwrap();
        let victim = dir.path().join("victim.txt");
        fs::write(&victim, b"user data").unwrap();
        fs::set_permissions(&victim, fs::Permissions::from_mode(0o644)).unwrap();
        let link = dir.path().join("store");
        symlink(&victim, &link).unwrap();

        assert!(create_private(&link).is_err());
        assert_eq!(fs::read(&victim).unwrap(), b"user data");
        let mode = fs::metadata(&victim).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_private_replaces_symlink_without_following() {
        use std::os::unix::fs::{symlink, PermissionsExt};

        let dir = tempdir().unwrap();
        let victim = dir.path().join("victim.txt");
        fs::write(&victim, b"user data").unwrap();
        fs::set_permissions(&victim, fs::Permissions::from_mode(0o644)).unwrap();
        let link = dir.path().join("store");
        symlink(&victim, &link).unwrap();

        write_private(&link, b"record").unwrap();

        assert_eq!(fs::read(&victim).unwrap(), b"user data");
        let mode = fs::metadata(&victim).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_file());
        assert_eq!(fs::read(&link).unwrap(), b"record");
    }

    #[test]
    fn test_write_private_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("store");
        assert!(write_private(&path, b"data").is_err());
    }
}
