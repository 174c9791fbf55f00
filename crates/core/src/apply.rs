use crate::config::Config;
use crate::planner::Placement;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Simulated,
    FolderOnly,
    Copied,
    Moved,
    /// Moved over an existing target by copying and deleting the source.
    Replaced,
}

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("could not create folder {}", .path.display())]
    CreateFolder {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("target already exists: {}", .0.display())]
    TargetExists(PathBuf),
    #[error("source and target are the same file: {}", .0.display())]
    SameFile(PathBuf),
    #[error("could not copy {} to {}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not move {} to {}", .from.display(), .to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not remove source {}", .path.display())]
    RemoveSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Creates the placement folder and copies or moves the source into it.
/// In simulation mode nothing on disk is touched.
pub fn execute(placement: &Placement, config: &Config) -> Result<Outcome, ApplyError> {
    if config.simulate {
        return Ok(Outcome::Simulated);
    }

    fs::create_dir_all(&placement.folder).map_err(|source| ApplyError::CreateFolder {
        path: placement.folder.clone(),
        source,
    })?;
    debug!(folder = %placement.folder.display(), "folder ready");

    if config.move_file {
        move_file(&placement.source, &placement.target, config.overwrite)
    } else if config.copy {
        copy_file(&placement.source, &placement.target, config.overwrite)?;
        Ok(Outcome::Copied)
    } else {
        Ok(Outcome::FolderOnly)
    }
}

fn copy_file(from: &Path, to: &Path, overwrite: bool) -> Result<(), ApplyError> {
    let existed = target_exists(to);
    if existed {
        if !overwrite {
            return Err(ApplyError::TargetExists(to.to_path_buf()));
        }
        ensure_distinct(from, to)?;
        unlink_symlink(to)?;
    }

    if let Err(source) = fs::copy(from, to) {
        if !existed {
            discard_partial(to);
        }
        return Err(ApplyError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        });
    }
    debug!(from = %from.display(), to = %to.display(), "copied");
    Ok(())
}

fn move_file(from: &Path, to: &Path, overwrite: bool) -> Result<Outcome, ApplyError> {
    if target_exists(to) {
        if !overwrite {
            return Err(ApplyError::TargetExists(to.to_path_buf()));
        }
        ensure_distinct(from, to)?;
        copy_file(from, to, true)?;
        remove_source(from)?;
        debug!(from = %from.display(), to = %to.display(), "replaced");
        return Ok(Outcome::Replaced);
    }

    match fs::rename(from, to) {
        Ok(()) => {
            debug!(from = %from.display(), to = %to.display(), "moved");
            Ok(Outcome::Moved)
        }
        Err(rename_err) if falls_back_to_copy(&rename_err) => {
            debug!(error = %rename_err, "rename crosses devices, copying instead");
            copy_file(from, to, false)?;
            if let Err(err) = remove_source(from) {
                discard_partial(to);
                return Err(err);
            }
            debug!(from = %from.display(), to = %to.display(), "moved by copy");
            Ok(Outcome::Moved)
        }
        Err(source) => Err(ApplyError::Move {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        }),
    }
}

/// Only a rename refused for crossing filesystems is retried as copy and delete.
fn falls_back_to_copy(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::CrossesDevices
}

/// True for any directory entry at `path`, dangling symlinks included.
fn target_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// An overwrite replaces a symlink itself, never the file it points to.
fn unlink_symlink(path: &Path) -> Result<(), ApplyError> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => {
            fs::remove_file(path).map_err(|source| ApplyError::Copy {
                from: path.to_path_buf(),
                to: path.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn discard_partial(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        if err.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %err, "could not remove incomplete copy");
        }
    }
}

fn remove_source(path: &Path) -> Result<(), ApplyError> {
    fs::remove_file(path).map_err(|source| ApplyError::RemoveSource {
        path: path.to_path_buf(),
        source,
    })
}

fn ensure_distinct(from: &Path, to: &Path) -> Result<(), ApplyError> {
    match (fs::canonicalize(from), fs::canonicalize(to)) {
        (Ok(a), Ok(b)) if a == b => Err(ApplyError::SameFile(to.to_path_buf())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Flag, Setting};
    use tempfile::tempdir;

    fn config(flags: &[Flag]) -> Config {
        flags
            .iter()
            .fold(Config::default(), |config, flag| {
                config.with(Setting::Flag(*flag, true))
            })
    }

    fn placement(root: &Path) -> Placement {
        let source = root.join("report.TXT");
        fs::write(&source, b"original").expect("write source");
        let folder = root.join("out").join("report");
        Placement {
            target: folder.join("report.TXT"),
            source,
            folder,
        }
    }

    #[test]
    fn folder_only_mode_creates_folder_and_leaves_file() {
        let temp = tempdir().expect("tempdir");
        let p = placement(temp.path());

        let outcome = execute(&p, &config(&[])).expect("execute");
        assert_eq!(outcome, Outcome::FolderOnly);
        assert!(p.folder.is_dir());
        assert!(!p.target.exists());
        assert_eq!(fs::read(&p.source).expect("read source"), b"original");
    }

    #[test]
    fn folder_creation_is_idempotent() {
        let temp = tempdir().expect("tempdir");
        let p = placement(temp.path());
        execute(&p, &config(&[])).expect("first");
        execute(&p, &config(&[])).expect("second");
        assert!(p.folder.is_dir());
    }

    #[test]
    fn simulation_touches_nothing() {
        let temp = tempdir().expect("tempdir");
        let p = placement(temp.path());

        for flags in [
            vec![Flag::Simulate],
            vec![Flag::Simulate, Flag::Copy],
            vec![Flag::Simulate, Flag::Move, Flag::Overwrite],
        ] {
            let outcome = execute(&p, &config(&flags)).expect("execute");
            assert_eq!(outcome, Outcome::Simulated);
            assert!(!temp.path().join("out").exists());
            assert!(p.source.exists());
        }
    }

    #[test]
    fn copy_duplicates_bytes() {
        let temp = tempdir().expect("tempdir");
        let p = placement(temp.path());

        let outcome = execute(&p, &config(&[Flag::Copy])).expect("execute");
        assert_eq!(outcome, Outcome::Copied);
        assert_eq!(fs::read(&p.target).expect("read target"), b"original");
        assert_eq!(fs::read(&p.source).expect("read source"), b"original");
    }

    #[test]
    fn copy_over_existing_target_requires_overwrite() {
        let temp = tempdir().expect("tempdir");
        let p = placement(temp.path());
        fs::create_dir_all(&p.folder).expect("create folder");
        fs::write(&p.target, b"existing").expect("write target");

        let err = execute(&p, &config(&[Flag::Copy])).expect_err("must fail");
        assert!(matches!(err, ApplyError::TargetExists(_)));
        assert_eq!(fs::read(&p.target).expect("read target"), b"existing");

        let outcome = execute(&p, &config(&[Flag::Copy, Flag::Overwrite])).expect("overwrite");
        assert_eq!(outcome, Outcome::Copied);
        assert_eq!(fs::read(&p.target).expect("read target"), b"original");
    }

    #[test]
    fn move_relocates_file() {
        let temp = tempdir().expect("tempdir");
        let p = placement(temp.path());

        let outcome = execute(&p, &config(&[Flag::Move])).expect("execute");
        assert_eq!(outcome, Outcome::Moved);
        assert!(!p.source.exists());
        assert_eq!(fs::read(&p.target).expect("read target"), b"original");
    }

    #[test]
    fn move_wins_over_copy() {
        let temp = tempdir().expect("tempdir");
        let p = placement(temp.path());

        let outcome = execute(&p, &config(&[Flag::Copy, Flag::Move])).expect("execute");
        assert_eq!(outcome, Outcome::Moved);
        assert!(!p.source.exists());
    }

    #[test]
    fn move_without_overwrite_keeps_both_files() {
        let temp = tempdir().expect("tempdir");
        let p = placement(temp.path());
        fs::create_dir_all(&p.folder).expect("create folder");
        fs::write(&p.target, b"existing").expect("write target");

        let err = execute(&p, &config(&[Flag::Move])).expect_err("must fail");
        assert!(matches!(err, ApplyError::TargetExists(_)));
        assert_eq!(fs::read(&p.source).expect("read source"), b"original");
        assert_eq!(fs::read(&p.target).expect("read target"), b"existing");
    }

    #[test]
    fn move_with_overwrite_replaces_target() {
        let temp = tempdir().expect("tempdir");
        let p = placement(temp.path());
        fs::create_dir_all(&p.folder).expect("create folder");
        fs::write(&p.target, b"existing").expect("write target");

        let outcome = execute(&p, &config(&[Flag::Move, Flag::Overwrite])).expect("execute");
        assert_eq!(outcome, Outcome::Replaced);
        assert!(!p.source.exists());
        assert_eq!(fs::read(&p.target).expect("read target"), b"original");
    }

    #[test]
    fn overwrite_onto_itself_is_refused() {
        let temp = tempdir().expect("tempdir");
        let source = temp.path().join("same.bin");
        fs::write(&source, b"keep me").expect("write source");
        let p = Placement {
            source: source.clone(),
            folder: temp.path().to_path_buf(),
            target: source.clone(),
        };

        for flags in [
            vec![Flag::Copy, Flag::Overwrite],
            vec![Flag::Move, Flag::Overwrite],
        ] {
            let err = execute(&p, &config(&flags)).expect_err("must fail");
            assert!(matches!(err, ApplyError::SameFile(_)));
            assert_eq!(fs::read(&source).expect("read source"), b"keep me");
        }
    }

    #[test]
    fn folder_creation_failure_is_reported() {
        let temp = tempdir().expect("tempdir");
        let blocker = temp.path().join("blocker");
        fs::write(&blocker, b"x").expect("write blocker");
        let source = temp.path().join("a.txt");
        fs::write(&source, b"a").expect("write source");
        let p = Placement {
            source,
            folder: blocker.join("sub"),
            target: blocker.join("sub").join("a.txt"),
        };

        let err = execute(&p, &config(&[])).expect_err("must fail");
        assert!(matches!(err, ApplyError::CreateFolder { .. }));
    }

    #[test]
    fn only_cross_device_renames_fall_back_to_copy() {
        assert!(falls_back_to_copy(&io::Error::from(io::ErrorKind::CrossesDevices)));
        assert!(!falls_back_to_copy(&io::Error::from(
            io::ErrorKind::PermissionDenied
        )));
        assert!(!falls_back_to_copy(&io::Error::from(io::ErrorKind::NotFound)));
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_target_counts_as_existing() {
        let temp = tempdir().expect("tempdir");
        let p = placement(temp.path());
        let elsewhere = temp.path().join("elsewhere.txt");
        fs::create_dir_all(&p.folder).expect("create folder");
        std::os::unix::fs::symlink(&elsewhere, &p.target).expect("create symlink");

        for flags in [vec![Flag::Copy], vec![Flag::Move]] {
            let err = execute(&p, &config(&flags)).expect_err("must fail");
            assert!(matches!(err, ApplyError::TargetExists(_)));
            assert!(!elsewhere.exists(), "nothing may be written through the link");
            assert!(fs::symlink_metadata(&p.target)
                .expect("link kept")
                .file_type()
                .is_symlink());
            assert_eq!(fs::read(&p.source).expect("read source"), b"original");
        }
    }

    #[cfg(unix)]
    #[test]
    fn overwrite_replaces_symlink_instead_of_writing_through_it() {
        let temp = tempdir().expect("tempdir");
        let p = placement(temp.path());
        let elsewhere = temp.path().join("elsewhere.txt");
        fs::write(&elsewhere, b"outside").expect("write elsewhere");
        fs::create_dir_all(&p.folder).expect("create folder");
        std::os::unix::fs::symlink(&elsewhere, &p.target).expect("create symlink");

        let outcome = execute(&p, &config(&[Flag::Copy, Flag::Overwrite])).expect("execute");
        assert_eq!(outcome, Outcome::Copied);
        assert_eq!(fs::read(&elsewhere).expect("read elsewhere"), b"outside");
        assert!(!fs::symlink_metadata(&p.target)
            .expect("target")
            .file_type()
            .is_symlink());
        assert_eq!(fs::read(&p.target).expect("read target"), b"original");
    }

    #[cfg(unix)]
    #[test]
    fn refused_move_leaves_no_duplicate() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempdir().expect("tempdir");
        let src_dir = temp.path().join("src");
        fs::create_dir_all(&src_dir).expect("create src");
        let source = src_dir.join("a.txt");
        fs::write(&source, b"a").expect("write source");
        let folder = temp.path().join("out");
        let p = Placement {
            target: folder.join("a.txt"),
            source: source.clone(),
            folder,
        };

        fs::set_permissions(&src_dir, fs::Permissions::from_mode(0o555)).expect("chmod");
        let canary = src_dir.join(".writable");
        let privileged = fs::write(&canary, b"").is_ok();
        if privileged {
            // Permission bits do not bind this user (e.g. root).
            fs::remove_file(&canary).expect("remove canary");
            fs::set_permissions(&src_dir, fs::Permissions::from_mode(0o755)).expect("chmod");
            return;
        }

        let result = execute(&p, &config(&[Flag::Move]));
        fs::set_permissions(&src_dir, fs::Permissions::from_mode(0o755)).expect("chmod");

        let err = result.expect_err("must fail");
        assert!(matches!(err, ApplyError::Move { .. }));
        assert!(source.exists());
        assert!(!p.target.exists());
    }

    #[test]
    fn failed_overwrite_keeps_existing_target() {
        let temp = tempdir().expect("tempdir");
        let folder = temp.path().join("out");
        fs::create_dir_all(&folder).expect("create folder");
        let target = folder.join("a.txt");
        fs::write(&target, b"existing").expect("write target");
        let p = Placement {
            source: temp.path().join("missing.txt"),
            folder,
            target: target.clone(),
        };

        let err = execute(&p, &config(&[Flag::Copy, Flag::Overwrite])).expect_err("must fail");
        assert!(matches!(err, ApplyError::Copy { .. }));
        assert_eq!(fs::read(&target).expect("read target"), b"existing");
    }
}
