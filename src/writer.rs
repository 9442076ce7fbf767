use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// 已写入同目录临时文件、尚未重命名到目标路径的内容
///
/// 未提交就被丢弃时，临时文件随 `NamedTempFile` 一起删除，目标文件保持原样。
pub struct Staged {
    tmp: NamedTempFile,
    path: PathBuf,
}

/// 把内容写入目标目录下的临时文件
pub fn stage(path: &Path, contents: &str) -> Result<Staged> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|err| Error::io(dir, err))?;
    }

    let mut tmp = NamedTempFile::new_in(dir).map_err(|err| Error::io(dir, err))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|err| Error::io(tmp.path(), err))?;

    Ok(Staged {
        tmp,
        path: path.to_path_buf(),
    })
}

impl Staged {
    /// 重命名覆盖目标文件
    pub fn commit(self) -> Result<()> {
        let Staged { tmp, path } = self;
        tmp.persist(&path).map_err(|err| Error::io(&path, err.error))?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

/// 原子写入单个文件
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    stage(path, contents)?.commit()
}

/// 先写好全部临时文件再逐个重命名，任何一个写入失败时不落盘任何文件
pub fn write_all_atomic(files: &[(&Path, &str)]) -> Result<()> {
    let staged = files
        .iter()
        .map(|(path, contents)| stage(path, contents))
        .collect::<Result<Vec<_>>>()?;
    for file in staged {
        file.commit()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn writes_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.sql");

        write_atomic(&path, "CREATE TABLE user ();\n").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "CREATE TABLE user ();\n");
        assert_eq!(entries(dir.path()), ["user.sql"]);
    }

    #[test]
    fn replaces_existing_content_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user_generated.rs");
        fs::write(&path, "a much longer previous version of the file").unwrap();

        write_atomic(&path, "short").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "short");
        assert_eq!(entries(dir.path()), ["user_generated.rs"]);
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sql/schema/user.sql");

        write_atomic(&path, "x").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "x");
    }

    #[test]
    fn failed_persist_leaves_no_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("occupied");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep"), "").unwrap();

        let err = write_atomic(&target, "x").unwrap_err();

        assert!(matches!(err, Error::Io { ref path, .. } if path == &target));
        assert_eq!(entries(dir.path()), ["occupied"]);
    }

    #[test]
    fn failed_stage_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let sql = dir.path().join("user.sql");
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "").unwrap();

        let err = write_all_atomic(&[(&sql, "ddl"), (&blocker.join("user_generated.rs"), "src")])
            .unwrap_err();

        assert!(matches!(err, Error::Io { .. }));
        assert!(!sql.exists());
        assert_eq!(entries(dir.path()), ["blocker"]);
    }

    #[test]
    fn writes_all_files() {
        let dir = tempfile::tempdir().unwrap();
        let sql = dir.path().join("user.sql");
        let src = dir.path().join("user_generated.rs");

        write_all_atomic(&[(&sql, "ddl"), (&src, "src")]).unwrap();

        assert_eq!(fs::read_to_string(&sql).unwrap(), "ddl");
        assert_eq!(fs::read_to_string(&src).unwrap(), "src");
        assert_eq!(entries(dir.path()), ["user.sql", "user_generated.rs"]);
    }

    #[test]
    fn dropped_stage_leaves_target_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.sql");
        fs::write(&path, "old").unwrap();

        drop(stage(&path, "new").unwrap());

        assert_eq!(fs::read_to_string(&path).unwrap(), "old");
        assert_eq!(entries(dir.path()), ["user.sql"]);
    }
}
