use crate::error::{Error, Result};
use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};

/// Moves the files belonging to one save between directories.
///
/// A save is every regular file named `<save_name>.*` directly inside a
/// directory. Sub-directories are not followed, so games that keep save data
/// in nested folders are only partially covered.
pub trait SaveCopier {
    /// Whether `path` is a directory holding at least one file of the save.
    fn has_saves(&self, save_name: &str, path: &Path) -> Result<bool>;

    /// Replaces the save files in `destination` with those in `source`,
    /// creating `destination` when it is missing.
    fn copy_over_saves(&self, save_name: &str, source: &Path, destination: &Path) -> Result<()>;

    fn delete_saves(&self, save_name: &str, path: &Path) -> Result<()>;

    fn validate_source(&self, save_name: &str, path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Err(Error::invalid_source(path, "source not found"));
        }
        if !self.has_saves(save_name, path)? {
            return Err(Error::invalid_source(
                path,
                format!("no files matching {}.* were found", save_name),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Default)]
pub struct StdSaveCopier;

impl SaveCopier for StdSaveCopier {
    fn has_saves(&self, save_name: &str, path: &Path) -> Result<bool> {
        if !path.is_dir() {
            return Ok(false);
        }
        Ok(!save_files(save_name, path)?.is_empty())
    }

    fn copy_over_saves(&self, save_name: &str, source: &Path, destination: &Path) -> Result<()> {
        fs::create_dir_all(destination)
            .map_err(Error::io(format!("create {}", destination.display())))?;
        self.delete_saves(save_name, destination)?;

        for file in save_files(save_name, source)? {
            let Some(file_name) = file.file_name() else {
                continue;
            };
            let target = destination.join(file_name);
            fs::copy(&file, &target).map_err(Error::io(format!(
                "copy {} to {}",
                file.display(),
                target.display()
            )))?;
        }
        Ok(())
    }

    fn delete_saves(&self, save_name: &str, path: &Path) -> Result<()> {
        if !path.is_dir() {
            return Ok(());
        }
        for old in save_files(save_name, path)? {
            fs::remove_file(&old).map_err(Error::io(format!("delete {}", old.display())))?;
        }
        Ok(())
    }
}

/// Regular files directly in `dir` whose name matches `<save_name>.*`.
pub fn save_files(save_name: &str, dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = save_pattern(save_name)?;
    let entries = fs::read_dir(dir).map_err(Error::io(format!("list {}", dir.display())))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(Error::io(format!("list {}", dir.display())))?;
        let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
        if is_file && pattern.matches(&entry.file_name().to_string_lossy()) {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn save_pattern(save_name: &str) -> Result<Pattern> {
    let raw = format!("{}.*", Pattern::escape(save_name));
    Pattern::new(&raw).map_err(|source| Error::Pattern {
        pattern: raw.clone(),
        source,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Real copier that breaks part-way through copies out of one directory.
    #[derive(Clone)]
    pub struct FlakyCopier {
        fail_from: PathBuf,
    }

    impl FlakyCopier {
        pub fn failing_from(source: &Path) -> Self {
            Self {
                fail_from: source.to_path_buf(),
            }
        }
    }

    impl SaveCopier for FlakyCopier {
        fn has_saves(&self, save_name: &str, path: &Path) -> Result<bool> {
            StdSaveCopier.has_saves(save_name, path)
        }

        fn copy_over_saves(&self, save_name: &str, source: &Path, destination: &Path) -> Result<()> {
            if source != self.fail_from {
                return StdSaveCopier.copy_over_saves(save_name, source, destination);
            }
            // Leave the destination half written, like an interrupted copy.
            fs::create_dir_all(destination).map_err(Error::io("create destination"))?;
            StdSaveCopier.delete_saves(save_name, destination)?;
            fs::write(destination.join(format!("{}.partial", save_name)), b"torn")
                .map_err(Error::io("write partial file"))?;
            Err(Error::Io {
                context: "copy save".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Interrupted, "copy interrupted"),
            })
        }

        fn delete_saves(&self, save_name: &str, path: &Path) -> Result<()> {
            StdSaveCopier.delete_saves(save_name, path)
        }
    }
}
