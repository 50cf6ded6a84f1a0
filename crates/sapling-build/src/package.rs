use crate::error::{BuildError, BuildResult};
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Direct-upload limit for Lambda deployment packages
const MAX_DIRECT_UPLOAD: usize = 50 * 1024 * 1024;

pub struct PackageBuilder;

impl PackageBuilder {
    /// Zip the contents of `source_dir`, paths relative to it
    pub fn create_archive(source_dir: &Path) -> BuildResult<Vec<u8>> {
        if !source_dir.is_dir() {
            return Err(BuildError::SourceNotFound(source_dir.to_path_buf()));
        }
        tracing::debug!("Packaging lambda sources from: {}", source_dir.display());

        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for path in Self::collect_entries(source_dir)? {
            let Some(name) = Self::archive_name(source_dir, &path) else {
                continue;
            };

            if path.is_dir() {
                zip.add_directory(format!("{}/", name), options)?;
            } else {
                zip.start_file(name, options)?;
                zip.write_all(&fs::read(&path)?)?;
            }
        }

        let archive = zip.finish()?.into_inner();
        tracing::debug!("Lambda package created: {} bytes", archive.len());
        Self::check_package_size(archive.len());

        Ok(archive)
    }

    /// Write the archive of `source_dir` to `dest`
    pub fn package_dir(source_dir: &Path, dest: &Path) -> BuildResult<PathBuf> {
        tracing::info!("Creating {}", dest.display());
        let archive = Self::create_archive(source_dir)?;
        fs::write(dest, archive)?;
        Ok(dest.to_path_buf())
    }

    fn collect_entries(source_dir: &Path) -> BuildResult<Vec<PathBuf>> {
        let pattern = format!(
            "{}/**/*",
            glob::Pattern::escape(&source_dir.to_string_lossy())
        );

        let mut entries = glob::glob(&pattern)?.collect::<Result<Vec<_>, _>>()?;
        entries.sort();
        Ok(entries)
    }

    /// Forward-slash path of `path` inside the archive
    fn archive_name(source_dir: &Path, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(source_dir).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("/"))
        }
    }

    fn check_package_size(size: usize) {
        if size > MAX_DIRECT_UPLOAD {
            tracing::warn!(
                "Lambda package is {}MB, above the direct upload limit; \
                 the update will likely be rejected",
                size / 1024 / 1024
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::tempdir;

    fn entry_names(archive: Vec<u8>) -> Vec<String> {
        let zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
        let mut names: Vec<String> = zip.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn test_create_archive() {
        let temp_dir = tempdir().unwrap();
        fs::write(temp_dir.path().join("index.py"), "def handler(e, c): pass").unwrap();
        let subdir = temp_dir.path().join("pkg");
        fs::create_dir(&subdir).unwrap();
        fs::write(subdir.join("util.py"), "X = 1").unwrap();

        let archive = PackageBuilder::create_archive(temp_dir.path()).unwrap();
        assert_eq!(entry_names(archive.clone()), vec!["index.py", "pkg/", "pkg/util.py"]);

        let mut zip = zip::ZipArchive::new(Cursor::new(archive)).unwrap();
        let mut content = String::new();
        zip.by_name("pkg/util.py")
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "X = 1");
    }

    #[test]
    fn test_empty_dir_gives_empty_archive() {
        let temp_dir = tempdir().unwrap();
        let archive = PackageBuilder::create_archive(temp_dir.path()).unwrap();
        assert!(entry_names(archive).is_empty());
    }

    #[test]
    fn test_missing_source_dir() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("lambda");

        let err = PackageBuilder::create_archive(&missing).unwrap_err();
        assert!(matches!(err, BuildError::SourceNotFound(ref p) if *p == missing));
        assert!(err.user_message().contains("sapling scaffold"));
    }

    #[test]
    fn test_package_dir_writes_file() {
        let temp_dir = tempdir().unwrap();
        let source = temp_dir.path().join("lambda");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("index.py"), "").unwrap();
        let dest = temp_dir.path().join("lambda.zip");

        let written = PackageBuilder::package_dir(&source, &dest).unwrap();
        assert_eq!(written, dest);
        assert_eq!(entry_names(fs::read(&dest).unwrap()), vec!["index.py"]);
    }
}
