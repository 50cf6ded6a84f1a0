pub mod error;
pub mod settings;

pub use error::*;
pub use settings::{SETTINGS_FILE, Settings, generate_app_name, generate_bucket_name};

use std::path::{Path, PathBuf};

/// Directory holding the Lambda sources
pub const LAMBDA_DIR: &str = "lambda";

/// Archive the Lambda sources are packaged into
pub const LAMBDA_ZIP: &str = "lambda.zip";

/// Resolve the project directory
///
/// `cwd` when given (it must exist), else the process working directory.
pub fn project_dir(cwd: Option<&Path>) -> Result<PathBuf> {
    match cwd {
        Some(dir) if dir.is_dir() => Ok(dir.to_path_buf()),
        Some(dir) => Err(ConfigError::WorkDirNotFound(dir.to_path_buf())),
        None => Ok(std::env::current_dir()?),
    }
}

/// Make sure `lambda/` exists under `project_dir`
pub fn ensure_lambda_dir(project_dir: &Path) -> Result<PathBuf> {
    let lambda_dir = project_dir.join(LAMBDA_DIR);
    if !lambda_dir.exists() {
        tracing::info!("Lambda directory does not exist, creating one...");
        std::fs::create_dir_all(&lambda_dir)?;
    }
    Ok(lambda_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_project_dir_explicit() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert_eq!(project_dir(Some(temp_dir.path())).unwrap(), temp_dir.path());

        let missing = temp_dir.path().join("missing");
        assert!(matches!(
            project_dir(Some(&missing)),
            Err(ConfigError::WorkDirNotFound(p)) if p == missing
        ));
    }

    #[test]
    #[serial]
    fn test_project_dir_defaults_to_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let dir = project_dir(None).unwrap();
        assert_eq!(
            dir.canonicalize().unwrap(),
            temp_dir.path().canonicalize().unwrap()
        );

        std::env::set_current_dir(original_dir).unwrap();
    }

    #[test]
    fn test_ensure_lambda_dir_is_idempotent() {
        let temp_dir = tempfile::tempdir().unwrap();
        let first = ensure_lambda_dir(temp_dir.path()).unwrap();
        std::fs::write(first.join("index.py"), "def handler(e, c): pass").unwrap();

        let second = ensure_lambda_dir(temp_dir.path()).unwrap();
        assert_eq!(first, second);
        assert!(second.join("index.py").exists());
    }
}
