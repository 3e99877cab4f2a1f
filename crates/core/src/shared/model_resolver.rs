use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("model {name} not found (searched: {})", display_paths(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve a model file by name.
///
/// Resolution order:
/// 1. `name` itself, when it already points at an existing file
/// 2. `root_dir` (the `--root-dir` models directory)
/// 3. User cache directory (platform-specific)
pub fn resolve(name: &str, root_dir: Option<&Path>) -> Result<PathBuf, ModelResolveError> {
    let direct = PathBuf::from(name);
    if direct.is_absolute() && direct.is_file() {
        return Ok(direct);
    }

    let mut search_dirs = Vec::new();
    if let Some(dir) = root_dir {
        search_dirs.push(dir.to_path_buf());
    }
    match model_cache_dir() {
        Ok(dir) => search_dirs.push(dir),
        Err(e) if search_dirs.is_empty() => return Err(e),
        Err(_) => {}
    }

    resolve_in(name, &search_dirs)
}

fn resolve_in(name: &str, search_dirs: &[PathBuf]) -> Result<PathBuf, ModelResolveError> {
    let candidates: Vec<PathBuf> = search_dirs.iter().map(|d| d.join(name)).collect();
    if let Some(found) = candidates.iter().find(|p| p.is_file()) {
        return Ok(found.clone());
    }
    Err(ModelResolveError::NotFound {
        name: name.to_string(),
        searched: candidates,
    })
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/Lens/models/`
/// - Linux: `$XDG_CACHE_HOME/Lens/models/` or `~/.cache/Lens/models/`
/// - Windows: `%LOCALAPPDATA%/Lens/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("Lens").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("Lens").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_finds_file_in_root_dir() {
        let tmp = TempDir::new().unwrap();
        let model_path = tmp.path().join("test_model.onnx");
        fs::write(&model_path, b"fake model data").unwrap();

        let resolved = resolve("test_model.onnx", Some(tmp.path())).unwrap();
        assert_eq!(resolved, model_path);
    }

    #[test]
    fn test_resolve_accepts_absolute_path() {
        let tmp = TempDir::new().unwrap();
        let model_path = tmp.path().join("swap.onnx");
        fs::write(&model_path, b"swap").unwrap();

        let resolved = resolve(model_path.to_str().unwrap(), None).unwrap();
        assert_eq!(resolved, model_path);
    }

    #[test]
    fn test_resolve_in_prefers_first_directory() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("m.onnx"), b"a").unwrap();
        fs::write(second.path().join("m.onnx"), b"b").unwrap();

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(
            resolve_in("m.onnx", &dirs).unwrap(),
            first.path().join("m.onnx")
        );
    }

    #[test]
    fn test_resolve_in_missing_lists_searched_paths() {
        let tmp = TempDir::new().unwrap();
        let dirs = vec![tmp.path().to_path_buf()];
        let err = resolve_in("missing.onnx", &dirs).unwrap_err();
        match err {
            ModelResolveError::NotFound { name, searched } => {
                assert_eq!(name, "missing.onnx");
                assert_eq!(searched, vec![tmp.path().join("missing.onnx")]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_directories_are_not_models() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("model.onnx")).unwrap();
        let dirs = vec![tmp.path().to_path_buf()];
        assert!(resolve_in("model.onnx", &dirs).is_err());
    }

    #[test]
    fn test_model_cache_dir_returns_path() {
        let dir = model_cache_dir();
        assert!(dir.is_ok());
        let path = dir.unwrap();
        assert!(path.to_string_lossy().contains("Lens"));
        assert!(path.to_string_lossy().contains("models"));
    }
}
