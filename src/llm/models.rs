//! Local model discovery

use std::path::Path;

use super::error::LlmResult;
use super::llamacpp::MODEL_EXTENSION;

/// List the GGUF model files in `dir`, sorted by file name
///
/// A missing directory yields an empty list.
pub fn list_local_models(dir: &Path) -> LlmResult<Vec<String>> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "Model directory not found");
        return Ok(Vec::new());
    }

    let mut models = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_model = path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(MODEL_EXTENSION));
        if !is_model {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            models.push(name.to_string());
        }
    }

    models.sort();
    Ok(models)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_list_local_models() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("phi-3.gguf"), b"x").unwrap();
        fs::write(dir.path().join("llama.gguf"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        fs::create_dir(dir.path().join("nested.gguf")).unwrap();

        let models = list_local_models(dir.path()).unwrap();
        assert_eq!(models, vec!["llama.gguf", "phi-3.gguf"]);
    }

    #[test]
    fn test_missing_dir() {
        let models = list_local_models(Path::new("/nonexistent/models")).unwrap();
        assert!(models.is_empty());
    }
}
