// crates/mt_workflow/src/discovery.rs

//! 输入文件枚举

use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// 列出目录下扩展名匹配的文件（大小写不敏感），按路径排序
///
/// 目录不存在或不可读时返回空列表并记录警告。
pub fn discover_inputs(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let wanted = extension.trim_start_matches('.').to_ascii_lowercase();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("无法读取输入目录 {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.to_string_lossy().to_ascii_lowercase() == wanted)
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    files
}

/// 显式指定的文件，丢弃不存在的路径
pub fn explicit_inputs(paths: &[PathBuf]) -> Vec<PathBuf> {
    paths
        .iter()
        .filter(|path| {
            let exists = path.exists();
            if !exists {
                warn!("文件不存在: {}", path.display());
            }
            exists
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.json", "a.JSON", "c.txt", "d.json.bak"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        fs::create_dir(dir.path().join("sub.json")).unwrap();

        let found = discover_inputs(dir.path(), ".json");
        let names: Vec<String> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.JSON", "b.json"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_inputs(&dir.path().join("nope"), "json").is_empty());
    }

    #[test]
    fn test_explicit_inputs_drop_missing() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.json");
        fs::write(&present, "{}").unwrap();
        let kept = explicit_inputs(&[present.clone(), dir.path().join("gone.json")]);
        assert_eq!(kept, vec![present]);
    }
}
