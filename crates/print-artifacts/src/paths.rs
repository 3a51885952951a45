//! Path utilities for the per-layer output layout.
//!
//! ```text
//! <output>/layer_<n>/layer_data.txt
//! <output>/layer_<n>/layer_<n>.png
//! <output>/print_summary.txt
//! <output>/print_summary_chart.png
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

pub const LAYER_DATA_FILE: &str = "layer_data.txt";
pub const SUMMARY_FILE: &str = "print_summary.txt";
pub const SUMMARY_CHART_FILE: &str = "print_summary_chart.png";

/// Make a layer number safe to use as a single path component.
///
/// Separators and parent references are replaced so a row can never write
/// outside its own layer folder.
pub fn sanitize_component(layer_number: &str) -> String {
    let cleaned: String = layer_number
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" => "unknown".to_string(),
        "." | ".." => cleaned.replace('.', "_"),
        _ => cleaned,
    }
}

/// Folder holding every artifact of one layer.
pub fn layer_dir(output: &Path, layer_number: &str) -> PathBuf {
    output.join(format!("layer_{}", sanitize_component(layer_number)))
}

/// Serialized record of one layer.
pub fn layer_data_path(output: &Path, layer_number: &str) -> PathBuf {
    layer_dir(output, layer_number).join(LAYER_DATA_FILE)
}

/// Fetched image of one layer.
pub fn layer_image_path(output: &Path, layer_number: &str) -> PathBuf {
    let name = sanitize_component(layer_number);
    layer_dir(output, layer_number).join(format!("layer_{}.png", name))
}

pub fn summary_path(output: &Path) -> PathBuf {
    output.join(SUMMARY_FILE)
}

pub fn summary_chart_path(output: &Path) -> PathBuf {
    output.join(SUMMARY_CHART_FILE)
}

/// Write a file atomically, creating parents.
///
/// The bytes go to a uniquely named temporary file in the target folder,
/// which is then renamed over `path`. Several writers may target the same
/// path at once; each rename is atomic and the last one wins.
pub async fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let path = path.to_path_buf();
    let contents = contents.to_vec();
    // Runs to completion even if the awaiting task is aborted, so the
    // temporary file is always either persisted or removed.
    tokio::task::spawn_blocking(move || atomic_write_blocking(&path, &contents))
        .await
        .map_err(io::Error::other)?
}

/// Blocking variant of [`atomic_write`] for callers outside the runtime.
pub fn atomic_write_blocking(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_paths_follow_layout() {
        let out = Path::new("/out");
        assert_eq!(layer_dir(out, "7"), PathBuf::from("/out/layer_7"));
        assert_eq!(
            layer_data_path(out, "7"),
            PathBuf::from("/out/layer_7/layer_data.txt")
        );
        assert_eq!(
            layer_image_path(out, "7"),
            PathBuf::from("/out/layer_7/layer_7.png")
        );
        assert_eq!(summary_path(out), PathBuf::from("/out/print_summary.txt"));
        assert_eq!(
            summary_chart_path(out),
            PathBuf::from("/out/print_summary_chart.png")
        );
    }

    #[test]
    fn sanitize_blocks_traversal() {
        assert_eq!(sanitize_component("../etc"), ".._etc");
        assert_eq!(sanitize_component(".."), "__");
        assert_eq!(sanitize_component("a\\b"), "a_b");
        assert_eq!(sanitize_component(""), "unknown");
        assert_eq!(sanitize_component("12"), "12");
    }

    #[test]
    fn atomic_write_blocking_leaves_no_tmp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.txt");
        atomic_write_blocking(&path, b"hello").unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
        assert_eq!(entries(&dir.path().join("nested")), vec!["file.txt"]);
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_to_one_path_all_succeed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layer_unknown").join(LAYER_DATA_FILE);

        let mut tasks = Vec::new();
        for n in 0..64u8 {
            let path = path.clone();
            tasks.push(tokio::spawn(async move {
                atomic_write(&path, &[n; 256]).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let written = std::fs::read(&path).unwrap();
        assert_eq!(written.len(), 256);
        assert!(written.iter().all(|b| *b == written[0]));
        assert_eq!(entries(&dir.path().join("layer_unknown")), vec![LAYER_DATA_FILE]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_write_leaves_no_temporary_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should go makes the final rename fail.
        let path = dir.path().join("layer_1").join(LAYER_DATA_FILE);
        std::fs::create_dir_all(path.join("occupied")).unwrap();

        assert!(atomic_write(&path, b"data").await.is_err());
        assert_eq!(entries(&dir.path().join("layer_1")), vec![LAYER_DATA_FILE]);
    }
}
