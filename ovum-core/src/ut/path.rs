// Copyright (c) 2025, Tom Ouellette
// Licensed under the MIT License

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::error::OvumError;

/// Create a new directory, adding an incrementing suffix if the name is taken
///
/// Existing directories are never reused or overwritten.
///
/// # Arguments
///
/// * `directory` - Path to new directory
///
/// # Examples
///
/// ```
/// use ovum_core::ut::path::create_directory;
///
/// let base = std::env::temp_dir().join("OVUM_DOCTEST_CREATE_DIRECTORY");
/// let _ = std::fs::remove_dir_all(&base);
/// let _ = std::fs::remove_dir_all(base.with_file_name("OVUM_DOCTEST_CREATE_DIRECTORY_0"));
///
/// let first = create_directory(&base).unwrap();
/// let second = create_directory(&base).unwrap();
///
/// assert_eq!(first, base);
/// assert!(second.ends_with("OVUM_DOCTEST_CREATE_DIRECTORY_0"));
///
/// std::fs::remove_dir(first).unwrap();
/// std::fs::remove_dir(second).unwrap();
/// ```
pub fn create_directory<P: AsRef<Path>>(directory: P) -> Result<PathBuf, OvumError> {
    let directory = directory.as_ref();

    if !directory.exists() {
        std::fs::create_dir_all(directory).map_err(|err| OvumError::DirError(err.to_string()))?;
        return Ok(directory.to_path_buf());
    }

    let parent = directory.parent().unwrap_or_else(|| Path::new("."));
    let base_name = directory
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| OvumError::DirError("Invalid directory name".to_string()))?;

    for index in 0..100 {
        let new_dir = parent.join(format!("{}_{}", base_name, index));

        if !new_dir.exists() {
            std::fs::create_dir(&new_dir).map_err(|err| OvumError::DirError(err.to_string()))?;
            return Ok(new_dir);
        }
    }

    Err(OvumError::DirError(format!(
        "Could not create a directory in allotted increments. Check the directory path: {}",
        directory.display()
    )))
}

/// File name without directory and extension
///
/// # Examples
///
/// ```
/// use ovum_core::ut::path::file_stem;
///
/// assert_eq!(file_stem("images/ovary_01.tif"), Some("ovary_01".to_string()));
/// ```
pub fn file_stem<P: AsRef<Path>>(path: P) -> Option<String> {
    path.as_ref()
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
}

/// Collect file paths from a directory with an optional substring filter
///
/// Paths are returned sorted.
///
/// # Arguments
///
/// * `directory` - Path to directory containing files
/// * `valid_ext` - Only include files with one of these extensions
/// * `substring` - Only include files containing this substring
///
/// # Examples
///
/// ```no_run
/// use ovum_core::ut::path::collect_file_paths;
/// use ovum_core::constant::SUPPORTED_IMAGE_FORMATS;
/// let files = collect_file_paths("directory/", SUPPORTED_IMAGE_FORMATS.as_slice(), None);
/// ```
pub fn collect_file_paths<P: AsRef<Path>>(
    directory: P,
    valid_ext: &[&str],
    substring: Option<&str>,
) -> Result<Vec<PathBuf>, OvumError> {
    let message = directory.as_ref().display().to_string();

    let mut files: Vec<PathBuf> = std::fs::read_dir(&directory)
        .map_err(|_| OvumError::DirError(message))?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| valid_ext.contains(&ext.to_lowercase().as_str()))
        })
        .filter(|path| match substring {
            Some(substring) => path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().contains(substring)),
            None => true,
        })
        .collect();

    files.sort();

    Ok(files)
}

/// Collect file pairs that share a stem once optional substrings are removed
///
/// Pairs are returned sorted by their shared stem.
///
/// # Arguments
///
/// * `files_a` - List of file paths (e.g. images)
/// * `files_b` - List of file paths (e.g. masks)
/// * `substring_a` - Optionally remove a substring from the first set of stems
/// * `substring_b` - Optionally remove a substring from the second set of stems
///
/// # Examples
///
/// ```
/// use std::path::PathBuf;
/// use ovum_core::ut::path::collect_file_pairs;
///
/// let images = [
///     PathBuf::from("images/ovary_1.png"),
///     PathBuf::from("images/ovary_2.png"),
///     PathBuf::from("images/ovary_3_image.png"),
/// ];
///
/// let masks = [
///     PathBuf::from("masks/ovary_1_mask.png"),
///     PathBuf::from("masks/ovary_3_mask.png"),
/// ];
///
/// let pairs = collect_file_pairs(&images, &masks, None, Some("_mask"));
/// assert_eq!(pairs.len(), 1);
///
/// let pairs = collect_file_pairs(&images, &masks, Some("_image"), Some("_mask"));
/// assert_eq!(pairs.len(), 2);
/// assert_eq!(pairs[1].0, "ovary_3");
/// ```
pub fn collect_file_pairs(
    files_a: &[PathBuf],
    files_b: &[PathBuf],
    substring_a: Option<&str>,
    substring_b: Option<&str>,
) -> Vec<(String, PathBuf, PathBuf)> {
    let substring_a = substring_a.unwrap_or_default();
    let substring_b = substring_b.unwrap_or_default();

    let strip = |stem: String, substring: &str| {
        if substring.is_empty() {
            stem
        } else {
            stem.replace(substring, "")
        }
    };

    let file_map: HashMap<String, &PathBuf> = files_a
        .iter()
        .filter_map(|file| file_stem(file).map(|stem| (strip(stem, substring_a), file)))
        .collect();

    let mut pairs: Vec<(String, PathBuf, PathBuf)> = files_b
        .par_iter()
        .filter_map(|file_b| {
            file_stem(file_b).and_then(|stem| {
                let name = strip(stem, substring_b);
                file_map
                    .get(&name)
                    .map(|file_a| (name, (*file_a).clone(), file_b.clone()))
            })
        })
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs
}

#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn test_collect_file_paths_filters() {
        let directory = std::env::temp_dir().join("ovum_test_collect_file_paths");
        let _ = std::fs::remove_dir_all(&directory);
        std::fs::create_dir_all(&directory).unwrap();

        for name in ["b_mask.png", "a_mask.PNG", "c_image.png", "notes.txt"] {
            std::fs::write(directory.join(name), b"").unwrap();
        }

        let files = collect_file_paths(&directory, &["png"], None).unwrap();
        assert_eq!(files.len(), 3);
        assert!(files[0].ends_with("a_mask.PNG"));

        let files = collect_file_paths(&directory, &["png"], Some("_mask")).unwrap();
        assert_eq!(files.len(), 2);

        let _ = std::fs::remove_dir_all(directory);
    }

    #[test]
    fn test_collect_file_paths_missing_directory() {
        let result = collect_file_paths("ovum_missing_directory", &["png"], None);
        assert!(matches!(result, Err(OvumError::DirError(_))));
    }
}
