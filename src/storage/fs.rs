//! Module to scan music directories in the file system

use walkdir::WalkDir;

use std::path::{Path, PathBuf};

use crate::{
    config,
    domain::TagSet,
    reader::TagReader,
    storage::error::StorageError,
};

/// Recursively collects the paths of all files under `root` that `reader`
/// supports.
pub fn scan_dir<R: TagReader + ?Sized>(
    reader: &R,
    follow_symlinks: bool,
    root: &Path,
    ignored_dirs: &[PathBuf],
) -> Result<Vec<PathBuf>, StorageError> {
    // a missing root is an error, unreadable entries below it are not
    std::fs::metadata(root)?;
    let root_str = root.to_string_lossy();

    let walker = WalkDir::new(root).follow_links(follow_symlinks);

    let paths = walker
        .into_iter()
        .filter_entry(|entry| {
            let entry_path = entry.path();
            !ignored_dirs
                .iter()
                .any(|ignored| entry_path.starts_with(ignored))
        })
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                log::warn!("error while scanning dir {root_str}, skipping an entry: {err}");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|e| reader.supports(e))
        .collect::<Vec<PathBuf>>();

    log::debug!("found {} supported files under {root_str}", paths.len());
    Ok(paths)
}

/// Scans every configured root. The result is sorted and free of duplicates.
pub fn scan_dirs<R: TagReader + ?Sized>(
    reader: &R,
    config: &config::LibrarySource,
) -> Result<Vec<PathBuf>, StorageError> {
    let scanned_dirs = config
        .roots
        .iter()
        .map(|root| scan_dir(reader, config.follow_symlinks, root, &config.ignored_dirs))
        .collect::<Result<Vec<_>, _>>()?;

    let mut paths: Vec<PathBuf> = scanned_dirs.into_iter().flatten().collect();
    paths.sort();
    paths.dedup();
    Ok(paths)
}

/// Parses the tags of every path. A file that fails to parse is logged and
/// kept as an unparsed set.
pub fn parse_all<R: TagReader + ?Sized>(reader: &R, paths: &[PathBuf]) -> Vec<TagSet> {
    paths
        .iter()
        .map(|path| {
            let mut set = TagSet::new(path);
            if let Err(err) = set.parse(reader) {
                log::warn!("{err}");
            }
            set
        })
        .collect()
}
