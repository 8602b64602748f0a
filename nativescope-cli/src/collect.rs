use std::path::{Path, PathBuf};

use log::debug;

/// The files to analyze, the inputs that do not exist and the directories that could not be read.
#[derive(Debug, Default)]
pub struct Collected {
    pub files: Vec<PathBuf>,
    pub missing: Vec<PathBuf>,
    pub unreadable: Vec<Unreadable>,
}

/// A directory, or an entry of one, that could not be listed.
#[derive(Debug)]
pub struct Unreadable {
    pub path: PathBuf,
    pub reason: String,
}

/// Expand the command line paths into files, in argument order.
///
/// A file is taken as is, a directory contributes its `.dll` and `.exe` files (sorted).
/// Symlinked directories below an input are not followed.
pub fn collect_paths(inputs: &[PathBuf]) -> Collected {
    let mut collected = Collected::default();

    for input in inputs {
        if input.is_file() {
            collected.files.push(input.clone());
        } else if input.is_dir() {
            let mut files = Vec::new();
            collect_assemblies_recursive(input, &mut files, &mut collected.unreadable);
            files.sort();
            collected.files.extend(files);
        } else {
            collected.missing.push(input.clone());
        }
    }

    collected
}

fn collect_assemblies_recursive(
    dir: &Path,
    files: &mut Vec<PathBuf>,
    unreadable: &mut Vec<Unreadable>,
) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) => {
            unreadable.push(Unreadable {
                path: dir.to_path_buf(),
                reason: error.to_string(),
            });
            return;
        }
    };

    for entry in entries {
        let entry = entry.and_then(|entry| Ok((entry.path(), entry.file_type()?)));
        let (path, file_type) = match entry {
            Ok(entry) => entry,
            Err(error) => {
                unreadable.push(Unreadable {
                    path: dir.to_path_buf(),
                    reason: error.to_string(),
                });
                continue;
            }
        };

        if file_type.is_dir() {
            collect_assemblies_recursive(&path, files, unreadable);
        } else if file_type.is_symlink() {
            if path.is_file() && is_assembly_file(&path) {
                files.push(path);
            } else if path.is_dir() {
                debug!("Not following symlinked directory {}", path.display());
            }
        } else if is_assembly_file(&path) {
            files.push(path);
        }
    }
}

/// Returns true if the path has an `.exe` or `.dll` extension, in any case.
pub fn is_assembly_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("exe") || e.eq_ignore_ascii_case("dll"))
}
