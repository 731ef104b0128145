//! Input discovery: files, directories, and shell-style glob patterns.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{Error, Result};

/// Extensions we accept as audio inputs (lowercase, without the dot).
///
/// Anything symphonia can demux is fair game; this list is the fixed filter
/// applied during directory scans and glob expansion.
pub const AUDIO_EXTENSIONS: &[&str] = &[
    "m4a", "mp3", "wav", "flac", "ogg", "opus", "aac", "mp4", "webm", "mkv",
];

fn has_audio_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| AUDIO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expand the CLI inputs into a deduplicated list of audio files.
///
/// Accepted inputs:
/// - a file path (must carry a recognized audio extension)
/// - a directory (scanned recursively for recognized extensions)
/// - anything else is treated as a glob pattern
///
/// Order is first-seen; duplicates are dropped. Inputs that match nothing
/// produce a warning rather than an error, but an overall empty result is
/// an [`Error::Input`].
pub fn collect_audio_files(inputs: &[String]) -> Result<Vec<PathBuf>> {
    if inputs.is_empty() {
        return Err(Error::Input(
            "no inputs provided; pass files, directories, or globs".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut push = |path: PathBuf| {
        if seen.insert(path.clone()) {
            files.push(path);
        }
    };

    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            collect_from_dir(path, &mut push)?;
        } else if path.is_file() {
            if has_audio_extension(path) {
                push(path.to_path_buf());
            } else {
                warn!(path = %path.display(), "skipping file with unrecognized extension");
            }
        } else {
            collect_from_glob(input, &mut push)?;
        }
    }

    if files.is_empty() {
        return Err(Error::Input(format!(
            "no audio files found in the given inputs (looked for: {})",
            AUDIO_EXTENSIONS.join(", ")
        )));
    }

    Ok(files)
}

/// Recursive directory scan with sorted entries so the result order is
/// stable across platforms and filesystems.
fn collect_from_dir(dir: &Path, push: &mut impl FnMut(PathBuf)) -> Result<()> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| Error::Input(format!("cannot read directory '{}': {e}", dir.display())))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    entries.sort();

    for entry in entries {
        if entry.is_dir() {
            collect_from_dir(&entry, push)?;
        } else if entry.is_file() && has_audio_extension(&entry) {
            push(entry);
        }
    }

    Ok(())
}

fn collect_from_glob(pattern: &str, push: &mut impl FnMut(PathBuf)) -> Result<()> {
    let matches = glob::glob(pattern)
        .map_err(|e| Error::Input(format!("invalid glob pattern '{pattern}': {e}")))?;

    let mut matched_any = false;
    for entry in matches {
        match entry {
            Ok(path) if path.is_file() && has_audio_extension(&path) => {
                matched_any = true;
                push(path);
            }
            Ok(_) => {}
            Err(err) => warn!(pattern, error = %err, "glob entry unreadable, skipping"),
        }
    }

    if !matched_any {
        warn!(pattern, "input matched no audio files");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use super::*;

    fn touch(path: &Path) -> anyhow::Result<()> {
        File::create(path)?;
        Ok(())
    }

    #[test]
    fn collects_files_dirs_and_globs_deduplicated() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();

        touch(&root.join("a.m4a"))?;
        touch(&root.join("b.mp3"))?;
        touch(&root.join("notes.txt"))?;
        fs::create_dir(root.join("nested"))?;
        touch(&root.join("nested/c.wav"))?;

        let inputs = vec![
            root.join("a.m4a").display().to_string(),
            root.display().to_string(),
            format!("{}/*.mp3", root.display()),
        ];

        let files = collect_audio_files(&inputs)?;

        // a.m4a appears once even though the file and the directory scan both
        // produce it; order is first-seen.
        assert_eq!(files[0], root.join("a.m4a"));
        assert_eq!(files.len(), 3);
        assert!(files.contains(&root.join("b.mp3")));
        assert!(files.contains(&root.join("nested/c.wav")));
        Ok(())
    }

    #[test]
    fn extension_match_is_case_insensitive() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        touch(&dir.path().join("LOUD.M4A"))?;

        let files = collect_audio_files(&[dir.path().display().to_string()])?;
        assert_eq!(files.len(), 1);
        Ok(())
    }

    #[test]
    fn no_inputs_is_an_input_error() {
        let err = collect_audio_files(&[]).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
    }

    #[test]
    fn no_matches_is_an_input_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        touch(&dir.path().join("readme.md"))?;

        let err = collect_audio_files(&[dir.path().display().to_string()]).unwrap_err();
        assert!(matches!(err, Error::Input(_)));
        Ok(())
    }
}
