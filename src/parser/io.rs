use crate::parser::error::ParseErrorKind;
use crate::parser::ParseError;

use semver::Version;
use std::fs;
use std::path::{Path, PathBuf};


/// Extract the step version from a directory name: "v6.2.1_add_index" -> 6.2.1
pub fn parse_version_from_name(version_name: &str) -> Result<Version, ParseError> {
    let prefix = match version_name.split('_').next() {
        Some(v) if !v.is_empty() => v,
        _ => {
            return Err(ParseError {
                kind: ParseErrorKind::InvalidVersionFormat(version_name.to_string()),
            })
        }
    };
    let prefix = prefix.strip_prefix('v').unwrap_or(prefix);

    Version::parse(prefix).map_err(|source| ParseError {
        kind: ParseErrorKind::InvalidVersionNumber { name: version_name.to_string(), source },
    })
}

/// Find every step directory under `directory`, sorted by version.
/// Duplicate versions are kept; rejecting them is up to the caller.
pub fn collect_versions_from_directory(directory: &Path) -> Result<Vec<(Version, PathBuf)>, ParseError> {
    if !directory.is_dir() {
        return Err(ParseError { kind: ParseErrorKind::InvalidDirectory(directory.to_path_buf()) })
    }

    let mut versions = fs::read_dir(directory)
        .map_err(|source| {
            ParseError { kind: ParseErrorKind::Io { path: directory.to_path_buf(), source } }
        })?
        .filter_map(|entry| {
            let entry = match entry {
                Ok(dir) => dir,
                Err(source) => {
                    // Fatal: reading the directory failed.
                    return Some(Err(
                        ParseError { kind: ParseErrorKind::Io { path: directory.to_path_buf(), source } }
                    ));
                }
            };

            let dir_path = entry.path();
            if !dir_path.is_dir() {
                tracing::debug!("Skipping non-directory: {:?}", dir_path);
                return None;
            }

            let dir_name = match dir_path.file_name().and_then(|s| s.to_str()) {
                Some(s) => s.to_string(),
                None => {
                    // Fatal: invalid directory name.
                    return Some(Err(
                        ParseError { kind: ParseErrorKind::InvalidDirectory(dir_path) }
                    ));
                }
            };

            match parse_version_from_name(&dir_name) {
                Ok(version) => Some(Ok((version, dir_path))),
                Err(e) => {
                    tracing::debug!("Skipping {:?}: {}", dir_name, e);
                    None
                }
            }
        })
        .collect::<Result<Vec<(Version, PathBuf)>, ParseError>>()?;

    // Directory iteration order is platform-dependent
    versions.sort();

    Ok(versions)
}
