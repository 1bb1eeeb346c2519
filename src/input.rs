//! Input file loading

use crate::error::InputError;
use crate::inventory::ExclusionSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

fn read(path: &Path) -> Result<String, InputError> {
    fs::read_to_string(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => InputError::Missing(path.to_path_buf()),
        _ => InputError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Every line of the identifier file, blank ones included
///
/// Blank lines are dropped later by the dispatcher, so the line count here
/// is the raw count of the file.
pub fn load_identifier_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>, InputError> {
    Ok(read(path.as_ref())?.lines().map(str::to_string).collect())
}

/// Trimmed, non-blank lines of the proxy file
pub fn load_proxy_lines<P: AsRef<Path>>(path: P) -> Result<Vec<String>, InputError> {
    Ok(read(path.as_ref())?
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Exclusion list; a missing file means nothing is excluded
pub fn load_exclusions<P: AsRef<Path>>(path: P) -> Result<ExclusionSet, InputError> {
    match read(path.as_ref()) {
        Ok(content) => Ok(ExclusionSet::new(content.lines())),
        Err(InputError::Missing(_)) => Ok(ExclusionSet::default()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_identifier_lines_keep_blanks() {
        let file = file_with("https://steamcommunity.com/profiles/1\n\nhttps://steamcommunity.com/profiles/2\n");
        let lines = load_identifier_lines(file.path()).unwrap();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "");
    }

    #[test]
    fn test_missing_identifier_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_identifier_lines(dir.path().join("id.txt")).unwrap_err();
        assert!(matches!(err, InputError::Missing(_)));
    }

    #[test]
    fn test_proxy_lines_trimmed() {
        let file = file_with("  10.0.0.1:8080  \n\n10.0.0.2:3128:u:p\r\n");
        let lines = load_proxy_lines(file.path()).unwrap();
        assert_eq!(lines, ["10.0.0.1:8080", "10.0.0.2:3128:u:p"]);
    }

    #[test]
    fn test_missing_proxy_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_proxy_lines(dir.path().join("proxy.txt")),
            Err(InputError::Missing(_))
        ));
    }

    #[test]
    fn test_exclusions_lowercased() {
        let file = file_with("AK-47 | Redline\n\n  Sticker | Crown (Foil)  \n");
        let set = load_exclusions(file.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains("ak-47 | redline"));
        assert!(set.contains("STICKER | CROWN (FOIL)"));
    }

    #[test]
    fn test_missing_exclusions_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let set = load_exclusions(dir.path().join("exclude.txt")).unwrap();
        assert!(set.is_empty());
    }
}
