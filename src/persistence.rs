//! On-disk state for the profile registry
//!
//! Two plain files under the state directory:
//! - `mappings`: one JSON record per line, in cycle order
//! - `current`: the selected index as decimal text
//!
//! Records are written the way older kbswitch releases wrote them: keys in
//! `model`, `layout`, `variant`, `option`, `name` order, `", "` / `": "`
//! separators, and everything outside printable ASCII escaped as `\uXXXX`.
//! Loading a file in that format and saving it again reproduces it byte
//! for byte.

use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Profile;
use crate::constants::config::{CURRENT_FILENAME, MAPPINGS_FILENAME, TEMP_SUFFIX};
use crate::registry::{ProfileRegistry, RegistryError};

#[derive(thiserror::Error, Debug)]
pub enum PersistenceError {
    #[error("failed to access {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid mapping record at {}:{}", .path.display(), .line)]
    Record {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("rejected mapping record at {}:{}", .path.display(), .line)]
    Rejected {
        path: PathBuf,
        line: usize,
        #[source]
        source: RegistryError,
    },
    #[error("invalid current index {:?} in {}", .value, .path.display())]
    Current { path: PathBuf, value: String },
    #[error("failed to encode mapping record")]
    Encode(#[from] serde_json::Error),
}

/// JSON formatter matching the record layout of the mappings file
///
/// Compact output except for a space after `,` and `:`, and every
/// non-ASCII character (and DEL) escaped as `\uXXXX`.
struct RecordFormatter;

impl serde_json::ser::Formatter for RecordFormatter {
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        let mut ascii_start = 0;
        for (offset, ch) in fragment.char_indices() {
            if ch.is_ascii() && ch != '\u{7f}' {
                continue;
            }
            writer.write_all(fragment[ascii_start..offset].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            ascii_start = offset + ch.len_utf8();
        }
        writer.write_all(fragment[ascii_start..].as_bytes())
    }
}

/// Encode one profile as a single record line (without the newline)
pub fn encode_record(profile: &Profile) -> Result<String, PersistenceError> {
    let mut buf = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, RecordFormatter);
    profile.serialize(&mut serializer)?;
    // The formatter only ever writes ASCII.
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Encode the whole registry, one newline-terminated record per profile
pub fn encode_profiles(registry: &ProfileRegistry) -> Result<String, PersistenceError> {
    let mut out = String::new();
    for profile in registry.iter() {
        out.push_str(&encode_record(profile)?);
        out.push('\n');
    }
    Ok(out)
}

/// Build a registry from mappings file contents.
///
/// Blank lines are skipped. A repeated name updates the earlier record in
/// place. `path` is only used for error messages.
pub fn decode_profiles(contents: &str, path: &Path) -> Result<ProfileRegistry, PersistenceError> {
    let mut registry = ProfileRegistry::new();

    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let profile: Profile = serde_json::from_str(line).map_err(|source| PersistenceError::Record {
            path: path.to_path_buf(),
            line: idx + 1,
            source,
        })?;
        registry
            .add_or_update(profile, None)
            .map_err(|source| PersistenceError::Rejected {
                path: path.to_path_buf(),
                line: idx + 1,
                source,
            })?;
    }

    Ok(registry)
}

/// File-backed store for the registry
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn mappings_path(&self) -> PathBuf {
        self.dir.join(MAPPINGS_FILENAME)
    }

    pub fn current_path(&self) -> PathBuf {
        self.dir.join(CURRENT_FILENAME)
    }

    /// Load the registry and its selection.
    ///
    /// Missing files mean an empty registry and index 0. A stored index
    /// that no longer fits the registry falls back to 0.
    pub fn load(&self) -> Result<ProfileRegistry, PersistenceError> {
        let mappings_path = self.mappings_path();
        let mut registry = match read_optional(&mappings_path)? {
            Some(contents) => decode_profiles(&contents, &mappings_path)?,
            None => {
                debug!(path = %mappings_path.display(), "No mappings file, starting empty");
                ProfileRegistry::new()
            }
        };

        let current_path = self.current_path();
        if let Some(contents) = read_optional(&current_path)? {
            let value = contents.trim();
            let index: usize = value.parse().map_err(|_| PersistenceError::Current {
                path: current_path.clone(),
                value: value.to_string(),
            })?;
            if registry.restore_current(index).is_err() && !registry.is_empty() {
                warn!(index = index, count = registry.len(), "Stored current index out of range, using 0");
            }
        }

        info!(count = registry.len(), current = registry.current_index(), "Loaded keyboard mappings");
        Ok(registry)
    }

    pub fn save_profiles(&self, registry: &ProfileRegistry) -> Result<(), PersistenceError> {
        let path = self.mappings_path();
        write_atomic(&path, &encode_profiles(registry)?)?;
        debug!(path = %path.display(), count = registry.len(), "Saved keyboard mappings");
        Ok(())
    }

    pub fn save_current(&self, registry: &ProfileRegistry) -> Result<(), PersistenceError> {
        let path = self.current_path();
        write_atomic(&path, &registry.current_index().to_string())?;
        debug!(path = %path.display(), current = registry.current_index(), "Saved current mapping");
        Ok(())
    }

    pub fn save(&self, registry: &ProfileRegistry) -> Result<(), PersistenceError> {
        self.save_profiles(registry)?;
        self.save_current(registry)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>, PersistenceError> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> PersistenceError {
    let path = path.to_path_buf();
    move |source| PersistenceError::Io { path, source }
}

/// Write through a sibling temp file and rename it into place
fn write_atomic(path: &Path, contents: &str) -> Result<(), PersistenceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".");
    temp_name.push(TEMP_SUFFIX);
    let temp_path = PathBuf::from(temp_name);

    fs::write(&temp_path, contents).map_err(io_error(&temp_path))?;
    fs::rename(&temp_path, path).map_err(io_error(path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LEGACY_MAPPINGS: &str = concat!(
        r#"{"model": "pc105", "layout": "us", "variant": "", "option": "compose:ralt", "name": "us"}"#,
        "\n",
        r#"{"model": "pc105", "layout": "fr", "variant": "bepo", "option": "", "name": "fr"}"#,
        "\n",
    );

    fn names(registry: &ProfileRegistry) -> Vec<&str> {
        registry.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_encode_record_layout() {
        let profile = Profile::with_layout("us", "us");

        assert_eq!(
            encode_record(&profile).unwrap(),
            r#"{"model": "", "layout": "us", "variant": "", "option": "", "name": "us"}"#
        );
    }

    #[test]
    fn test_encode_record_escapes_non_ascii() {
        let profile = Profile::with_layout("Français 🇫🇷", "fr");

        let record = encode_record(&profile).unwrap();

        assert!(record.is_ascii());
        assert!(record.ends_with(r#", "name": "Fran\u00e7ais \ud83c\uddeb\ud83c\uddf7"}"#));
        let decoded: Profile = serde_json::from_str(&record).unwrap();
        assert_eq!(decoded, profile);
    }

    #[test]
    fn test_encode_record_escapes_delete() {
        let profile = Profile::with_layout("a\u{7f}b", "us");

        let record = encode_record(&profile).unwrap();

        assert!(record.ends_with(r#""name": "a\u007fb"}"#), "got {record}");
        let decoded: Profile = serde_json::from_str(&record).unwrap();
        assert_eq!(decoded.name, "a\u{7f}b");
    }

    #[test]
    fn test_name_last_record_roundtrip_is_byte_identical() {
        let contents = concat!(
            r#"{"model": "pc105", "layout": "us", "variant": "", "option": "", "name": "us"}"#,
            "\n",
        );

        let registry = decode_profiles(contents, Path::new("mappings")).unwrap();

        assert_eq!(encode_profiles(&registry).unwrap(), contents);
    }

    #[test]
    fn test_legacy_file_roundtrip_is_byte_identical() {
        let registry = decode_profiles(LEGACY_MAPPINGS, Path::new("mappings")).unwrap();

        assert_eq!(names(&registry), ["us", "fr"]);
        assert_eq!(encode_profiles(&registry).unwrap(), LEGACY_MAPPINGS);
    }

    #[test]
    fn test_decode_skips_blank_lines_and_collapses_duplicates() {
        let contents = concat!(
            r#"{"name": "us", "layout": "us"}"#,
            "\n\n",
            r#"{"name": "fr", "layout": "fr"}"#,
            "\n",
            r#"{"name": "us", "layout": "us", "variant": "intl"}"#,
            "\n",
        );

        let registry = decode_profiles(contents, Path::new("mappings")).unwrap();

        assert_eq!(names(&registry), ["us", "fr"]);
        assert_eq!(registry.get("us").unwrap().variant, "intl");
    }

    #[test]
    fn test_decode_reports_line_number() {
        let contents = "{\"name\": \"us\"}\nnot json\n";

        let err = decode_profiles(contents, Path::new("mappings")).unwrap_err();

        assert!(matches!(err, PersistenceError::Record { line: 2, .. }), "got {err:?}");
    }

    #[test]
    fn test_decode_rejects_empty_name() {
        let err = decode_profiles("{\"name\": \"\"}\n", Path::new("mappings")).unwrap_err();

        assert!(matches!(
            err,
            PersistenceError::Rejected { line: 1, source: RegistryError::EmptyName, .. }
        ));
    }

    #[test]
    fn test_load_missing_files_gives_empty_registry() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::new(temp_dir.path().join("keyboard-switch"));

        let registry = store.load().unwrap();

        assert!(registry.is_empty());
        assert_eq!(registry.current_index(), 0);
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::new(temp_dir.path().join("keyboard-switch"));
        let mut registry = ProfileRegistry::new();
        registry
            .add_or_update(
                Profile {
                    name: "work".to_string(),
                    model: "pc104".to_string(),
                    layout: "us".to_string(),
                    variant: "dvorak".to_string(),
                    option: "ctrl:nocaps".to_string(),
                },
                None,
            )
            .unwrap();
        registry.add_or_update(Profile::with_layout("home", "de"), None).unwrap();
        registry.set_current(1).unwrap();

        store.save(&registry).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(names(&loaded), ["work", "home"]);
        assert_eq!(loaded.current_index(), 1);
        for profile in registry.iter() {
            assert_eq!(loaded.get(&profile.name), Some(profile));
        }
        assert_eq!(fs::read_to_string(store.current_path()).unwrap(), "1");
        assert!(!store.dir().join("mappings.tmp").exists());
    }

    #[test]
    fn test_resave_without_changes_is_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::new(temp_dir.path());
        fs::write(store.mappings_path(), LEGACY_MAPPINGS).unwrap();

        let registry = store.load().unwrap();
        store.save_profiles(&registry).unwrap();

        assert_eq!(fs::read_to_string(store.mappings_path()).unwrap(), LEGACY_MAPPINGS);
    }

    #[test]
    fn test_current_with_whitespace() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::new(temp_dir.path());
        fs::write(store.mappings_path(), LEGACY_MAPPINGS).unwrap();
        fs::write(store.current_path(), " 1\n").unwrap();

        assert_eq!(store.load().unwrap().current_index(), 1);
    }

    #[test]
    fn test_current_out_of_range_falls_back_to_zero() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::new(temp_dir.path());
        fs::write(store.mappings_path(), LEGACY_MAPPINGS).unwrap();
        fs::write(store.current_path(), "7").unwrap();

        assert_eq!(store.load().unwrap().current_index(), 0);
    }

    #[test]
    fn test_current_not_a_number() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::new(temp_dir.path());
        fs::write(store.current_path(), "two").unwrap();

        let err = store.load().unwrap_err();

        assert!(matches!(err, PersistenceError::Current { ref value, .. } if value == "two"));
    }

    #[test]
    fn test_unreadable_mappings_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = Store::new(temp_dir.path());
        fs::create_dir(store.mappings_path()).unwrap();

        assert!(matches!(store.load(), Err(PersistenceError::Io { .. })));
    }
}
