use std::{
    env, fs,
    path::{Path, PathBuf},
};

use dirs::home_dir;

use crate::errors::Result;

const DEFAULT_DIR_NAME: &str = ".ride_wizard";
const HOME_ENV: &str = "RIDE_WIZARD_HOME";
const RIDES_DIR: &str = "rides";
const CONFIG_FILE: &str = "config.json";

/// Resolves the files the application keeps under one base directory.
pub struct PathResolver;

impl PathResolver {
    /// `RIDE_WIZARD_HOME` when set, otherwise `~/.ride_wizard`.
    pub fn base_dir() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_base(custom: Option<PathBuf>) -> PathBuf {
        custom.unwrap_or_else(Self::base_dir)
    }

    pub fn rides_dir_in(base: &Path) -> PathBuf {
        base.join(RIDES_DIR)
    }

    pub fn config_file_in(base: &Path) -> PathBuf {
        base.join(CONFIG_FILE)
    }
}

pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Sibling path used while writing `path` atomically.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.tmp", existing),
        None => "tmp".to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes `data` next to `path` and renames it into place.
pub fn write_atomic(path: &Path, data: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)
}

/// Filesystem-safe file stem for an identifier. Lowercase ASCII letters,
/// digits and `-` are kept; every other byte becomes `_xx` (hex), so distinct
/// identifiers never share a stem.
pub fn file_stem_for(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "_".into();
    }
    let mut stem = String::with_capacity(trimmed.len());
    for byte in trimmed.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' => stem.push(byte as char),
            _ => stem.push_str(&format!("_{byte:02x}")),
        }
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn file_stem_escapes_unsafe_characters() {
        assert_eq!(file_stem_for("driver-1"), "driver-1");
        assert_eq!(file_stem_for("  driver-1 "), "driver-1");
        assert_eq!(file_stem_for("Driver 1/A"), "_44river_201_2f_41");
        assert_eq!(file_stem_for("  "), "_");
    }

    #[test]
    fn file_stems_never_collide() {
        let ids = ["Driver 1", "driver_1", "DRIVER 1", "driver 1", "driver_201"];
        let stems: std::collections::HashSet<String> =
            ids.iter().map(|id| file_stem_for(id)).collect();
        assert_eq!(stems.len(), ids.len());
    }

    #[test]
    fn tmp_path_appends_suffix() {
        assert_eq!(
            tmp_path(Path::new("/data/rides.json")),
            PathBuf::from("/data/rides.json.tmp")
        );
        assert_eq!(tmp_path(Path::new("/data/rides")), PathBuf::from("/data/rides.tmp"));
    }

    #[test]
    fn write_atomic_creates_parents_and_leaves_no_tmp() {
        let temp = TempDir::new().expect("temp dir");
        let target = temp.path().join("nested").join("file.json");
        write_atomic(&target, "{}").expect("write");
        assert_eq!(fs::read_to_string(&target).unwrap(), "{}");
        assert!(!tmp_path(&target).exists());
    }
}
