use std::fmt::{Display, Formatter};
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Result, bail};
use regex::Regex;

pub const DEFAULT_TABLE_NAME: &str = "policelog";
pub const DEFAULT_DATA_DIR: &str = ".securecheck";
pub const DEFAULT_DATABASE_FILE: &str = "secure_check.sqlite";

/// A table reference that is safe to splice into catalog SQL.
///
/// Accepts a bare identifier or a `schema.table` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName(String);

impl TableName {
    pub fn parse(raw: &str) -> Result<Self> {
        let candidate = raw.trim();
        if !table_name_regex().is_match(candidate) {
            bail!("table name must be an identifier or schema.identifier: `{raw}`");
        }
        Ok(Self(candidate.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE_NAME.to_string())
    }
}

impl Display for TableName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub database_path: PathBuf,
    pub table: TableName,
}

impl DatabaseConfig {
    #[must_use]
    pub fn new(database_path: impl Into<PathBuf>, table: TableName) -> Self {
        Self {
            database_path: database_path.into(),
            table,
        }
    }
}

pub fn resolve_database_config(
    home_dir: &Path,
    cwd: &Path,
    database_override: Option<&Path>,
    table_override: Option<&str>,
) -> Result<DatabaseConfig> {
    if !home_dir.is_absolute() {
        bail!("home_dir must be absolute: {}", home_dir.display());
    }
    if !cwd.is_absolute() {
        bail!("cwd must be absolute: {}", cwd.display());
    }

    let home_dir = normalize_lexical(home_dir);
    let cwd = normalize_lexical(cwd);
    let database_path = match database_override {
        Some(path) => resolve_user_path(path, &home_dir, &cwd)?,
        None => home_dir.join(DEFAULT_DATA_DIR).join(DEFAULT_DATABASE_FILE),
    };
    let table = match table_override {
        Some(raw) => TableName::parse(raw)?,
        None => TableName::default(),
    };

    Ok(DatabaseConfig {
        database_path: normalize_lexical(&database_path),
        table,
    })
}

fn table_name_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)?$")
            .expect("table name regex should compile")
    })
}

fn resolve_user_path(path: &Path, home_dir: &Path, cwd: &Path) -> Result<PathBuf> {
    let expanded = expand_tilde(path, home_dir)?;
    let resolved = if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    };

    Ok(normalize_lexical(&resolved))
}

fn expand_tilde(path: &Path, home_dir: &Path) -> Result<PathBuf> {
    let mut components = path.components();
    match components.next() {
        Some(Component::Normal(first)) if first == "~" => {
            let mut expanded = home_dir.to_path_buf();
            for component in components {
                expanded.push(component.as_os_str());
            }
            Ok(expanded)
        }
        Some(Component::Normal(first))
            if first
                .to_str()
                .is_some_and(|segment| segment.starts_with('~')) =>
        {
            bail!(
                "unsupported home expansion syntax (only `~` and `~/...` are supported): {}",
                path.display()
            )
        }
        _ => Ok(path.to_path_buf()),
    }
}

fn normalize_lexical(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component.as_os_str());
                }
            }
            _ => normalized.push(component.as_os_str()),
        }
    }

    normalized
}
