//! Directory-based SQL migrations.
//!
//! Scripts are selected by filename suffix (`.up.sql`, `.down.sql`,
//! `.reset.sql`) and executed inside a single transaction so a failing
//! script leaves the schema untouched. Up and reset scripts run in lexical
//! filename order, down scripts in reverse.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use sqlx::{Executor, PgPool};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationMode {
    Up,
    Down,
    Reset,
    Skip,
}

impl MigrationMode {
    fn suffix(self) -> Option<&'static str> {
        match self {
            MigrationMode::Up => Some(".up.sql"),
            MigrationMode::Down => Some(".down.sql"),
            MigrationMode::Reset => Some(".reset.sql"),
            MigrationMode::Skip => None,
        }
    }
}

impl fmt::Display for MigrationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MigrationMode::Up => "up",
            MigrationMode::Down => "down",
            MigrationMode::Reset => "reset",
            MigrationMode::Skip => "skip",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
#[error("unknown migration mode {0:?} (expected up, down, reset or skip)")]
pub struct UnknownMode(String);

impl FromStr for MigrationMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(MigrationMode::Up),
            "down" => Ok(MigrationMode::Down),
            "reset" => Ok(MigrationMode::Reset),
            "skip" | "none" => Ok(MigrationMode::Skip),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("migration path is empty")]
    EmptyPath,

    #[error("failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("migration directory {0} is empty")]
    EmptyDir(PathBuf),

    #[error("failed to read sql script {path}: {source}")]
    ReadScript {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to execute {script}: {source}")]
    Execute {
        script: String,
        source: sqlx::Error,
    },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A script loaded from disk, ready to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub name: String,
    pub sql: String,
}

/// Loads every script in `dir` matching `mode` in execution order.
pub fn collect_scripts(dir: &Path, mode: MigrationMode) -> Result<Vec<Script>, MigrationError> {
    if dir.as_os_str().is_empty() {
        return Err(MigrationError::EmptyPath);
    }

    let entries = std::fs::read_dir(dir).map_err(|source| MigrationError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    let mut seen_any = false;
    for entry in entries {
        let entry = entry.map_err(|source| MigrationError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        seen_any = true;

        let path = entry.path();
        if path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if mode.suffix().is_some_and(|suffix| name.ends_with(suffix)) {
            files.push((name.to_string(), path));
        }
    }

    if !seen_any {
        return Err(MigrationError::EmptyDir(dir.to_path_buf()));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));
    if mode == MigrationMode::Down {
        files.reverse();
    }

    files
        .into_iter()
        .map(|(name, path)| {
            let sql = std::fs::read_to_string(&path)
                .map_err(|source| MigrationError::ReadScript { path, source })?;
            Ok(Script { name, sql })
        })
        .collect()
}

/// Applies the scripts selected by `mode` in one transaction.
///
/// Returns the number of scripts executed.
pub async fn run(pool: &PgPool, dir: &Path, mode: MigrationMode) -> Result<usize, MigrationError> {
    if mode == MigrationMode::Skip {
        info!("migrations skipped");
        return Ok(0);
    }

    let scripts = collect_scripts(dir, mode)?;

    let mut tx = pool.begin().await?;
    for script in &scripts {
        debug!(script = %script.name, %mode, "applying migration");
        (&mut *tx)
            .execute(script.sql.as_str())
            .await
            .map_err(|source| MigrationError::Execute {
                script: script.name.clone(),
                source,
            })?;
    }
    tx.commit().await?;

    info!(count = scripts.len(), %mode, dir = %dir.display(), "migrations applied");
    Ok(scripts.len())
}
