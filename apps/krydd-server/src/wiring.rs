use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use url::Url;

use krydd::domain::ports::{LanguageModel, ObjectStore};
use krydd::infra::llm::{HttpModelClient, HttpModelConfig, OfflineModel};
use krydd::infra::objects::{FsObjectStore, InMemoryObjectStore};
use krydd::infra::system::{SystemClock, UuidGenerator};
use krydd::KryddDeps;
use runtime::{AppConfig, ModelConfig, ObjectBackend, StorageConfig};
use table_store::sql::SeaOrmTable;
use table_store::{InMemoryTable, TableStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Sqlite,
    Postgres,
}

/// Detect the table backend from the storage URL scheme.
pub fn detect_backend(cfg: &StorageConfig) -> Result<Backend> {
    let raw = cfg.url.trim();
    if raw.is_empty() {
        return Err(anyhow!("Storage URL not configured"));
    }
    if cfg.is_memory() {
        return Ok(Backend::Memory);
    }
    if raw.starts_with("sqlite::memory:") || raw.eq_ignore_ascii_case("sqlite://:memory:") {
        return Ok(Backend::Sqlite);
    }

    let url = Url::parse(raw).map_err(|e| anyhow!("Invalid storage URL '{}': {}", raw, e))?;
    match url.scheme() {
        "sqlite" | "sqlite3" => Ok(Backend::Sqlite),
        "postgres" | "postgresql" => Ok(Backend::Postgres),
        other => Err(anyhow!("Unsupported storage type: {}", other)),
    }
}

/// Expand a sqlite DSN into an absolute-path DSN using a base directory.
/// - Keeps "sqlite::memory:" as-is.
/// - Adds `mode=rwc` when no query is given so the file gets created.
fn absolutize_sqlite_dsn(dsn: &str, base_dir: &Path, create_dirs: bool) -> Result<String> {
    if dsn.eq_ignore_ascii_case("sqlite::memory:") || dsn.eq_ignore_ascii_case("sqlite://:memory:")
    {
        return Ok("sqlite::memory:".to_string());
    }
    let db_path = dsn
        .strip_prefix("sqlite://")
        .ok_or_else(|| anyhow!("DSN must start with sqlite:// (got: {})", dsn))?;

    let (path_str, query) = match db_path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (db_path, None),
    };

    let mut p = PathBuf::from(path_str);
    if p.as_os_str().is_empty() {
        return Err(anyhow!("Empty SQLite path in DSN"));
    }
    if p.is_relative() {
        p = base_dir.join(p);
    }

    if create_dirs {
        if let Some(dir) = p.parent() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("cannot create {}", dir.display()))?;
        }
    }

    let mut out = String::from("sqlite://");
    out.push_str(&p.to_string_lossy().replace('\\', "/"));
    out.push('?');
    out.push_str(query.unwrap_or("mode=rwc"));
    Ok(out)
}

async fn build_table(config: &AppConfig) -> Result<Arc<dyn TableStore>> {
    let storage = &config.storage;
    match detect_backend(storage)? {
        Backend::Memory => {
            tracing::info!("Using in-memory table store");
            Ok(Arc::new(InMemoryTable::new()))
        }
        backend => {
            let mut dsn = storage.url.trim().to_owned();
            if backend == Backend::Sqlite {
                dsn = absolutize_sqlite_dsn(&dsn, Path::new(&config.server.home_dir), true)?;
            }
            tracing::info!("Connecting table store ({:?})", backend);
            let table = SeaOrmTable::connect(&dsn, storage.max_conns).await?;
            Ok(Arc::new(table))
        }
    }
}

fn build_model(cfg: &ModelConfig) -> Result<Arc<dyn LanguageModel>> {
    if !cfg.enabled {
        tracing::warn!("Model runtime disabled, using the offline model");
        return Ok(Arc::new(OfflineModel::new(cfg.embedding_dimensions)));
    }
    let base_url = Url::parse(cfg.base_url.trim())
        .map_err(|e| anyhow!("Invalid model base_url '{}': {}", cfg.base_url, e))?;
    let client = HttpModelClient::new(HttpModelConfig {
        base_url,
        api_key: cfg.api_key.clone(),
        chat_model_id: cfg.chat_model_id.clone(),
        embedding_model_id: cfg.embedding_model_id.clone(),
        embedding_dimensions: cfg.embedding_dimensions,
        timeout: Duration::from_secs(cfg.timeout_sec),
    })?;
    Ok(Arc::new(client))
}

/// Build the module backends selected by `config`.
pub async fn build_deps(config: &AppConfig) -> Result<KryddDeps> {
    let table = build_table(config).await?;

    let objects: Arc<dyn ObjectStore> = match config.objects.backend {
        ObjectBackend::Fs => {
            let root = config.home_path(&config.objects.root);
            tracing::info!("Object store rooted at {}", root.display());
            Arc::new(FsObjectStore::new(root))
        }
        ObjectBackend::Memory => Arc::new(InMemoryObjectStore::new()),
    };

    Ok(KryddDeps {
        table,
        objects,
        model: build_model(&config.model)?,
        clock: Arc::new(SystemClock),
        ids: Arc::new(UuidGenerator),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(url: &str) -> StorageConfig {
        StorageConfig {
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn backend_is_detected_from_scheme() {
        assert_eq!(detect_backend(&storage("memory")).unwrap(), Backend::Memory);
        assert_eq!(
            detect_backend(&storage("sqlite://data/krydd.db")).unwrap(),
            Backend::Sqlite
        );
        assert_eq!(
            detect_backend(&storage("sqlite::memory:")).unwrap(),
            Backend::Sqlite
        );
        assert_eq!(
            detect_backend(&storage("postgres://u:p@localhost/krydd")).unwrap(),
            Backend::Postgres
        );
        assert!(detect_backend(&storage("mysql://localhost/krydd")).is_err());
        assert!(detect_backend(&storage("  ")).is_err());
    }

    #[test]
    fn relative_sqlite_paths_resolve_against_home() {
        let tmp = tempfile::tempdir().unwrap();
        let dsn = absolutize_sqlite_dsn("sqlite://db/krydd.db", tmp.path(), true).unwrap();
        let expected = tmp.path().join("db/krydd.db");
        assert_eq!(
            dsn,
            format!(
                "sqlite://{}?mode=rwc",
                expected.to_string_lossy().replace('\\', "/")
            )
        );
        assert!(tmp.path().join("db").is_dir());
    }

    #[test]
    fn sqlite_query_and_memory_are_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let dsn =
            absolutize_sqlite_dsn("sqlite:///var/krydd.db?cache=shared", tmp.path(), false).unwrap();
        assert_eq!(dsn, "sqlite:///var/krydd.db?cache=shared");
        assert_eq!(
            absolutize_sqlite_dsn("sqlite://:memory:", tmp.path(), false).unwrap(),
            "sqlite::memory:"
        );
        assert!(absolutize_sqlite_dsn("sqlite://", tmp.path(), false).is_err());
    }

    #[test]
    fn disabled_model_uses_offline_embeddings() {
        let cfg = ModelConfig {
            enabled: false,
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(build_model(&cfg).is_ok());
    }

    #[test]
    fn invalid_model_url_is_rejected() {
        let cfg = ModelConfig {
            base_url: "not a url".into(),
            ..Default::default()
        };
        assert!(build_model(&cfg).is_err());
    }
}
