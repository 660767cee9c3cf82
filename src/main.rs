use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use parley_engine::{ChatConfig, TurnManager};
use parley_llm::{BedrockConfig, BedrockProvider};
use parley_server::{AppState, ServerConfig};
use parley_settings::{Settings, StoreBackend};
use parley_store::{Database, MemorySessionStore, SessionStore, SqliteSessionStore};
use parley_telemetry::TelemetryConfig;

/// Stateless chat handler with rolling session history.
#[derive(Debug, Parser)]
#[command(name = "parley", version)]
struct Cli {
    /// Address to bind (overrides PARLEY_HOST).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (overrides PARLEY_PORT).
    #[arg(long)]
    port: Option<u16>,

    /// SQLite file for session history (overrides PARLEY_DB_PATH).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Keep sessions in memory only.
    #[arg(long)]
    memory_store: bool,
}

impl Cli {
    fn apply(self, settings: &mut Settings) {
        if let Some(host) = self.host {
            settings.server.host = host;
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(path) = self.db_path {
            settings.store.db_path = path;
        }
        if self.memory_store {
            settings.store.backend = StoreBackend::Memory;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = parley_settings::load_settings().context("loading settings")?;
    cli.apply(&mut settings);

    let telemetry = TelemetryConfig::from_level_str(&settings.logging.level, settings.logging.json);
    parley_telemetry::init_telemetry(&telemetry).context("initialising telemetry")?;

    tracing::info!(
        model_id = %settings.inference.model_id,
        endpoint = %settings.inference.endpoint(),
        store = ?settings.store.backend,
        table = %settings.store.table_name,
        "starting parley"
    );

    let provider = BedrockProvider::new(BedrockConfig::from(&settings.inference)).context("building inference client")?;
    let store = open_store(&settings)?;
    let manager = TurnManager::new(Arc::new(provider), store, ChatConfig::default());

    let server_config = ServerConfig::from(&settings.server);
    let state = AppState {
        manager: Arc::new(manager),
        expose_internal_errors: server_config.expose_internal_errors,
    };
    let handle = parley_server::start(&server_config, state)
        .await
        .with_context(|| format!("binding {}", server_config.bind_addr()))?;

    tokio::signal::ctrl_c().await.context("listening for ctrl+c")?;
    tracing::info!("shutting down");
    handle.shutdown().await;
    Ok(())
}

fn open_store(settings: &Settings) -> anyhow::Result<Arc<dyn SessionStore>> {
    match settings.store.backend {
        StoreBackend::Memory => Ok(Arc::new(MemorySessionStore::new())),
        StoreBackend::Sqlite => {
            let db = Database::open(&settings.store.db_path)
                .with_context(|| format!("opening {}", settings.store.db_path.display()))?;
            let store = SqliteSessionStore::new(db, settings.store.table_name.clone())
                .context("preparing session table")?;
            Ok(Arc::new(store))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_settings() {
        let cli = Cli::parse_from(["parley", "--host", "127.0.0.1", "--port", "9000", "--memory-store"]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn cli_without_flags_keeps_settings() {
        let cli = Cli::parse_from(["parley"]);
        let mut settings = Settings::default();
        let before = settings.store.db_path.clone();
        cli.apply(&mut settings);
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.store.backend, StoreBackend::Sqlite);
        assert_eq!(settings.store.db_path, before);
    }

    #[test]
    fn db_path_flag() {
        let cli = Cli::parse_from(["parley", "--db-path", "/tmp/x.db"]);
        let mut settings = Settings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.store.db_path, PathBuf::from("/tmp/x.db"));
    }

    #[test]
    fn memory_store_opens_without_disk() {
        let mut settings = Settings::default();
        settings.store.backend = StoreBackend::Memory;
        let store = open_store(&settings).unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
