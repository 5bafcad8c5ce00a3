//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both CLI and
//! REST API. Services are generic over repository traits, but AppState
//! pins them to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use faredesk_core::service::auth::AuthService;
use faredesk_core::service::chat::ChatService;
use faredesk_core::service::ticket::TicketService;
use faredesk_infra::config::{load_config, resolve_data_dir};
use faredesk_infra::crypto::password::Argon2PasswordHasher;
use faredesk_infra::sqlite::chat::SqliteChatRepository;
use faredesk_infra::sqlite::history::SqliteHistoryRepository;
use faredesk_infra::sqlite::pool::DatabasePool;
use faredesk_infra::sqlite::refund::SqliteRefundRepository;
use faredesk_infra::sqlite::ticket::SqliteTicketRepository;
use faredesk_infra::sqlite::user::SqliteUserRepository;
use faredesk_types::config::AppConfig;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteTicketService =
    TicketService<SqliteTicketRepository, SqliteRefundRepository, SqliteHistoryRepository>;

pub type ConcreteChatService = ChatService<SqliteChatRepository>;

pub type ConcreteAuthService = AuthService<SqliteUserRepository, Argon2PasswordHasher>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub ticket_service: Arc<ConcreteTicketService>,
    pub chat_service: Arc<ConcreteChatService>,
    pub auth_service: Arc<ConcreteAuthService>,
    pub config: AppConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_config(&data_dir).await;

        // Initialize database
        let db_url = format!(
            "sqlite://{}?mode=rwc",
            data_dir.join("faredesk.db").display()
        );
        let db_pool = DatabasePool::new(&db_url).await?;

        // Wire the ticket lifecycle engine with its repositories
        let ticket_service = TicketService::new(
            SqliteTicketRepository::new(db_pool.clone()),
            SqliteRefundRepository::new(db_pool.clone()),
            SqliteHistoryRepository::new(db_pool.clone()),
            config.default_currency.clone(),
        );

        // Wire chat service
        let chat_service = ChatService::new(SqliteChatRepository::new(db_pool.clone()));

        // Wire auth service
        let auth_service = AuthService::new(
            SqliteUserRepository::new(db_pool.clone()),
            Argon2PasswordHasher::new(),
        );

        Ok(Self {
            ticket_service: Arc::new(ticket_service),
            chat_service: Arc::new(chat_service),
            auth_service: Arc::new(auth_service),
            config,
            data_dir,
            db_pool,
        })
    }
}
