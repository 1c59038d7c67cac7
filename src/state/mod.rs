// state module: AppState, initialization, and re-exports of submodules.

use anyhow::Result;
use mongodb::{Client as MongoClient, Collection};

use crate::{
    config::Config,
    lookup::RegistryClient,
    models::{
        Client, Counter, MessageTemplate, Notification, Payment, PaymentCommitment, Receipt,
        Session, User,
    },
    notify::Notifier,
    storage::StorageClient,
};

mod billing;
mod clients;
mod commitments;
mod notifications;
mod payments;
mod receipts;
mod seed;
mod templates;
mod users;

pub use billing::*;
pub use clients::*;
pub use commitments::*;
pub use notifications::*;
pub use payments::*;
pub use receipts::*;
pub use templates::*;
pub use users::*;

pub const SESSION_TTL_SECONDS: u64 = 60 * 60 * 24; // 1 day

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub notifier: Notifier,
    pub registry: RegistryClient,
    pub storage: StorageClient,
    pub users: Collection<User>,
    pub sessions: Collection<Session>,
    pub clients: Collection<Client>,
    pub payments: Collection<Payment>,
    pub commitments: Collection<PaymentCommitment>,
    pub templates: Collection<MessageTemplate>,
    pub notifications: Collection<Notification>,
    pub receipts: Collection<Receipt>,
    pub counters: Collection<Counter>,
}

pub async fn init_state(config: Config) -> Result<AppState> {
    let mongo = MongoClient::with_uri_str(&config.mongodb_uri).await?;
    let db = mongo.database(&config.mongodb_db);

    seed::ensure_collections(&db).await?;
    seed::ensure_indexes(&db).await?;

    // Only seed when the database is effectively empty (no users).
    if seed::is_database_empty(&db).await? {
        seed::seed_admin_user(&db, &config).await?;
        seed::seed_default_templates(&db).await?;
    }

    let notifier = Notifier::new(&config);
    let registry = RegistryClient::new(config.registry.clone());
    let storage = StorageClient::new(config.storage.clone());

    Ok(AppState {
        notifier,
        registry,
        storage,
        users: db.collection::<User>("users"),
        sessions: db.collection::<Session>("sessions"),
        clients: db.collection::<Client>("clientes"),
        payments: db.collection::<Payment>("pagos"),
        commitments: db.collection::<PaymentCommitment>("compromisos"),
        templates: db.collection::<MessageTemplate>("plantillas"),
        notifications: db.collection::<Notification>("notificaciones"),
        receipts: db.collection::<Receipt>("recibos"),
        counters: db.collection::<Counter>("counters"),
        config,
    })
}
