#![allow(clippy::unwrap_used, clippy::expect_used, dead_code)]

//! Common test utilities for adspace integration tests

use std::sync::Arc;

use adspace::config::AdspaceConfig;
use adspace::domain::clock::ManualClock;
use adspace::domain::service::{Repositories, Service};
use adspace::infra::media::InMemoryStore;
use adspace::infra::storage::entity::category;
use adspace::infra::storage::migrations::Migrator;
use adspace::infra::storage::repositories;
use adspace_sdk::{Agency, Company, Listing, MediaUpload, NewAgency, NewCompany, NewListing};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use time::OffsetDateTime;
use time::macros::datetime;
use uuid::Uuid;

pub const D0: OffsetDateTime = datetime!(2024-03-01 09:00 UTC);

/// Bytes the in-memory store accepts as an image.
pub const PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-image";
pub const PDF: &[u8] = b"%PDF-1.7 fake-document";

pub struct TestEnv {
    pub service: Arc<Service>,
    pub conn: DatabaseConnection,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
    pub category: Uuid,
}

pub async fn connect() -> DatabaseConnection {
    // A single connection keeps the in-memory database alive for the whole test.
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let conn = Database::connect(opts).await.unwrap();
    Migrator::up(&conn, None).await.unwrap();
    conn
}

pub async fn seed_category(conn: &DatabaseConnection, name: &str) -> Uuid {
    let id = Uuid::now_v7();
    category::ActiveModel {
        id: Set(id),
        name: Set(name.to_owned()),
        created_at: Set(D0),
    }
    .insert(conn)
    .await
    .unwrap();
    id
}

pub async fn env() -> TestEnv {
    env_with(AdspaceConfig::default(), |repos| repos).await
}

/// Builds the service over SQLite; `wrap` may decorate the repositories.
pub async fn env_with(
    config: AdspaceConfig,
    wrap: impl FnOnce(Repositories) -> Repositories,
) -> TestEnv {
    let conn = connect().await;
    let category = seed_category(&conn, "Billboards").await;
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::new(D0));
    let service = Arc::new(Service::new(
        wrap(repositories(conn.clone())),
        store.clone(),
        clock.clone(),
        config,
    ));
    TestEnv {
        service,
        conn,
        store,
        clock,
        category,
    }
}

impl TestEnv {
    pub async fn agency(&self, name: &str) -> Agency {
        self.service
            .register_agency(NewAgency {
                id: None,
                name: name.to_owned(),
                email: format!("{}@agency.example", name.to_lowercase().replace(' ', "-")),
            })
            .await
            .unwrap()
    }

    pub async fn company(&self, name: &str) -> Company {
        self.service
            .register_company(NewCompany {
                id: None,
                name: name.to_owned(),
                email: format!("{}@company.example", name.to_lowercase().replace(' ', "-")),
            })
            .await
            .unwrap()
    }

    pub fn new_listing(&self, title: &str) -> NewListing {
        NewListing {
            category_id: self.category,
            title: title.to_owned(),
            description: "Backlit panel at the ring road exit".to_owned(),
            location: "Lyon".to_owned(),
            price_min: 50_000,
            price_max: 90_000,
        }
    }

    pub async fn listing(&self, agency_id: Uuid, title: &str) -> Listing {
        self.service
            .create_listing(agency_id, self.new_listing(title), MediaUpload::new(PNG.to_vec()))
            .await
            .unwrap()
    }
}
