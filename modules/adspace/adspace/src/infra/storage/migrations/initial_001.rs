use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

const POSTGRES: &str = r"
CREATE TABLE IF NOT EXISTS agencies (
    id UUID PRIMARY KEY NOT NULL,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    description TEXT NULL,
    website TEXT NULL,
    is_verified BOOLEAN NOT NULL DEFAULT FALSE,
    logo_url TEXT NULL,
    logo_remote_id VARCHAR(512) NULL,
    logo_resource_type VARCHAR(16) NULL,
    verification_document_url TEXT NULL,
    verification_document_remote_id VARCHAR(512) NULL,
    verification_document_resource_type VARCHAR(16) NULL,
    trial_started_at TIMESTAMPTZ NULL,
    trial_ends_at TIMESTAMPTZ NULL,
    subscription_ends_at TIMESTAMPTZ NULL,
    subscription_plan VARCHAR(64) NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_agencies_email ON agencies(email);

CREATE TABLE IF NOT EXISTS companies (
    id UUID PRIMARY KEY NOT NULL,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_companies_email ON companies(email);

CREATE TABLE IF NOT EXISTS categories (
    id UUID PRIMARY KEY NOT NULL,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_name ON categories(name);

CREATE TABLE IF NOT EXISTS listings (
    id UUID PRIMARY KEY NOT NULL,
    agency_id UUID NOT NULL REFERENCES agencies(id),
    category_id UUID NOT NULL REFERENCES categories(id),
    title VARCHAR(255) NOT NULL,
    description TEXT NOT NULL,
    location VARCHAR(255) NOT NULL,
    price_min BIGINT NOT NULL,
    price_max BIGINT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    image_url TEXT NOT NULL,
    image_remote_id VARCHAR(512) NOT NULL,
    image_resource_type VARCHAR(16) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_listings_agency ON listings(agency_id);

CREATE TABLE IF NOT EXISTS bookings (
    id UUID PRIMARY KEY NOT NULL,
    company_id UUID NOT NULL REFERENCES companies(id),
    listing_id UUID NOT NULL REFERENCES listings(id),
    agency_id UUID NOT NULL REFERENCES agencies(id),
    status VARCHAR(16) NOT NULL,
    request_description TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_bookings_agency ON bookings(agency_id);
CREATE INDEX IF NOT EXISTS idx_bookings_listing ON bookings(listing_id);
";

const MYSQL: &str = r"
CREATE TABLE IF NOT EXISTS agencies (
    id VARCHAR(36) PRIMARY KEY NOT NULL,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    description TEXT NULL,
    website TEXT NULL,
    is_verified BOOLEAN NOT NULL DEFAULT FALSE,
    logo_url TEXT NULL,
    logo_remote_id VARCHAR(512) NULL,
    logo_resource_type VARCHAR(16) NULL,
    verification_document_url TEXT NULL,
    verification_document_remote_id VARCHAR(512) NULL,
    verification_document_resource_type VARCHAR(16) NULL,
    trial_started_at TIMESTAMP(6) NULL,
    trial_ends_at TIMESTAMP(6) NULL,
    subscription_ends_at TIMESTAMP(6) NULL,
    subscription_plan VARCHAR(64) NULL,
    created_at TIMESTAMP(6) NOT NULL,
    updated_at TIMESTAMP(6) NOT NULL,
    UNIQUE KEY idx_agencies_email (email)
);

CREATE TABLE IF NOT EXISTS companies (
    id VARCHAR(36) PRIMARY KEY NOT NULL,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL,
    created_at TIMESTAMP(6) NOT NULL,
    updated_at TIMESTAMP(6) NOT NULL,
    UNIQUE KEY idx_companies_email (email)
);

CREATE TABLE IF NOT EXISTS categories (
    id VARCHAR(36) PRIMARY KEY NOT NULL,
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMP(6) NOT NULL,
    UNIQUE KEY idx_categories_name (name)
);

CREATE TABLE IF NOT EXISTS listings (
    id VARCHAR(36) PRIMARY KEY NOT NULL,
    agency_id VARCHAR(36) NOT NULL,
    category_id VARCHAR(36) NOT NULL,
    title VARCHAR(255) NOT NULL,
    description TEXT NOT NULL,
    location VARCHAR(255) NOT NULL,
    price_min BIGINT NOT NULL,
    price_max BIGINT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    image_url TEXT NOT NULL,
    image_remote_id VARCHAR(512) NOT NULL,
    image_resource_type VARCHAR(16) NOT NULL,
    created_at TIMESTAMP(6) NOT NULL,
    updated_at TIMESTAMP(6) NOT NULL,
    KEY idx_listings_agency (agency_id),
    FOREIGN KEY (agency_id) REFERENCES agencies(id),
    FOREIGN KEY (category_id) REFERENCES categories(id)
);

CREATE TABLE IF NOT EXISTS bookings (
    id VARCHAR(36) PRIMARY KEY NOT NULL,
    company_id VARCHAR(36) NOT NULL,
    listing_id VARCHAR(36) NOT NULL,
    agency_id VARCHAR(36) NOT NULL,
    status VARCHAR(16) NOT NULL,
    request_description TEXT NOT NULL,
    created_at TIMESTAMP(6) NOT NULL,
    updated_at TIMESTAMP(6) NOT NULL,
    KEY idx_bookings_agency (agency_id),
    KEY idx_bookings_listing (listing_id),
    FOREIGN KEY (company_id) REFERENCES companies(id),
    FOREIGN KEY (listing_id) REFERENCES listings(id),
    FOREIGN KEY (agency_id) REFERENCES agencies(id)
);
";

const SQLITE: &str = r"
CREATE TABLE IF NOT EXISTS agencies (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    description TEXT NULL,
    website TEXT NULL,
    is_verified INTEGER NOT NULL DEFAULT 0,
    logo_url TEXT NULL,
    logo_remote_id TEXT NULL,
    logo_resource_type TEXT NULL,
    verification_document_url TEXT NULL,
    verification_document_remote_id TEXT NULL,
    verification_document_resource_type TEXT NULL,
    trial_started_at TEXT NULL,
    trial_ends_at TEXT NULL,
    subscription_ends_at TEXT NULL,
    subscription_plan TEXT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_agencies_email ON agencies(email);

CREATE TABLE IF NOT EXISTS companies (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    email TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_companies_email ON companies(email);

CREATE TABLE IF NOT EXISTS categories (
    id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    created_at TEXT NOT NULL
);
CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_name ON categories(name);

CREATE TABLE IF NOT EXISTS listings (
    id TEXT PRIMARY KEY NOT NULL,
    agency_id TEXT NOT NULL REFERENCES agencies(id),
    category_id TEXT NOT NULL REFERENCES categories(id),
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    location TEXT NOT NULL,
    price_min INTEGER NOT NULL,
    price_max INTEGER NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    image_url TEXT NOT NULL,
    image_remote_id TEXT NOT NULL,
    image_resource_type TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_listings_agency ON listings(agency_id);

CREATE TABLE IF NOT EXISTS bookings (
    id TEXT PRIMARY KEY NOT NULL,
    company_id TEXT NOT NULL REFERENCES companies(id),
    listing_id TEXT NOT NULL REFERENCES listings(id),
    agency_id TEXT NOT NULL REFERENCES agencies(id),
    status TEXT NOT NULL,
    request_description TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_bookings_agency ON bookings(agency_id);
CREATE INDEX IF NOT EXISTS idx_bookings_listing ON bookings(listing_id);
";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();
        let conn = manager.get_connection();

        let sql = match backend {
            sea_orm::DatabaseBackend::Postgres => POSTGRES,
            sea_orm::DatabaseBackend::MySql => MYSQL,
            sea_orm::DatabaseBackend::Sqlite => SQLITE,
        };

        // One statement per call: not every driver accepts batches.
        for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            conn.execute_unprepared(statement).await?;
        }
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        for table in ["bookings", "listings", "categories", "companies", "agencies"] {
            conn.execute_unprepared(&format!("DROP TABLE IF EXISTS {table}"))
                .await?;
        }
        Ok(())
    }
}
