//! Infrastructure storage layer - database persistence.
//!
//! This module contains ALL SeaORM-specific code and database operations:
//! - `entity/` - SeaORM entity definitions
//! - `mapper.rs` - Conversions between SeaORM models and SDK contract types
//! - `migrations/` - Database schema migrations, one raw SQL script per backend
//! - `*_sea_repo.rs` - repository port implementations
//!
//! Updates are issued as `UPDATE .. SET <named columns>` so that writers of
//! unrelated fields never overwrite each other.

mod agencies_sea_repo;
mod bookings_sea_repo;
mod companies_sea_repo;
mod db;
pub mod entity;
mod listings_sea_repo;
pub mod mapper;
pub mod migrations;

pub use agencies_sea_repo::SeaOrmAgenciesRepository;
pub use bookings_sea_repo::SeaOrmBookingsRepository;
pub use companies_sea_repo::SeaOrmCompaniesRepository;
pub use listings_sea_repo::SeaOrmListingsRepository;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::domain::service::Repositories;

/// SeaORM-backed repository set sharing one connection pool.
#[must_use]
pub fn repositories(conn: DatabaseConnection) -> Repositories {
    Repositories {
        agencies: Arc::new(SeaOrmAgenciesRepository::new(conn.clone())),
        companies: Arc::new(SeaOrmCompaniesRepository::new(conn.clone())),
        listings: Arc::new(SeaOrmListingsRepository::new(conn.clone())),
        bookings: Arc::new(SeaOrmBookingsRepository::new(conn)),
    }
}
