use adspace_sdk::Company;
use async_trait::async_trait;
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use super::db::insert_err;
use super::entity::company;
use super::mapper::company_to_active_model;
use crate::domain::error::DomainError;
use crate::domain::repo::CompaniesRepository;

/// `SeaORM` implementation of `CompaniesRepository`.
#[derive(Clone)]
pub struct SeaOrmCompaniesRepository {
    conn: DatabaseConnection,
}

impl SeaOrmCompaniesRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl CompaniesRepository for SeaOrmCompaniesRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Company>, DomainError> {
        let found = company::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, c: &Company) -> Result<(), DomainError> {
        company::Entity::insert(company_to_active_model(c))
            .exec_without_returning(&self.conn)
            .await
            .map_err(|e| insert_err("Company", e))?;
        Ok(())
    }
}
