use adspace_sdk::Listing;
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, UpdateMany,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::entity::{category, listing};
use super::mapper::listing_to_active_model;
use crate::domain::error::DomainError;
use crate::domain::repo::ListingsRepository;

/// Descriptive columns; ownership and creation time never change after insert.
fn with_fields(update: UpdateMany<listing::Entity>, l: &Listing) -> UpdateMany<listing::Entity> {
    update
        .col_expr(listing::Column::CategoryId, Expr::value(l.category_id))
        .col_expr(listing::Column::Title, Expr::value(l.title.clone()))
        .col_expr(
            listing::Column::Description,
            Expr::value(l.description.clone()),
        )
        .col_expr(listing::Column::Location, Expr::value(l.location.clone()))
        .col_expr(listing::Column::PriceMin, Expr::value(l.price_min))
        .col_expr(listing::Column::PriceMax, Expr::value(l.price_max))
        .col_expr(listing::Column::UpdatedAt, Expr::value(l.updated_at))
}

/// `SeaORM` implementation of `ListingsRepository`.
#[derive(Clone)]
pub struct SeaOrmListingsRepository {
    conn: DatabaseConnection,
}

impl SeaOrmListingsRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    async fn exists(&self, id: Uuid) -> Result<bool, DomainError> {
        let count = listing::Entity::find()
            .filter(listing::Column::Id.eq(id))
            .count(&self.conn)
            .await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl ListingsRepository for SeaOrmListingsRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Listing>, DomainError> {
        let found = listing::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(found.map(Into::into))
    }

    async fn category_exists(&self, id: Uuid) -> Result<bool, DomainError> {
        let count = category::Entity::find()
            .filter(category::Column::Id.eq(id))
            .count(&self.conn)
            .await?;
        Ok(count > 0)
    }

    async fn insert(&self, l: &Listing) -> Result<(), DomainError> {
        listing::Entity::insert(listing_to_active_model(l))
            .exec_without_returning(&self.conn)
            .await?;
        Ok(())
    }

    async fn update_fields(&self, l: &Listing) -> Result<(), DomainError> {
        let res = with_fields(listing::Entity::update_many(), l)
            .filter(listing::Column::Id.eq(l.id))
            .exec(&self.conn)
            .await?;

        // MySQL reports zero rows for a write that changes nothing.
        if res.rows_affected == 0 && !self.exists(l.id).await? {
            return Err(DomainError::not_found("Listing", l.id));
        }
        Ok(())
    }

    async fn update_with_image(
        &self,
        l: &Listing,
        previous_remote_id: &str,
    ) -> Result<(), DomainError> {
        let res = with_fields(listing::Entity::update_many(), l)
            .col_expr(listing::Column::ImageUrl, Expr::value(l.image.url.clone()))
            .col_expr(
                listing::Column::ImageRemoteId,
                Expr::value(l.image.remote_id.clone()),
            )
            .col_expr(
                listing::Column::ImageResourceType,
                Expr::value(l.image.resource_type.as_str()),
            )
            .filter(listing::Column::Id.eq(l.id))
            .filter(listing::Column::ImageRemoteId.eq(previous_remote_id))
            .exec(&self.conn)
            .await?;

        if res.rows_affected > 0 {
            return Ok(());
        }
        if !self.exists(l.id).await? {
            return Err(DomainError::not_found("Listing", l.id));
        }
        Err(DomainError::conflict(format!(
            "image of listing {} changed concurrently",
            l.id
        )))
    }

    async fn set_active(
        &self,
        id: Uuid,
        is_active: bool,
        now: OffsetDateTime,
    ) -> Result<(), DomainError> {
        let res = listing::Entity::update_many()
            .col_expr(listing::Column::IsActive, Expr::value(is_active))
            .col_expr(listing::Column::UpdatedAt, Expr::value(now))
            .filter(listing::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        if res.rows_affected == 0 {
            return Err(DomainError::not_found("Listing", id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        let res = listing::Entity::delete_by_id(id).exec(&self.conn).await?;
        Ok(res.rows_affected > 0)
    }
}
