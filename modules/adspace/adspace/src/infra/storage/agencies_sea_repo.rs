use adspace_sdk::{Agency, AgencyProfilePatch};
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::db::insert_err;
use super::entity::agency;
use super::mapper::agency_to_active_model;
use crate::domain::error::DomainError;
use crate::domain::repo::{AgenciesRepository, MediaSwap};
use crate::domain::subscription::{Renewal, TrialWindow};

/// `SeaORM` implementation of `AgenciesRepository`.
#[derive(Clone)]
pub struct SeaOrmAgenciesRepository {
    conn: DatabaseConnection,
}

impl SeaOrmAgenciesRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Explains an update that matched no row: the agency is gone, or the
    /// media column no longer holds the reference the caller read.
    async fn lost_swap(&self, id: Uuid, field: &str) -> DomainError {
        match agency::Entity::find_by_id(id).one(&self.conn).await {
            Ok(Some(_)) => {
                DomainError::conflict(format!("{field} of agency {id} changed concurrently"))
            }
            Ok(None) => DomainError::not_found("Agency", id),
            Err(e) => e.into(),
        }
    }
}

#[async_trait]
impl AgenciesRepository for SeaOrmAgenciesRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Agency>, DomainError> {
        let found = agency::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, a: &Agency) -> Result<(), DomainError> {
        agency::Entity::insert(agency_to_active_model(a))
            .exec_without_returning(&self.conn)
            .await
            .map_err(|e| insert_err("Agency", e))?;
        Ok(())
    }

    async fn set_trial_window(&self, id: Uuid, window: TrialWindow) -> Result<(), DomainError> {
        // updated_at is left alone so that concurrent backfills write identical rows.
        let res = agency::Entity::update_many()
            .col_expr(
                agency::Column::TrialStartedAt,
                Expr::value(window.trial_started_at),
            )
            .col_expr(agency::Column::TrialEndsAt, Expr::value(window.trial_ends_at))
            .filter(agency::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;
        debug!(agency_id = %id, rows = res.rows_affected, "Trial window written");
        Ok(())
    }

    async fn set_subscription(
        &self,
        id: Uuid,
        renewal: &Renewal,
        now: OffsetDateTime,
    ) -> Result<(), DomainError> {
        let res = agency::Entity::update_many()
            .col_expr(
                agency::Column::SubscriptionEndsAt,
                Expr::value(renewal.subscription_ends_at),
            )
            .col_expr(
                agency::Column::SubscriptionPlan,
                Expr::value(renewal.plan_name.clone()),
            )
            .col_expr(agency::Column::UpdatedAt, Expr::value(now))
            .filter(agency::Column::Id.eq(id))
            .exec(&self.conn)
            .await?;

        if res.rows_affected == 0 {
            return Err(DomainError::not_found("Agency", id));
        }
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: &AgencyProfilePatch,
        logo: Option<MediaSwap<'_>>,
        now: OffsetDateTime,
    ) -> Result<(), DomainError> {
        let mut update = agency::Entity::update_many()
            .col_expr(agency::Column::UpdatedAt, Expr::value(now))
            .filter(agency::Column::Id.eq(id));

        if let Some(name) = &patch.name {
            update = update.col_expr(agency::Column::Name, Expr::value(name.clone()));
        }
        if let Some(description) = &patch.description {
            update = update.col_expr(
                agency::Column::Description,
                Expr::value(description.clone()),
            );
        }
        if let Some(website) = &patch.website {
            update = update.col_expr(agency::Column::Website, Expr::value(website.clone()));
        }
        if let Some(swap) = logo {
            let logo = swap.next;
            update = update
                .col_expr(agency::Column::LogoUrl, Expr::value(logo.url.clone()))
                .col_expr(
                    agency::Column::LogoRemoteId,
                    Expr::value(logo.remote_id.clone()),
                )
                .col_expr(
                    agency::Column::LogoResourceType,
                    Expr::value(logo.resource_type.as_str()),
                )
                .filter(match swap.previous {
                    Some(previous) => agency::Column::LogoRemoteId.eq(previous),
                    None => agency::Column::LogoRemoteId.is_null(),
                });
        }

        let res = update.exec(&self.conn).await?;
        if res.rows_affected == 0 {
            return Err(self.lost_swap(id, "logo").await);
        }
        Ok(())
    }

    async fn set_verification_document(
        &self,
        id: Uuid,
        document: MediaSwap<'_>,
        now: OffsetDateTime,
    ) -> Result<(), DomainError> {
        let next = document.next;
        let res = agency::Entity::update_many()
            .col_expr(
                agency::Column::VerificationDocumentUrl,
                Expr::value(next.url.clone()),
            )
            .col_expr(
                agency::Column::VerificationDocumentRemoteId,
                Expr::value(next.remote_id.clone()),
            )
            .col_expr(
                agency::Column::VerificationDocumentResourceType,
                Expr::value(next.resource_type.as_str()),
            )
            .col_expr(agency::Column::UpdatedAt, Expr::value(now))
            .filter(agency::Column::Id.eq(id))
            .filter(match document.previous {
                Some(previous) => agency::Column::VerificationDocumentRemoteId.eq(previous),
                None => agency::Column::VerificationDocumentRemoteId.is_null(),
            })
            .exec(&self.conn)
            .await?;

        if res.rows_affected == 0 {
            return Err(self.lost_swap(id, "verification document").await);
        }
        Ok(())
    }
}
