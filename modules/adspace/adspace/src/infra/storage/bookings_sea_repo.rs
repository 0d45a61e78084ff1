use adspace_sdk::{Booking, BookingStatus, RankedAgency};
use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait,
};
use time::OffsetDateTime;
use uuid::Uuid;

use super::entity::{agency, booking};
use super::mapper::booking_to_active_model;
use crate::domain::error::DomainError;
use crate::domain::repo::BookingsRepository;

/// `SeaORM` implementation of `BookingsRepository`.
#[derive(Clone)]
pub struct SeaOrmBookingsRepository {
    conn: DatabaseConnection,
}

impl SeaOrmBookingsRepository {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }
}

#[derive(Debug, FromQueryResult)]
struct RankedRow {
    agency_id: Uuid,
    agency_name: String,
    logo_url: Option<String>,
    booking_count: i64,
}

impl From<RankedRow> for RankedAgency {
    fn from(r: RankedRow) -> Self {
        Self {
            agency_id: r.agency_id,
            agency_name: r.agency_name,
            logo_url: r.logo_url,
            booking_count: u64::try_from(r.booking_count).unwrap_or(0),
        }
    }
}

#[async_trait]
impl BookingsRepository for SeaOrmBookingsRepository {
    async fn get(&self, id: Uuid) -> Result<Option<Booking>, DomainError> {
        let found = booking::Entity::find_by_id(id).one(&self.conn).await?;
        Ok(found.map(Into::into))
    }

    async fn insert(&self, b: &Booking) -> Result<(), DomainError> {
        booking::Entity::insert(booking_to_active_model(b))
            .exec_without_returning(&self.conn)
            .await?;
        Ok(())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        expected: Option<BookingStatus>,
        now: OffsetDateTime,
    ) -> Result<bool, DomainError> {
        let mut update = booking::Entity::update_many()
            .col_expr(booking::Column::Status, Expr::value(booking::Status::from(status)))
            .col_expr(booking::Column::UpdatedAt, Expr::value(now))
            .filter(booking::Column::Id.eq(id));
        if let Some(expected) = expected {
            update = update.filter(booking::Column::Status.eq(booking::Status::from(expected)));
        }

        let res = update.exec(&self.conn).await?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_pending(&self, id: Uuid) -> Result<bool, DomainError> {
        let res = booking::Entity::delete_many()
            .filter(booking::Column::Id.eq(id))
            .filter(booking::Column::Status.eq(booking::Status::Pending))
            .exec(&self.conn)
            .await?;
        Ok(res.rows_affected > 0)
    }

    async fn count_for_listing(&self, listing_id: Uuid) -> Result<u64, DomainError> {
        let count = booking::Entity::find()
            .filter(booking::Column::ListingId.eq(listing_id))
            .count(&self.conn)
            .await?;
        Ok(count)
    }

    async fn top_agencies(&self, limit: u64) -> Result<Vec<RankedAgency>, DomainError> {
        let rows = booking::Entity::find()
            .select_only()
            .column(booking::Column::AgencyId)
            .column_as(agency::Column::Name, "agency_name")
            .column_as(agency::Column::LogoUrl, "logo_url")
            .column_as(booking::Column::Id.count(), "booking_count")
            .join(JoinType::InnerJoin, booking::Relation::Agency.def())
            .group_by(booking::Column::AgencyId)
            .group_by(agency::Column::Name)
            .group_by(agency::Column::LogoUrl)
            .order_by_desc(booking::Column::Id.count())
            .order_by_asc(booking::Column::AgencyId)
            .limit(limit)
            .into_model::<RankedRow>()
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
