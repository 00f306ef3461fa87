use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, error};

use crate::config::{DatabaseConfig, QueryConfig};
use crate::db::filters::{property_listing_query, resolve_limit, PropertyFilter};
use crate::db::models::{GuestReservation, NewProperty, NewUser, Property, PropertyListing, User};
use crate::error::AppError;
use crate::Result;

const GUEST_RESERVATIONS_SQL: &str = r#"
    SELECT reservations.id, reservations.guest_id, reservations.property_id,
           reservations.start_date, reservations.end_date,
           properties.title, properties.description, properties.thumbnail_photo_url,
           properties.cover_photo_url, properties.cost_per_night, properties.parking_spaces,
           properties.number_of_bathrooms, properties.number_of_bedrooms, properties.country,
           properties.street, properties.city, properties.province, properties.post_code,
           AVG(property_reviews.rating)::float8 AS average_rating
    FROM reservations
    JOIN properties ON reservations.property_id = properties.id
    JOIN property_reviews ON properties.id = property_reviews.property_id
    WHERE reservations.guest_id = $1
    GROUP BY reservations.id, properties.id
    ORDER BY reservations.start_date
    LIMIT $2
"#;

const INSERT_PROPERTY_SQL: &str = r#"
    INSERT INTO properties (
        owner_id, title, description, thumbnail_photo_url, cover_photo_url,
        cost_per_night, street, city, province, post_code, country,
        parking_spaces, number_of_bathrooms, number_of_bedrooms
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
    RETURNING *
"#;

/// Opens the shared pool sized and timed by `config`.
pub async fn connect_pool(config: &DatabaseConfig) -> std::result::Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect(&config.url)
        .await
}

/// Logs a failed statement on the way out so callers still get the error.
fn log_failure(operation: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        error!(operation, error = %e, "query failed");
        e.into()
    }
}

/// Query service over the LightBnB schema. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct DbOperations {
    pool: Arc<PgPool>,
    limits: QueryConfig,
}

impl DbOperations {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self::with_limits(pool, QueryConfig::default())
    }

    pub fn with_limits(pool: Arc<PgPool>, limits: QueryConfig) -> Self {
        Self { pool, limits }
    }

    pub fn pool(&self) -> &PgPool {
        self.pool.as_ref()
    }

    pub fn limits(&self) -> QueryConfig {
        self.limits
    }

    pub async fn get_pool_status(&self) -> Result<DbPoolStatus> {
        let size = self.pool.size();
        let idle = self.pool.num_idle() as u32;
        let active = size.saturating_sub(idle);

        Ok(DbPoolStatus {
            total_connections: size,
            active_connections: active,
            idle_connections: idle,
        })
    }

    /// Round-trips a trivial statement to prove the store is reachable.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map_err(log_failure("ping"))?;
        Ok(())
    }

    /// Looks a user up by email, ignoring case.
    #[tracing::instrument(skip(self))]
    pub async fn get_user_with_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password FROM users WHERE LOWER(email) = LOWER($1)",
        )
        .bind(email)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(log_failure("get_user_with_email"))?;

        debug!(found = user.is_some(), "user lookup by email");
        Ok(user)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_user_with_id(&self, id: i32) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, password FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(log_failure("get_user_with_id"))?;

        debug!(found = user.is_some(), "user lookup by id");
        Ok(user)
    }

    /// Inserts a user. Duplicate emails are rejected by the store, not checked here.
    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    pub async fn add_user(&self, user: &NewUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) \
             RETURNING id, name, email, password",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(log_failure("add_user"))?;

        debug!(user_id = user.id, "user created");
        Ok(user)
    }

    /// Reservations for a guest, earliest first, each with its property and average rating.
    ///
    /// Reservations on properties without any review are not returned.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_reservations(
        &self,
        guest_id: i32,
        limit: Option<i64>,
    ) -> Result<Vec<GuestReservation>> {
        let limit = resolve_limit(limit, &self.limits)?;

        let reservations = sqlx::query_as::<_, GuestReservation>(GUEST_RESERVATIONS_SQL)
            .bind(guest_id)
            .bind(limit)
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(log_failure("get_all_reservations"))?;

        debug!(count = reservations.len(), "guest reservations loaded");
        Ok(reservations)
    }

    /// Reviewed properties matching `filter`, cheapest first.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_properties(
        &self,
        filter: &PropertyFilter,
        limit: Option<i64>,
    ) -> Result<Vec<PropertyListing>> {
        filter.validate()?;
        let limit = resolve_limit(limit, &self.limits)?;

        let mut query = property_listing_query(filter, limit)?;
        debug!(sql = query.sql(), "property search");

        let listings = query
            .build_query_as::<PropertyListing>()
            .fetch_all(self.pool.as_ref())
            .await
            .map_err(log_failure("get_all_properties"))?;

        debug!(count = listings.len(), "property listings loaded");
        Ok(listings)
    }

    #[tracing::instrument(skip(self, property), fields(owner_id = property.owner_id, title = %property.title))]
    pub async fn add_property(&self, property: &NewProperty) -> Result<Property> {
        let property = sqlx::query_as::<_, Property>(INSERT_PROPERTY_SQL)
            .bind(property.owner_id)
            .bind(&property.title)
            .bind(&property.description)
            .bind(&property.thumbnail_photo_url)
            .bind(&property.cover_photo_url)
            .bind(property.cost_per_night)
            .bind(&property.street)
            .bind(&property.city)
            .bind(&property.province)
            .bind(&property.post_code)
            .bind(&property.country)
            .bind(property.parking_spaces)
            .bind(property.number_of_bathrooms)
            .bind(property.number_of_bedrooms)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(log_failure("add_property"))?;

        debug!(property_id = property.id, "property created");
        Ok(property)
    }
}

#[derive(Debug, Clone)]
pub struct DbPoolStatus {
    pub total_connections: u32,
    pub active_connections: u32,
    pub idle_connections: u32,
}
