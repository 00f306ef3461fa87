//! Search options for property listings and the SQL they expand to.
//!
//! Every filter is optional and only narrows the result when it carries a
//! meaningful value: an empty city or a zero price/rating/owner is treated
//! as absent. Values are always bound, never spliced into the statement.

use serde::{Deserialize, Serialize};
use sqlx::{Postgres, QueryBuilder};

use crate::config::QueryConfig;
use crate::error::AppError;
use crate::Result;

/// Highest rating a review can carry.
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    /// Case-insensitive substring of the city name.
    pub city: Option<String>,
    pub owner_id: Option<i32>,
    /// Dollars.
    pub minimum_price_per_night: Option<f64>,
    /// Dollars.
    pub maximum_price_per_night: Option<f64>,
    pub minimum_rating: Option<f64>,
}

impl PropertyFilter {
    pub fn city(&self) -> Option<&str> {
        self.city.as_deref().filter(|c| !c.trim().is_empty())
    }

    pub fn owner_id(&self) -> Option<i32> {
        self.owner_id.filter(|id| *id != 0)
    }

    pub fn minimum_price_per_night(&self) -> Option<f64> {
        self.minimum_price_per_night.filter(|p| *p != 0.0)
    }

    pub fn maximum_price_per_night(&self) -> Option<f64> {
        self.maximum_price_per_night.filter(|p| *p != 0.0)
    }

    pub fn minimum_rating(&self) -> Option<f64> {
        self.minimum_rating.filter(|r| *r != 0.0)
    }

    /// Rejects values that cannot describe a real search.
    pub fn validate(&self) -> Result<()> {
        if let Some(owner_id) = self.owner_id() {
            if owner_id < 0 {
                return Err(AppError::ValidationError(format!(
                    "owner_id must be positive, got {}",
                    owner_id
                )));
            }
        }

        let min = Self::price_in_cents("minimum_price_per_night", self.minimum_price_per_night())?;
        let max = Self::price_in_cents("maximum_price_per_night", self.maximum_price_per_night())?;
        // Compared after rounding, the same way the store sees them.
        if let (Some(min), Some(max)) = (min, max) {
            if min > max {
                return Err(AppError::ValidationError(format!(
                    "minimum_price_per_night ({} cents) exceeds maximum_price_per_night ({} cents)",
                    min, max
                )));
            }
        }

        if let Some(rating) = self.minimum_rating() {
            if !rating.is_finite() || !(0.0..=MAX_RATING).contains(&rating) {
                return Err(AppError::ValidationError(format!(
                    "minimum_rating must be between 0 and {}, got {}",
                    MAX_RATING, rating
                )));
            }
        }

        Ok(())
    }

    fn price_in_cents(name: &str, dollars: Option<f64>) -> Result<Option<i64>> {
        dollars
            .map(dollars_to_cents)
            .transpose()
            .map_err(|e| match e {
                AppError::ValidationError(msg) => {
                    AppError::ValidationError(format!("{}: {}", name, msg))
                }
                other => other,
            })
    }
}

/// Converts a dollar amount to cents, rounding to the nearest cent.
pub fn dollars_to_cents(dollars: f64) -> Result<i64> {
    if !dollars.is_finite() || dollars < 0.0 {
        return Err(AppError::ValidationError(format!(
            "price must be a non-negative amount, got {}",
            dollars
        )));
    }

    let cents = (dollars * 100.0).round();
    if cents > i32::MAX as f64 {
        return Err(AppError::ValidationError(format!(
            "price {} is out of range",
            dollars
        )));
    }

    Ok(cents as i64)
}

/// Escapes LIKE wildcards so user input matches literally.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Picks the configured default when no limit is given and bounds the rest.
pub fn resolve_limit(limit: Option<i64>, config: &QueryConfig) -> Result<i64> {
    let limit = limit.unwrap_or(config.default_limit);
    if !(1..=config.max_limit).contains(&limit) {
        return Err(AppError::ValidationError(format!(
            "limit must be between 1 and {}, got {}",
            config.max_limit, limit
        )));
    }
    Ok(limit)
}

/// Builds the listing query. The filter must already be validated.
pub(crate) fn property_listing_query(
    filter: &PropertyFilter,
    limit: i64,
) -> Result<QueryBuilder<'static, Postgres>> {
    let mut query = QueryBuilder::new(
        "SELECT properties.*, AVG(property_reviews.rating)::float8 AS average_rating \
         FROM properties \
         JOIN property_reviews ON properties.id = property_reviews.property_id",
    );

    let mut conjunction = " WHERE ";
    if let Some(city) = filter.city() {
        query
            .push(conjunction)
            .push("properties.city ILIKE ")
            .push_bind(format!("%{}%", escape_like(city)));
        conjunction = " AND ";
    }
    if let Some(owner_id) = filter.owner_id() {
        query
            .push(conjunction)
            .push("properties.owner_id = ")
            .push_bind(owner_id);
        conjunction = " AND ";
    }
    if let Some(min) = filter.minimum_price_per_night() {
        query
            .push(conjunction)
            .push("properties.cost_per_night >= ")
            .push_bind(dollars_to_cents(min)?);
        conjunction = " AND ";
    }
    if let Some(max) = filter.maximum_price_per_night() {
        query
            .push(conjunction)
            .push("properties.cost_per_night <= ")
            .push_bind(dollars_to_cents(max)?);
    }

    query.push(" GROUP BY properties.id");

    // Aggregate predicate: the average only exists after grouping.
    if let Some(rating) = filter.minimum_rating() {
        query
            .push(" HAVING AVG(property_reviews.rating) >= ")
            .push_bind(rating);
    }

    query
        .push(" ORDER BY properties.cost_per_night LIMIT ")
        .push_bind(limit);

    Ok(query)
}
