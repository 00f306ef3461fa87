use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// Already hashed by the caller; never logged.
    #[serde(skip_serializing)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Property {
    pub id: i32,
    pub owner_id: i32,
    pub title: String,
    pub description: String,
    pub thumbnail_photo_url: String,
    pub cover_photo_url: String,
    /// Minor units (cents).
    pub cost_per_night: i32,
    pub parking_spaces: i32,
    pub number_of_bathrooms: i32,
    pub number_of_bedrooms: i32,
    pub country: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
    pub active: bool,
}

/// Insertable property fields. `cost_per_night` is in minor units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProperty {
    pub owner_id: i32,
    pub title: String,
    pub description: String,
    pub thumbnail_photo_url: String,
    pub cover_photo_url: String,
    pub cost_per_night: i32,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
    pub country: String,
    pub parking_spaces: i32,
    pub number_of_bathrooms: i32,
    pub number_of_bedrooms: i32,
}

/// A property together with the average of its review ratings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PropertyListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub property: Property,
    pub average_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    pub id: i32,
    pub guest_id: i32,
    pub property_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// A guest's reservation joined with the reserved property and its rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct GuestReservation {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub reservation: Reservation,
    pub title: String,
    pub description: String,
    pub thumbnail_photo_url: String,
    pub cover_photo_url: String,
    pub cost_per_night: i32,
    pub parking_spaces: i32,
    pub number_of_bathrooms: i32,
    pub number_of_bedrooms: i32,
    pub country: String,
    pub street: String,
    pub city: String,
    pub province: String,
    pub post_code: String,
    pub average_rating: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_property() -> Property {
        Property {
            id: 7,
            owner_id: 3,
            title: "Speed lamp".into(),
            description: "description".into(),
            thumbnail_photo_url: "https://images.example.com/thumb.jpg".into(),
            cover_photo_url: "https://images.example.com/cover.jpg".into(),
            cost_per_night: 93061,
            parking_spaces: 6,
            number_of_bathrooms: 4,
            number_of_bedrooms: 8,
            country: "Canada".into(),
            street: "536 Namsub Highway".into(),
            city: "Sotboske".into(),
            province: "Quebec".into(),
            post_code: "28142".into(),
            active: true,
        }
    }

    #[test]
    fn test_listing_serializes_flat() {
        let listing = PropertyListing {
            property: sample_property(),
            average_rating: 4.25,
        };

        let value = serde_json::to_value(&listing).unwrap();
        assert_eq!(value["id"], json!(7));
        assert_eq!(value["cost_per_night"], json!(93061));
        assert_eq!(value["average_rating"], json!(4.25));
        assert!(value.get("property").is_none());
    }

    #[test]
    fn test_user_password_not_serialized() {
        let user = User {
            id: 1,
            name: "Devin Sanders".into(),
            email: "tristanjacobs@gmail.com".into(),
            password: "$2a$10$FB/BOAVhpuLvpOREQVmvmezD4ED/.JBIDRh70tGevYzYzQgFId2u.".into(),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["email"], json!("tristanjacobs@gmail.com"));
        assert!(value.get("password").is_none());
    }

    #[test]
    fn test_guest_reservation_serializes_dates() {
        let reservation = GuestReservation {
            reservation: Reservation {
                id: 1,
                guest_id: 1,
                property_id: 7,
                start_date: NaiveDate::from_ymd_opt(2018, 9, 11).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2018, 9, 26).unwrap(),
            },
            title: "Speed lamp".into(),
            description: "description".into(),
            thumbnail_photo_url: String::new(),
            cover_photo_url: String::new(),
            cost_per_night: 93061,
            parking_spaces: 6,
            number_of_bathrooms: 4,
            number_of_bedrooms: 8,
            country: "Canada".into(),
            street: "536 Namsub Highway".into(),
            city: "Sotboske".into(),
            province: "Quebec".into(),
            post_code: "28142".into(),
            average_rating: 3.0,
        };

        let value = serde_json::to_value(&reservation).unwrap();
        assert_eq!(value["start_date"], json!("2018-09-11"));
        assert_eq!(value["property_id"], json!(7));
        assert_eq!(value["average_rating"], json!(3.0));
    }
}
