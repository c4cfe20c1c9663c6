use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::gallery::Gallery;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyStatus {
    #[default]
    Available,
    Reserved,
    Sold,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Reserved => "reserved",
            PropertyStatus::Sold => "sold",
        }
    }

    /// Label shown on cards and the detail page.
    pub fn label(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "Tersedia",
            PropertyStatus::Reserved => "Dipesan",
            PropertyStatus::Sold => "Terjual",
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(PropertyStatus::Available),
            "reserved" => Ok(PropertyStatus::Reserved),
            "sold" => Ok(PropertyStatus::Sold),
            other => Err(format!("unknown property status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub location: String,
    pub size_m2: Option<i32>,
    pub price: String,
    pub status: PropertyStatus,
    pub description: String,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::properties)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PropertyRow {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub location: Option<String>,
    pub size_m2: Option<i32>,
    pub price: Option<String>,
    pub status: String,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        let status = row.status.parse().unwrap_or_else(|e| {
            log::warn!("Property {} has {}; treating as available", row.slug, e);
            PropertyStatus::Available
        });

        Property {
            id: row.id,
            slug: row.slug,
            title: row.title,
            location: row.location.unwrap_or_default(),
            size_m2: row.size_m2,
            price: row.price.unwrap_or_default(),
            status,
            description: row.description.unwrap_or_default(),
            images: row.images.unwrap_or_default(),
            features: row.features.unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

/// Editable columns written by the admin surface. `features` is never
/// written here.
#[derive(Debug, Clone, PartialEq, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::properties)]
#[diesel(treat_none_as_null = true)]
pub struct PropertyChanges {
    pub slug: String,
    pub title: String,
    pub location: Option<String>,
    pub size_m2: Option<i32>,
    pub price: Option<String>,
    pub status: String,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ImagesField {
    List(Vec<String>),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SizeField {
    Number(i64),
    Text(String),
}

/// Payload accepted by the mutation endpoint; mirrors the admin form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PropertyInput {
    pub slug: String,
    pub title: String,
    pub location: String,
    pub size_m2: Option<SizeField>,
    pub price: String,
    pub status: PropertyStatus,
    pub description: String,
    pub images: Option<ImagesField>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Slug and title are required")]
    MissingSlugOrTitle,
}

impl PropertyInput {
    pub fn into_changes(self) -> Result<PropertyChanges, InputError> {
        let slug = self.slug.trim().to_string();
        let title = self.title.trim().to_string();
        if slug.is_empty() || title.is_empty() {
            return Err(InputError::MissingSlugOrTitle);
        }

        let size_m2 = match self.size_m2 {
            Some(SizeField::Number(n)) => i32::try_from(n).ok().filter(|n| *n >= 0),
            Some(SizeField::Text(text)) => parse_size(&text),
            None => None,
        };

        let images = match self.images {
            Some(ImagesField::List(list)) => Gallery::from_urls(list),
            Some(ImagesField::Text(text)) => Gallery::parse(&text),
            None => Gallery::default(),
        };

        Ok(PropertyChanges {
            slug,
            title,
            location: Some(self.location),
            size_m2,
            price: Some(self.price),
            status: self.status.to_string(),
            description: Some(self.description),
            images: (!images.is_empty()).then(|| images.into_vec()),
        })
    }
}

/// Random 11-character alphanumeric slug for new listings.
pub fn generate_slug() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(11)
        .map(char::from)
        .collect()
}

/// Parses the leading digits of a size field: `"200 m2"` is 200, anything
/// without leading digits (including negatives) is unset.
pub fn parse_size(text: &str) -> Option<i32> {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> PropertyRow {
        PropertyRow {
            id: Uuid::new_v4(),
            slug: "kavling-puri-indah-200".into(),
            title: "Kavling Puri Indah 200 m²".into(),
            location: None,
            size_m2: Some(200),
            price: None,
            status: "reserved".into(),
            description: None,
            images: None,
            features: Some(vec!["SHM".into()]),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn row_nulls_read_back_as_empty() {
        let property = Property::from(row());
        assert_eq!(property.location, "");
        assert_eq!(property.price, "");
        assert_eq!(property.description, "");
        assert!(property.images.is_empty());
        assert_eq!(property.features, vec!["SHM".to_string()]);
        assert_eq!(property.status, PropertyStatus::Reserved);
    }

    #[test]
    fn unknown_status_reads_as_available() {
        let mut row = row();
        row.status = "archived".into();
        assert_eq!(Property::from(row).status, PropertyStatus::Available);
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in [
            PropertyStatus::Available,
            PropertyStatus::Reserved,
            PropertyStatus::Sold,
        ] {
            assert_eq!(status.as_str().parse::<PropertyStatus>(), Ok(status));
        }
        assert_eq!(PropertyStatus::Sold.label(), "Terjual");
    }

    #[test]
    fn generated_slugs_are_alphanumeric() {
        let slug = generate_slug();
        assert_eq!(slug.len(), 11);
        assert!(slug.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(generate_slug(), slug);
    }

    #[test]
    fn parse_size_takes_leading_digits() {
        assert_eq!(parse_size("200"), Some(200));
        assert_eq!(parse_size(" 150 m2"), Some(150));
        assert_eq!(parse_size("luas 300"), None);
        assert_eq!(parse_size("-5"), None);
        assert_eq!(parse_size(""), None);
    }

    #[test]
    fn input_from_form_strings() {
        let input: PropertyInput = serde_json::from_value(serde_json::json!({
            "slug": "abc",
            "title": "Rumah",
            "size_m2": "120",
            "price": "1.500.000.000",
            "status": "sold",
            "images": "a.jpg, b.jpg,  , c.jpg"
        }))
        .unwrap();

        let changes = input.into_changes().unwrap();
        assert_eq!(changes.size_m2, Some(120));
        assert_eq!(changes.status, "sold");
        assert_eq!(
            changes.images,
            Some(vec!["a.jpg".into(), "b.jpg".into(), "c.jpg".into()])
        );
    }

    #[test]
    fn input_from_typed_json() {
        let input: PropertyInput = serde_json::from_value(serde_json::json!({
            "slug": "abc",
            "title": "Rumah",
            "size_m2": -4,
            "images": []
        }))
        .unwrap();

        let changes = input.into_changes().unwrap();
        assert_eq!(changes.size_m2, None);
        assert_eq!(changes.images, None);
        assert_eq!(changes.status, "available");
    }

    #[test]
    fn input_requires_slug_and_title() {
        let input = PropertyInput {
            slug: "abc".into(),
            title: "   ".into(),
            ..Default::default()
        };
        assert_eq!(input.into_changes(), Err(InputError::MissingSlugOrTitle));
    }
}
