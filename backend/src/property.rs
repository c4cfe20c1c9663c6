use axum::extract::{Path, Query, State};
use axum::Json;
use log::{error, info, warn};
use reqwest::Url;
use serde::Serialize;

use crate::catalog::{CatalogPage, CatalogQuery};
use crate::error::AppError;
use crate::gallery::PLACEHOLDER_IMAGE;
use crate::models::Property;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PropertyDetail {
    #[serde(flatten)]
    pub property: Property,
    pub status_label: &'static str,
    pub price_label: String,
    /// Carousel images; the placeholder alone when the listing has none.
    pub carousel: Vec<String>,
    pub contact_url: Option<String>,
}

impl PropertyDetail {
    pub fn new(property: Property, contact_phone: &str) -> Self {
        let carousel = if property.images.is_empty() {
            vec![PLACEHOLDER_IMAGE.to_string()]
        } else {
            property.images.clone()
        };
        let price_label = if property.price.is_empty() {
            "Hubungi untuk harga".to_string()
        } else {
            format!("Rp{}", property.price)
        };

        PropertyDetail {
            status_label: property.status.label(),
            price_label,
            carousel,
            contact_url: contact_url(contact_phone, &property.title),
            property,
        }
    }
}

/// WhatsApp chat link prefilled with a question about `title`.
pub fn contact_url(phone: &str, title: &str) -> Option<String> {
    let text = format!("Halo, saya ingin tanya mengenai properti: {title}");
    match Url::parse_with_params(&format!("https://wa.me/{phone}"), &[("text", text)]) {
        Ok(url) => Some(url.into()),
        Err(e) => {
            warn!("Cannot build contact link for phone {}: {}", phone, e);
            None
        }
    }
}

/// Fetches the whole catalog, newest first, and filters it in memory.
pub async fn get_properties(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Json<CatalogPage> {
    let properties = match state.repo.list().await {
        Ok(props) => {
            info!("Successfully fetched {} properties", props.len());
            props
        }
        Err(e) => {
            error!("Failed to fetch properties: {}", e);
            Vec::new()
        }
    };

    Json(query.apply(properties))
}

/// Fetches a specific property by its slug
pub async fn get_property(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PropertyDetail>, AppError> {
    info!("Fetching property with slug: {}", slug);

    match state.repo.find_by_slug(&slug).await {
        Ok(Some(property)) => Ok(Json(PropertyDetail::new(
            property,
            &state.config.contact_phone,
        ))),
        Ok(None) => {
            warn!("No property found for slug: {}", slug);
            Err(AppError::NotFound(format!("Property {slug} not found")))
        }
        Err(e) => {
            error!("Failed to fetch property {}: {}", slug, e);
            Err(AppError::Internal(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PropertyStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn property(images: Vec<String>, price: &str) -> Property {
        Property {
            id: Uuid::new_v4(),
            slug: "lahan-jakbar-300".into(),
            title: "Lahan Siap Bangun 300 m²".into(),
            location: "Jakarta Barat".into(),
            size_m2: Some(300),
            price: price.into(),
            status: PropertyStatus::Reserved,
            description: String::new(),
            images,
            features: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn detail_without_images_shows_placeholder() {
        let detail = PropertyDetail::new(property(Vec::new(), ""), "6281234567890");
        assert_eq!(detail.carousel, vec![PLACEHOLDER_IMAGE.to_string()]);
        assert_eq!(detail.price_label, "Hubungi untuk harga");
        assert_eq!(detail.status_label, "Dipesan");
    }

    #[test]
    fn detail_keeps_image_order() {
        let images = vec!["b.jpg".to_string(), "a.jpg".to_string()];
        let detail = PropertyDetail::new(property(images.clone(), "3.600.000.000"), "62");
        assert_eq!(detail.carousel, images);
        assert_eq!(detail.price_label, "Rp3.600.000.000");
    }

    #[test]
    fn contact_url_encodes_title() {
        let url = contact_url("6281234567890", "Kavling & Ruko").unwrap();
        assert!(url.starts_with("https://wa.me/6281234567890?text="));
        assert!(url.contains("Kavling+%26+Ruko"));
        assert!(!url.contains(' '));
    }
}
