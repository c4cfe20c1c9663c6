//! Search, price bands and sorting over the fetched catalog.
//!
//! The whole table is fetched on every request and filtered in memory; the
//! catalog is expected to stay small.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::gallery::cover_image;
use crate::models::Property;

const FIVE_HUNDRED_MILLION: u64 = 500_000_000;
const ONE_BILLION: u64 = 1_000_000_000;
const TWO_BILLION: u64 = 2_000_000_000;

/// Best-effort numeric price: every non-digit is stripped, so
/// `"2.500.000.000"` becomes 2500000000. Returns `None` when no digits are
/// left or the number does not fit.
pub fn parse_price(price: &str) -> Option<u64> {
    let digits: String = price.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Formats a price as `Rp1,234,567.00`.
pub fn format_rupiah(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("Rp{grouped}.00")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum PriceBand {
    #[default]
    #[serde(rename = "all")]
    All,
    #[serde(rename = "under500")]
    Under500M,
    #[serde(rename = "500to1")]
    From500MTo1B,
    #[serde(rename = "1to2")]
    From1BTo2B,
    #[serde(rename = "over2")]
    Over2B,
}

impl PriceBand {
    /// Unparseable prices pass every band.
    pub fn admits(&self, price: Option<u64>) -> bool {
        let Some(price) = price else {
            return true;
        };
        match self {
            PriceBand::All => true,
            PriceBand::Under500M => price < FIVE_HUNDRED_MILLION,
            PriceBand::From500MTo1B => (FIVE_HUNDRED_MILLION..=ONE_BILLION).contains(&price),
            PriceBand::From1BTo2B => (ONE_BILLION..=TWO_BILLION).contains(&price),
            PriceBand::Over2B => price > TWO_BILLION,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Server order, newest first.
    #[default]
    Newest,
    Cheap,
    Expensive,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogQuery {
    pub q: Option<String>,
    pub price: PriceBand,
    pub sort: SortOrder,
}

/// A property card as shown in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    #[serde(flatten)]
    pub property: Property,
    pub price_number: Option<u64>,
    pub price_label: String,
    pub status_label: &'static str,
    pub cover_image: String,
}

impl From<Property> for Listing {
    fn from(property: Property) -> Self {
        let price_number = parse_price(&property.price);
        let price_label = match price_number {
            Some(value) if value > 0 => format_rupiah(value),
            _ => "Harga nego".to_string(),
        };

        Listing {
            price_number,
            price_label,
            status_label: property.status.label(),
            cover_image: cover_image(&property.images).to_string(),
            property,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CatalogPage {
    pub total: usize,
    pub shown: usize,
    pub properties: Vec<Listing>,
}

impl CatalogQuery {
    fn matches_text(&self, listing: &Listing) -> bool {
        let term = match self.q.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => term.to_lowercase(),
            _ => return true,
        };
        listing.property.title.to_lowercase().contains(&term)
            || listing.property.location.to_lowercase().contains(&term)
    }

    /// Filters and orders `properties`, which must arrive newest first.
    pub fn apply(&self, properties: Vec<Property>) -> CatalogPage {
        let total = properties.len();

        let mut listings: Vec<Listing> = properties
            .into_iter()
            .map(Listing::from)
            .filter(|listing| self.matches_text(listing))
            .filter(|listing| self.price.admits(listing.price_number))
            .collect();

        match self.sort {
            SortOrder::Newest => {}
            SortOrder::Cheap => {
                listings.sort_by(|a, b| compare_prices(a.price_number, b.price_number, false))
            }
            SortOrder::Expensive => {
                listings.sort_by(|a, b| compare_prices(a.price_number, b.price_number, true))
            }
        }

        CatalogPage {
            total,
            shown: listings.len(),
            properties: listings,
        }
    }
}

/// Unparseable prices go last when ascending and first when descending.
fn compare_prices(a: Option<u64>, b: Option<u64>, descending: bool) -> Ordering {
    let ascending = match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    };
    if descending {
        ascending.reverse()
    } else {
        ascending
    }
}
