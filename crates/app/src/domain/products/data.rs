//! Products Data

use std::str::FromStr;

use thiserror::Error;

use crate::domain::products::records::ProductUuid;

/// New Product Data
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub uuid: ProductUuid,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub price: u64,
}

/// Product Update Data
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub name: String,
    pub category: String,
    pub price: u64,
}

/// Catalog ordering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductSort {
    #[default]
    Name,
    PriceAsc,
    PriceDesc,
    Newest,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown product sort {0:?}")]
pub struct UnknownSort(pub String);

impl ProductSort {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Newest => "newest",
        }
    }
}

impl FromStr for ProductSort {
    type Err = UnknownSort;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Self::Name),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "newest" => Ok(Self::Newest),
            other => Err(UnknownSort(other.to_string())),
        }
    }
}

/// Catalog listing filter. Unset fields do not restrict the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    /// Exact category match.
    pub category: Option<String>,

    /// Case-insensitive substring of the name or SKU.
    pub q: Option<String>,

    /// Inclusive lower price bound in minor units.
    pub min_price: Option<u64>,

    /// Inclusive upper price bound in minor units.
    pub max_price: Option<u64>,

    pub sort: ProductSort,
}
