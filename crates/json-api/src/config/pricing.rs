//! Pricing Config

use clap::Args;
use scrubline_app::pricing::{StorePricing, StorePricingError};

/// Store pricing settings.
#[derive(Debug, Args)]
pub struct PricingConfig {
    /// ISO 4217 store currency
    #[arg(long, env = "STORE_CURRENCY", default_value = "USD")]
    pub currency: String,

    /// Orders above this subtotal (minor units) ship free
    #[arg(long, env = "FREE_SHIPPING_THRESHOLD", default_value_t = 50_00)]
    pub free_shipping_threshold: u64,

    /// Shipping fee (minor units) below the threshold
    #[arg(long, env = "FLAT_SHIPPING_FEE", default_value_t = 7_95)]
    pub flat_shipping_fee: u64,

    /// Tax rate in basis points (875 is 8.75%)
    #[arg(long, env = "TAX_RATE_BPS", default_value_t = 875)]
    pub tax_rate_bps: u32,
}

impl PricingConfig {
    /// Validated store pricing.
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown currency or an out of range amount or rate.
    pub fn store_pricing(&self) -> Result<StorePricing, StorePricingError> {
        StorePricing::new(
            &self.currency,
            self.free_shipping_threshold,
            self.flat_shipping_fee,
            self.tax_rate_bps,
        )
    }
}
