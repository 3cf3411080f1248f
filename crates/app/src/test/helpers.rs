//! Test Helpers

use crate::domain::orders::data::ShippingAddress;

pub(crate) fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        name: "Dana Reyes".to_string(),
        line1: "12 Harbor Rd".to_string(),
        line2: Some("Suite 4".to_string()),
        city: "Portland".to_string(),
        region: Some("OR".to_string()),
        postal_code: "97201".to_string(),
        country: "US".to_string(),
    }
}
