//! Order Data

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{
    domain::{
        orders::records::{OrderItemUuid, OrderUuid},
        owners::Owner,
        products::records::ProductUuid,
    },
    pricing::CartTotals,
};

/// Where an order is shipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    pub name: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub region: Option<String>,
    pub postal_code: String,
    pub country: String,
}

/// A required address field that was left blank.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("shipping address {0} is required")]
pub struct MissingAddressField(pub &'static str);

impl ShippingAddress {
    /// Check that every required field has content.
    ///
    /// # Errors
    ///
    /// Returns the first blank required field.
    pub fn validate(&self) -> Result<(), MissingAddressField> {
        let required = [
            ("name", &self.name),
            ("line1", &self.line1),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ];

        match required
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
        {
            Some((field, _)) => Err(MissingAddressField(field)),
            None => Ok(()),
        }
    }
}

/// Payment stub recorded with an order. No payment is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Card,
    BankTransfer,
    CashOnDelivery,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown payment method {0:?}")]
pub struct UnknownPaymentMethod(pub String);

impl PaymentMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
            Self::CashOnDelivery => "cash_on_delivery",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "bank_transfer" => Ok(Self::BankTransfer),
            "cash_on_delivery" => Ok(Self::CashOnDelivery),
            other => Err(UnknownPaymentMethod(other.to_string())),
        }
    }
}

/// New Order Data
#[derive(Debug, Clone)]
pub(crate) struct NewOrder {
    pub uuid: OrderUuid,
    pub owner: Owner,
    pub totals: CartTotals,
    pub coupon_code: Option<String>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// New Order Item Data
#[derive(Debug, Clone)]
pub(crate) struct NewOrderItem {
    pub uuid: OrderItemUuid,
    pub product_uuid: ProductUuid,
    pub sku: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: u64,
    pub line_total: u64,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            name: "Dana Reyes".to_string(),
            line1: "12 Harbor Rd".to_string(),
            line2: None,
            city: "Portland".to_string(),
            region: Some("OR".to_string()),
            postal_code: "97201".to_string(),
            country: "US".to_string(),
        }
    }

    #[test]
    fn complete_address_is_valid() {
        assert_eq!(address().validate(), Ok(()));
    }

    #[test]
    fn blank_required_field_is_reported() {
        let missing_city = ShippingAddress {
            city: "   ".to_string(),
            ..address()
        };

        assert_eq!(missing_city.validate(), Err(MissingAddressField("city")));
    }

    #[test]
    fn optional_fields_may_be_blank() {
        let sparse = ShippingAddress {
            line2: Some(String::new()),
            region: None,
            ..address()
        };

        assert_eq!(sparse.validate(), Ok(()));
    }

    #[test]
    fn payment_method_parses_wire_names() -> TestResult {
        assert_eq!("card".parse::<PaymentMethod>()?, PaymentMethod::Card);
        assert_eq!(
            "cash_on_delivery".parse::<PaymentMethod>()?,
            PaymentMethod::CashOnDelivery
        );
        assert_eq!(PaymentMethod::BankTransfer.to_string(), "bank_transfer");
        assert!("cheque".parse::<PaymentMethod>().is_err(), "unknown method");

        Ok(())
    }
}
