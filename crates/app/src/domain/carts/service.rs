//! Carts service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::debug;

use crate::{
    database::Db,
    domain::{
        carts::{
            data::{NewCartItem, is_valid_quantity},
            errors::CartsServiceError,
            reader::CartReader,
            records::{CartItemUuid, PricedCart},
            repositories::{PgCartItemsRepository, PgCartsRepository},
        },
        owners::Owner,
        products::repository::PgProductsRepository,
    },
    pricing::StorePricing,
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    pricing: StorePricing,
    carts_repository: PgCartsRepository,
    items_repository: PgCartItemsRepository,
    products_repository: PgProductsRepository,
    reader: CartReader,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db, pricing: StorePricing) -> Self {
        Self {
            db,
            pricing,
            carts_repository: PgCartsRepository::new(),
            items_repository: PgCartItemsRepository::new(),
            products_repository: PgProductsRepository::new(),
            reader: CartReader::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, owner: Owner, now: Timestamp) -> Result<PricedCart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.ensure_cart(&mut tx, &owner).await?;
        let priced = self.reader.price::<CartsServiceError>(&mut tx, cart, &self.pricing, now).await?;

        tx.commit().await?;

        Ok(priced)
    }

    async fn add_item(
        &self,
        owner: Owner,
        item: NewCartItem,
        now: Timestamp,
    ) -> Result<PricedCart, CartsServiceError> {
        if !is_valid_quantity(item.quantity) {
            return Err(CartsServiceError::InvalidQuantity(item.quantity));
        }

        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.ensure_cart(&mut tx, &owner).await?;

        let product = self
            .products_repository
            .get_product(&mut tx, item.product_uuid)
            .await
            .map_err(|error| match error {
                sqlx::Error::RowNotFound => CartsServiceError::ProductNotFound,
                other => other.into(),
            })?;

        let existing = self
            .items_repository
            .line_quantity(&mut tx, cart.uuid, product.uuid)
            .await?;

        let merged = existing.saturating_add(item.quantity);

        if !is_valid_quantity(merged) {
            return Err(CartsServiceError::InvalidQuantity(merged));
        }

        self.items_repository
            .upsert_cart_item(&mut tx, cart.uuid, &product, item.quantity)
            .await?;

        debug!(cart = %cart.uuid, product = %product.uuid, quantity = item.quantity, "added cart item");

        let priced = self.reader.price::<CartsServiceError>(&mut tx, cart, &self.pricing, now).await?;

        tx.commit().await?;

        Ok(priced)
    }

    async fn update_item(
        &self,
        owner: Owner,
        item: CartItemUuid,
        quantity: u32,
        now: Timestamp,
    ) -> Result<PricedCart, CartsServiceError> {
        if !is_valid_quantity(quantity) {
            return Err(CartsServiceError::InvalidQuantity(quantity));
        }

        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.ensure_cart(&mut tx, &owner).await?;

        let rows_affected = self
            .items_repository
            .update_cart_item(&mut tx, cart.uuid, item, quantity)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        let priced = self.reader.price::<CartsServiceError>(&mut tx, cart, &self.pricing, now).await?;

        tx.commit().await?;

        Ok(priced)
    }

    async fn remove_item(
        &self,
        owner: Owner,
        item: CartItemUuid,
        now: Timestamp,
    ) -> Result<PricedCart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.ensure_cart(&mut tx, &owner).await?;

        let rows_affected = self
            .items_repository
            .delete_cart_item(&mut tx, cart.uuid, item)
            .await?;

        if rows_affected == 0 {
            return Err(CartsServiceError::NotFound);
        }

        let priced = self.reader.price::<CartsServiceError>(&mut tx, cart, &self.pricing, now).await?;

        tx.commit().await?;

        Ok(priced)
    }

    async fn clear_cart(
        &self,
        owner: Owner,
        now: Timestamp,
    ) -> Result<PricedCart, CartsServiceError> {
        let mut tx = self.db.begin().await?;

        let cart = self.carts_repository.ensure_cart(&mut tx, &owner).await?;

        self.items_repository
            .delete_cart_items(&mut tx, cart.uuid)
            .await?;

        let cart = self
            .carts_repository
            .set_coupon(&mut tx, cart.uuid, None)
            .await?;

        let priced = self.reader.price::<CartsServiceError>(&mut tx, cart, &self.pricing, now).await?;

        tx.commit().await?;

        Ok(priced)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Retrieve the owner's priced cart, creating an empty one on first access.
    async fn get_cart(&self, owner: Owner, now: Timestamp) -> Result<PricedCart, CartsServiceError>;

    /// Add a product, merging quantity into an existing line for the same product.
    async fn add_item(
        &self,
        owner: Owner,
        item: NewCartItem,
        now: Timestamp,
    ) -> Result<PricedCart, CartsServiceError>;

    /// Set the quantity of a cart line.
    async fn update_item(
        &self,
        owner: Owner,
        item: CartItemUuid,
        quantity: u32,
        now: Timestamp,
    ) -> Result<PricedCart, CartsServiceError>;

    /// Remove a cart line.
    async fn remove_item(
        &self,
        owner: Owner,
        item: CartItemUuid,
        now: Timestamp,
    ) -> Result<PricedCart, CartsServiceError>;

    /// Remove every line and the coupon.
    async fn clear_cart(&self, owner: Owner, now: Timestamp)
    -> Result<PricedCart, CartsServiceError>;
}
