//! Products service.

use async_trait::async_trait;
use mockall::automock;

use crate::{
    database::Db,
    domain::products::{
        data::{NewProduct, ProductFilter, ProductUpdate},
        errors::ProductsServiceError,
        records::{ProductRecord, ProductUuid},
        repository::PgProductsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgProductsService {
    db: Db,
    repository: PgProductsRepository,
}

impl PgProductsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgProductsRepository::new(),
        }
    }
}

fn has_blank(fields: &[&str]) -> bool {
    fields.iter().any(|field| field.trim().is_empty())
}

#[async_trait]
impl ProductsService for PgProductsService {
    async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let products = self.repository.list_products(&mut tx, &filter).await?;

        tx.commit().await?;

        Ok(products)
    }

    async fn get_product(
        &self,
        product: ProductUuid,
    ) -> Result<ProductRecord, ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let product = self.repository.get_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(product)
    }

    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError> {
        if has_blank(&[&product.sku, &product.name, &product.category]) {
            return Err(ProductsServiceError::MissingDetails);
        }

        let mut tx = self.db.begin().await?;

        let created = self.repository.create_product(&mut tx, product).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError> {
        if has_blank(&[&update.name, &update.category]) {
            return Err(ProductsServiceError::MissingDetails);
        }

        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .update_product(&mut tx, product, update)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn delete_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self.repository.delete_product(&mut tx, product).await?;

        if rows_affected == 0 {
            return Err(ProductsServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait ProductsService: Send + Sync {
    /// Retrieves the products matching a filter.
    async fn list_products(
        &self,
        filter: ProductFilter,
    ) -> Result<Vec<ProductRecord>, ProductsServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductUuid)
    -> Result<ProductRecord, ProductsServiceError>;

    /// Creates a new product.
    async fn create_product(
        &self,
        product: NewProduct,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Updates a product's name, category and price.
    async fn update_product(
        &self,
        product: ProductUuid,
        update: ProductUpdate,
    ) -> Result<ProductRecord, ProductsServiceError>;

    /// Soft-deletes a product.
    async fn delete_product(&self, product: ProductUuid) -> Result<(), ProductsServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{domain::products::data::ProductSort, test::TestContext};

    use super::*;

    fn scrub_top(price: u64) -> NewProduct {
        let uuid = ProductUuid::new();

        NewProduct {
            uuid,
            sku: format!("TOP-{uuid}"),
            name: "V-Neck Scrub Top".to_string(),
            category: "tops".to_string(),
            price,
        }
    }

    #[tokio::test]
    async fn create_product_returns_details() -> TestResult {
        let ctx = TestContext::new().await;
        let new = scrub_top(24_99);

        let product = ctx.products.create_product(new.clone()).await?;

        assert_eq!(product.uuid, new.uuid);
        assert_eq!(product.sku, new.sku);
        assert_eq!(product.price, 24_99);
        assert!(product.deleted_at.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn get_product_unknown_uuid_returns_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.products.get_product(ProductUuid::new()).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    async fn duplicate_sku_returns_already_exists() -> TestResult {
        let ctx = TestContext::new().await;
        let first = scrub_top(10_00);

        ctx.products.create_product(first.clone()).await?;

        let result = ctx
            .products
            .create_product(NewProduct {
                uuid: ProductUuid::new(),
                ..first
            })
            .await;

        assert!(
            matches!(result, Err(ProductsServiceError::AlreadyExists)),
            "expected AlreadyExists, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn list_products_filters_and_sorts_by_price() -> TestResult {
        let ctx = TestContext::new().await;

        let cheap = ctx.products.create_product(scrub_top(12_00)).await?;
        let mid = ctx.products.create_product(scrub_top(30_00)).await?;
        let dear = ctx.products.create_product(scrub_top(55_00)).await?;

        ctx.products
            .create_product(NewProduct {
                category: "footwear".to_string(),
                ..scrub_top(20_00)
            })
            .await?;

        let products = ctx
            .products
            .list_products(ProductFilter {
                category: Some("tops".to_string()),
                min_price: Some(12_00),
                max_price: Some(40_00),
                sort: ProductSort::PriceDesc,
                ..ProductFilter::default()
            })
            .await?;

        let uuids: Vec<ProductUuid> = products.iter().map(|p| p.uuid).collect();

        assert_eq!(uuids, vec![mid.uuid, cheap.uuid]);
        assert!(!uuids.contains(&dear.uuid), "above max price");

        Ok(())
    }

    #[tokio::test]
    async fn list_products_matches_name_case_insensitively() -> TestResult {
        let ctx = TestContext::new().await;

        let jogger = ctx
            .products
            .create_product(NewProduct {
                name: "Jogger Scrub Pants".to_string(),
                ..scrub_top(32_00)
            })
            .await?;

        ctx.products.create_product(scrub_top(20_00)).await?;

        let products = ctx
            .products
            .list_products(ProductFilter {
                q: Some("jogger".to_string()),
                ..ProductFilter::default()
            })
            .await?;

        assert_eq!(products.len(), 1);
        assert_eq!(products.first().map(|p| p.uuid), Some(jogger.uuid));

        Ok(())
    }

    #[tokio::test]
    async fn list_products_treats_wildcards_in_query_literally() -> TestResult {
        let ctx = TestContext::new().await;

        let underscored = ctx
            .products
            .create_product(NewProduct {
                sku: "SCR_TOP_1".to_string(),
                ..scrub_top(20_00)
            })
            .await?;

        ctx.products
            .create_product(NewProduct {
                sku: "SCR-TOP-2".to_string(),
                ..scrub_top(20_00)
            })
            .await?;

        ctx.products
            .create_product(NewProduct {
                sku: "SCRXTOP3".to_string(),
                ..scrub_top(20_00)
            })
            .await?;

        let cotton = ctx
            .products
            .create_product(NewProduct {
                name: "100% Cotton Pant".to_string(),
                ..scrub_top(28_00)
            })
            .await?;

        ctx.products
            .create_product(NewProduct {
                name: "100 Cotton Pant".to_string(),
                ..scrub_top(28_00)
            })
            .await?;

        let by_sku = ctx
            .products
            .list_products(ProductFilter {
                q: Some("scr_top".to_string()),
                ..ProductFilter::default()
            })
            .await?;

        let uuids: Vec<ProductUuid> = by_sku.iter().map(|p| p.uuid).collect();

        assert_eq!(uuids, vec![underscored.uuid], "`_` must match only itself");

        let by_name = ctx
            .products
            .list_products(ProductFilter {
                q: Some("100%".to_string()),
                ..ProductFilter::default()
            })
            .await?;

        let uuids: Vec<ProductUuid> = by_name.iter().map(|p| p.uuid).collect();

        assert_eq!(uuids, vec![cotton.uuid], "`%` must match only itself");

        Ok(())
    }

    #[tokio::test]
    async fn update_product_reflects_new_price() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.products.create_product(scrub_top(5_00)).await?;

        let updated = ctx
            .products
            .update_product(
                product.uuid,
                ProductUpdate {
                    name: product.name.clone(),
                    category: product.category.clone(),
                    price: 7_50,
                },
            )
            .await?;

        assert_eq!(updated.uuid, product.uuid);
        assert_eq!(updated.price, 7_50);

        Ok(())
    }

    #[tokio::test]
    async fn deleted_product_is_hidden() -> TestResult {
        let ctx = TestContext::new().await;
        let product = ctx.products.create_product(scrub_top(3_00)).await?;

        ctx.products.delete_product(product.uuid).await?;

        let result = ctx.products.get_product(product.uuid).await;

        assert!(
            matches!(result, Err(ProductsServiceError::NotFound)),
            "expected NotFound after deletion, got {result:?}"
        );

        let again = ctx.products.delete_product(product.uuid).await;

        assert!(
            matches!(again, Err(ProductsServiceError::NotFound)),
            "expected NotFound deleting twice, got {again:?}"
        );

        Ok(())
    }

    #[test]
    fn blank_fields_are_detected() {
        assert!(has_blank(&["SKU-1", " ", "tops"]), "blank name");
        assert!(!has_blank(&["SKU-1", "Top", "tops"]), "all present");
    }
}
