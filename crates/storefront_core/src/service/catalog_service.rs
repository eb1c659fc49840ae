//! Catalog use-case service.
//!
//! # Responsibility
//! - Provide category/product maintenance entry points.
//! - Map repository failures to catalog-level errors.

use crate::model::catalog::{Category, CategoryId, NewProduct, Product, ProductId};
use crate::repo::catalog_repo::{CatalogRepository, ProductListQuery};
use crate::repo::{RepoError, RepoResult};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for catalog use-cases.
#[derive(Debug)]
pub enum CatalogServiceError {
    /// Category name already exists.
    DuplicateCategory(String),
    /// Referenced category does not exist.
    CategoryNotFound(CategoryId),
    /// Target product does not exist.
    ProductNotFound(ProductId),
    /// Restock amount must be strictly positive.
    InvalidRestock(i64),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for CatalogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateCategory(name) => write!(f, "category already exists: `{name}`"),
            Self::CategoryNotFound(id) => write!(f, "category not found: {id}"),
            Self::ProductNotFound(id) => write!(f, "product not found: {id}"),
            Self::InvalidRestock(amount) => write!(f, "restock amount must be > 0, got {amount}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for CatalogServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound {
                entity: "product",
                id,
            } => match id.parse() {
                Ok(product_id) => Self::ProductNotFound(product_id),
                Err(_) => Self::Repo(RepoError::NotFound {
                    entity: "product",
                    id,
                }),
            },
            other => Self::Repo(other),
        }
    }
}

/// Catalog service facade over repository implementations.
pub struct CatalogService<R: CatalogRepository> {
    repo: R,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Adds a category, rejecting case-insensitive duplicates.
    pub fn add_category(&self, name: &str) -> Result<Category, CatalogServiceError> {
        let trimmed = name.trim();
        let exists = self
            .repo
            .list_categories()?
            .iter()
            .any(|category| category.category_name.eq_ignore_ascii_case(trimmed));
        if exists {
            return Err(CatalogServiceError::DuplicateCategory(trimmed.to_string()));
        }

        let category = self.repo.create_category(trimmed)?;
        info!(
            "event=category_create module=service status=ok category_id={}",
            category.category_id
        );
        Ok(category)
    }

    /// Adds a product to an existing category.
    pub fn add_product(&self, product: &NewProduct) -> Result<Product, CatalogServiceError> {
        if self.repo.get_category(product.category_id)?.is_none() {
            return Err(CatalogServiceError::CategoryNotFound(product.category_id));
        }

        let created = self.repo.create_product(product)?;
        info!(
            "event=product_create module=service status=ok product_id={} category_id={}",
            created.product_id, created.category_id
        );
        Ok(created)
    }

    /// Increases stock by `amount` and returns the updated product.
    pub fn restock(&self, id: ProductId, amount: i64) -> Result<Product, CatalogServiceError> {
        if amount <= 0 {
            return Err(CatalogServiceError::InvalidRestock(amount));
        }

        let stock_quantity = self.repo.adjust_stock(id, amount)?;
        info!(
            "event=product_restock module=service status=ok product_id={id} amount={amount} stock_quantity={stock_quantity}"
        );
        self.repo
            .get_product(id)?
            .ok_or(CatalogServiceError::ProductNotFound(id))
    }

    pub fn get_product(&self, id: ProductId) -> RepoResult<Option<Product>> {
        self.repo.get_product(id)
    }

    pub fn list_products(&self, query: &ProductListQuery) -> RepoResult<Vec<Product>> {
        self.repo.list_products(query)
    }

    pub fn list_categories(&self) -> RepoResult<Vec<Category>> {
        self.repo.list_categories()
    }
}
