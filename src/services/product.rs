//! Product service
//!
//! Saving a product can name its provider and category instead of passing
//! their ids. Missing parents are created in the same transaction as the
//! product, so either every row lands or none does.

use tracing::debug;

use crate::audit::AuditEntry;
use crate::error::{GestionError, GestionResult};
use crate::events::Topic;
use crate::models::{
    Category, CategoryId, ParentRef, Product, ProductDraft, ProductId, ProductListing, Provider,
    ProviderDraft, ProviderId,
};
use crate::storage::{
    require_parent, CategoryRepository, NewProduct, ProductFilter, ProductRepository,
    ProviderRepository, Relation, Storage,
};

/// Parents created while resolving a product's references
#[derive(Debug, Default)]
struct CreatedParents {
    provider: Option<Provider>,
    category: Option<Category>,
}

pub struct ProductService<'a> {
    storage: &'a Storage,
}

impl<'a> ProductService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, draft: ProductDraft) -> GestionResult<Product> {
        let draft = draft.normalize()?;

        let (product, created) = self.storage.db().write(|tx| {
            let mut created = CreatedParents::default();
            let provider_id = resolve_provider(tx, draft.provider, &mut created)?;
            let category_id = resolve_category(tx, draft.category, &mut created)?;

            let product = ProductRepository::new(tx).insert(NewProduct {
                name: draft.name,
                price: draft.price,
                provider_id,
                category_id,
                observations: draft.observations,
            })?;
            Ok((product, created))
        })?;

        debug!(id = %product.id, name = %product.name, "product created");
        self.announce_parents(created);
        self.storage
            .committed(&AuditEntry::created(&product), Topic::Products);
        Ok(product)
    }

    pub fn update(&self, id: ProductId, draft: ProductDraft) -> GestionResult<Product> {
        let draft = draft.normalize()?;

        let (before, after, created) = self.storage.db().write(|tx| {
            let repo = ProductRepository::new(tx);
            let before = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("Product", id))?;

            let mut created = CreatedParents::default();
            let after = Product {
                id,
                name: draft.name,
                price: draft.price,
                provider_id: resolve_provider(tx, draft.provider, &mut created)?,
                category_id: resolve_category(tx, draft.category, &mut created)?,
                observations: draft.observations,
            };
            repo.update(&after)?;
            Ok((before, after, created))
        })?;

        self.announce_parents(created);
        self.storage
            .committed(&AuditEntry::updated(&before, &after), Topic::Products);
        Ok(after)
    }

    pub fn delete(&self, id: ProductId) -> GestionResult<Product> {
        let product = self.storage.db().write(|tx| {
            let repo = ProductRepository::new(tx);
            let product = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("Product", id))?;
            repo.delete(id)?;
            Ok(product)
        })?;

        self.storage
            .committed(&AuditEntry::deleted(&product), Topic::Products);
        Ok(product)
    }

    pub fn get(&self, id: ProductId) -> GestionResult<Option<Product>> {
        self.storage
            .db()
            .read(|conn| ProductRepository::new(conn).get(id))
    }

    /// A product with its provider and category names
    pub fn get_listing(&self, id: ProductId) -> GestionResult<Option<ProductListing>> {
        self.storage
            .db()
            .read(|conn| ProductRepository::new(conn).get_listing(id))
    }

    pub fn list(&self, filter: &ProductFilter) -> GestionResult<Vec<ProductListing>> {
        self.storage
            .db()
            .read(|conn| ProductRepository::new(conn).list(filter))
    }

    /// Find a product by id, falling back to an exact (case-insensitive) name
    pub fn find(&self, identifier: &str) -> GestionResult<Option<ProductListing>> {
        if let Ok(id) = identifier.parse::<ProductId>() {
            if let Some(listing) = self.get_listing(id)? {
                return Ok(Some(listing));
            }
        }

        let wanted = identifier.trim();
        let candidates = self.list(&ProductFilter {
            search: Some(identifier.trim().to_string()),
            ..ProductFilter::default()
        })?;
        Ok(candidates
            .into_iter()
            .find(|listing| listing.product.name.eq_ignore_ascii_case(wanted)))
    }

    pub fn count(&self) -> GestionResult<i64> {
        self.storage
            .db()
            .read(|conn| ProductRepository::new(conn).count())
    }

    fn announce_parents(&self, created: CreatedParents) {
        if let Some(provider) = created.provider {
            debug!(id = %provider.id, name = %provider.name, "provider created for product");
            self.storage
                .committed(&AuditEntry::created(&provider), Topic::Providers);
        }
        if let Some(category) = created.category {
            debug!(id = %category.id, name = %category.name, "category created for product");
            self.storage
                .committed(&AuditEntry::created(&category), Topic::Categories);
        }
    }
}

fn resolve_provider(
    conn: &rusqlite::Connection,
    parent: Option<ParentRef<ProviderId>>,
    created: &mut CreatedParents,
) -> GestionResult<Option<ProviderId>> {
    match parent {
        None => Ok(None),
        Some(ParentRef::Existing(id)) => {
            require_parent(conn, Relation::ProductProvider, Some(id.get()))?;
            Ok(Some(id))
        }
        Some(ParentRef::ByName(name)) => {
            let repo = ProviderRepository::new(conn);
            if let Some(existing) = repo.find_by_name(&name)? {
                return Ok(Some(existing.id));
            }
            let provider = repo.insert(&ProviderDraft::new(name))?;
            let id = provider.id;
            created.provider = Some(provider);
            Ok(Some(id))
        }
    }
}

fn resolve_category(
    conn: &rusqlite::Connection,
    parent: Option<ParentRef<CategoryId>>,
    created: &mut CreatedParents,
) -> GestionResult<Option<CategoryId>> {
    match parent {
        None => Ok(None),
        Some(ParentRef::Existing(id)) => {
            require_parent(conn, Relation::ProductCategory, Some(id.get()))?;
            Ok(Some(id))
        }
        Some(ParentRef::ByName(name)) => {
            let repo = CategoryRepository::new(conn);
            if let Some(existing) = repo.find_by_name(&name)? {
                return Ok(Some(existing.id));
            }
            let category = repo.insert(&name)?;
            let id = category.id;
            created.category = Some(category);
            Ok(Some(id))
        }
    }
}
