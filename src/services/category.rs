//! Category service
//!
//! Category names are unique regardless of case. A category that any product
//! uses cannot be deleted.

use tracing::debug;

use crate::audit::AuditEntry;
use crate::error::{GestionError, GestionResult};
use crate::events::Topic;
use crate::models::{Category, CategoryDraft, CategoryId};
use crate::storage::{check_delete, CategoryRepository, DeleteDecision, NameFilter, Relation, Storage};

pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, draft: CategoryDraft) -> GestionResult<Category> {
        let draft = draft.normalize()?;

        let category = self.storage.db().write(|tx| {
            let repo = CategoryRepository::new(tx);
            if repo.find_by_name(&draft.name)?.is_some() {
                return Err(duplicate(&draft.name));
            }
            repo.insert(&draft.name)
        })?;

        debug!(id = %category.id, name = %category.name, "category created");
        self.storage
            .committed(&AuditEntry::created(&category), Topic::Categories);
        Ok(category)
    }

    pub fn rename(&self, id: CategoryId, draft: CategoryDraft) -> GestionResult<Category> {
        let draft = draft.normalize()?;

        let (before, after) = self.storage.db().write(|tx| {
            let repo = CategoryRepository::new(tx);
            let before = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("Category", id))?;
            if let Some(existing) = repo.find_by_name(&draft.name)? {
                if existing.id != id {
                    return Err(duplicate(&draft.name));
                }
            }
            let after = Category {
                id,
                name: draft.name,
            };
            repo.update(&after)?;
            Ok((before, after))
        })?;

        self.storage
            .committed(&AuditEntry::updated(&before, &after), Topic::Categories);
        Ok(after)
    }

    /// Delete a category no product uses
    pub fn delete(&self, id: CategoryId) -> GestionResult<Category> {
        let category = self.storage.db().write(|tx| {
            let repo = CategoryRepository::new(tx);
            let category = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("Category", id))?;
            check_delete(tx, Relation::ProductCategory, id.get())?.into_result()?;
            repo.delete(id)?;
            Ok(category)
        })?;

        self.storage
            .committed(&AuditEntry::deleted(&category), Topic::Categories);
        Ok(category)
    }

    pub fn can_delete(&self, id: CategoryId) -> GestionResult<DeleteDecision> {
        self.storage.db().read(|conn| {
            if CategoryRepository::new(conn).get(id)?.is_none() {
                return Err(GestionError::not_found("Category", id));
            }
            check_delete(conn, Relation::ProductCategory, id.get())
        })
    }

    pub fn get(&self, id: CategoryId) -> GestionResult<Option<Category>> {
        self.storage
            .db()
            .read(|conn| CategoryRepository::new(conn).get(id))
    }

    pub fn list(&self, filter: &NameFilter) -> GestionResult<Vec<Category>> {
        self.storage
            .db()
            .read(|conn| CategoryRepository::new(conn).list(filter))
    }

    pub fn find_by_name(&self, name: &str) -> GestionResult<Option<Category>> {
        self.storage
            .db()
            .read(|conn| CategoryRepository::new(conn).find_by_name(name))
    }

    /// Find a category by name, falling back to its id
    pub fn find(&self, identifier: &str) -> GestionResult<Option<Category>> {
        if let Some(category) = self.find_by_name(identifier)? {
            return Ok(Some(category));
        }
        match identifier.parse::<CategoryId>() {
            Ok(id) => self.get(id),
            Err(_) => Ok(None),
        }
    }

    pub fn count(&self) -> GestionResult<i64> {
        self.storage
            .db()
            .read(|conn| CategoryRepository::new(conn).count())
    }
}

fn duplicate(name: &str) -> GestionError {
    GestionError::Duplicate {
        entity_type: "Category",
        identifier: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, ProductDraft};
    use crate::services::ProductService;
    use crate::storage::testing::open_storage;

    #[test]
    fn test_duplicate_name_rejected() {
        let (_temp, storage) = open_storage();
        let service = CategoryService::new(&storage);
        service.create(CategoryDraft::new("Bebidas")).unwrap();

        let err = service.create(CategoryDraft::new(" bebidas ")).unwrap_err();
        assert!(matches!(err, GestionError::Duplicate { .. }));
        assert_eq!(service.count().unwrap(), 1);
    }

    #[test]
    fn test_rename_to_own_name_with_new_case() {
        let (_temp, storage) = open_storage();
        let service = CategoryService::new(&storage);
        let bebidas = service.create(CategoryDraft::new("bebidas")).unwrap();
        let aseo = service.create(CategoryDraft::new("Aseo")).unwrap();

        let renamed = service
            .rename(bebidas.id, CategoryDraft::new("Bebidas"))
            .unwrap();
        assert_eq!(renamed.name, "Bebidas");

        let err = service.rename(aseo.id, CategoryDraft::new("BEBIDAS")).unwrap_err();
        assert!(matches!(err, GestionError::Duplicate { .. }));
    }

    #[test]
    fn test_delete_referenced_category_leaves_both_rows() {
        let (_temp, storage) = open_storage();
        let service = CategoryService::new(&storage);
        let products = ProductService::new(&storage);

        let tools = service.create(CategoryDraft::new("Tools")).unwrap();
        let widget = products
            .create(ProductDraft::new("Widget", Money::from_cents(4999)).with_category(tools.id))
            .unwrap();

        let err = service.delete(tools.id).unwrap_err();
        assert!(err.is_referential());
        assert_eq!(service.get(tools.id).unwrap(), Some(tools.clone()));
        assert_eq!(
            products.get(widget.id).unwrap().unwrap().category_id,
            Some(tools.id)
        );

        match service.can_delete(tools.id).unwrap() {
            DeleteDecision::Blocked { dependents, .. } => assert_eq!(dependents, 1),
            DeleteDecision::Allowed => panic!("expected delete to be blocked"),
        }
    }

    #[test]
    fn test_delete_after_product_removed() {
        let (_temp, storage) = open_storage();
        let service = CategoryService::new(&storage);
        let products = ProductService::new(&storage);

        let tools = service.create(CategoryDraft::new("Tools")).unwrap();
        let widget = products
            .create(ProductDraft::new("Widget", Money::from_cents(1)).with_category(tools.id))
            .unwrap();
        products.delete(widget.id).unwrap();

        assert!(service.can_delete(tools.id).unwrap().is_allowed());
        service.delete(tools.id).unwrap();
        assert!(service.get(tools.id).unwrap().is_none());
    }
}
