//! Provider service
//!
//! Command and query API for providers. A provider referenced by any
//! product cannot be deleted.

use tracing::debug;

use crate::audit::AuditEntry;
use crate::error::{GestionError, GestionResult};
use crate::events::Topic;
use crate::models::{Provider, ProviderDraft, ProviderId};
use crate::storage::{check_delete, DeleteDecision, NameFilter, ProviderRepository, Relation, Storage};

pub struct ProviderService<'a> {
    storage: &'a Storage,
}

impl<'a> ProviderService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, draft: ProviderDraft) -> GestionResult<Provider> {
        let draft = draft.normalize()?;

        let provider = self
            .storage
            .db()
            .write(|tx| ProviderRepository::new(tx).insert(&draft))?;

        debug!(id = %provider.id, name = %provider.name, "provider created");
        self.storage
            .committed(&AuditEntry::created(&provider), Topic::Providers);
        Ok(provider)
    }

    pub fn update(&self, id: ProviderId, draft: ProviderDraft) -> GestionResult<Provider> {
        let draft = draft.normalize()?;

        let (before, after) = self.storage.db().write(|tx| {
            let repo = ProviderRepository::new(tx);
            let before = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("Provider", id))?;
            let after = Provider {
                id,
                name: draft.name,
                phone: draft.phone,
                notes: draft.notes,
            };
            repo.update(&after)?;
            Ok((before, after))
        })?;

        self.storage
            .committed(&AuditEntry::updated(&before, &after), Topic::Providers);
        Ok(after)
    }

    /// Delete a provider no product refers to
    pub fn delete(&self, id: ProviderId) -> GestionResult<Provider> {
        let provider = self.storage.db().write(|tx| {
            let repo = ProviderRepository::new(tx);
            let provider = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("Provider", id))?;
            check_delete(tx, Relation::ProductProvider, id.get())?.into_result()?;
            repo.delete(id)?;
            Ok(provider)
        })?;

        self.storage
            .committed(&AuditEntry::deleted(&provider), Topic::Providers);
        Ok(provider)
    }

    /// Preview whether [`delete`](Self::delete) would be allowed
    pub fn can_delete(&self, id: ProviderId) -> GestionResult<DeleteDecision> {
        self.storage.db().read(|conn| {
            if ProviderRepository::new(conn).get(id)?.is_none() {
                return Err(GestionError::not_found("Provider", id));
            }
            check_delete(conn, Relation::ProductProvider, id.get())
        })
    }

    pub fn get(&self, id: ProviderId) -> GestionResult<Option<Provider>> {
        self.storage
            .db()
            .read(|conn| ProviderRepository::new(conn).get(id))
    }

    pub fn list(&self, filter: &NameFilter) -> GestionResult<Vec<Provider>> {
        self.storage
            .db()
            .read(|conn| ProviderRepository::new(conn).list(filter))
    }

    pub fn find_by_name(&self, name: &str) -> GestionResult<Option<Provider>> {
        self.storage
            .db()
            .read(|conn| ProviderRepository::new(conn).find_by_name(name))
    }

    /// Find a provider by name, falling back to its id (`prv-3` or `3`)
    pub fn find(&self, identifier: &str) -> GestionResult<Option<Provider>> {
        if let Some(provider) = self.find_by_name(identifier)? {
            return Ok(Some(provider));
        }
        match identifier.parse::<ProviderId>() {
            Ok(id) => self.get(id),
            Err(_) => Ok(None),
        }
    }

    pub fn count(&self) -> GestionResult<i64> {
        self.storage
            .db()
            .read(|conn| ProviderRepository::new(conn).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, ProductDraft};
    use crate::services::ProductService;
    use crate::storage::testing::open_storage;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_create_and_get() {
        let (_temp, storage) = open_storage();
        let service = ProviderService::new(&storage);

        let acme = service
            .create(ProviderDraft::new(" Acme ").with_phone("3001234567"))
            .unwrap();
        assert_eq!(acme.name, "Acme");
        assert_eq!(service.get(acme.id).unwrap(), Some(acme));
    }

    #[test]
    fn test_empty_name_rejected_before_write() {
        let (_temp, storage) = open_storage();
        let service = ProviderService::new(&storage);

        let err = service.create(ProviderDraft::new("  ")).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(service.count().unwrap(), 0);
        assert_eq!(storage.audit().entry_count().unwrap(), 0);
    }

    #[test]
    fn test_update_writes_audit_diff() {
        let (_temp, storage) = open_storage();
        let service = ProviderService::new(&storage);
        let acme = service.create(ProviderDraft::new("Acme")).unwrap();

        let updated = service
            .update(acme.id, ProviderDraft::new("Acme SAS"))
            .unwrap();
        assert_eq!(updated.name, "Acme SAS");

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries[1].diff_summary.as_deref(),
            Some("name: \"Acme\" -> \"Acme SAS\"")
        );
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let (_temp, storage) = open_storage();
        let service = ProviderService::new(&storage);
        let err = service
            .update(ProviderId::new(5), ProviderDraft::new("X"))
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_blocked_while_products_reference_it() {
        let (_temp, storage) = open_storage();
        let service = ProviderService::new(&storage);
        let acme = service.create(ProviderDraft::new("Acme")).unwrap();
        ProductService::new(&storage)
            .create(ProductDraft::new("Widget", Money::from_cents(4999)).with_provider(acme.id))
            .unwrap();

        assert!(!service.can_delete(acme.id).unwrap().is_allowed());
        assert!(service.delete(acme.id).unwrap_err().is_referential());
        assert!(service.get(acme.id).unwrap().is_some());
    }

    #[test]
    fn test_delete_unreferenced() {
        let (_temp, storage) = open_storage();
        let service = ProviderService::new(&storage);
        let acme = service.create(ProviderDraft::new("Acme")).unwrap();

        service.delete(acme.id).unwrap();
        assert!(service.get(acme.id).unwrap().is_none());
        assert!(service.delete(acme.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_find_by_name_or_id() {
        let (_temp, storage) = open_storage();
        let service = ProviderService::new(&storage);
        let acme = service.create(ProviderDraft::new("Acme")).unwrap();

        assert_eq!(service.find("acme").unwrap(), Some(acme.clone()));
        assert_eq!(service.find(&acme.id.to_string()).unwrap(), Some(acme));
        assert!(service.find("nobody").unwrap().is_none());
    }

    #[test]
    fn test_commands_publish_topic_then_umbrella() {
        let (_temp, storage) = open_storage();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        for topic in [Topic::Providers, Topic::AnyDataChanged] {
            let seen = Arc::clone(&seen);
            storage
                .bus()
                .subscribe(topic, move |t| seen.lock().unwrap().push(t));
        }

        ProviderService::new(&storage)
            .create(ProviderDraft::new("Acme"))
            .unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec![Topic::Providers, Topic::AnyDataChanged]
        );
    }

    #[test]
    fn test_failed_command_publishes_nothing() {
        let (_temp, storage) = open_storage();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        storage.bus().subscribe(Topic::AnyDataChanged, move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });

        let _ = ProviderService::new(&storage).create(ProviderDraft::new(""));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
