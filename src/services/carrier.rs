//! Carrier service
//!
//! Freight companies that expenses can be paid to. A carrier referenced by
//! an expense cannot be deleted.

use tracing::debug;

use crate::audit::AuditEntry;
use crate::error::{GestionError, GestionResult};
use crate::events::Topic;
use crate::models::{Carrier, CarrierDraft, CarrierId};
use crate::storage::{check_delete, CarrierRepository, DeleteDecision, NameFilter, Relation, Storage};

pub struct CarrierService<'a> {
    storage: &'a Storage,
}

impl<'a> CarrierService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, draft: CarrierDraft) -> GestionResult<Carrier> {
        let draft = draft.normalize()?;

        let carrier = self
            .storage
            .db()
            .write(|tx| CarrierRepository::new(tx).insert(&draft))?;

        debug!(id = %carrier.id, name = %carrier.name, "carrier created");
        self.storage
            .committed(&AuditEntry::created(&carrier), Topic::Carriers);
        Ok(carrier)
    }

    pub fn update(&self, id: CarrierId, draft: CarrierDraft) -> GestionResult<Carrier> {
        let draft = draft.normalize()?;

        let (before, after) = self.storage.db().write(|tx| {
            let repo = CarrierRepository::new(tx);
            let before = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("Carrier", id))?;
            let after = Carrier {
                id,
                name: draft.name,
                observations: draft.observations,
            };
            repo.update(&after)?;
            Ok((before, after))
        })?;

        self.storage
            .committed(&AuditEntry::updated(&before, &after), Topic::Carriers);
        Ok(after)
    }

    pub fn delete(&self, id: CarrierId) -> GestionResult<Carrier> {
        let carrier = self.storage.db().write(|tx| {
            let repo = CarrierRepository::new(tx);
            let carrier = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("Carrier", id))?;
            check_delete(tx, Relation::ExpenseCarrier, id.get())?.into_result()?;
            repo.delete(id)?;
            Ok(carrier)
        })?;

        self.storage
            .committed(&AuditEntry::deleted(&carrier), Topic::Carriers);
        Ok(carrier)
    }

    pub fn can_delete(&self, id: CarrierId) -> GestionResult<DeleteDecision> {
        self.storage.db().read(|conn| {
            if CarrierRepository::new(conn).get(id)?.is_none() {
                return Err(GestionError::not_found("Carrier", id));
            }
            check_delete(conn, Relation::ExpenseCarrier, id.get())
        })
    }

    pub fn get(&self, id: CarrierId) -> GestionResult<Option<Carrier>> {
        self.storage
            .db()
            .read(|conn| CarrierRepository::new(conn).get(id))
    }

    pub fn list(&self, filter: &NameFilter) -> GestionResult<Vec<Carrier>> {
        self.storage
            .db()
            .read(|conn| CarrierRepository::new(conn).list(filter))
    }

    pub fn find_by_name(&self, name: &str) -> GestionResult<Option<Carrier>> {
        self.storage
            .db()
            .read(|conn| CarrierRepository::new(conn).find_by_name(name))
    }

    pub fn find(&self, identifier: &str) -> GestionResult<Option<Carrier>> {
        if let Some(carrier) = self.find_by_name(identifier)? {
            return Ok(Some(carrier));
        }
        match identifier.parse::<CarrierId>() {
            Ok(id) => self.get(id),
            Err(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseDraft, ExpenseType, Money};
    use crate::services::ExpenseService;
    use crate::storage::testing::{day, open_storage};

    #[test]
    fn test_create_update_list() {
        let (_temp, storage) = open_storage();
        let service = CarrierService::new(&storage);
        let servientrega = service.create(CarrierDraft::new("Servientrega")).unwrap();
        service.create(CarrierDraft::new("Coordinadora")).unwrap();

        service
            .update(
                servientrega.id,
                CarrierDraft::new("Servientrega").with_observations("Pickup on Mondays"),
            )
            .unwrap();

        let names: Vec<_> = service
            .list(&NameFilter::default())
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Coordinadora", "Servientrega"]);

        let found = service.list(&NameFilter::search("monday")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, servientrega.id);
    }

    #[test]
    fn test_delete_blocked_by_expense() {
        let (_temp, storage) = open_storage();
        let service = CarrierService::new(&storage);
        let carrier = service.create(CarrierDraft::new("Envia")).unwrap();
        let expense = ExpenseService::new(&storage)
            .create(
                ExpenseDraft::new(ExpenseType::Carrier, Money::from_units(20_000), day(3))
                    .with_carrier(carrier.id),
            )
            .unwrap();

        assert!(service.delete(carrier.id).unwrap_err().is_referential());

        ExpenseService::new(&storage).delete(expense.id).unwrap();
        service.delete(carrier.id).unwrap();
        assert!(service.find("Envia").unwrap().is_none());
    }
}
