//! Courier service
//!
//! Delivery people paid through expenses. A courier referenced by an expense
//! cannot be deleted.

use tracing::debug;

use crate::audit::AuditEntry;
use crate::error::{GestionError, GestionResult};
use crate::events::Topic;
use crate::models::{Courier, CourierDraft, CourierId};
use crate::storage::{check_delete, CourierRepository, DeleteDecision, NameFilter, Relation, Storage};

pub struct CourierService<'a> {
    storage: &'a Storage,
}

impl<'a> CourierService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, draft: CourierDraft) -> GestionResult<Courier> {
        let draft = draft.normalize()?;

        let courier = self
            .storage
            .db()
            .write(|tx| CourierRepository::new(tx).insert(&draft))?;

        debug!(id = %courier.id, name = %courier.name, "courier created");
        self.storage
            .committed(&AuditEntry::created(&courier), Topic::Couriers);
        Ok(courier)
    }

    pub fn update(&self, id: CourierId, draft: CourierDraft) -> GestionResult<Courier> {
        let draft = draft.normalize()?;

        let (before, after) = self.storage.db().write(|tx| {
            let repo = CourierRepository::new(tx);
            let before = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("Courier", id))?;
            let after = Courier {
                id,
                name: draft.name,
                phone: draft.phone,
                observations: draft.observations,
            };
            repo.update(&after)?;
            Ok((before, after))
        })?;

        self.storage
            .committed(&AuditEntry::updated(&before, &after), Topic::Couriers);
        Ok(after)
    }

    pub fn delete(&self, id: CourierId) -> GestionResult<Courier> {
        let courier = self.storage.db().write(|tx| {
            let repo = CourierRepository::new(tx);
            let courier = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("Courier", id))?;
            check_delete(tx, Relation::ExpenseCourier, id.get())?.into_result()?;
            repo.delete(id)?;
            Ok(courier)
        })?;

        self.storage
            .committed(&AuditEntry::deleted(&courier), Topic::Couriers);
        Ok(courier)
    }

    pub fn can_delete(&self, id: CourierId) -> GestionResult<DeleteDecision> {
        self.storage.db().read(|conn| {
            if CourierRepository::new(conn).get(id)?.is_none() {
                return Err(GestionError::not_found("Courier", id));
            }
            check_delete(conn, Relation::ExpenseCourier, id.get())
        })
    }

    pub fn get(&self, id: CourierId) -> GestionResult<Option<Courier>> {
        self.storage
            .db()
            .read(|conn| CourierRepository::new(conn).get(id))
    }

    pub fn list(&self, filter: &NameFilter) -> GestionResult<Vec<Courier>> {
        self.storage
            .db()
            .read(|conn| CourierRepository::new(conn).list(filter))
    }

    pub fn find_by_name(&self, name: &str) -> GestionResult<Option<Courier>> {
        self.storage
            .db()
            .read(|conn| CourierRepository::new(conn).find_by_name(name))
    }

    pub fn find(&self, identifier: &str) -> GestionResult<Option<Courier>> {
        if let Some(courier) = self.find_by_name(identifier)? {
            return Ok(Some(courier));
        }
        match identifier.parse::<CourierId>() {
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
    fn test_find_by_phone_search() {
        let (_temp, storage) = open_storage();
        let service = CourierService::new(&storage);
        let pedro = service
            .create(CourierDraft::new("Pedro").with_phone("3105550000"))
            .unwrap();
        service.create(CourierDraft::new("Luisa")).unwrap();

        let found = service.list(&NameFilter::search("555")).unwrap();
        assert_eq!(found, vec![pedro.clone()]);
        assert_eq!(service.find("PEDRO").unwrap(), Some(pedro));
    }

    #[test]
    fn test_can_delete_reports_dependents() {
        let (_temp, storage) = open_storage();
        let service = CourierService::new(&storage);
        let pedro = service.create(CourierDraft::new("Pedro")).unwrap();
        let expenses = ExpenseService::new(&storage);
        for d in 1..=2 {
            expenses
                .create(
                    ExpenseDraft::new(ExpenseType::Delivery, Money::from_units(8_000), day(d))
                        .with_courier(pedro.id),
                )
                .unwrap();
        }

        match service.can_delete(pedro.id).unwrap() {
            DeleteDecision::Blocked {
                dependents,
                dependent_table,
                ..
            } => {
                assert_eq!(dependents, 2);
                assert_eq!(dependent_table, "expenses");
            }
            DeleteDecision::Allowed => panic!("expected delete to be blocked"),
        }
        assert!(service.can_delete(CourierId::new(404)).unwrap_err().is_not_found());
    }
}
