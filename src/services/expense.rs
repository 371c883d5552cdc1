//! Expense service
//!
//! Cash-box outflows. The carrier and courier an expense points at must exist
//! when it is saved.

use tracing::debug;

use crate::audit::AuditEntry;
use crate::error::{GestionError, GestionResult};
use crate::events::Topic;
use crate::models::{Expense, ExpenseDraft, ExpenseId, ExpenseListing, Money};
use crate::storage::{require_parent, DateRange, ExpenseFilter, ExpenseRepository, Relation, Storage};

pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, draft: ExpenseDraft) -> GestionResult<Expense> {
        let draft = draft.normalize()?;

        let expense = self.storage.db().write(|tx| {
            check_parents(tx, &draft)?;
            ExpenseRepository::new(tx).insert(&draft)
        })?;

        debug!(
            id = %expense.id,
            expense_type = %expense.expense_type,
            amount = expense.amount.cents(),
            "expense recorded"
        );
        self.storage
            .committed(&AuditEntry::created(&expense), Topic::Expenses);
        Ok(expense)
    }

    pub fn update(&self, id: ExpenseId, draft: ExpenseDraft) -> GestionResult<Expense> {
        let draft = draft.normalize()?;

        let (before, after) = self.storage.db().write(|tx| {
            let repo = ExpenseRepository::new(tx);
            let before = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("Expense", id))?;
            check_parents(tx, &draft)?;

            let after = Expense {
                id,
                expense_type: draft.expense_type,
                amount: draft.amount,
                observations: draft.observations,
                occurred_at: draft.occurred_at,
                carrier_id: draft.carrier_id,
                courier_id: draft.courier_id,
            };
            repo.update(&after)?;
            Ok((before, after))
        })?;

        self.storage
            .committed(&AuditEntry::updated(&before, &after), Topic::Expenses);
        Ok(after)
    }

    pub fn delete(&self, id: ExpenseId) -> GestionResult<Expense> {
        let expense = self.storage.db().write(|tx| {
            let repo = ExpenseRepository::new(tx);
            let expense = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("Expense", id))?;
            repo.delete(id)?;
            Ok(expense)
        })?;

        self.storage
            .committed(&AuditEntry::deleted(&expense), Topic::Expenses);
        Ok(expense)
    }

    pub fn get(&self, id: ExpenseId) -> GestionResult<Option<Expense>> {
        self.storage
            .db()
            .read(|conn| ExpenseRepository::new(conn).get(id))
    }

    /// Newest first, with carrier and courier names
    pub fn list(&self, filter: &ExpenseFilter) -> GestionResult<Vec<ExpenseListing>> {
        self.storage
            .db()
            .read(|conn| ExpenseRepository::new(conn).list(filter))
    }

    pub fn total(&self, range: &DateRange) -> GestionResult<Money> {
        self.storage
            .db()
            .read(|conn| ExpenseRepository::new(conn).total(range))
    }
}

fn check_parents(conn: &rusqlite::Connection, draft: &ExpenseDraft) -> GestionResult<()> {
    require_parent(conn, Relation::ExpenseCarrier, draft.carrier_id.map(|id| id.get()))?;
    require_parent(conn, Relation::ExpenseCourier, draft.courier_id.map(|id| id.get()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CarrierDraft, CourierId, ExpenseType};
    use crate::services::CarrierService;
    use crate::storage::testing::{day, open_storage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_create_lists_carrier_name() {
        let (_temp, storage) = open_storage();
        let carrier = CarrierService::new(&storage)
            .create(CarrierDraft::new("Servientrega"))
            .unwrap();
        let service = ExpenseService::new(&storage);
        let expense = service
            .create(
                ExpenseDraft::new(ExpenseType::Freight, Money::from_units(200_000), day(2))
                    .with_carrier(carrier.id)
                    .with_observations("Bogota run"),
            )
            .unwrap();

        let listed = service.list(&ExpenseFilter::default()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].expense, expense);
        assert_eq!(listed[0].carrier_name.as_deref(), Some("Servientrega"));
        assert!(listed[0].courier_name.is_none());
    }

    #[test]
    fn test_unknown_courier_is_referential_error() {
        let (_temp, storage) = open_storage();
        let service = ExpenseService::new(&storage);
        let err = service
            .create(
                ExpenseDraft::new(ExpenseType::Delivery, Money::from_units(5_000), day(1))
                    .with_courier(CourierId::new(3)),
            )
            .unwrap_err();
        assert!(err.is_referential());
        assert!(service.list(&ExpenseFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let (_temp, storage) = open_storage();
        let err = ExpenseService::new(&storage)
            .create(ExpenseDraft::new(ExpenseType::Other, Money::zero(), day(1)))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_update_changes_total() {
        let (_temp, storage) = open_storage();
        let service = ExpenseService::new(&storage);
        let expense = service
            .create(ExpenseDraft::new(ExpenseType::Other, Money::from_units(100), day(1)))
            .unwrap();
        service
            .update(
                expense.id,
                ExpenseDraft::new(ExpenseType::Other, Money::from_units(250), day(1)),
            )
            .unwrap();
        assert_eq!(service.total(&DateRange::all()).unwrap(), Money::from_units(250));
    }

    #[test]
    fn test_expense_topic_handlers_run_once() {
        let (_temp, storage) = open_storage();
        let expense_hits = Arc::new(AtomicUsize::new(0));
        let product_hits = Arc::new(AtomicUsize::new(0));

        let hits = Arc::clone(&expense_hits);
        storage.bus().subscribe(Topic::Expenses, move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        });
        let hits = Arc::clone(&product_hits);
        storage.bus().subscribe(Topic::Products, move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        });

        ExpenseService::new(&storage)
            .create(ExpenseDraft::new(ExpenseType::Freight, Money::from_units(10), day(1)))
            .unwrap();

        assert_eq!(expense_hits.load(Ordering::SeqCst), 1);
        assert_eq!(product_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handler_can_query_committed_state() {
        let (_temp, storage) = open_storage();
        let storage = Arc::new(storage);
        let observed = Arc::new(std::sync::Mutex::new(None));

        let store = Arc::clone(&storage);
        let seen = Arc::clone(&observed);
        storage.bus().subscribe(Topic::Expenses, move |_| {
            let total = ExpenseService::new(&store).total(&DateRange::all()).unwrap();
            *seen.lock().unwrap() = Some(total);
        });

        ExpenseService::new(&storage)
            .create(ExpenseDraft::new(ExpenseType::Other, Money::from_units(42), day(4)))
            .unwrap();
        assert_eq!(*observed.lock().unwrap(), Some(Money::from_units(42)));
    }
}
