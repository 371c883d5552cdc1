//! Cash deposit service

use tracing::debug;

use crate::audit::AuditEntry;
use crate::error::{GestionError, GestionResult};
use crate::events::Topic;
use crate::models::{CashDeposit, CashDepositDraft, CashDepositId, Money};
use crate::storage::{CashDepositFilter, CashDepositRepository, DateRange, Storage};

pub struct CashDepositService<'a> {
    storage: &'a Storage,
}

impl<'a> CashDepositService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, draft: CashDepositDraft) -> GestionResult<CashDeposit> {
        let draft = draft.normalize()?;

        let deposit = self
            .storage
            .db()
            .write(|tx| CashDepositRepository::new(tx).insert(&draft))?;

        debug!(id = %deposit.id, amount = deposit.amount.cents(), "cash deposit recorded");
        self.storage
            .committed(&AuditEntry::created(&deposit), Topic::CashDeposits);
        Ok(deposit)
    }

    pub fn update(&self, id: CashDepositId, draft: CashDepositDraft) -> GestionResult<CashDeposit> {
        let draft = draft.normalize()?;

        let (before, after) = self.storage.db().write(|tx| {
            let repo = CashDepositRepository::new(tx);
            let before = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("CashDeposit", id))?;
            let after = CashDeposit {
                id,
                amount: draft.amount,
                observations: draft.observations,
                occurred_at: draft.occurred_at,
            };
            repo.update(&after)?;
            Ok((before, after))
        })?;

        self.storage
            .committed(&AuditEntry::updated(&before, &after), Topic::CashDeposits);
        Ok(after)
    }

    pub fn delete(&self, id: CashDepositId) -> GestionResult<CashDeposit> {
        let deposit = self.storage.db().write(|tx| {
            let repo = CashDepositRepository::new(tx);
            let deposit = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("CashDeposit", id))?;
            repo.delete(id)?;
            Ok(deposit)
        })?;

        self.storage
            .committed(&AuditEntry::deleted(&deposit), Topic::CashDeposits);
        Ok(deposit)
    }

    pub fn get(&self, id: CashDepositId) -> GestionResult<Option<CashDeposit>> {
        self.storage
            .db()
            .read(|conn| CashDepositRepository::new(conn).get(id))
    }

    pub fn list(&self, filter: &CashDepositFilter) -> GestionResult<Vec<CashDeposit>> {
        self.storage
            .db()
            .read(|conn| CashDepositRepository::new(conn).list(filter))
    }

    pub fn total(&self, range: &DateRange) -> GestionResult<Money> {
        self.storage
            .db()
            .read(|conn| CashDepositRepository::new(conn).total(range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::{day, open_storage};

    #[test]
    fn test_round_trip() {
        let (_temp, storage) = open_storage();
        let service = CashDepositService::new(&storage);
        let deposit = service
            .create(CashDepositDraft::new(Money::from_units(1_000_000), day(1)).with_observations("base"))
            .unwrap();

        assert_eq!(service.get(deposit.id).unwrap(), Some(deposit.clone()));
        assert_eq!(service.list(&CashDepositFilter::default()).unwrap(), vec![deposit]);
    }

    #[test]
    fn test_update_and_delete_publish() {
        let (_temp, storage) = open_storage();
        let hits = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let h = std::sync::Arc::clone(&hits);
        storage.bus().subscribe(Topic::CashDeposits, move |_| {
            h.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });

        let service = CashDepositService::new(&storage);
        let deposit = service
            .create(CashDepositDraft::new(Money::from_units(10), day(1)))
            .unwrap();
        service
            .update(deposit.id, CashDepositDraft::new(Money::from_units(12), day(2)))
            .unwrap();
        service.delete(deposit.id).unwrap();

        assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 3);
        assert_eq!(service.total(&DateRange::all()).unwrap(), Money::zero());
    }
}
