//! Transfer service
//!
//! Money received into the shop's accounts (Nequi, Daviplata, bank...).

use tracing::debug;

use crate::audit::AuditEntry;
use crate::error::{GestionError, GestionResult};
use crate::events::Topic;
use crate::models::{Money, Transfer, TransferDraft, TransferId};
use crate::storage::{DateRange, Storage, TransferFilter, TransferRepository};

pub struct TransferService<'a> {
    storage: &'a Storage,
}

impl<'a> TransferService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, draft: TransferDraft) -> GestionResult<Transfer> {
        let draft = draft.normalize()?;

        let transfer = self
            .storage
            .db()
            .write(|tx| TransferRepository::new(tx).insert(&draft))?;

        debug!(
            id = %transfer.id,
            account = %transfer.account_type,
            amount = transfer.amount.cents(),
            "transfer recorded"
        );
        self.storage
            .committed(&AuditEntry::created(&transfer), Topic::Transfers);
        Ok(transfer)
    }

    pub fn update(&self, id: TransferId, draft: TransferDraft) -> GestionResult<Transfer> {
        let draft = draft.normalize()?;

        let (before, after) = self.storage.db().write(|tx| {
            let repo = TransferRepository::new(tx);
            let before = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("Transfer", id))?;
            let after = Transfer {
                id,
                amount: draft.amount,
                account_type: draft.account_type,
                sender_name: draft.sender_name,
                observations: draft.observations,
                occurred_at: draft.occurred_at,
            };
            repo.update(&after)?;
            Ok((before, after))
        })?;

        self.storage
            .committed(&AuditEntry::updated(&before, &after), Topic::Transfers);
        Ok(after)
    }

    pub fn delete(&self, id: TransferId) -> GestionResult<Transfer> {
        let transfer = self.storage.db().write(|tx| {
            let repo = TransferRepository::new(tx);
            let transfer = repo
                .get(id)?
                .ok_or_else(|| GestionError::not_found("Transfer", id))?;
            repo.delete(id)?;
            Ok(transfer)
        })?;

        self.storage
            .committed(&AuditEntry::deleted(&transfer), Topic::Transfers);
        Ok(transfer)
    }

    pub fn get(&self, id: TransferId) -> GestionResult<Option<Transfer>> {
        self.storage
            .db()
            .read(|conn| TransferRepository::new(conn).get(id))
    }

    pub fn list(&self, filter: &TransferFilter) -> GestionResult<Vec<Transfer>> {
        self.storage
            .db()
            .read(|conn| TransferRepository::new(conn).list(filter))
    }

    pub fn total(&self, range: &DateRange) -> GestionResult<Money> {
        self.storage
            .db()
            .read(|conn| TransferRepository::new(conn).total(range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::{day, open_storage};

    fn seed(service: &TransferService<'_>) {
        service
            .create(TransferDraft::new(Money::from_units(50_000), "Nequi", "Ana", day(1)))
            .unwrap();
        service
            .create(TransferDraft::new(Money::from_units(80_000), "Daviplata", "Luis", day(5)))
            .unwrap();
        service
            .create(
                TransferDraft::new(Money::from_units(20_000), "nequi", "Marta", day(9))
                    .with_observations("abono pedido 12"),
            )
            .unwrap();
    }

    #[test]
    fn test_list_newest_first() {
        let (_temp, storage) = open_storage();
        let service = TransferService::new(&storage);
        seed(&service);

        let senders: Vec<_> = service
            .list(&TransferFilter::default())
            .unwrap()
            .into_iter()
            .map(|t| t.sender_name)
            .collect();
        assert_eq!(senders, vec!["Marta", "Luis", "Ana"]);
    }

    #[test]
    fn test_filters_combine() {
        let (_temp, storage) = open_storage();
        let service = TransferService::new(&storage);
        seed(&service);

        let nequi = service
            .list(&TransferFilter {
                account_type: Some("NEQUI".into()),
                ..TransferFilter::default()
            })
            .unwrap();
        assert_eq!(nequi.len(), 2);

        let ranged = service
            .list(&TransferFilter {
                range: DateRange::between(day(2), day(9)),
                search: Some("pedido".into()),
                ..TransferFilter::default()
            })
            .unwrap();
        assert_eq!(ranged.len(), 1);
        assert_eq!(ranged[0].sender_name, "Marta");

        assert_eq!(
            service.total(&DateRange::between(day(1), day(5))).unwrap(),
            Money::from_units(130_000)
        );
    }

    #[test]
    fn test_update_missing_and_blank_sender() {
        let (_temp, storage) = open_storage();
        let service = TransferService::new(&storage);

        let err = service
            .update(
                TransferId::new(1),
                TransferDraft::new(Money::from_units(1), "Nequi", "Ana", day(1)),
            )
            .unwrap_err();
        assert!(err.is_not_found());

        let err = service
            .create(TransferDraft::new(Money::from_units(1), "Nequi", "", day(1)))
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_delete_audits_before_value() {
        let (_temp, storage) = open_storage();
        let service = TransferService::new(&storage);
        let transfer = service
            .create(TransferDraft::new(Money::from_units(10), "Nequi", "Ana", day(1)))
            .unwrap();
        service.delete(transfer.id).unwrap();

        let entries = storage.audit().read_all().unwrap();
        let last = entries.last().unwrap();
        assert!(last.after.is_none());
        assert_eq!(last.before.as_ref().unwrap()["sender_name"], "Ana");
    }
}
