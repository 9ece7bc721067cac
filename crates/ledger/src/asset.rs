//! External asset collaborator boundary.
//!
//! The ledger never moves tokens itself; it instructs this collaborator and
//! books the result. Calls are synchronous and non-reentrant by construction:
//! the collaborator receives no handle to ledger state, and every ledger
//! operation runs to completion under a `&mut` borrow.

use std::collections::HashMap;
use std::sync::RwLock;

use thiserror::Error;

use lendpool_core::{AssetId, PrincipalId};

/// Failure reported by the asset collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient balance: needed {required}, holder has {available}")]
    InsufficientBalance { required: u128, available: u128 },

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Custody and transfer of the fungible assets backing group funding.
pub trait AssetLedger {
    /// Units of `asset_id` the ledger itself currently custodies.
    fn custodied_balance(&self, asset_id: AssetId) -> u128;

    /// Move `amount` out of custody to `to`.
    fn transfer_out(
        &self,
        asset_id: AssetId,
        to: PrincipalId,
        amount: u128,
    ) -> Result<(), TransferError>;

    /// Pull `amount` from `from` into custody.
    fn transfer_in(
        &self,
        asset_id: AssetId,
        from: PrincipalId,
        amount: u128,
    ) -> Result<(), TransferError>;
}

/// In-memory asset ledger.
///
/// Intended for tests/dev. Custody and principal balances are plain maps
/// behind locks; seed them with [`credit_custody`] / [`credit_account`].
///
/// [`credit_custody`]: InMemoryAssetLedger::credit_custody
/// [`credit_account`]: InMemoryAssetLedger::credit_account
#[derive(Debug, Default)]
pub struct InMemoryAssetLedger {
    custody: RwLock<HashMap<AssetId, u128>>,
    accounts: RwLock<HashMap<(AssetId, PrincipalId), u128>>,
}

impl InMemoryAssetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the ledger's own custodial balance of an asset.
    pub fn credit_custody(&self, asset_id: AssetId, amount: u128) {
        let mut custody = self.custody.write().expect("asset custody lock poisoned");
        *custody.entry(asset_id).or_insert(0) += amount;
    }

    /// Seed a principal's balance of an asset.
    pub fn credit_account(&self, asset_id: AssetId, holder: PrincipalId, amount: u128) {
        let mut accounts = self.accounts.write().expect("asset accounts lock poisoned");
        *accounts.entry((asset_id, holder)).or_insert(0) += amount;
    }

    pub fn account_balance(&self, asset_id: AssetId, holder: PrincipalId) -> u128 {
        self.accounts
            .read()
            .expect("asset accounts lock poisoned")
            .get(&(asset_id, holder))
            .copied()
            .unwrap_or(0)
    }
}

impl AssetLedger for InMemoryAssetLedger {
    fn custodied_balance(&self, asset_id: AssetId) -> u128 {
        self.custody
            .read()
            .expect("asset custody lock poisoned")
            .get(&asset_id)
            .copied()
            .unwrap_or(0)
    }

    fn transfer_out(
        &self,
        asset_id: AssetId,
        to: PrincipalId,
        amount: u128,
    ) -> Result<(), TransferError> {
        let mut custody = self.custody.write().expect("asset custody lock poisoned");
        let balance = custody.entry(asset_id).or_insert(0);
        if *balance < amount {
            return Err(TransferError::InsufficientBalance {
                required: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        drop(custody);

        let mut accounts = self.accounts.write().expect("asset accounts lock poisoned");
        *accounts.entry((asset_id, to)).or_insert(0) += amount;
        Ok(())
    }

    fn transfer_in(
        &self,
        asset_id: AssetId,
        from: PrincipalId,
        amount: u128,
    ) -> Result<(), TransferError> {
        let mut accounts = self.accounts.write().expect("asset accounts lock poisoned");
        let balance = accounts.entry((asset_id, from)).or_insert(0);
        if *balance < amount {
            return Err(TransferError::InsufficientBalance {
                required: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        drop(accounts);

        let mut custody = self.custody.write().expect("asset custody lock poisoned");
        *custody.entry(asset_id).or_insert(0) += amount;
        Ok(())
    }
}
