use alloy::primitives::{Address, U256};
use tracing::warn;

use crate::contract::{CredentialContract, CredentialRecord};
use crate::error::ContractCallError;

/// Read-only projection of a credential token. Fetched fresh per screen
/// visit, never cached across navigations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialView {
    pub token_id: U256,
    pub student_name: String,
    pub degree: String,
    pub university: String,
    pub ipfs_hash: String,
    pub recipient: Option<Address>,
}

fn view(token_id: U256, record: CredentialRecord, recipient: Option<Address>) -> CredentialView {
    CredentialView {
        token_id,
        student_name: record.student_name,
        degree: record.degree,
        university: record.university,
        ipfs_hash: record.ipfs_hash,
        recipient,
    }
}

/// Looks up each token, isolating per-item failures: a failed lookup is
/// logged and skipped, the rest of the batch still renders in order.
pub async fn load_by_ids(contract: &dyn CredentialContract, ids: &[U256]) -> Vec<CredentialView> {
    let mut views = Vec::with_capacity(ids.len());
    for id in ids {
        match contract.verify(*id).await {
            Ok(record) => views.push(view(*id, record, None)),
            Err(err) => warn!(token_id = %id, "credential lookup failed, skipping: {err}"),
        }
    }
    views
}

/// Enumerates and loads the owner's credentials. The initial balance read
/// is all-or-nothing; enumeration and lookup failures are per-item.
pub async fn load_owned(
    contract: &dyn CredentialContract,
    owner: Address,
) -> Result<Vec<CredentialView>, ContractCallError> {
    let balance = contract.balance_of(owner).await?;
    let count = u64::try_from(balance).unwrap_or(u64::MAX);

    let mut views = Vec::new();
    for index in 0..count {
        let token_id = match contract.token_of_owner_by_index(owner, U256::from(index)).await {
            Ok(id) => id,
            Err(err) => {
                warn!(index, "token enumeration failed, skipping: {err}");
                continue;
            }
        };
        match contract.verify(token_id).await {
            Ok(record) => views.push(view(token_id, record, Some(owner))),
            Err(err) => warn!(token_id = %token_id, "credential lookup failed, skipping: {err}"),
        }
    }
    Ok(views)
}

/// Loads the credentials minted by an issuer.
pub async fn load_issued(
    contract: &dyn CredentialContract,
    issuer: Address,
) -> Result<Vec<CredentialView>, ContractCallError> {
    let ids = contract.list_issued(issuer).await?;
    Ok(load_by_ids(contract, &ids).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MockCredentialContract;

    fn record(student: &str) -> CredentialRecord {
        CredentialRecord {
            student_name: student.to_string(),
            degree: "BSc Computer Science".to_string(),
            university: "Example University".to_string(),
            ipfs_hash: "QmExample".to_string(),
        }
    }

    #[tokio::test]
    async fn failed_item_is_skipped_and_order_preserved() {
        let mut contract = MockCredentialContract::new();
        contract.expect_verify().returning(|token_id| {
            if token_id == U256::from(2) {
                Err(ContractCallError::call("verify", "execution reverted"))
            } else {
                Ok(record(&format!("student-{token_id}")))
            }
        });

        let ids = [U256::from(1), U256::from(2), U256::from(3)];
        let views = load_by_ids(&contract, &ids).await;

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].token_id, U256::from(1));
        assert_eq!(views[1].token_id, U256::from(3));
        assert_eq!(views[0].student_name, "student-1");
    }

    #[tokio::test]
    async fn load_owned_enumerates_by_index() {
        let owner = Address::from([0x0a; 20]);
        let mut contract = MockCredentialContract::new();
        contract
            .expect_balance_of()
            .returning(|_| Ok(U256::from(2)));
        contract
            .expect_token_of_owner_by_index()
            .returning(|_, index| Ok(index + U256::from(100)));
        contract.expect_verify().returning(|token_id| Ok(record(&format!("s{token_id}"))));

        let views = load_owned(&contract, owner).await.unwrap();

        assert_eq!(views.len(), 2);
        assert_eq!(views[0].token_id, U256::from(100));
        assert_eq!(views[1].token_id, U256::from(101));
        assert_eq!(views[0].recipient, Some(owner));
    }

    #[tokio::test]
    async fn load_owned_skips_failed_enumeration_slot() {
        let owner = Address::from([0x0b; 20]);
        let mut contract = MockCredentialContract::new();
        contract
            .expect_balance_of()
            .returning(|_| Ok(U256::from(3)));
        contract.expect_token_of_owner_by_index().returning(|_, index| {
            if index == U256::from(1) {
                Err(ContractCallError::call("tokenOfOwnerByIndex", "execution reverted"))
            } else {
                Ok(index)
            }
        });
        contract.expect_verify().returning(|token_id| Ok(record(&format!("s{token_id}"))));

        let views = load_owned(&contract, owner).await.unwrap();
        assert_eq!(views.len(), 2);
    }

    #[tokio::test]
    async fn load_owned_propagates_balance_failure() {
        let mut contract = MockCredentialContract::new();
        contract
            .expect_balance_of()
            .returning(|_| Err(ContractCallError::call("balanceOf", "rpc unavailable")));

        let err = load_owned(&contract, Address::ZERO).await.unwrap_err();
        assert!(matches!(err, ContractCallError::Call { op: "balanceOf", .. }));
    }

    #[tokio::test]
    async fn load_issued_forwards_listed_ids() {
        let issuer = Address::from([0x0c; 20]);
        let mut contract = MockCredentialContract::new();
        contract
            .expect_list_issued()
            .returning(|_| Ok(vec![U256::from(7), U256::from(9)]));
        contract.expect_verify().returning(|token_id| Ok(record(&format!("s{token_id}"))));

        let views = load_issued(&contract, issuer).await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[1].token_id, U256::from(9));
    }
}
