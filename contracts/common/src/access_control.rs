//! Access Control Module
//!
//! Single-owner authorization. The owner is fixed when a contract is
//! created; every owner-only operation goes through [`only_owner`] before
//! touching state.

use crate::errors::{FundMeError, FundMeResult};
use crate::types::Address;

/// Fail with `NotOwner` unless `caller` is `owner`.
pub fn only_owner(owner: &Address, caller: &Address) -> FundMeResult<()> {
    if owner != caller {
        return Err(FundMeError::NotOwner {
            expected: *owner,
            actual: *caller,
        });
    }
    Ok(())
}

/// Fail with `Unauthorized` unless `caller` is `operator`.
pub fn only_operator(operator: &Address, caller: &Address) -> FundMeResult<()> {
    if operator != caller {
        return Err(FundMeError::Unauthorized {
            expected: *operator,
            actual: *caller,
        });
    }
    Ok(())
}

/// Fail with `AdminOnly` unless `caller` is `admin`.
pub fn only_admin(admin: &Address, caller: &Address) -> FundMeResult<()> {
    if admin != caller {
        return Err(FundMeError::AdminOnly);
    }
    Ok(())
}

/// Types with an immutable owner
pub trait Owned {
    fn owner(&self) -> &Address;

    /// Guard for owner-only operations
    fn ensure_owner(&self, caller: &Address) -> FundMeResult<()> {
        only_owner(self.owner(), caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Jar {
        owner: Address,
    }

    impl Owned for Jar {
        fn owner(&self) -> &Address {
            &self.owner
        }
    }

    #[test]
    fn test_only_owner() {
        let owner = [1u8; 32];
        assert!(only_owner(&owner, &owner).is_ok());

        let result = only_owner(&owner, &[2u8; 32]);
        assert_eq!(
            result,
            Err(FundMeError::NotOwner { expected: owner, actual: [2u8; 32] })
        );
    }

    #[test]
    fn test_only_operator_and_admin() {
        assert!(only_operator(&[3u8; 32], &[3u8; 32]).is_ok());
        assert!(matches!(
            only_operator(&[3u8; 32], &[4u8; 32]),
            Err(FundMeError::Unauthorized { .. })
        ));
        assert_eq!(only_admin(&[5u8; 32], &[6u8; 32]), Err(FundMeError::AdminOnly));
    }

    #[test]
    fn test_owned_guard() {
        let v = Jar { owner: [7u8; 32] };
        assert!(v.ensure_owner(&[7u8; 32]).is_ok());
        assert!(matches!(v.ensure_owner(&[8u8; 32]), Err(FundMeError::NotOwner { .. })));
    }
}
