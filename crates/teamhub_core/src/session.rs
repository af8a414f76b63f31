//! Authenticated-account context handed to every resource store.
//!
//! A session is a plain value: switching accounts means building new stores
//! with a new session, never mutating one stores already hold.

use crate::model::profile::AccountId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    account_id: Option<AccountId>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { account_id: None }
    }

    pub fn authenticated(account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
        }
    }

    pub fn account_id(&self) -> Option<AccountId> {
        self.account_id
    }

    pub fn is_authenticated(&self) -> bool {
        self.account_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use uuid::Uuid;

    #[test]
    fn default_session_is_anonymous() {
        assert_eq!(Session::default(), Session::anonymous());
        assert!(!Session::default().is_authenticated());
    }

    #[test]
    fn authenticated_session_exposes_account() {
        let account = Uuid::new_v4();
        let session = Session::authenticated(account);
        assert_eq!(session.account_id(), Some(account));
    }
}
