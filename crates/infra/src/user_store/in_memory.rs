use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use tracing::debug;

use warden_auth::{CodePurpose, User, UserStore};
use warden_core::{DomainError, DomainResult, UserId};

/// In-memory user store.
///
/// Intended for tests/dev. Every write runs under the single write lock, which
/// is what makes `compare_and_update` atomic. Mutators run against a copy that
/// is only committed once the uniqueness checks pass.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.read().map(|users| users.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate `candidate` against every other record, then replace.
    fn commit(users: &mut HashMap<UserId, User>, mut candidate: User) -> DomainResult<User> {
        for other in users.values().filter(|u| u.id != candidate.id) {
            if other.email == candidate.email {
                return Err(DomainError::DuplicateEmail);
            }
            for purpose in [CodePurpose::Verify, CodePurpose::ResetPassword, CodePurpose::ChangeEmail] {
                if let (Some(mine), Some(theirs)) = (candidate.code(purpose), other.code(purpose)) {
                    if mine.token == theirs.token {
                        return Err(DomainError::internal(format!("{purpose} code collision")));
                    }
                }
            }
        }

        candidate.version += 1;
        candidate.last_modified_at = Utc::now();
        users.insert(candidate.id, candidate.clone());
        debug!(user_id = %candidate.id, version = candidate.version, "user committed");
        Ok(candidate)
    }
}

fn poisoned<T>(_: T) -> DomainError {
    DomainError::internal("user store lock poisoned")
}

impl UserStore for InMemoryUserStore {
    fn insert(&self, user: User) -> DomainResult<User> {
        let mut users = self.users.write().map_err(poisoned)?;
        if users.contains_key(&user.id) {
            return Err(DomainError::internal(format!("user {} already exists", user.id)));
        }
        Self::commit(&mut users, user)
    }

    fn load(&self, id: UserId) -> DomainResult<User> {
        let users = self.users.read().map_err(poisoned)?;
        users.get(&id).cloned().ok_or(DomainError::NotFound)
    }

    fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    fn update(&self, id: UserId, mutator: &mut dyn FnMut(&mut User)) -> DomainResult<User> {
        let mut users = self.users.write().map_err(poisoned)?;
        let mut candidate = users.get(&id).cloned().ok_or(DomainError::NotFound)?;
        mutator(&mut candidate);
        Self::commit(&mut users, candidate)
    }

    fn compare_and_update(
        &self,
        id: UserId,
        purpose: CodePurpose,
        expected: &str,
        mutator: &mut dyn FnMut(&mut User),
    ) -> DomainResult<Option<User>> {
        let mut users = self.users.write().map_err(poisoned)?;
        let current = users.get(&id).ok_or(DomainError::NotFound)?;

        let matches = current
            .code(purpose)
            .is_some_and(|code| code.token.as_str() == expected);
        if !matches {
            return Ok(None);
        }

        let mut candidate = current.clone();
        mutator(&mut candidate);
        Self::commit(&mut users, candidate).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_auth::{PasswordHash, Role, TokenIssuer};

    fn user(email: &str) -> User {
        let now = Utc::now();
        User::new(
            UserId::new(),
            email,
            PasswordHash::new("test:pw"),
            TokenIssuer::default().mint(now).unwrap(),
            now,
        )
    }

    #[test]
    fn insert_then_load_and_find() {
        let store = InMemoryUserStore::new();
        let alice = store.insert(user("alice@example.com")).unwrap();
        assert_eq!(alice.version, 1);

        assert_eq!(store.load(alice.id).unwrap().email, "alice@example.com");
        assert!(store.find_by_email("alice@example.com").unwrap().is_some());
        assert!(!store.exists_by_email("bob@example.com").unwrap());
        assert_eq!(store.load(UserId::new()).unwrap_err(), DomainError::NotFound);
    }

    #[test]
    fn duplicate_email_is_rejected_on_insert_and_update() {
        let store = InMemoryUserStore::new();
        store.insert(user("alice@example.com")).unwrap();
        let bob = store.insert(user("bob@example.com")).unwrap();

        let err = store.insert(user("alice@example.com")).unwrap_err();
        assert_eq!(err, DomainError::DuplicateEmail);

        let err = store
            .update(bob.id, &mut |u| u.email = "alice@example.com".into())
            .unwrap_err();
        assert_eq!(err, DomainError::DuplicateEmail);

        let unchanged = store.load(bob.id).unwrap();
        assert_eq!(unchanged.email, "bob@example.com");
        assert_eq!(unchanged.version, bob.version);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn update_bumps_version() {
        let store = InMemoryUserStore::new();
        let alice = store.insert(user("alice@example.com")).unwrap();
        let updated = store
            .update(alice.id, &mut |u| {
                u.roles.insert(Role::ADMIN);
            })
            .unwrap();
        assert_eq!(updated.version, alice.version + 1);
        assert!(updated.last_modified_at >= alice.last_modified_at);
        assert!(updated.has_role(&Role::ADMIN));
    }

    #[test]
    fn compare_and_update_requires_the_stored_code() {
        let store = InMemoryUserStore::new();
        let alice = store.insert(user("alice@example.com")).unwrap();
        let token = alice.verification_code.as_ref().unwrap().token.as_str().to_string();

        let mut clear = |u: &mut User| u.verification_code = None;
        assert!(store.compare_and_update(alice.id, CodePurpose::Verify, "nope", &mut clear).unwrap().is_none());
        assert!(store.compare_and_update(alice.id, CodePurpose::ResetPassword, &token, &mut clear).unwrap().is_none());

        let committed = store
            .compare_and_update(alice.id, CodePurpose::Verify, &token, &mut clear)
            .unwrap()
            .unwrap();
        assert!(committed.verification_code.is_none());
        assert_eq!(committed.version, alice.version + 1);
        assert_eq!(store.load(alice.id).unwrap().version, committed.version);

        assert!(store.compare_and_update(alice.id, CodePurpose::Verify, &token, &mut clear).unwrap().is_none());
    }
}
