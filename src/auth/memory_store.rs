//! In-memory user store, used by tests and local experiments

use crate::auth::models::User;
use crate::auth::user_store::{page_offset, DuplicateUser, UserStore};
use anyhow::Result;
use parking_lot::RwLock;

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

impl UserStore for MemoryUserStore {
    fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .read()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    fn list(&self, page: u64, size: u64) -> Result<Vec<User>> {
        let users = self.users.read();
        let skip = usize::try_from(page_offset(page, size)).unwrap_or(usize::MAX);
        let take = if size == 0 {
            usize::MAX
        } else {
            usize::try_from(size).unwrap_or(usize::MAX)
        };

        Ok(users.iter().skip(skip).take(take).cloned().collect())
    }

    fn insert(&self, user: &User) -> Result<()> {
        let mut users = self.users.write();
        if users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(DuplicateUser(user.username.clone()).into());
        }
        users.push(user.clone());
        Ok(())
    }

    fn exists(&self, username: &str, email: &str) -> Result<bool> {
        Ok(self
            .users
            .read()
            .iter()
            .any(|u| u.username == username || u.email == email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::UserRole;

    fn user(name: &str) -> User {
        User {
            id: name.to_string(),
            email: format!("{name}@gapef.com.ar"),
            username: name.to_string(),
            password_hash: "hash".to_string(),
            role: UserRole::Athlete,
        }
    }

    #[test]
    fn test_memory_store_behaves_like_sqlite() {
        let store = MemoryUserStore::new();
        assert!(store.is_empty());

        store.insert(&user("ana")).unwrap();
        store.insert(&user("joan")).unwrap();
        assert!(store.insert(&user("ana")).is_err());
        assert_eq!(store.len(), 2);

        assert!(store.exists("ana", "x@y.z").unwrap());
        assert!(store.exists("x", "joan@gapef.com.ar").unwrap());
        assert!(!store.exists("x", "x@y.z").unwrap());

        assert_eq!(store.find_by_username("joan").unwrap().unwrap().id, "joan");
        assert_eq!(store.list(1, 1).unwrap()[0].username, "joan");
        assert_eq!(store.list(0, 0).unwrap().len(), 2);
    }
}
