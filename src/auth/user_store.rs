//! User Storage
//! Mission: Store and look up user accounts

use crate::auth::models::{User, UserRole};
use anyhow::{Context, Result};
use rusqlite::{params, types::Type, Connection, ErrorCode, Row};
use thiserror::Error;
use tracing::info;

/// Returned through `insert` when the username or email is already taken
#[derive(Debug, Error)]
#[error("username or email already taken: {0}")]
pub struct DuplicateUser(pub String);

/// Storage capability consumed by the auth core and user management.
///
/// Calls are synchronous round-trips; errors are opaque and propagate as-is.
pub trait UserStore: Send + Sync {
    /// `Ok(None)` when no user has that username
    fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Page through users in insertion order. `size == 0` means no limit;
    /// `page` is zero-based.
    fn list(&self, page: u64, size: u64) -> Result<Vec<User>>;

    /// Fails with [`DuplicateUser`] when the username or email is taken
    fn insert(&self, user: &User) -> Result<()>;

    /// True if any user already has this username or this email
    fn exists(&self, username: &str, email: &str) -> Result<bool>;
}

/// Records skipped before the requested page
pub fn page_offset(page: u64, size: u64) -> u64 {
    page.saturating_mul(size)
}

/// User storage with SQLite backend
pub struct SqliteUserStore {
    db_path: String,
}

impl SqliteUserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        info!("User store ready at {}", db_path);
        Ok(store)
    }

    fn connect(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .with_context(|| format!("Failed to open user database at {}", self.db_path))
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<()> {
        let conn = self.connect()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create users table")?;

        Ok(())
    }

    fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
        let role_str: String = row.get(4)?;
        let role = UserRole::from_name(&role_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                Type::Text,
                format!("unknown role {role_str:?}").into(),
            )
        })?;

        Ok(User {
            id: row.get(0)?,
            email: row.get(1)?,
            username: row.get(2)?,
            password_hash: row.get(3)?,
            role,
        })
    }
}

impl UserStore for SqliteUserStore {
    fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.connect()?;

        let mut stmt = conn.prepare(
            "SELECT id, email, username, password_hash, role
             FROM users WHERE username = ?1",
        )?;

        match stmt.query_row(params![username], Self::user_from_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to look up user"),
        }
    }

    fn list(&self, page: u64, size: u64) -> Result<Vec<User>> {
        let conn = self.connect()?;

        // SQLite reads a negative LIMIT as "no limit"
        let limit: i64 = if size == 0 {
            -1
        } else {
            i64::try_from(size).unwrap_or(i64::MAX)
        };
        let offset = i64::try_from(page_offset(page, size)).unwrap_or(i64::MAX);

        let mut stmt = conn.prepare(
            "SELECT id, email, username, password_hash, role
             FROM users ORDER BY rowid LIMIT ?1 OFFSET ?2",
        )?;

        let users = stmt
            .query_map(params![limit, offset], Self::user_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read users")?;

        Ok(users)
    }

    fn insert(&self, user: &User) -> Result<()> {
        let conn = self.connect()?;
        let inserted = conn.execute(
            "INSERT INTO users (id, email, username, password_hash, role)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id,
                user.email,
                user.username,
                user.password_hash,
                user.role.as_str(),
            ],
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(DuplicateUser(user.username.clone()).into())
            }
            Err(e) => Err(e).context("Failed to insert user"),
        }
    }

    fn exists(&self, username: &str, email: &str) -> Result<bool> {
        let conn = self.connect()?;
        let found: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1 OR email = ?2)",
                params![username, email],
                |row| row.get(0),
            )
            .context("Failed to check for existing user")?;

        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (SqliteUserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = SqliteUserStore::new(db_path).unwrap();
        (store, temp_file)
    }

    fn user(n: usize, role: UserRole) -> User {
        User {
            id: format!("id-{n}"),
            email: format!("user{n}@gapef.com.ar"),
            username: format!("user{n}"),
            password_hash: "$2b$04$not-a-real-hash".to_string(),
            role,
        }
    }

    #[test]
    fn test_insert_and_find_by_username() {
        let (store, _temp) = create_test_store();
        store.insert(&user(1, UserRole::Coach)).unwrap();

        let found = store.find_by_username("user1").unwrap().unwrap();
        assert_eq!(found, user(1, UserRole::Coach));

        assert!(store.find_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn test_exists_matches_username_or_email() {
        let (store, _temp) = create_test_store();
        store.insert(&user(1, UserRole::Athlete)).unwrap();

        assert!(store.exists("user1", "fresh@gapef.com.ar").unwrap());
        assert!(store.exists("fresh", "user1@gapef.com.ar").unwrap());
        assert!(!store.exists("fresh", "fresh@gapef.com.ar").unwrap());
    }

    #[test]
    fn test_unique_constraints_enforced() {
        let (store, _temp) = create_test_store();
        store.insert(&user(1, UserRole::Athlete)).unwrap();

        let mut clash = user(2, UserRole::Athlete);
        clash.username = "user1".to_string();
        let err = store.insert(&clash).unwrap_err();
        assert!(err.downcast_ref::<DuplicateUser>().is_some());

        let mut same_email = user(3, UserRole::Athlete);
        same_email.email = "user1@gapef.com.ar".to_string();
        let err = store.insert(&same_email).unwrap_err();
        assert!(err.downcast_ref::<DuplicateUser>().is_some());
    }

    #[test]
    fn test_list_pages_without_skipping() {
        let (store, _temp) = create_test_store();
        for n in 0..5 {
            store.insert(&user(n, UserRole::Athlete)).unwrap();
        }

        let first = store.list(0, 2).unwrap();
        assert_eq!(
            first.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(),
            vec!["user0", "user1"]
        );

        let second = store.list(1, 2).unwrap();
        assert_eq!(
            second.iter().map(|u| u.username.as_str()).collect::<Vec<_>>(),
            vec!["user2", "user3"]
        );

        assert_eq!(store.list(2, 2).unwrap().len(), 1);
        assert_eq!(store.list(0, 0).unwrap().len(), 5);
    }

    #[test]
    fn test_legacy_role_spelling_is_read() {
        let (store, temp) = create_test_store();
        let conn = Connection::open(temp.path()).unwrap();
        conn.execute(
            "INSERT INTO users (id, email, username, password_hash, role)
             VALUES ('old', 'old@gapef.com.ar', 'old', 'hash', 'ATLETHE')",
            [],
        )
        .unwrap();

        let found = store.find_by_username("old").unwrap().unwrap();
        assert_eq!(found.role, UserRole::Athlete);
    }

    #[test]
    fn test_page_offset() {
        assert_eq!(page_offset(0, 10), 0);
        assert_eq!(page_offset(1, 4), 4);
        assert_eq!(page_offset(3, 0), 0);
        assert_eq!(page_offset(u64::MAX, 2), u64::MAX);
    }
}
