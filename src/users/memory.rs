use std::{collections::BTreeMap, sync::Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{
    repo::{RepoError, UserRepository},
    repo_types::{NewUser, User, UserChanges},
};

const UNIQUE_EMAIL: &str = r#"duplicate key value violates unique constraint "users_email_key""#;

/// In-process stand-in for the Postgres table. Ids start at 1 like a fresh `BIGSERIAL`.
#[derive(Default)]
pub struct MemoryUserRepository {
    inner: Mutex<Table>,
}

#[derive(Default)]
struct Table {
    last_id: i64,
    rows: BTreeMap<i64, User>,
}

impl Table {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut table = self.inner.lock().unwrap();
        if table.email_taken(&user.email, None) {
            return Err(RepoError::Conflict(UNIQUE_EMAIL.into()));
        }
        table.last_id += 1;
        let row = User {
            id: table.last_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, id: i64) -> Result<User, RepoError> {
        let table = self.inner.lock().unwrap();
        table.rows.get(&id).cloned().ok_or(RepoError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, RepoError> {
        let table = self.inner.lock().unwrap();
        table
            .rows
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        let table = self.inner.lock().unwrap();
        Ok(table.rows.values().cloned().collect())
    }

    async fn update(&self, id: i64, changes: UserChanges) -> Result<User, RepoError> {
        let mut table = self.inner.lock().unwrap();
        if !table.rows.contains_key(&id) {
            return Err(RepoError::NotFound);
        }
        if table.email_taken(&changes.email, Some(id)) {
            return Err(RepoError::Conflict(UNIQUE_EMAIL.into()));
        }
        let row = table.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        row.username = changes.username;
        row.email = changes.email;
        if let Some(hash) = changes.password_hash {
            row.password_hash = hash;
        }
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut table = self.inner.lock().unwrap();
        table.rows.remove(&id).map(|_| ()).ok_or(RepoError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            username: "testuser".into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
        }
    }

    #[tokio::test]
    async fn create_then_find_by_id() {
        let repo = MemoryUserRepository::new();
        let created = repo.create(new_user("test@gmail.com")).await.unwrap();
        assert_eq!(created.id, 1);

        let found = repo.find_by_id(created.id).await.unwrap();
        assert_eq!(found, created);
        assert_eq!(repo.find_by_email("test@gmail.com").await.unwrap().id, 1);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let repo = MemoryUserRepository::new();
        repo.create(new_user("dup@gmail.com")).await.unwrap();
        let err = repo.create(new_user("dup@gmail.com")).await.unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_then_find_is_not_found() {
        let repo = MemoryUserRepository::new();
        let user = repo.create(new_user("gone@gmail.com")).await.unwrap();
        repo.delete(user.id).await.unwrap();
        assert!(matches!(repo.find_by_id(user.id).await, Err(RepoError::NotFound)));
        assert!(matches!(repo.delete(user.id).await, Err(RepoError::NotFound)));
    }

    #[tokio::test]
    async fn update_keeps_hash_and_created_at_unless_replaced() {
        let repo = MemoryUserRepository::new();
        let user = repo.create(new_user("a@gmail.com")).await.unwrap();

        let updated = repo
            .update(
                user.id,
                UserChanges {
                    username: "renamed".into(),
                    email: "b@gmail.com".into(),
                    password_hash: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.username, "renamed");
        assert_eq!(updated.password_hash, user.password_hash);
        assert_eq!(updated.created_at, user.created_at);
    }

    #[tokio::test]
    async fn update_to_someone_elses_email_conflicts() {
        let repo = MemoryUserRepository::new();
        repo.create(new_user("first@gmail.com")).await.unwrap();
        let second = repo.create(new_user("second@gmail.com")).await.unwrap();
        let err = repo
            .update(
                second.id,
                UserChanges {
                    username: "second".into(),
                    email: "first@gmail.com".into(),
                    password_hash: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(_)));
        assert!(matches!(
            repo.update(99, UserChanges {
                username: "x".into(),
                email: "x@gmail.com".into(),
                password_hash: None,
            })
            .await,
            Err(RepoError::NotFound)
        ));
    }
}
