//! Registered users and the current session, each mirrored to its own slot.
//!
//! This is deliberately not an authentication system: passwords are stored
//! as-is and checked with a linear scan, matching the system it replaces.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::storage::{Storage, SESSION_SLOT, USERS_SLOT};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub full_name: String,
    pub cpf: String,
    pub email: String,
    pub password: String,
}

/// What the session slot actually holds: id and password are stripped
/// before anything leaves the users registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub username: String,
    pub full_name: String,
    pub cpf: String,
    pub email: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            cpf: user.cpf.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("this email is already in use")]
    EmailTaken,
    #[error("this CPF is already registered")]
    CpfTaken,
    #[error(transparent)]
    Storage(#[from] Error),
}

#[derive(Debug)]
pub struct Session {
    storage: Storage,
    users: Vec<User>,
    current: Option<SessionUser>,
}

impl Session {
    /// Hydrates the registry and any persisted session. A present session
    /// user means the login screen is skipped at startup.
    pub fn load(storage: Storage) -> Self {
        let users = storage.read(USERS_SLOT).unwrap_or_default();
        let current = storage.read(SESSION_SLOT);
        Self {
            storage,
            users,
            current,
        }
    }

    pub fn current(&self) -> Option<&SessionUser> {
        self.current.as_ref()
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Appends a user unless the email or CPF is already registered.
    pub fn register(&mut self, user: User) -> std::result::Result<(), RegisterError> {
        if self.users.iter().any(|u| u.email == user.email) {
            return Err(RegisterError::EmailTaken);
        }
        if self.users.iter().any(|u| u.cpf == user.cpf) {
            return Err(RegisterError::CpfTaken);
        }
        self.users.push(user);
        self.storage.write(USERS_SLOT, &self.users)?;
        Ok(())
    }

    /// Matches the identifier against username or email plus an exact
    /// password. Failure clears any current session and reports only a
    /// boolean, so the caller cannot tell an unknown user from a wrong
    /// password.
    pub fn login(&mut self, identifier: &str, password: &str) -> Result<bool> {
        let hit = self
            .users
            .iter()
            .find(|u| (u.username == identifier || u.email == identifier) && u.password == password);
        match hit {
            Some(user) => {
                let session_user = SessionUser::from(user);
                self.storage.write(SESSION_SLOT, &session_user)?;
                self.current = Some(session_user);
                Ok(true)
            }
            None => {
                self.current = None;
                self.storage.clear(SESSION_SLOT)?;
                Ok(false)
            }
        }
    }

    pub fn logout(&mut self) -> Result<()> {
        self.current = None;
        self.storage.clear(SESSION_SLOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn user(username: &str, email: &str, cpf: &str, password: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            full_name: format!("{username} full name"),
            cpf: cpf.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn register_then_login_sets_a_stripped_session_user() {
        let dir = tempdir().unwrap();
        let mut session = Session::load(Storage::open(dir.path()).unwrap());
        session
            .register(user("alice", "a@b.com", "123.456.789-00", "secret"))
            .unwrap();
        assert!(session.login("a@b.com", "secret").unwrap());
        let current = session.current().unwrap();
        assert_eq!(current.username, "alice");
        // The slot must not contain id or password.
        let raw: serde_json::Value = Storage::open(dir.path())
            .unwrap()
            .read(SESSION_SLOT)
            .unwrap();
        assert!(raw.get("password").is_none());
        assert!(raw.get("id").is_none());
        assert!(raw.get("fullName").is_some());
    }

    #[test]
    fn login_accepts_username_or_email() {
        let dir = tempdir().unwrap();
        let mut session = Session::load(Storage::open(dir.path()).unwrap());
        session
            .register(user("alice", "a@b.com", "123.456.789-00", "secret"))
            .unwrap();
        assert!(session.login("alice", "secret").unwrap());
        assert!(session.login("a@b.com", "secret").unwrap());
    }

    #[test]
    fn failed_login_clears_the_session() {
        let dir = tempdir().unwrap();
        let mut session = Session::load(Storage::open(dir.path()).unwrap());
        session
            .register(user("alice", "a@b.com", "123.456.789-00", "secret"))
            .unwrap();
        assert!(session.login("a@b.com", "secret").unwrap());
        assert!(!session.login("a@b.com", "wrong").unwrap());
        assert!(session.current().is_none());
        let reloaded = Session::load(Storage::open(dir.path()).unwrap());
        assert!(reloaded.current().is_none());
    }

    #[test]
    fn duplicate_email_and_cpf_are_rejected() {
        let dir = tempdir().unwrap();
        let mut session = Session::load(Storage::open(dir.path()).unwrap());
        session
            .register(user("alice", "a@b.com", "123.456.789-00", "secret"))
            .unwrap();
        let err = session
            .register(user("bob", "a@b.com", "999.999.999-99", "other"))
            .unwrap_err();
        assert!(matches!(err, RegisterError::EmailTaken));
        let err = session
            .register(user("bob", "b@b.com", "123.456.789-00", "other"))
            .unwrap_err();
        assert!(matches!(err, RegisterError::CpfTaken));
        assert_eq!(session.users().len(), 1);
    }

    #[test]
    fn session_survives_a_reload() {
        let dir = tempdir().unwrap();
        let storage = Storage::open(dir.path()).unwrap();
        let mut session = Session::load(storage.clone());
        session
            .register(user("alice", "a@b.com", "123.456.789-00", "secret"))
            .unwrap();
        session.login("alice", "secret").unwrap();
        let reloaded = Session::load(storage.clone());
        assert_eq!(reloaded.current(), session.current());

        let mut session = reloaded;
        session.logout().unwrap();
        let reloaded = Session::load(storage);
        assert!(reloaded.current().is_none());
    }
}
