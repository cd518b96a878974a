//! User lookup and registration.

use common::UserId;
use document_store::{DocumentStore, DocumentStoreExt};

use crate::collections::USERS;
use crate::config::{CartWriteMode, ShopConfig};
use crate::converter::OrderConverter;
use crate::error::Result;

use super::{User, UserAggregate};

/// Result of looking a user up by identifier.
///
/// Absence is a normal outcome; store failures travel in the surrounding
/// `Result`.
pub enum UserLookup<S> {
    Found(UserAggregate<S>),
    NotFound,
}

impl<S> UserLookup<S> {
    pub fn is_found(&self) -> bool {
        matches!(self, UserLookup::Found(_))
    }

    pub fn into_option(self) -> Option<UserAggregate<S>> {
        match self {
            UserLookup::Found(user) => Some(user),
            UserLookup::NotFound => None,
        }
    }
}

/// Entry point for obtaining user aggregates.
///
/// Holds the injected store handle and hands clones of it to every
/// aggregate it produces.
#[derive(Clone)]
pub struct Users<S> {
    store: S,
    write_mode: CartWriteMode,
}

impl<S: DocumentStore + Clone> Users<S> {
    /// Creates a repository using last-writer-wins cart writes.
    pub fn new(store: S) -> Self {
        Self::with_write_mode(store, CartWriteMode::default())
    }

    pub fn with_write_mode(store: S, write_mode: CartWriteMode) -> Self {
        Self { store, write_mode }
    }

    pub fn from_config(store: S, config: &ShopConfig) -> Self {
        Self::with_write_mode(store, config.cart_write_mode)
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Binds an in-memory user to the store without writing anything.
    pub fn bind(&self, user: User) -> UserAggregate<S> {
        UserAggregate::new(user, self.store.clone(), self.write_mode)
    }

    /// Inserts a new user and returns its aggregate.
    pub async fn register(&self, user: User) -> Result<UserAggregate<S>> {
        let aggregate = self.bind(user);
        aggregate.persist_new().await?;
        Ok(aggregate)
    }

    /// Loads a user by identifier.
    #[tracing::instrument(skip(self))]
    pub async fn find_by_identifier(&self, id: UserId) -> Result<UserLookup<S>> {
        let document = self
            .store
            .find_by_id(USERS, id.into())
            .await
            .inspect_err(|error| tracing::error!(%error, "failed to load user"))?;

        match document {
            Some(document) => {
                let user: User = document.into_typed()?;
                tracing::debug!("user loaded");
                Ok(UserLookup::Found(self.bind(user)))
            }
            None => {
                tracing::debug!("user not found");
                Ok(UserLookup::NotFound)
            }
        }
    }

    /// Order converter sharing this repository's store and write mode.
    pub fn orders(&self) -> OrderConverter<S> {
        OrderConverter::with_write_mode(self.store.clone(), self.write_mode)
    }
}
