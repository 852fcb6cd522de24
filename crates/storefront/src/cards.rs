//! Saved payment method service.
//!
//! Read-through cache over the backend's card endpoints. Mutations keep the
//! cached list coherent: deletes invalidate, set-default rewrites the cached
//! entry optimistically so exactly one card carries the default flag.

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

use giftwell_core::CardId;

use crate::backend::{BackendClient, BackendError};
use crate::cache::QueryCache;
use crate::models::{SavedCard, SessionToken};

/// Errors that can occur during saved-card operations.
#[derive(Debug, Error)]
pub enum CardsError {
    /// Backend request failed.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// A de-duplicated fetch failed; the error is shared between waiters.
    #[error("backend error: {0}")]
    SharedFetch(Arc<BackendError>),
}

impl CardsError {
    /// The underlying backend failure, however the fetch was wrapped.
    #[must_use]
    pub fn backend(&self) -> &BackendError {
        match self {
            Self::Backend(err) => err,
            Self::SharedFetch(err) => err.as_ref(),
        }
    }
}

/// Saved card operations over the account backend.
#[derive(Clone)]
pub struct CardsService {
    backend: BackendClient,
    cache: QueryCache<SessionToken, Vec<SavedCard>>,
}

impl CardsService {
    /// Create the service around an injected cache.
    ///
    /// The cache handle is shared with
    /// [`AuthService`](crate::auth::AuthService), which flushes it on logout.
    #[must_use]
    pub const fn new(
        backend: BackendClient,
        cache: QueryCache<SessionToken, Vec<SavedCard>>,
    ) -> Self {
        Self { backend, cache }
    }

    /// List the customer's saved cards, cached per token with de-duplicated
    /// concurrent fetches.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend request fails.
    #[instrument(skip_all)]
    pub async fn list(&self, token: &SessionToken) -> Result<Vec<SavedCard>, CardsError> {
        self.cache
            .try_get_with(token.clone(), self.backend.list_cards(token))
            .await
            .map_err(CardsError::SharedFetch)
    }

    /// Delete a saved card and invalidate the cached list.
    ///
    /// # Errors
    ///
    /// Returns an error if the card does not exist or the request fails.
    #[instrument(skip(self, token), fields(card_id = %card_id))]
    pub async fn delete(&self, token: &SessionToken, card_id: &CardId) -> Result<(), CardsError> {
        self.backend.delete_card(token, card_id).await?;
        self.cache.invalidate(token).await;
        Ok(())
    }

    /// Make a card the default and return the updated list.
    ///
    /// The backend flips the flag authoritatively; the cached list is
    /// rewritten in place to match (exactly the target card ends up with
    /// `is_default == true`) rather than re-fetched.
    ///
    /// # Errors
    ///
    /// Returns an error if the card does not exist or the request fails.
    #[instrument(skip(self, token), fields(card_id = %card_id))]
    pub async fn set_default(
        &self,
        token: &SessionToken,
        card_id: &CardId,
    ) -> Result<Vec<SavedCard>, CardsError> {
        self.backend.set_default_card(token, card_id).await?;

        if let Some(mut cards) = self.cache.get(token).await {
            for card in &mut cards {
                card.is_default = card.id == *card_id;
            }
            self.cache.insert(token.clone(), cards.clone()).await;
            return Ok(cards);
        }

        // Nothing cached to rewrite; fetch the authoritative list.
        self.list(token).await
    }
}
