//! Location cache service — write-through location cache that pushes every
//! weather update to the trigger engine.

use trygr_domain::error::{NotFoundError, TrygrError};
use trygr_domain::event::Event;
use trygr_domain::id::PostalCode;
use trygr_domain::location::Location;
use trygr_domain::time::now;

use crate::ports::{EventPublisher, LocationStore};

/// Application service in front of a [`LocationStore`].
pub struct LocationCacheService<S, P> {
    store: S,
    publisher: P,
}

impl<S, P> LocationCacheService<S, P>
where
    S: LocationStore + Sync,
    P: EventPublisher + Sync,
{
    /// Create a new service backed by the given store and publisher.
    pub fn new(store: S, publisher: P) -> Self {
        Self { store, publisher }
    }

    /// Validate, stamp `last_updated`, persist and publish a location.
    ///
    /// # Errors
    ///
    /// Returns [`TrygrError::Validation`] if invariants fail, or a
    /// storage error propagated from the store.
    #[tracing::instrument(skip(self, location), fields(postal_code = %location.postal_code))]
    pub async fn upsert_location(&self, mut location: Location) -> Result<Location, TrygrError> {
        location.validate()?;
        location.last_updated = now().timestamp();
        let saved = self.store.upsert(location).await?;
        if let Err(err) = self
            .publisher
            .publish(Event::LocationUpdated(saved.clone()))
            .await
        {
            tracing::warn!(%err, "failed to publish location update");
        }
        Ok(saved)
    }

    /// Look up a location by postal code, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`TrygrError::NotFound`] when the location is not cached,
    /// or a storage error from the store.
    #[tracing::instrument(skip(self))]
    pub async fn get_location(&self, postal_code: &PostalCode) -> Result<Location, TrygrError> {
        self.store
            .get_by_postal_code(postal_code)
            .await?
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Location",
                    id: postal_code.to_string(),
                }
                .into()
            })
    }
}
