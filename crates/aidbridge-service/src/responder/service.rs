//! Responder registration and nearest-N lookup.

use tracing::info;

use aidbridge_core::AppError;
use aidbridge_core::result::AppResult;
use aidbridge_core::types::geo::GeoPoint;
use aidbridge_core::types::id::ResponderId;
use aidbridge_database::Store;
use aidbridge_database::store::NearbyResponder;
use aidbridge_entity::responder::{CreateResponder, Responder};

use crate::context::RequestContext;
use crate::lookup;

/// Most responders a single nearest query may return.
const MAX_NEAREST: usize = 100;

/// Manages responder organizations.
#[derive(Debug, Clone)]
pub struct ResponderService {
    store: Store,
}

impl ResponderService {
    /// Creates a new responder service.
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Register the calling responder actor's organization record.
    pub async fn register(
        &self,
        ctx: &RequestContext,
        input: CreateResponder,
    ) -> AppResult<Responder> {
        let id = ctx.require_responder()?;
        input.validate()?;

        let responder = Responder::new(id, input);
        self.store.responders.insert(&responder).await?;

        info!(
            responder_id = %id,
            name = %responder.name,
            categories = ?responder.categories,
            "Responder registered"
        );

        Ok(responder)
    }

    /// Fetch a responder.
    pub async fn get(&self, id: ResponderId) -> AppResult<Responder> {
        lookup::responder(&self.store, id).await
    }

    /// The `limit` responders closest to `point`, optionally filtered by category.
    pub async fn nearest(
        &self,
        point: GeoPoint,
        limit: usize,
        category: Option<&str>,
    ) -> AppResult<Vec<NearbyResponder>> {
        point.validate()?;
        if limit == 0 || limit > MAX_NEAREST {
            return Err(AppError::validation(format!(
                "limit must be between 1 and {MAX_NEAREST}"
            )));
        }
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        self.store.responders.nearest(point, limit, category).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aidbridge_core::error::ErrorKind;

    fn input(name: &str, lat: f64, lon: f64) -> CreateResponder {
        CreateResponder {
            name: name.into(),
            categories: vec!["food".into()],
            location: GeoPoint::new(lat, lon),
            contact_email: Some("ops@example.org".into()),
        }
    }

    #[tokio::test]
    async fn test_register_uses_actor_id_once() {
        let service = ResponderService::new(Store::memory());
        let id = ResponderId::new();
        let ctx = RequestContext::responder(id);
        let responder = service.register(&ctx, input("NGO", 19.0, 72.8)).await.unwrap();
        assert_eq!(responder.id, id);

        let err = service.register(&ctx, input("NGO", 19.0, 72.8)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateAction);
    }

    #[tokio::test]
    async fn test_nearest_validates_limit() {
        let service = ResponderService::new(Store::memory());
        let err = service
            .nearest(GeoPoint::new(0.0, 0.0), 0, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_nearest_by_category() {
        let service = ResponderService::new(Store::memory());
        for (name, lat, lon) in [("Far", 18.52, 73.85), ("Near", 19.08, 72.88)] {
            let ctx = RequestContext::responder(ResponderId::new());
            service.register(&ctx, input(name, lat, lon)).await.unwrap();
        }
        let found = service
            .nearest(GeoPoint::new(19.076, 72.8777), 2, Some(" Food "))
            .await
            .unwrap();
        assert_eq!(found[0].responder.name, "Near");
        assert!(found[0].distance_km < found[1].distance_km);
    }
}
