use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::conditional::{last_modified_layer, LastModified};
use crate::api::paged::PagedResultSet;
use crate::config;
use crate::entity::{Entity, MonotonicClock, Validate};
use crate::error::ApiError;
use crate::patch::{self, PatchOperation};
use crate::store::EntityStore;

/// Everything the generic REST layer needs from a resource type.
pub trait Resource:
    Entity + Validate + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

impl<T> Resource for T where
    T: Entity + Validate + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// Generic REST controller over one entity type: the data collection it
/// operates on, the mutation clock, and the mount path used for Location
/// references.
pub struct RestEntityController<T> {
    store: Arc<dyn EntityStore<T>>,
    clock: Arc<MonotonicClock>,
    base_path: String,
}

impl<T> Clone for RestEntityController<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            base_path: self.base_path.clone(),
        }
    }
}

impl<T: Resource> RestEntityController<T> {
    pub fn new(
        base_path: impl Into<String>,
        store: Arc<dyn EntityStore<T>>,
        clock: Arc<MonotonicClock>,
    ) -> Self {
        Self { store, clock, base_path: base_path.into() }
    }

    /// Location reference for an entity created under this controller.
    pub fn location_of(&self, id: Uuid) -> String {
        format!("{}/{}", self.base_path, id)
    }

    /// Page of entities in creation-time order. `offset` is a keyset cursor:
    /// only entities created strictly after it are included, so pages stay
    /// stable under concurrent inserts. `totalCount` covers the unfiltered
    /// type-scoped set.
    pub async fn list(
        &self,
        limit: Option<i64>,
        offset: Option<DateTime<Utc>>,
    ) -> Result<PagedResultSet<T>, ApiError> {
        let max = config::config().api.max_page_size;
        if let Some(limit) = limit {
            if limit < 1 || limit > max {
                let mut errors = crate::entity::FieldErrors::new();
                errors.push("limit", format!("must be between 1 and {max}"));
                return Err(errors.into());
            }
        }

        let results = self.store.list(offset, limit.map(|l| l as usize)).await?;
        let total_count = self.store.count().await?;
        Ok(PagedResultSet::new(results, total_count))
    }

    pub async fn get(&self, id: Uuid) -> Result<T, ApiError> {
        self.store.find(id).await?.ok_or(ApiError::NotFound)
    }

    /// Creates an entity. Caller-supplied identifier and timestamps are
    /// ignored: the server assigns a fresh id and stamps both audit fields
    /// with the same instant. Validation runs before any store write.
    pub async fn create(&self, mut entity: T) -> Result<T, ApiError> {
        entity.validate()?;

        let now = self.clock.next();
        entity.set_id(Uuid::new_v4());
        entity.set_created_at(now);
        entity.set_updated_at(now);

        self.store.insert(entity.clone()).await?;
        self.store.commit().await?;

        Ok(entity)
    }

    /// Full replace. The payload's claimed `updatedAt` is the
    /// optimistic-concurrency token: it must be strictly newer than the
    /// stored value or the update is rejected as stale. Identity and
    /// creation time always come from the stored entity.
    pub async fn update(&self, id: Uuid, mut entity: T) -> Result<(), ApiError> {
        let previous = self.store.find(id).await?.ok_or(ApiError::NotFound)?;

        if previous.updated_at() >= entity.updated_at() {
            return Err(ApiError::stale_update());
        }

        entity.set_id(id);
        entity.set_created_at(previous.created_at());
        entity.set_updated_at(self.clock.next());

        entity.validate()?;

        self.store.replace(entity).await?;
        self.store.commit().await?;

        Ok(())
    }

    /// Partial update: applies the operations in order to a working copy of
    /// the stored entity's JSON document. Any failure discards the copy.
    /// Identifier and creation time are restored afterwards, so a patch
    /// cannot alter them even when an operation targets those fields.
    pub async fn patch(&self, id: Uuid, ops: Vec<PatchOperation>) -> Result<T, ApiError> {
        let stored = self.store.find(id).await?.ok_or(ApiError::NotFound)?;

        let doc = serde_json::to_value(&stored)
            .map_err(|e| ApiError::internal_server_error(format!("serialize entity: {e}")))?;
        let patched = patch::apply(&doc, &ops)?;

        let mut entity: T = serde_json::from_value(patched).map_err(|e| {
            let mut errors = crate::entity::FieldErrors::new();
            errors.push("body", format!("patched document is invalid: {e}"));
            ApiError::from(errors)
        })?;

        entity.set_id(stored.id());
        entity.set_created_at(stored.created_at());
        entity.set_updated_at(self.clock.next());

        entity.validate()?;

        self.store.replace(entity.clone()).await?;
        self.store.commit().await?;

        Ok(entity)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        if !self.store.remove(id).await? {
            return Err(ApiError::NotFound);
        }
        self.store.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Maximum number of entities to return.
    pub limit: Option<i64>,
    /// Keyset cursor: only entities created strictly after this instant.
    pub offset: Option<DateTime<Utc>>,
}

/// Single-entity success body. Carries the last-modified marker the
/// conditional layer reads back out of the response, plus the Location
/// header for 201s.
pub struct EntityBody<T> {
    status: StatusCode,
    location: Option<String>,
    entity: T,
}

impl<T: Resource> EntityBody<T> {
    pub fn ok(entity: T) -> Self {
        Self { status: StatusCode::OK, location: None, entity }
    }

    pub fn created(entity: T, location: String) -> Self {
        Self { status: StatusCode::CREATED, location: Some(location), entity }
    }
}

impl<T: Resource> IntoResponse for EntityBody<T> {
    fn into_response(self) -> Response {
        let last_modified = LastModified(self.entity.updated_at());
        let mut response = (self.status, Json(self.entity)).into_response();
        response.extensions_mut().insert(last_modified);
        if let Some(location) = self.location {
            if let Ok(value) = HeaderValue::from_str(&location) {
                response.headers_mut().insert(header::LOCATION, value);
            }
        }
        response
    }
}

/// GET /{resource} - list a page of entities
pub async fn collection_get<T: Resource>(
    State(controller): State<RestEntityController<T>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<PagedResultSet<T>>, ApiError> {
    Ok(Json(controller.list(query.limit, query.offset).await?))
}

/// POST /{resource} - create an entity
pub async fn collection_post<T: Resource>(
    State(controller): State<RestEntityController<T>>,
    Json(body): Json<T>,
) -> Result<EntityBody<T>, ApiError> {
    let entity = controller.create(body).await?;
    let location = controller.location_of(entity.id());
    Ok(EntityBody::created(entity, location))
}

/// GET /{resource}/{id} - fetch a single entity
pub async fn record_get<T: Resource>(
    State(controller): State<RestEntityController<T>>,
    Path(id): Path<Uuid>,
) -> Result<EntityBody<T>, ApiError> {
    Ok(EntityBody::ok(controller.get(id).await?))
}

/// PUT /{resource}/{id} - replace an entity
pub async fn record_put<T: Resource>(
    State(controller): State<RestEntityController<T>>,
    Path(id): Path<Uuid>,
    Json(body): Json<T>,
) -> Result<StatusCode, ApiError> {
    controller.update(id, body).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /{resource}/{id} - apply a patch-operation list
pub async fn record_patch<T: Resource>(
    State(controller): State<RestEntityController<T>>,
    Path(id): Path<Uuid>,
    Json(ops): Json<Vec<PatchOperation>>,
) -> Result<EntityBody<T>, ApiError> {
    Ok(EntityBody::ok(controller.patch(id, ops).await?))
}

/// DELETE /{resource}/{id} - remove an entity
pub async fn record_delete<T: Resource>(
    State(controller): State<RestEntityController<T>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    controller.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Mounts the six CRUD routes for one resource type, wrapped in the
/// conditional-request layer. `base_path` must match the mount point so
/// Location references resolve.
pub fn resource_router<T: Resource>(
    base_path: &str,
    store: Arc<dyn EntityStore<T>>,
    clock: Arc<MonotonicClock>,
) -> Router {
    let controller = RestEntityController::new(base_path, store, clock);

    Router::new()
        .route("/", get(collection_get::<T>).post(collection_post::<T>))
        .route(
            "/:id",
            get(record_get::<T>)
                .put(record_put::<T>)
                .patch(record_patch::<T>)
                .delete(record_delete::<T>),
        )
        .layer(axum::middleware::from_fn(last_modified_layer))
        .with_state(controller)
}
