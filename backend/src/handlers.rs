use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use diesel::sqlite::SqliteConnection;
use serde::Deserialize;

use crate::catalog;
use crate::db::DbPool;
use crate::error::EstateResult;
use crate::models::{
    NewPartner, NewPropertyTag, NewPropertyType, NewUser, Offer, OfferChanges, OfferDraft, Partner,
    Property, PropertyChanges, PropertyDetails, PropertyDraft, PropertyFilter, PropertyTag,
    PropertyType, PropertyTypeDetails, User,
};
use crate::offer;
use crate::partner;
use crate::property;

#[derive(Clone)]
pub struct AppState {
    pool: DbPool,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Runs diesel work on the blocking pool with a pooled connection.
    async fn run<T, F>(&self, work: F) -> EstateResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> EstateResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            work(&mut *conn)
        })
        .await?
    }
}

#[derive(Deserialize)]
pub struct BatchRequest {
    pub ids: Vec<i32>,
}

#[derive(Deserialize)]
pub struct TagsRequest {
    pub tag_ids: Vec<i32>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Hello, Real Estate!" }))
        .route("/properties", get(list_properties).post(create_property))
        .route("/properties/sell", post(sell_properties))
        .route("/properties/cancel", post(cancel_properties))
        .route(
            "/properties/:id",
            get(get_property).patch(update_property).delete(delete_property),
        )
        .route("/properties/:id/tags", put(set_property_tags))
        .route("/properties/:id/sell", post(sell_property))
        .route("/properties/:id/cancel", post(cancel_property))
        .route("/properties/:id/offers", get(list_property_offers))
        .route("/offers", post(create_offer))
        .route("/offers/:id", axum::routing::patch(update_offer))
        .route("/offers/:id/accept", post(accept_offer))
        .route("/offers/:id/refuse", post(refuse_offer))
        .route("/property-types", get(list_types).post(create_type))
        .route("/property-types/:id", get(get_type).delete(delete_type))
        .route("/property-types/:id/offers", get(type_offers))
        .route("/property-tags", get(list_tags).post(create_tag))
        .route("/property-tags/:id", axum::routing::delete(delete_tag))
        .route("/partners", get(list_partners).post(create_partner))
        .route("/partners/:id", get(get_partner))
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id/properties", get(user_properties))
        .with_state(state)
}

async fn list_properties(
    State(state): State<AppState>,
    Query(filter): Query<PropertyFilter>,
) -> EstateResult<Json<Vec<PropertyDetails>>> {
    state.run(move |conn| property::list_properties(conn, &filter)).await.map(Json)
}

async fn create_property(
    State(state): State<AppState>,
    Json(draft): Json<PropertyDraft>,
) -> EstateResult<(StatusCode, Json<PropertyDetails>)> {
    let created = state.run(move |conn| property::create_property(conn, draft)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_property(State(state): State<AppState>, Path(id): Path<i32>) -> EstateResult<Json<PropertyDetails>> {
    state.run(move |conn| property::get_property(conn, id)).await.map(Json)
}

async fn update_property(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(changes): Json<PropertyChanges>,
) -> EstateResult<Json<PropertyDetails>> {
    state.run(move |conn| property::update_property(conn, id, changes)).await.map(Json)
}

async fn delete_property(State(state): State<AppState>, Path(id): Path<i32>) -> EstateResult<StatusCode> {
    state.run(move |conn| property::delete_property(conn, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn set_property_tags(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(request): Json<TagsRequest>,
) -> EstateResult<Json<PropertyDetails>> {
    state
        .run(move |conn| property::set_property_tags(conn, id, &request.tag_ids))
        .await
        .map(Json)
}

async fn sell_property(State(state): State<AppState>, Path(id): Path<i32>) -> EstateResult<Json<Property>> {
    state.run(move |conn| property::sell_property(conn, id)).await.map(Json)
}

async fn cancel_property(State(state): State<AppState>, Path(id): Path<i32>) -> EstateResult<Json<Property>> {
    state.run(move |conn| property::cancel_property(conn, id)).await.map(Json)
}

async fn sell_properties(
    State(state): State<AppState>,
    Json(batch): Json<BatchRequest>,
) -> EstateResult<Json<Vec<Property>>> {
    state.run(move |conn| property::sell_properties(conn, &batch.ids)).await.map(Json)
}

async fn cancel_properties(
    State(state): State<AppState>,
    Json(batch): Json<BatchRequest>,
) -> EstateResult<Json<Vec<Property>>> {
    state.run(move |conn| property::cancel_properties(conn, &batch.ids)).await.map(Json)
}

async fn list_property_offers(State(state): State<AppState>, Path(id): Path<i32>) -> EstateResult<Json<Vec<Offer>>> {
    state.run(move |conn| offer::list_property_offers(conn, id)).await.map(Json)
}

async fn create_offer(
    State(state): State<AppState>,
    Json(draft): Json<OfferDraft>,
) -> EstateResult<(StatusCode, Json<Offer>)> {
    let created = state.run(move |conn| offer::create_offer(conn, draft)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_offer(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(changes): Json<OfferChanges>,
) -> EstateResult<Json<Offer>> {
    state.run(move |conn| offer::update_offer(conn, id, changes)).await.map(Json)
}

async fn accept_offer(State(state): State<AppState>, Path(id): Path<i32>) -> EstateResult<Json<Offer>> {
    state.run(move |conn| offer::accept_offer(conn, id)).await.map(Json)
}

async fn refuse_offer(State(state): State<AppState>, Path(id): Path<i32>) -> EstateResult<Json<Offer>> {
    state.run(move |conn| offer::refuse_offer(conn, id)).await.map(Json)
}

async fn list_types(State(state): State<AppState>) -> EstateResult<Json<Vec<PropertyType>>> {
    state.run(catalog::list_types).await.map(Json)
}

async fn create_type(
    State(state): State<AppState>,
    Json(new_type): Json<NewPropertyType>,
) -> EstateResult<(StatusCode, Json<PropertyType>)> {
    let created = state.run(move |conn| catalog::create_type(conn, new_type)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_type(State(state): State<AppState>, Path(id): Path<i32>) -> EstateResult<Json<PropertyTypeDetails>> {
    state.run(move |conn| catalog::get_type(conn, id)).await.map(Json)
}

async fn delete_type(State(state): State<AppState>, Path(id): Path<i32>) -> EstateResult<StatusCode> {
    state.run(move |conn| catalog::delete_type(conn, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn type_offers(State(state): State<AppState>, Path(id): Path<i32>) -> EstateResult<Json<Vec<Offer>>> {
    state.run(move |conn| catalog::type_offers(conn, id)).await.map(Json)
}

async fn list_tags(State(state): State<AppState>) -> EstateResult<Json<Vec<PropertyTag>>> {
    state.run(catalog::list_tags).await.map(Json)
}

async fn create_tag(
    State(state): State<AppState>,
    Json(new_tag): Json<NewPropertyTag>,
) -> EstateResult<(StatusCode, Json<PropertyTag>)> {
    let created = state.run(move |conn| catalog::create_tag(conn, new_tag)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn delete_tag(State(state): State<AppState>, Path(id): Path<i32>) -> EstateResult<StatusCode> {
    state.run(move |conn| catalog::delete_tag(conn, id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_partners(State(state): State<AppState>) -> EstateResult<Json<Vec<Partner>>> {
    state.run(partner::list_partners).await.map(Json)
}

async fn create_partner(
    State(state): State<AppState>,
    Json(new_partner): Json<NewPartner>,
) -> EstateResult<(StatusCode, Json<Partner>)> {
    let created = state.run(move |conn| partner::create_partner(conn, new_partner)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_partner(State(state): State<AppState>, Path(id): Path<i32>) -> EstateResult<Json<Partner>> {
    state.run(move |conn| partner::get_partner(conn, id)).await.map(Json)
}

async fn list_users(State(state): State<AppState>) -> EstateResult<Json<Vec<User>>> {
    state.run(partner::list_users).await.map(Json)
}

async fn create_user(
    State(state): State<AppState>,
    Json(new_user): Json<NewUser>,
) -> EstateResult<(StatusCode, Json<User>)> {
    let created = state.run(move |conn| partner::create_user(conn, new_user)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn user_properties(State(state): State<AppState>, Path(id): Path<i32>) -> EstateResult<Json<Vec<PropertyDetails>>> {
    state.run(move |conn| partner::user_properties(conn, id)).await.map(Json)
}
