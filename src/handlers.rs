use crate::errors::AppError;
use crate::expiry::to_ymd;
use crate::form::{ExpiryForm, FormFields};
use crate::items::{finish_item, list_items, register_item, to_view};
use crate::models::{
    ExpiryRequest, ExpiryResponse, ExpiryStatsResponse, ItemQuery, ItemView, MarkReadRequest,
    MarkReadResponse, NewItemRequest, NotificationKind, NotificationSummary, SuggestRequest,
    SuggestResponse, TaxonNode, TaxonQuery,
};
use crate::notifications;
use crate::rules::WireRule;
use crate::state::AppState;
use crate::stats::build_stats;
use crate::storage::persist_data;
use crate::suggest::{TOP_K, suggest_candidates};
use crate::ui::render_item_form;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
};
use chrono::{Local, NaiveDate};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_item_form(&state.catalog, &state.rules))
}

pub async fn get_rules(State(state): State<AppState>) -> Json<BTreeMap<String, WireRule>> {
    Json(state.rules.to_wire())
}

pub async fn get_taxons(
    State(state): State<AppState>,
    Query(query): Query<TaxonQuery>,
) -> Json<Vec<TaxonNode>> {
    let parent = query.parent.as_deref().filter(|p| !p.trim().is_empty());
    Json(state.catalog.children(parent))
}

pub async fn preview_expiry(
    State(state): State<AppState>,
    Json(payload): Json<ExpiryRequest>,
) -> Json<ExpiryResponse> {
    let fields = FormFields {
        product_type: Some(payload.product_type),
        opened_on: Some(payload.opened_on),
        expires_on: Some(String::new()),
    };
    let expires_on = ExpiryForm::attach(Arc::clone(&state.rules), fields)
        .and_then(|mut form| form.recompute())
        .map(to_ymd);
    Json(ExpiryResponse { expires_on })
}

pub async fn get_items(
    State(state): State<AppState>,
    Query(query): Query<ItemQuery>,
) -> Json<Vec<ItemView>> {
    let data = state.data.lock().await;
    Json(list_items(&data, &state.catalog, &query, today()))
}

pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<NewItemRequest>,
) -> Result<(StatusCode, Json<ItemView>), AppError> {
    let mut data = state.data.lock().await;
    let item = register_item(&mut data, payload, &state.catalog, Arc::clone(&state.rules))?;
    info!(id = item.id, product_type = %item.product_type, expires_on = %item.expires_on, "item registered");

    let view = to_view(&item, &state.catalog, today());
    persist_data(&state.data_path, &data).await?;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn finish(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<ItemView>, AppError> {
    let today = today();
    let mut data = state.data.lock().await;
    let item = finish_item(&mut data, id, today)?;
    persist_data(&state.data_path, &data).await?;
    Ok(Json(to_view(&item, &state.catalog, today)))
}

pub async fn get_expiry_stats(State(state): State<AppState>) -> Json<ExpiryStatsResponse> {
    let data = state.data.lock().await;
    Json(build_stats(&data, &state.catalog))
}

pub async fn get_notification_summary(
    State(state): State<AppState>,
) -> Result<Json<NotificationSummary>, AppError> {
    let mut data = state.data.lock().await;
    if notifications::generate_at(today(), &mut data) > 0 {
        persist_data(&state.data_path, &data).await?;
    }
    Ok(Json(notifications::summary(&data)))
}

pub async fn mark_notifications_read(
    State(state): State<AppState>,
    Json(payload): Json<MarkReadRequest>,
) -> Result<Json<MarkReadResponse>, AppError> {
    let kind = NotificationKind::parse(&payload.kind)
        .ok_or_else(|| AppError::bad_request("type must be one of D30, D14, D7, OVERWEEK"))?;

    let mut data = state.data.lock().await;
    let response = notifications::mark_read(&mut data, kind);
    persist_data(&state.data_path, &data).await?;
    Ok(Json(response))
}

pub async fn suggest(
    State(state): State<AppState>,
    Json(payload): Json<SuggestRequest>,
) -> Json<SuggestResponse> {
    let candidates = suggest_candidates(&state.catalog, &payload.name, &payload.brand, TOP_K);
    Json(SuggestResponse { candidates })
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
