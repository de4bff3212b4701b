use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;

use intus_types::api::CatalogQuery;
use intus_types::models::{ResourceLink, ResourceType, Scenario, ScenarioType, Tool, ToolType};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::parse_kind;

/// GET /tools?type=
pub async fn list_tools(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<CatalogQuery>, ApiError>,
) -> Result<Json<Vec<Tool>>, ApiError> {
    let kind = parse_kind::<ToolType>(query.kind.as_deref())?;
    Ok(Json(state.run_db(move |db| db.list_tools(kind)).await?))
}

/// GET /tools/{id}
pub async fn get_tool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Tool>, ApiError> {
    state
        .run_db(move |db| db.get_tool(&id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Tool not found"))
}

/// GET /scenarios?type=
pub async fn list_scenarios(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<CatalogQuery>, ApiError>,
) -> Result<Json<Vec<Scenario>>, ApiError> {
    let kind = parse_kind::<ScenarioType>(query.kind.as_deref())?;
    Ok(Json(state.run_db(move |db| db.list_scenarios(kind)).await?))
}

/// GET /scenarios/{id}
pub async fn get_scenario(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Scenario>, ApiError> {
    state
        .run_db(move |db| db.get_scenario(&id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Scenario not found"))
}

/// GET /resources?type=
pub async fn list_resources(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<CatalogQuery>, ApiError>,
) -> Result<Json<Vec<ResourceLink>>, ApiError> {
    let kind = parse_kind::<ResourceType>(query.kind.as_deref())?;
    Ok(Json(state.run_db(move |db| db.list_resources(kind)).await?))
}
