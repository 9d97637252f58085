//! HTTP request handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::data::FeatureVector;
use crate::inference::ModelInfo;
use crate::report::ScoutReport;

use super::error::{Result, ServerError};
use super::state::AppState;
use super::templates;

/// Body of the scouting form.
///
/// Every field is optional; anything left out takes the form's default
/// value. A present but non-numeric field rejects the whole request.
#[derive(Debug, Default, Deserialize)]
pub struct ScoutForm {
    pub kills: Option<f64>,
    pub damage: Option<f64>,
    pub boosts: Option<f64>,
    pub heals: Option<f64>,
    pub distance: Option<f64>,
    pub weapons: Option<f64>,
    pub revives: Option<f64>,
    pub headshots: Option<f64>,
}

impl ScoutForm {
    pub fn into_features(self) -> FeatureVector {
        let defaults = FeatureVector::default();
        FeatureVector {
            kills: self.kills.unwrap_or(defaults.kills),
            damage: self.damage.unwrap_or(defaults.damage),
            boosts: self.boosts.unwrap_or(defaults.boosts),
            heals: self.heals.unwrap_or(defaults.heals),
            distance: self.distance.unwrap_or(defaults.distance),
            weapons: self.weapons.unwrap_or(defaults.weapons),
            revives: self.revives.unwrap_or(defaults.revives),
            headshots: self.headshots.unwrap_or(defaults.headshots),
        }
    }
}

fn score(state: &AppState, features: &FeatureVector) -> Result<ScoutReport> {
    let prediction = state.predictor.predict(features)?;
    debug!(
        label = prediction.label.as_u8(),
        probability = prediction.probability,
        "Scored player"
    );
    Ok(ScoutReport::from_prediction(features, &prediction))
}

// ============================================================================
// UI Handlers
// ============================================================================

pub async fn serve_index() -> Html<String> {
    Html(templates::render_index(&FeatureVector::default()))
}

/// Form post: render the verdict page, or an error page with a 4xx status
pub async fn scout_form(
    State(state): State<Arc<AppState>>,
    form: std::result::Result<Form<ScoutForm>, FormRejection>,
) -> Response {
    let Form(form) = match form {
        Ok(form) => form,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "Rejected scouting form");
            return (rejection.status(), Html(templates::render_error(&rejection.body_text()))).into_response();
        }
    };

    let features = form.into_features();
    match score(&state, &features) {
        Ok(report) => Html(templates::render_result(&report)).into_response(),
        Err(err) => {
            let status = err.status();
            let message = err.public_message();
            (status, Html(templates::render_error(&message))).into_response()
        }
    }
}

// ============================================================================
// API Handlers
// ============================================================================

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(features): Json<FeatureVector>,
) -> Result<Json<ScoutReport>> {
    Ok(Json(score(&state, &features)?))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model_loaded": true,
        "pair_id": state.predictor.metadata().pair_id,
        "predictions_served": state.predictor.predictions_served(),
        "uptime_secs": state.uptime_secs(),
    }))
}

pub async fn model_info(State(state): State<Arc<AppState>>) -> Json<ModelInfo> {
    Json(state.predictor.model_info())
}

pub async fn handle_404() -> impl IntoResponse {
    ServerError::NotFound("Not found. Visit / for the scouting form or /api/health to check API status.".to_string())
}

pub async fn handle_405() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(serde_json::json!({
            "error": true,
            "message": "Method not allowed.",
        })),
    )
}
