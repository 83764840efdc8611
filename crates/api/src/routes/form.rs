//! Form Schema Route

use axum::{extract::State, Json};
use data_validator::FormLimits;
use feature_engine::{Mechanism, SoilClass};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

/// A mutually exclusive category picker
#[derive(Debug, Serialize)]
pub struct CategoryPicker {
    pub label: &'static str,
    pub options: Vec<&'static str>,
    pub default: &'static str,
}

/// Initial text of the chart bound inputs
#[derive(Debug, Serialize)]
pub struct BoundInputs {
    pub lower: String,
    pub upper: String,
}

/// Static presentation theme
#[derive(Debug, Serialize)]
pub struct Theme {
    pub primary_color: &'static str,
    pub background_color: &'static str,
    pub secondary_background_color: &'static str,
    pub text_color: &'static str,
    pub font: &'static str,
}

const THEME: Theme = Theme {
    primary_color: "#F63366",
    background_color: "#FFFFFF",
    secondary_background_color: "#F0F2F6",
    text_color: "#262730",
    font: "Times New Roman",
};

/// Everything a client needs to draw the input form
#[derive(Debug, Serialize)]
pub struct FormSchema {
    pub title: &'static str,
    pub description: &'static str,
    pub sliders: FormLimits,
    pub mechanism: CategoryPicker,
    pub soil: CategoryPicker,
    pub chart_bounds: BoundInputs,
    pub theme: Theme,
}

/// Get the form schema
pub async fn get_form(State(state): State<Arc<AppState>>) -> Json<FormSchema> {
    Json(FormSchema {
        title: "Ground Motion Model for Turkey (KMHCAL23)",
        description: "This app predicts the PGA, PGV, and PSA (5% damping) for the horizontal \
                      component of ground motion records in bedrock",
        sliders: state.validator.limits().clone(),
        mechanism: CategoryPicker {
            label: "Fault Mechanism",
            options: Mechanism::ALL.iter().map(Mechanism::as_str).collect(),
            default: Mechanism::StrikeSlip.as_str(),
        },
        soil: CategoryPicker {
            label: "Soil type",
            options: SoilClass::ALL.iter().map(SoilClass::as_str).collect(),
            default: SoilClass::GenericSoil.as_str(),
        },
        chart_bounds: BoundInputs {
            lower: state.chart_config.default_lower_bound.clone(),
            upper: state.chart_config.default_upper_bound.clone(),
        },
        theme: THEME,
    })
}
