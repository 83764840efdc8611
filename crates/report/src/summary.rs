//! Scalar summary lines

use feature_engine::ScenarioInput;
use inference_engine::GroundMotion;
use serde::Serialize;

/// Format a float the way the form has always shown it: shortest
/// round-trip digits, whole numbers keep one decimal ("10.0").
pub fn format_value(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Text shown for one prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Echo of the scenario inputs
    pub inputs: String,
    /// "PGA= ... (cm/s^2)"
    pub pga: String,
    /// "PGV= ...  cm/s"
    pub pgv: String,
}

impl Summary {
    pub fn new(input: &ScenarioInput, motion: &GroundMotion) -> Self {
        Self {
            inputs: Self::inputs_line(input),
            pga: format!("PGA= {} (cm/s^2)", format_value(round2(motion.pga))),
            pgv: format!("PGV= {}  cm/s", format_value(round2(motion.pgv))),
        }
    }

    /// "Mw= 7.8; RJB= 100 km; Soil Type= ...; Focal Depth= 10.0 km; Focal Mechanism= ..."
    pub fn inputs_line(input: &ScenarioInput) -> String {
        // RJB sits on an integer slider
        let distance = if input.distance.fract() == 0.0 {
            format!("{:.0}", input.distance)
        } else {
            format!("{}", input.distance)
        };
        format!(
            "Mw= {}; RJB= {} km; Soil Type= {}; Focal Depth= {} km; Focal Mechanism= {}",
            format_value(input.magnitude),
            distance,
            input.soil,
            format_value(input.focal_depth),
            input.mechanism
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::{Mechanism, SoilClass};

    fn reference_input() -> ScenarioInput {
        ScenarioInput {
            magnitude: 7.8,
            distance: 100.0,
            focal_depth: 10.0,
            mechanism: Mechanism::StrikeSlip,
            soil: SoilClass::GenericSoil,
        }
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(10.0), "10.0");
        assert_eq!(format_value(7.8), "7.8");
        assert_eq!(format_value(0.03), "0.03");
        assert_eq!(format_value(89.1), "89.1");
    }

    #[test]
    fn test_inputs_line() {
        assert_eq!(
            Summary::inputs_line(&reference_input()),
            "Mw= 7.8; RJB= 100 km; Soil Type= Generic soil; Focal Depth= 10.0 km; Focal Mechanism= Strike-slip"
        );
    }

    #[test]
    fn test_scalar_lines_round_to_two_decimals() {
        let motion = GroundMotion {
            pga: 89.12345,
            pgv: 4.0,
            spectrum: Vec::new(),
        };
        let summary = Summary::new(&reference_input(), &motion);
        assert_eq!(summary.pga, "PGA= 89.12 (cm/s^2)");
        assert_eq!(summary.pgv, "PGV= 4.0  cm/s");
    }
}
