//! Earthquake scenario inputs

use crate::EncodingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fault mechanism of the rupture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mechanism {
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Strike-slip")]
    StrikeSlip,
    /// Trained as "Thrust"
    #[serde(rename = "Reverse")]
    Reverse,
}

impl Mechanism {
    /// All mechanisms in one-hot order
    pub const ALL: [Mechanism; 3] = [Mechanism::Normal, Mechanism::StrikeSlip, Mechanism::Reverse];

    /// Label shown on the form
    pub fn as_str(&self) -> &'static str {
        match self {
            Mechanism::Normal => "Normal",
            Mechanism::StrikeSlip => "Strike-slip",
            Mechanism::Reverse => "Reverse",
        }
    }

    /// Column name in the training frame
    pub fn column(&self) -> &'static str {
        match self {
            Mechanism::Normal => "Mechanism_Normal",
            Mechanism::StrikeSlip => "Mechanism_Strike-slip",
            Mechanism::Reverse => "Mechanism_Thrust",
        }
    }

    /// Position inside the mechanism one-hot group
    pub fn index(&self) -> usize {
        match self {
            Mechanism::Normal => 0,
            Mechanism::StrikeSlip => 1,
            Mechanism::Reverse => 2,
        }
    }
}

impl fmt::Display for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mechanism {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mechanism::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| EncodingError::UnknownMechanism(s.to_string()))
    }
}

/// Site soil class, keyed by Vs30
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilClass {
    /// Vs30 = 255 m/s
    #[serde(rename = "NEHRP D")]
    NehrpD,
    /// Vs30 = 310 m/s
    #[serde(rename = "Generic soil")]
    GenericSoil,
    /// Vs30 = 520 m/s
    #[serde(rename = "NEHRP C")]
    NehrpC,
}

impl SoilClass {
    /// All soil classes in one-hot order
    pub const ALL: [SoilClass; 3] = [SoilClass::NehrpD, SoilClass::GenericSoil, SoilClass::NehrpC];

    /// Label shown on the form
    pub fn as_str(&self) -> &'static str {
        match self {
            SoilClass::NehrpD => "NEHRP D",
            SoilClass::GenericSoil => "Generic soil",
            SoilClass::NehrpC => "NEHRP C",
        }
    }

    /// Column name in the training frame
    pub fn column(&self) -> &'static str {
        match self {
            SoilClass::NehrpD => "Vs30_255",
            SoilClass::GenericSoil => "Vs30_310",
            SoilClass::NehrpC => "Vs30_520",
        }
    }

    /// Position inside the soil one-hot group
    pub fn index(&self) -> usize {
        match self {
            SoilClass::NehrpD => 0,
            SoilClass::GenericSoil => 1,
            SoilClass::NehrpC => 2,
        }
    }
}

impl fmt::Display for SoilClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoilClass {
    type Err = EncodingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SoilClass::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| EncodingError::UnknownSoilClass(s.to_string()))
    }
}

/// One earthquake scenario as entered on the form
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInput {
    /// Moment magnitude (Mw)
    pub magnitude: f64,
    /// Joyner-Boore distance (km)
    pub distance: f64,
    /// Focal depth (km)
    pub focal_depth: f64,
    /// Fault mechanism
    pub mechanism: Mechanism,
    /// Site soil class
    pub soil: SoilClass,
}

impl ScenarioInput {
    /// Build a scenario from form labels
    pub fn from_labels(
        magnitude: f64,
        distance: f64,
        focal_depth: f64,
        mechanism: &str,
        soil: &str,
    ) -> Result<Self, EncodingError> {
        Ok(Self {
            magnitude,
            distance,
            focal_depth,
            mechanism: mechanism.parse()?,
            soil: soil.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_parse_back() {
        for m in Mechanism::ALL {
            assert_eq!(m.as_str().parse::<Mechanism>().unwrap(), m);
        }
        for s in SoilClass::ALL {
            assert_eq!(s.as_str().parse::<SoilClass>().unwrap(), s);
        }
    }

    #[test]
    fn test_unknown_labels_rejected() {
        assert_eq!(
            "Thrust".parse::<Mechanism>(),
            Err(EncodingError::UnknownMechanism("Thrust".into()))
        );
        assert!("strike-slip".parse::<Mechanism>().is_err());
        assert!("NEHRP B".parse::<SoilClass>().is_err());
    }

    #[test]
    fn test_serde_uses_form_labels() {
        let json = r#"{"magnitude":6.0,"distance":20.0,"focal_depth":8.0,"mechanism":"Strike-slip","soil":"NEHRP C"}"#;
        let input: ScenarioInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.mechanism, Mechanism::StrikeSlip);
        assert_eq!(input.soil, SoilClass::NehrpC);

        let bad = r#"{"magnitude":6.0,"distance":20.0,"focal_depth":8.0,"mechanism":"Oblique","soil":"NEHRP C"}"#;
        assert!(serde_json::from_str::<ScenarioInput>(bad).is_err());
    }
}
