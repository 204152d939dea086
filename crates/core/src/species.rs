use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// IUCN-style conservation status.
///
/// Serialized as the display label ("Least Concern"). Input is matched
/// leniently: case, spacing and punctuation are ignored, a trailing
/// parenthetical is dropped ("Endangered (EN)"), and the two-letter IUCN
/// codes are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ConservationStatus {
    #[serde(rename = "Least Concern")]
    LeastConcern,
    #[serde(rename = "Near Threatened")]
    NearThreatened,
    #[serde(rename = "Vulnerable")]
    Vulnerable,
    #[serde(rename = "Endangered")]
    Endangered,
    #[serde(rename = "Critically Endangered")]
    CriticallyEndangered,
    #[serde(rename = "Extinct")]
    Extinct,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown conservation status: {0:?}")]
pub struct UnknownStatus(pub String);

impl FromStr for ConservationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let head = s.split('(').next().unwrap_or(s);
        let key: String = head
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match key.as_str() {
            "leastconcern" | "lc" => Ok(Self::LeastConcern),
            "nearthreatened" | "nt" => Ok(Self::NearThreatened),
            "vulnerable" | "vu" => Ok(Self::Vulnerable),
            "endangered" | "en" => Ok(Self::Endangered),
            "criticallyendangered" | "cr" => Ok(Self::CriticallyEndangered),
            "extinct" | "ex" | "extinctinthewild" | "ew" => Ok(Self::Extinct),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for ConservationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl ConservationStatus {
    pub const ALL: [ConservationStatus; 6] = [
        Self::LeastConcern,
        Self::NearThreatened,
        Self::Vulnerable,
        Self::Endangered,
        Self::CriticallyEndangered,
        Self::Extinct,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::LeastConcern => "Least Concern",
            Self::NearThreatened => "Near Threatened",
            Self::Vulnerable => "Vulnerable",
            Self::Endangered => "Endangered",
            Self::CriticallyEndangered => "Critically Endangered",
            Self::Extinct => "Extinct",
        }
    }

    /// Vulnerable, Endangered or Critically Endangered.
    pub fn is_threatened(&self) -> bool {
        matches!(
            self,
            Self::Vulnerable | Self::Endangered | Self::CriticallyEndangered
        )
    }
}

impl std::fmt::Display for ConservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One slice of a species' diet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietItem {
    pub name: String,
    /// Share of the diet, 0–100. Slices are not guaranteed to sum to 100.
    pub percentage: f64,
    /// Hex colour used when charting the slice (e.g. "#a3b18a")
    pub color: String,
}

/// Educational profile of one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesProfile {
    pub common_name: String,
    pub scientific_name: String,
    pub habitat: String,
    pub diet: Vec<DietItem>,
    pub conservation_status: ConservationStatus,
    /// Free text, usually with source and year
    pub population_estimate: String,
    pub geographic_range: String,
    pub fun_facts: Vec<String>,
    pub description: String,
    /// Web sources the model consulted, in the order it reported them
    #[serde(default)]
    pub grounding_urls: Vec<String>,
}

impl SpeciesProfile {
    /// Sum of all diet percentages.
    pub fn diet_total(&self) -> f64 {
        self.diet.iter().map(|d| d.percentage).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels_roundtrip() {
        for status in ConservationStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.label()));
            let parsed: ConservationStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_accepts_camel_alias() {
        let parsed: ConservationStatus = serde_json::from_str("\"CriticallyEndangered\"").unwrap();
        assert_eq!(parsed, ConservationStatus::CriticallyEndangered);
        let parsed: ConservationStatus = serde_json::from_str("\"LeastConcern\"").unwrap();
        assert_eq!(parsed, ConservationStatus::LeastConcern);
    }

    #[test]
    fn test_status_lenient_input() {
        let cases = [
            ("critically endangered", ConservationStatus::CriticallyEndangered),
            ("Endangered (EN)", ConservationStatus::Endangered),
            ("  NEAR-THREATENED ", ConservationStatus::NearThreatened),
            ("least_concern", ConservationStatus::LeastConcern),
            ("VU", ConservationStatus::Vulnerable),
            ("Extinct in the Wild", ConservationStatus::Extinct),
        ];
        for (input, expected) in cases {
            let json = serde_json::to_string(input).unwrap();
            let parsed: ConservationStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, expected, "input {:?}", input);
        }
    }

    #[test]
    fn test_status_rejects_unknown() {
        assert!(serde_json::from_str::<ConservationStatus>("\"Data Deficient\"").is_err());
        assert!(serde_json::from_str::<ConservationStatus>("\"\"").is_err());
        assert!(serde_json::from_str::<ConservationStatus>("3").is_err());
        assert_eq!(
            "Thriving".parse::<ConservationStatus>(),
            Err(UnknownStatus("Thriving".to_string()))
        );
    }

    #[test]
    fn test_is_threatened() {
        assert!(!ConservationStatus::LeastConcern.is_threatened());
        assert!(!ConservationStatus::NearThreatened.is_threatened());
        assert!(ConservationStatus::Vulnerable.is_threatened());
        assert!(ConservationStatus::CriticallyEndangered.is_threatened());
        assert!(!ConservationStatus::Extinct.is_threatened());
    }

    #[test]
    fn test_grounding_urls_default_empty() {
        let json = r##"{
            "commonName": "Pangolin",
            "scientificName": "Manis",
            "habitat": "Savanna",
            "diet": [{"name": "Ants", "percentage": 80, "color": "#000"}],
            "conservationStatus": "Endangered",
            "populationEstimate": "Unknown",
            "geographicRange": "Africa, Asia",
            "funFacts": ["Scaly"],
            "description": "A scaly mammal."
        }"##;
        let profile: SpeciesProfile = serde_json::from_str(json).unwrap();
        assert!(profile.grounding_urls.is_empty());
        assert_eq!(profile.diet_total(), 80.0);
        assert_eq!(profile.conservation_status, ConservationStatus::Endangered);
    }

    #[test]
    fn test_missing_required_field_rejected() {
        let json = r#"{"commonName": "Pangolin"}"#;
        assert!(serde_json::from_str::<SpeciesProfile>(json).is_err());
    }
}
