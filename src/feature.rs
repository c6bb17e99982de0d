use serde::{Deserialize, Serialize};

use crate::record::DonationRecord;

/// The point collection consumed by the web map. Key names, nesting, and
/// coordinate order must stay exactly as serialized here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub collection_type: String,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            collection_type: "FeatureCollection".to_string(),
            features,
        }
    }
}

/// A single map point with donor display properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub geometry: Geometry,
    pub properties: Properties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    /// GeoJSON order: longitude, then latitude.
    pub coordinates: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    pub name: String,
    pub address: String,
    pub donation_type: Option<String>,
    pub quantity: u32,
    pub date: String,
}

impl DonationRecord {
    /// The single map point for this record.
    pub fn feature(&self) -> Feature {
        Feature {
            feature_type: "Feature".to_string(),
            geometry: Geometry {
                geometry_type: "Point".to_string(),
                coordinates: [self.longitude, self.latitude],
            },
            properties: Properties {
                name: self.first_name.clone(),
                address: self.address.clone(),
                donation_type: self.donation_type.clone(),
                quantity: self.quantity,
                date: self.donation_date.clone(),
            },
        }
    }

    /// One copy of the point per donated unit.
    pub fn features(&self) -> Vec<Feature> {
        (0..self.quantity).map(|_| self.feature()).collect()
    }
}
