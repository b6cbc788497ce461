use geojson::{FeatureCollection, Geometry, Value};

use crate::{normalize_region_name, LatLng, Region};

/// Feature property carrying the governorate name in the boundary file.
pub const BOUNDARY_NAME_PROPERTY: &str = "ADM1_EN";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryStyle {
    pub color: &'static str,
    pub weight: f32,
    pub fill_color: &'static str,
    pub fill_opacity: f32,
}

pub const BOUNDARY_STYLE: BoundaryStyle = BoundaryStyle {
    color: "#f5f5f5",
    weight: 1.5,
    fill_color: "#ffffff",
    fill_opacity: 0.05,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub radius: f32,
    pub color: &'static str,
    pub weight: f32,
    pub fill_color: &'static str,
    pub fill_opacity: f32,
}

pub const DAMAGE_MARKER_STYLE: MarkerStyle = MarkerStyle {
    radius: 3.0,
    color: "#ff3b30",
    weight: 0.5,
    fill_color: "#ff3b30",
    fill_opacity: 0.7,
};

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryFeature {
    /// Raw `ADM1_EN` value, if the feature had one.
    pub name: Option<String>,
    /// Normalised registry key derived from `name`.
    pub key: Option<String>,
    pub geometry: Option<Geometry>,
}

impl BoundaryFeature {
    pub fn region(&self) -> Option<Region> {
        self.key.as_deref().and_then(Region::from_key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryLayer {
    pub features: Vec<BoundaryFeature>,
    pub style: BoundaryStyle,
}

impl BoundaryLayer {
    pub fn from_collection(collection: FeatureCollection) -> Self {
        let features = collection
            .features
            .into_iter()
            .map(|feature| {
                let name = feature
                    .property(BOUNDARY_NAME_PROPERTY)
                    .and_then(|v| v.as_str())
                    .map(str::to_owned);
                let key = name.as_deref().map(normalize_region_name);
                BoundaryFeature {
                    name,
                    key,
                    geometry: feature.geometry,
                }
            })
            .collect();

        Self {
            features,
            style: BOUNDARY_STYLE,
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Regions that at least one feature resolves to, in feature order.
    pub fn resolved_regions(&self) -> Vec<Region> {
        let mut regions = Vec::new();
        for region in self.features.iter().filter_map(BoundaryFeature::region) {
            if !regions.contains(&region) {
                regions.push(region);
            }
        }
        regions
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DamagePointLayer {
    pub points: Vec<LatLng>,
    pub style: MarkerStyle,
}

impl DamagePointLayer {
    /// Keeps `Point` features only. GeoJSON positions are `[lng, lat, ..]`.
    pub fn from_collection(collection: FeatureCollection) -> Self {
        let points = collection
            .features
            .iter()
            .filter_map(|feature| match feature.geometry.as_ref().map(|g| &g.value) {
                Some(Value::Point(position)) if position.len() >= 2 => Some(LatLng {
                    lat: position[1],
                    lng: position[0],
                }),
                _ => None,
            })
            .collect();

        Self {
            points,
            style: DAMAGE_MARKER_STYLE,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
