//! Renderable airport and route features

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::cluster::Partition;
use crate::data::{AirportTable, Route};
use crate::geo::{interpolate, LatLon};

/// Group id of a route whose endpoints sit in different communities
pub const BRIDGE_GROUP: i64 = -1;

/// Group id of airports the partition does not know about
const UNGROUPED: i64 = 0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirportFeature {
    pub code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub disrupted: bool,
    pub group: i64,
    pub position: LatLon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteFeature {
    pub src: String,
    pub dst: String,
    pub disrupted: bool,
    /// Shared community id, or [`BRIDGE_GROUP`]
    pub group: i64,
    pub path: Vec<LatLon>,
}

/// Everything the map needs to draw one state of the network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub airports: Vec<AirportFeature>,
    pub routes: Vec<RouteFeature>,
    pub community_count: usize,
}

/// Combine records, the fixed partition and a disruption into features.
///
/// Every code in the airport table yields one airport feature. Routes with
/// an endpoint missing from the table are left out. Route geometry follows
/// the great circle with `gc_steps` subdivisions. `community_count` is
/// reported as given; a degraded partition passes 1.
pub fn build_features(
    airports: &AirportTable,
    routes: &[Route],
    partition: &Partition,
    community_count: usize,
    disrupted: &HashSet<String>,
    gc_steps: u32,
) -> FeatureSet {
    let group_of = |code: &str| {
        partition
            .group_of(code)
            .map_or(UNGROUPED, |group| group as i64)
    };

    let airport_features: Vec<AirportFeature> = airports
        .iter()
        .map(|(code, info)| AirportFeature {
            code: code.to_string(),
            name: info.name.clone(),
            city: info.city.clone(),
            country: info.country.clone(),
            disrupted: disrupted.contains(code),
            group: group_of(code),
            position: LatLon::new(info.latitude, info.longitude),
        })
        .collect();

    let route_features: Vec<RouteFeature> = routes
        .iter()
        .filter_map(|route| {
            let src = airports.get(&route.source)?;
            let dst = airports.get(&route.destination)?;

            let src_group = group_of(&route.source);
            let dst_group = group_of(&route.destination);

            Some(RouteFeature {
                src: route.source.clone(),
                dst: route.destination.clone(),
                disrupted: disrupted.contains(&route.source) || disrupted.contains(&route.destination),
                group: if src_group == dst_group { src_group } else { BRIDGE_GROUP },
                path: interpolate(src.longitude, src.latitude, dst.longitude, dst.latitude, gc_steps),
            })
        })
        .collect();

    log::debug!(
        "Built {} airport features and {} route features",
        airport_features.len(),
        route_features.len()
    );

    FeatureSet {
        airports: airport_features,
        routes: route_features,
        community_count,
    }
}

impl FeatureSet {
    /// Airports as a GeoJSON FeatureCollection of points
    pub fn airports_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .airports
            .iter()
            .map(|airport| {
                json!({
                    "type": "Feature",
                    "properties": {
                        "code": airport.code,
                        "name": airport.name,
                        "city": airport.city,
                        "country": airport.country,
                        "disrupted": airport.disrupted,
                        "group": airport.group,
                    },
                    "geometry": {
                        "type": "Point",
                        "coordinates": airport.position.to_lon_lat(),
                    }
                })
            })
            .collect();

        json!({ "type": "FeatureCollection", "features": features })
    }

    /// Routes as a GeoJSON FeatureCollection of line strings
    pub fn routes_geojson(&self) -> Value {
        let features: Vec<Value> = self
            .routes
            .iter()
            .map(|route| {
                let coordinates: Vec<[f64; 2]> = route.path.iter().map(|p| p.to_lon_lat()).collect();
                json!({
                    "type": "Feature",
                    "properties": {
                        "src": route.src,
                        "dst": route.dst,
                        "disrupted": route.disrupted,
                        "group": route.group,
                    },
                    "geometry": {
                        "type": "LineString",
                        "coordinates": coordinates,
                    }
                })
            })
            .collect();

        json!({ "type": "FeatureCollection", "features": features })
    }

    /// Both collections plus the community count in one document
    pub fn to_geojson(&self) -> Value {
        json!({
            "airports": self.airports_geojson(),
            "routes": self.routes_geojson(),
            "community_count": self.community_count,
        })
    }
}
