//! Great-circle interpolation for rendering curved route paths

use serde::{Deserialize, Serialize};

/// A point on the globe in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// GeoJSON position order
    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

/// Angular great-circle distance in radians (haversine form)
pub fn angular_distance(a: LatLon, b: LatLon) -> f64 {
    let (phi1, phi2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_phi = phi2 - phi1;
    let d_lambda = (b.lon - a.lon).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

/// Points along the great circle from `(lon1, lat1)` to `(lon2, lat2)`.
///
/// * `steps == 0`: the two endpoints, unchanged.
/// * identical endpoints: the shared point once.
/// * otherwise `steps + 1` slerp samples at fractions `i / steps`.
pub fn interpolate(lon1: f64, lat1: f64, lon2: f64, lat2: f64, steps: u32) -> Vec<LatLon> {
    let start = LatLon::new(lat1, lon1);
    let end = LatLon::new(lat2, lon2);

    if steps == 0 {
        return vec![start, end];
    }

    let d = angular_distance(start, end);
    if d == 0.0 {
        return vec![start];
    }

    let (phi1, lambda1) = (lat1.to_radians(), lon1.to_radians());
    let (phi2, lambda2) = (lat2.to_radians(), lon2.to_radians());
    let sin_d = d.sin();

    (0..=steps)
        .map(|i| {
            let f = i as f64 / steps as f64;
            let a = ((1.0 - f) * d).sin() / sin_d;
            let b = (f * d).sin() / sin_d;

            let x = a * phi1.cos() * lambda1.cos() + b * phi2.cos() * lambda2.cos();
            let y = a * phi1.cos() * lambda1.sin() + b * phi2.cos() * lambda2.sin();
            let z = a * phi1.sin() + b * phi2.sin();

            let phi = z.atan2((x * x + y * y).sqrt());
            let lambda = y.atan2(x);
            LatLon::new(phi.to_degrees(), lambda.to_degrees())
        })
        .collect()
}
