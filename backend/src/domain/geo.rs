//! Great-circle distance and coordinate validation.

use crate::domain::errors::{DomainError, DomainResult};

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance in meters between two (lat, lon) points given in degrees
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

pub fn validate_coordinates(latitude: f64, longitude: f64) -> DomainResult<()> {
    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(DomainError::validation("Coordinates must be finite numbers"));
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(DomainError::validation(format!(
            "Latitude must be between -90 and 90, got {}",
            latitude
        )));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(DomainError::validation(format!(
            "Longitude must be between -180 and 180, got {}",
            longitude
        )));
    }
    Ok(())
}

pub fn validate_accuracy(accuracy_m: Option<f64>) -> DomainResult<()> {
    match accuracy_m {
        Some(accuracy) if !accuracy.is_finite() || accuracy < 0.0 => Err(DomainError::validation(
            "Accuracy must be a non-negative number of meters",
        )),
        _ => Ok(()),
    }
}
