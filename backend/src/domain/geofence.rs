//! # Geofence evaluation
//!
//! Pure transition logic: given a sample position, the geofence-enabled
//! locations of a family and the child's previous containment mapping, work
//! out which fences were entered or left and what the next mapping is.
//!
//! Containment is `distance <= radius`, so a sample exactly on the boundary
//! counts as inside. A location with no previous state is treated as
//! "outside"; whether entering it on the first sample raises an alert is
//! decided by the [`FirstSamplePolicy`].

use serde::{Deserialize, Serialize};
use shared::{AlertType, Location};
use std::collections::HashMap;
use strum_macros::{Display, EnumString};

use crate::domain::geo::haversine_distance_m;

/// What to do the first time a child is seen relative to a fence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FirstSamplePolicy {
    /// Record the containment state without alerting
    #[default]
    Initialize,
    /// Alert "enter" when the first sample is inside the fence
    AlertOnEnter,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub location_id: String,
    pub alert_type: AlertType,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    /// One entry per location whose containment flipped, in location order
    pub transitions: Vec<Transition>,
    /// Containment for every evaluated location
    pub next_state: HashMap<String, bool>,
}

/// Radius of a location if it takes part in geofencing
fn active_radius(location: &Location) -> Option<f64> {
    if location.geofence_enabled {
        location.geofence_radius_m.filter(|r| *r > 0.0)
    } else {
        None
    }
}

pub fn is_inside(location: &Location, latitude: f64, longitude: f64) -> Option<bool> {
    active_radius(location).map(|radius| {
        haversine_distance_m(latitude, longitude, location.latitude, location.longitude) <= radius
    })
}

/// Evaluate one sample position against a family's locations.
///
/// Locations without an active geofence are skipped and do not appear in
/// the next state.
pub fn evaluate(
    locations: &[Location],
    latitude: f64,
    longitude: f64,
    previous: &HashMap<String, bool>,
    policy: FirstSamplePolicy,
) -> Evaluation {
    let mut evaluation = Evaluation::default();

    for location in locations {
        let Some(inside) = is_inside(location, latitude, longitude) else {
            continue;
        };

        let alert_type = match (previous.get(&location.id).copied(), inside) {
            (Some(false), true) => Some(AlertType::Enter),
            (Some(true), false) => Some(AlertType::Leave),
            (None, true) if policy == FirstSamplePolicy::AlertOnEnter => Some(AlertType::Enter),
            _ => None,
        };

        if let Some(alert_type) = alert_type {
            evaluation.transitions.push(Transition {
                location_id: location.id.clone(),
                alert_type,
            });
        }
        evaluation.next_state.insert(location.id.clone(), inside);
    }

    evaluation
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::LocationCategory;

    fn fence(id: &str, latitude: f64, longitude: f64, radius: Option<f64>) -> Location {
        let ts = Utc::now();
        Location {
            id: id.to_string(),
            family_id: "family::1".to_string(),
            name: id.to_string(),
            address: None,
            category: LocationCategory::Other,
            latitude,
            longitude,
            geofence_enabled: radius.is_some(),
            geofence_radius_m: radius,
            created_at: ts,
            updated_at: ts,
        }
    }

    fn state(entries: &[(&str, bool)]) -> HashMap<String, bool> {
        entries.iter().map(|(id, inside)| (id.to_string(), *inside)).collect()
    }

    #[test]
    fn test_first_sample_initializes_without_alert() {
        let locations = vec![fence("home", 40.0, -74.0, Some(100.0))];
        let result = evaluate(&locations, 40.0, -74.0, &HashMap::new(), FirstSamplePolicy::Initialize);

        assert!(result.transitions.is_empty());
        assert_eq!(result.next_state, state(&[("home", true)]));
    }

    #[test]
    fn test_first_sample_alert_on_enter_policy() {
        let locations = vec![
            fence("home", 40.0, -74.0, Some(100.0)),
            fence("school", 41.0, -74.0, Some(100.0)),
        ];
        let result = evaluate(&locations, 40.0, -74.0, &HashMap::new(), FirstSamplePolicy::AlertOnEnter);

        assert_eq!(
            result.transitions,
            vec![Transition { location_id: "home".to_string(), alert_type: AlertType::Enter }]
        );
        assert_eq!(result.next_state, state(&[("home", true), ("school", false)]));
    }

    #[test]
    fn test_enter_and_leave_transitions() {
        let locations = vec![
            fence("home", 40.0, -74.0, Some(100.0)),
            fence("school", 40.01, -74.0, Some(100.0)),
        ];
        // At school, having been at home
        let previous = state(&[("home", true), ("school", false)]);
        let result = evaluate(&locations, 40.01, -74.0, &previous, FirstSamplePolicy::Initialize);

        assert_eq!(
            result.transitions,
            vec![
                Transition { location_id: "home".to_string(), alert_type: AlertType::Leave },
                Transition { location_id: "school".to_string(), alert_type: AlertType::Enter },
            ]
        );
        assert_eq!(result.next_state, state(&[("home", false), ("school", true)]));
    }

    #[test]
    fn test_unchanged_state_emits_nothing() {
        let locations = vec![fence("home", 40.0, -74.0, Some(100.0))];
        let previous = state(&[("home", true)]);
        let result = evaluate(&locations, 40.0001, -74.0, &previous, FirstSamplePolicy::AlertOnEnter);
        assert!(result.transitions.is_empty());
    }

    #[test]
    fn test_boundary_counts_as_inside() {
        let home = fence("home", 0.0, 0.0, None);
        let radius = haversine_distance_m(0.001, 0.0, 0.0, 0.0);
        let home = Location { geofence_enabled: true, geofence_radius_m: Some(radius), ..home };

        assert_eq!(is_inside(&home, 0.001, 0.0), Some(true));
        assert_eq!(is_inside(&home, 0.0011, 0.0), Some(false));
    }

    #[test]
    fn test_disabled_fences_are_skipped() {
        let locations = vec![fence("park", 40.0, -74.0, None)];
        let result = evaluate(&locations, 40.0, -74.0, &state(&[("park", false)]), FirstSamplePolicy::Initialize);
        assert!(result.transitions.is_empty());
        assert!(result.next_state.is_empty());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("initialize".parse::<FirstSamplePolicy>(), Ok(FirstSamplePolicy::Initialize));
        assert_eq!("Alert_On_Enter".parse::<FirstSamplePolicy>(), Ok(FirstSamplePolicy::AlertOnEnter));
        assert!("sometimes".parse::<FirstSamplePolicy>().is_err());
        assert_eq!(FirstSamplePolicy::AlertOnEnter.to_string(), "alert_on_enter");
    }
}
