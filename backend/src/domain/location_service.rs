use log::{info, warn};
use shared::{
    CheckIn, CheckInListResponse, CreateCheckInRequest, CreateLocationRequest, Location,
    LocationListResponse, LocationResponse, UpdateLocationRequest,
};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::geo::validate_coordinates;
use crate::domain::ids::{generate_id, validate_family_id};
use crate::storage::time::{now, truncate_to_millis};
use crate::storage::{CheckInRepository, ChildRepository, DbConnection, LocationRepository};

const MAX_NAME_LEN: usize = 100;
/// Recent check-ins page size when the caller does not ask for one
pub const DEFAULT_CHECK_IN_LIMIT: u32 = 20;

/// Service for family locations, their geofence settings and check-ins
#[derive(Clone)]
pub struct LocationService {
    locations: LocationRepository,
    children: ChildRepository,
    check_ins: CheckInRepository,
}

impl LocationService {
    pub fn new(db: DbConnection) -> Self {
        Self {
            locations: LocationRepository::new(db.clone()),
            children: ChildRepository::new(db.clone()),
            check_ins: CheckInRepository::new(db),
        }
    }

    pub async fn create_location(&self, request: CreateLocationRequest) -> DomainResult<LocationResponse> {
        info!(
            "Creating location: name={}, family={}, geofence={}",
            request.name, request.family_id, request.geofence_enabled
        );

        validate_family_id(&request.family_id)?;
        let name = validate_name(&request.name)?;
        validate_coordinates(request.latitude, request.longitude)?;
        validate_geofence(request.geofence_enabled, request.geofence_radius_m)?;

        let ts = now();
        let location = Location {
            id: generate_id("location"),
            family_id: request.family_id,
            name,
            address: request.address,
            category: request.category,
            latitude: request.latitude,
            longitude: request.longitude,
            geofence_enabled: request.geofence_enabled,
            geofence_radius_m: request.geofence_radius_m,
            created_at: ts,
            updated_at: ts,
        };

        self.locations.store_location(&location).await?;
        info!("Created location: {} with ID: {}", location.name, location.id);

        Ok(LocationResponse {
            location,
            success_message: "Location created successfully".to_string(),
        })
    }

    pub async fn get_location(&self, location_id: &str) -> DomainResult<Location> {
        info!("Getting location: {}", location_id);

        self.locations.get_location(location_id).await?.ok_or_else(|| {
            warn!("Location not found: {}", location_id);
            DomainError::not_found("Location", location_id)
        })
    }

    pub async fn list_locations(&self, family_id: &str) -> DomainResult<LocationListResponse> {
        info!("Listing locations for family {}", family_id);
        validate_family_id(family_id)?;

        let locations = self.locations.list_locations(family_id).await?;

        info!("Found {} locations", locations.len());
        Ok(LocationListResponse { locations })
    }

    /// Update a location's details or geofence settings
    pub async fn update_location(
        &self,
        location_id: &str,
        request: UpdateLocationRequest,
    ) -> DomainResult<LocationResponse> {
        info!("Updating location: {}", location_id);

        let mut location = self.get_location(location_id).await?;
        let previous_fence = fence_settings(&location);

        if let Some(name) = request.name {
            location.name = validate_name(&name)?;
        }
        if let Some(address) = request.address {
            location.address = Some(address);
        }
        if let Some(category) = request.category {
            location.category = category;
        }
        if let Some(latitude) = request.latitude {
            location.latitude = latitude;
        }
        if let Some(longitude) = request.longitude {
            location.longitude = longitude;
        }
        if let Some(enabled) = request.geofence_enabled {
            location.geofence_enabled = enabled;
        }
        if let Some(radius) = request.geofence_radius_m {
            location.geofence_radius_m = Some(radius);
        }

        validate_coordinates(location.latitude, location.longitude)?;
        validate_geofence(location.geofence_enabled, location.geofence_radius_m)?;

        // Stored containment only describes the fence it was computed against
        let fence_changed = fence_settings(&location) != previous_fence;
        if fence_changed {
            info!("Geofence of location {} changed; resetting containment state", location.id);
        }

        location.updated_at = now();
        self.locations.update_location(&location, fence_changed).await?;

        info!(
            "Updated location: {} (geofence enabled: {}, radius: {:?})",
            location.id, location.geofence_enabled, location.geofence_radius_m
        );
        Ok(LocationResponse {
            location,
            success_message: "Location updated successfully".to_string(),
        })
    }

    /// Delete a location. Its containment state, check-ins and alerts go with it.
    pub async fn delete_location(&self, location_id: &str) -> DomainResult<()> {
        info!("Deleting location: {}", location_id);

        if !self.locations.delete_location(location_id).await? {
            warn!("Location not found: {}", location_id);
            return Err(DomainError::not_found("Location", location_id));
        }

        info!("Deleted location {}", location_id);
        Ok(())
    }

    /// Record a check-in at a location, optionally attributed to a child of
    /// the same family
    pub async fn check_in(&self, request: CreateCheckInRequest) -> DomainResult<CheckIn> {
        info!(
            "Check-in at location {} (child: {:?})",
            request.location_id, request.child_id
        );

        let location = self.get_location(&request.location_id).await?;

        if let Some(ref child_id) = request.child_id {
            let child = self
                .children
                .get_child(child_id)
                .await?
                .ok_or_else(|| DomainError::not_found("Child", child_id))?;
            if child.family_id != location.family_id {
                return Err(DomainError::validation(format!(
                    "Child {} does not belong to the family of location {}",
                    child_id, location.id
                )));
            }
        }

        let check_in = CheckIn {
            id: generate_id("checkin"),
            location_id: location.id,
            child_id: request.child_id,
            timestamp: request.timestamp.map(truncate_to_millis).unwrap_or_else(now),
            notes: request.notes,
        };

        self.check_ins.store_check_in(&check_in).await?;
        info!("Stored check-in {}", check_in.id);

        Ok(check_in)
    }

    pub async fn recent_check_ins(&self, family_id: &str, limit: Option<u32>) -> DomainResult<CheckInListResponse> {
        info!("Listing recent check-ins for family {}", family_id);
        validate_family_id(family_id)?;

        let check_ins = self
            .check_ins
            .list_recent(family_id, limit.unwrap_or(DEFAULT_CHECK_IN_LIMIT))
            .await?;

        info!("Found {} check-ins", check_ins.len());
        Ok(CheckInListResponse { check_ins })
    }
}

fn validate_name(name: &str) -> DomainResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(DomainError::validation("Location name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation("Location name cannot exceed 100 characters"));
    }
    Ok(name.to_string())
}

/// An enabled geofence needs a radius; any radius given must be positive
fn fence_settings(location: &Location) -> (bool, f64, f64, Option<f64>) {
    (
        location.geofence_enabled,
        location.latitude,
        location.longitude,
        location.geofence_radius_m,
    )
}

fn validate_geofence(enabled: bool, radius_m: Option<f64>) -> DomainResult<()> {
    match radius_m {
        Some(radius) if !radius.is_finite() || radius <= 0.0 => Err(DomainError::validation(
            "Geofence radius must be a positive number of meters",
        )),
        None if enabled => Err(DomainError::validation(
            "Geofence radius is required when geofencing is enabled",
        )),
        _ => Ok(()),
    }
}
