use chrono::{Datelike, NaiveDate};
use log::{info, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ids::{generate_id, validate_family_id};
use crate::storage::time::now;
use crate::storage::{ChildRepository, DbConnection};
use shared::{Child, ChildListResponse, ChildResponse, CreateChildRequest, UpdateChildRequest};

const MAX_NAME_LEN: usize = 100;

/// Service for managing child profiles
#[derive(Clone)]
pub struct ChildService {
    children: ChildRepository,
}

impl ChildService {
    /// Create a new ChildService
    pub fn new(db: DbConnection) -> Self {
        Self {
            children: ChildRepository::new(db),
        }
    }

    /// Create a new child
    pub async fn create_child(&self, request: CreateChildRequest) -> DomainResult<ChildResponse> {
        info!("Creating child: name={}, birthdate={}", request.name, request.birthdate);

        // Validate the request
        validate_family_id(&request.family_id)?;
        self.validate_name(&request.name)?;
        self.validate_birthdate(&request.birthdate)?;

        let ts = now();
        let child = Child {
            id: generate_id("child"),
            family_id: request.family_id,
            name: request.name.trim().to_string(),
            birthdate: request.birthdate,
            allergies: clean_allergies(request.allergies),
            notes: request.notes,
            created_at: ts,
            updated_at: ts,
        };

        // Store in database
        self.children.store_child(&child).await?;

        info!("Created child: {} with ID: {}", child.name, child.id);

        Ok(ChildResponse {
            child,
            success_message: "Child created successfully".to_string(),
        })
    }

    /// Get a child by ID
    pub async fn get_child(&self, child_id: &str) -> DomainResult<Child> {
        info!("Getting child: {}", child_id);

        match self.children.get_child(child_id).await? {
            Some(child) => {
                info!("Found child: {}", child_id);
                Ok(child)
            }
            None => {
                warn!("Child not found: {}", child_id);
                Err(DomainError::not_found("Child", child_id))
            }
        }
    }

    /// List a family's children by name
    pub async fn list_children(&self, family_id: &str) -> DomainResult<ChildListResponse> {
        info!("Listing children for family {}", family_id);
        validate_family_id(family_id)?;

        let children = self.children.list_children(family_id).await?;

        info!("Found {} children", children.len());

        Ok(ChildListResponse { children })
    }

    /// Update an existing child
    pub async fn update_child(&self, child_id: &str, request: UpdateChildRequest) -> DomainResult<ChildResponse> {
        info!("Updating child: {}", child_id);

        // Get the existing child
        let mut child = self.get_child(child_id).await?;

        // Validate the update request
        if let Some(ref name) = request.name {
            self.validate_name(name)?;
        }
        if let Some(ref birthdate) = request.birthdate {
            self.validate_birthdate(birthdate)?;
        }

        // Update fields if provided
        if let Some(name) = request.name {
            child.name = name.trim().to_string();
        }
        if let Some(birthdate) = request.birthdate {
            child.birthdate = birthdate;
        }
        if let Some(allergies) = request.allergies {
            child.allergies = clean_allergies(allergies);
        }
        if let Some(notes) = request.notes {
            child.notes = Some(notes);
        }

        child.updated_at = now();

        self.children.update_child(&child).await?;

        info!("Updated child: {} with ID: {}", child.name, child.id);

        Ok(ChildResponse {
            child,
            success_message: "Child updated successfully".to_string(),
        })
    }

    /// Delete a child together with their samples, logs and alerts
    pub async fn delete_child(&self, child_id: &str) -> DomainResult<()> {
        info!("Deleting child: {}", child_id);

        if !self.children.delete_child(child_id).await? {
            warn!("Child not found: {}", child_id);
            return Err(DomainError::not_found("Child", child_id));
        }

        info!("Deleted child with ID: {}", child_id);

        Ok(())
    }

    fn validate_name(&self, name: &str) -> DomainResult<()> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("Child name cannot be empty"));
        }

        if name.trim().chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation("Child name cannot exceed 100 characters"));
        }

        Ok(())
    }

    /// Validate birthdate format (YYYY-MM-DD)
    fn validate_birthdate(&self, birthdate: &str) -> DomainResult<()> {
        // chrono tolerates signs and short fields, so pin the shape first
        let well_formed = birthdate.len() == 10
            && birthdate
                .bytes()
                .enumerate()
                .all(|(i, b)| if i == 4 || i == 7 { b == b'-' } else { b.is_ascii_digit() });
        if !well_formed {
            return Err(DomainError::validation("Birthdate must be in YYYY-MM-DD format"));
        }

        let date = NaiveDate::parse_from_str(birthdate, "%Y-%m-%d")
            .map_err(|e| DomainError::validation(format!("Invalid birthdate {}: {}", birthdate, e)))?;

        if !(1900..=2100).contains(&date.year()) {
            return Err(DomainError::validation("Year must be between 1900 and 2100"));
        }

        Ok(())
    }
}

/// Trim allergy names and drop blanks
fn clean_allergies(allergies: Vec<String>) -> Vec<String> {
    allergies
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test() -> ChildService {
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        ChildService::new(db)
    }

    fn request(name: &str, birthdate: &str) -> CreateChildRequest {
        CreateChildRequest {
            family_id: "family::1".to_string(),
            name: name.to_string(),
            birthdate: birthdate.to_string(),
            allergies: vec![],
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_child() {
        let service = setup_test().await;

        let mut req = request("  Alice Smith ", "2015-06-15");
        req.allergies = vec![" Peanuts ".to_string(), "".to_string()];
        let response = service.create_child(req).await.expect("Failed to create child");

        assert_eq!(response.child.name, "Alice Smith");
        assert_eq!(response.child.birthdate, "2015-06-15");
        assert_eq!(response.child.allergies, vec!["Peanuts"]);
        assert!(response.child.id.starts_with("child::"));
        assert_eq!(response.success_message, "Child created successfully");
    }

    #[tokio::test]
    async fn test_create_child_validation() {
        let service = setup_test().await;

        // Test empty name
        assert!(service.create_child(request("", "2015-06-15")).await.is_err());

        // Test invalid birthdate
        assert!(service.create_child(request("Alice", "invalid-date")).await.is_err());

        // Test invalid month
        assert!(service.create_child(request("Alice", "2015-13-15")).await.is_err());

        // Test invalid day for February
        let result = service.create_child(request("Alice", "2015-02-30")).await;
        assert!(matches!(result, Err(DomainError::Validation(_))));

        // Leap day is fine
        assert!(service.create_child(request("Alice", "2016-02-29")).await.is_ok());
    }

    #[tokio::test]
    async fn test_birthdate_rejects_malformed_fields() {
        let service = setup_test().await;

        for birthdate in ["2015-06-+5", "+015-06-15", "2015-6-015", "2015/06/15", "1899-12-31", "2015-04-31"] {
            let result = service.create_child(request("Alice", birthdate)).await;
            assert!(
                matches!(result, Err(DomainError::Validation(_))),
                "{} should be rejected",
                birthdate
            );
        }

        let listed = service.list_children("family::1").await.unwrap();
        assert!(listed.children.is_empty());
    }

    #[tokio::test]
    async fn test_get_nonexistent_child() {
        let service = setup_test().await;

        let result = service.get_child("child::nonexistent").await;
        assert!(matches!(result, Err(DomainError::NotFound { entity: "Child", .. })));
    }

    #[tokio::test]
    async fn test_list_children() {
        let service = setup_test().await;

        let response = service.list_children("family::1").await.expect("Failed to list children");
        assert_eq!(response.children.len(), 0);

        service.create_child(request("Bob Johnson", "2012-03-20")).await.unwrap();
        service.create_child(request("Alice Smith", "2015-06-15")).await.unwrap();

        let response = service.list_children("family::1").await.expect("Failed to list children");
        assert_eq!(response.children.len(), 2);
        assert_eq!(response.children[0].name, "Alice Smith");
        assert_eq!(response.children[1].name, "Bob Johnson");
    }

    #[tokio::test]
    async fn test_update_child() {
        let service = setup_test().await;
        let created = service.create_child(request("Alice", "2015-06-15")).await.unwrap();

        let update = UpdateChildRequest {
            name: Some("Alice Cooper".to_string()),
            notes: Some("Loves swimming".to_string()),
            ..Default::default()
        };
        let response = service.update_child(&created.child.id, update).await.unwrap();

        assert_eq!(response.child.name, "Alice Cooper");
        assert_eq!(response.child.birthdate, "2015-06-15");
        assert_eq!(response.child.notes.as_deref(), Some("Loves swimming"));
        assert!(response.child.updated_at >= created.child.updated_at);

        let bad = UpdateChildRequest {
            birthdate: Some("2015-04-31".to_string()),
            ..Default::default()
        };
        assert!(service.update_child(&created.child.id, bad).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_child() {
        let service = setup_test().await;
        let created = service.create_child(request("Alice", "2015-06-15")).await.unwrap();

        service.delete_child(&created.child.id).await.expect("Failed to delete child");
        assert!(service.get_child(&created.child.id).await.is_err());
        assert!(service.delete_child(&created.child.id).await.is_err());
    }
}
