use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

/// Build an entity ID such as `child::0b4c...`
pub fn generate_id(prefix: &str) -> String {
    format!("{}::{}", prefix, Uuid::new_v4())
}

/// Families are owned by the external auth layer; all we can check is that a
/// scope was given at all
pub fn validate_family_id(family_id: &str) -> DomainResult<()> {
    if family_id.trim().is_empty() {
        return Err(DomainError::validation("Family ID cannot be empty"));
    }
    Ok(())
}
