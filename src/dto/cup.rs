use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    config::FormatSpec,
    dto::{format_system_time, validation::validate_slug},
    state::cup::Cup,
};

/// Payload used to create a new cup instance.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCupRequest {
    /// URL-safe unique identifier for the cup.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// Name of a configured format preset (e.g. `war5v5_league`).
    pub format: String,
}

impl Validate for CreateCupRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_slug(&self.slug) {
            errors.add("slug", e);
        }
        if self.name.trim().is_empty() {
            let mut err = validator::ValidationError::new("name_empty");
            err.message = Some("cup name must not be empty".into());
            errors.add("name", err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Cup representation returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CupSummary {
    /// URL-safe unique identifier.
    pub slug: String,
    /// Display name.
    pub name: String,
    /// The format the cup was created with.
    pub format: FormatSpec,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl From<Cup> for CupSummary {
    fn from(value: Cup) -> Self {
        Self {
            slug: value.slug,
            name: value.name,
            format: value.format,
            created_at: format_system_time(value.created_at),
        }
    }
}
