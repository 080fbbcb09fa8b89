use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Body of a workload-creation request.
///
/// Both fields are optional at the serde level so that a missing field
/// surfaces as an [`InvalidSpec`] instead of a deserializer rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorkloadSpec {
    pub name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidSpec {
    #[error("workload name is required")]
    MissingName,
    #[error("workload image is required")]
    MissingImage,
}

impl WorkloadSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            image: Some(image.into()),
        }
    }

    /// Returns the trimmed `(name, image)` pair, rejecting absent or blank values.
    pub fn validate(&self) -> Result<(&str, &str), InvalidSpec> {
        let name = non_blank(self.name.as_deref()).ok_or(InvalidSpec::MissingName)?;
        let image = non_blank(self.image.as_deref()).ok_or(InvalidSpec::MissingImage)?;
        Ok((name, image))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A workload accepted by the control plane. Write-once: the assigned node
/// is fixed at creation and never migrates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadRecord {
    pub id: String,
    pub name: String,
    pub image: String,
    pub node_name: String,
    pub created_at: DateTime<Utc>,
}

impl WorkloadRecord {
    /// Stamp a fresh record with a v4 id and the current time.
    pub fn new(name: &str, image: &str, node_name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            image: image.to_string(),
            node_name: node_name.to_string(),
            created_at: Utc::now(),
        }
    }
}
