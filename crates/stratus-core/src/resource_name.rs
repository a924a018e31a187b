//! Hierarchical resource names.
//!
//! Every remote object is addressed by a path of the form
//! `projects/{project}/locations/{location}/<collection>/{id}[/<collection>/{id}...]`.
//! [`ResourceName`] parses and renders that grammar so wrappers never build
//! names with ad-hoc string formatting.

use crate::error::{SdkError, SdkResult};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceName {
    project: String,
    location: String,
    segments: Vec<(String, String)>,
}

impl ResourceName {
    /// The location root `projects/{project}/locations/{location}`.
    #[must_use]
    pub fn location(project: impl Into<String>, location: impl Into<String>) -> Self {
        Self { project: project.into(), location: location.into(), segments: Vec::new() }
    }

    #[must_use]
    pub fn dataset(project: &str, location: &str, id: &str) -> Self {
        Self::location(project, location).child("datasets", id)
    }

    #[must_use]
    pub fn training_pipeline(project: &str, location: &str, id: &str) -> Self {
        Self::location(project, location).child("trainingPipelines", id)
    }

    #[must_use]
    pub fn tuning_job(project: &str, location: &str, id: &str) -> Self {
        Self::location(project, location).child("tuningJobs", id)
    }

    #[must_use]
    pub fn model(project: &str, location: &str, id: &str) -> Self {
        Self::location(project, location).child("models", id)
    }

    #[must_use]
    pub fn tensorboard(project: &str, location: &str, id: &str) -> Self {
        Self::location(project, location).child("tensorboards", id)
    }

    /// Appends a `<collection>/{id}` segment.
    #[must_use]
    pub fn child(mut self, collection: &str, id: &str) -> Self {
        self.segments.push((collection.to_string(), id.to_string()));
        self
    }

    /// Parses a full resource name.
    pub fn parse(name: &str) -> SdkResult<Self> {
        let invalid = |reason: &str| SdkError::InvalidResourceName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let parts: Vec<&str> = name.split('/').collect();
        if parts.len() < 4 || parts.len() % 2 != 0 {
            return Err(invalid("expected alternating collection/id segments"));
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(invalid("empty path segment"));
        }
        if parts[0] != "projects" || parts[2] != "locations" {
            return Err(invalid("must start with projects/{project}/locations/{location}"));
        }

        let segments = parts[4..]
            .chunks(2)
            .map(|pair| (pair[0].to_string(), pair[1].to_string()))
            .collect();

        Ok(Self { project: parts[1].to_string(), location: parts[3].to_string(), segments })
    }

    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    #[must_use]
    pub fn location_id(&self) -> &str {
        &self.location
    }

    /// `projects/{project}/locations/{location}` for this resource.
    #[must_use]
    pub fn location_path(&self) -> String {
        format!("projects/{}/locations/{}", self.project, self.location)
    }

    /// Collection of the innermost segment (e.g. `datasets`).
    #[must_use]
    pub fn collection(&self) -> Option<&str> {
        self.segments.last().map(|(c, _)| c.as_str())
    }

    /// Id of the innermost segment.
    #[must_use]
    pub fn resource_id(&self) -> Option<&str> {
        self.segments.last().map(|(_, id)| id.as_str())
    }

    /// Id recorded under `collection` anywhere in the path.
    #[must_use]
    pub fn segment(&self, collection: &str) -> Option<&str> {
        self.segments.iter().find(|(c, _)| c == collection).map(|(_, id)| id.as_str())
    }

    /// The name with its innermost segment removed, `None` at the location root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        let mut parent = self.clone();
        parent.segments.pop();
        Some(parent)
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "projects/{}/locations/{}", self.project, self.location)?;
        for (collection, id) in &self.segments {
            write!(f, "/{collection}/{id}")?;
        }
        Ok(())
    }
}

impl FromStr for ResourceName {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Renders the parent used by create/list calls.
#[must_use]
pub fn location_path(project: &str, location: &str) -> String {
    format!("projects/{project}/locations/{location}")
}
