//! Registered models.

use crate::context::PlatformContext;
use crate::error::SdkResult;
use crate::operation::OperationHandle;
use crate::resource_name::ResourceName;
use std::time::Duration;
use stratus_abstraction::Model;
use tracing::info;

#[derive(Debug, Clone)]
pub struct ModelResource {
    ctx: PlatformContext,
    name: ResourceName,
    resource: Model,
}

impl ModelResource {
    pub async fn get(ctx: &PlatformContext, name: &str) -> SdkResult<Self> {
        let parsed = ResourceName::parse(name)?;
        let resource = ctx.models.get_model(name).await?;
        Ok(Self { ctx: ctx.clone(), name: parsed, resource })
    }

    #[must_use]
    pub const fn resource_name(&self) -> &ResourceName {
        &self.name
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.resource.display_name
    }

    #[must_use]
    pub fn artifact_uri(&self) -> Option<&str> {
        self.resource.artifact_uri.as_deref()
    }

    #[must_use]
    pub fn version_id(&self) -> Option<&str> {
        self.resource.version_id.as_deref()
    }

    #[must_use]
    pub const fn snapshot(&self) -> &Model {
        &self.resource
    }

    pub async fn refresh(&mut self) -> SdkResult<&Model> {
        self.resource = self.ctx.models.get_model(&self.name.to_string()).await?;
        Ok(&self.resource)
    }

    pub async fn delete(self, timeout: Duration) -> SdkResult<()> {
        let name = self.name.to_string();
        info!(model = %name, "Deleting Model");
        let operation = self.ctx.models.delete_model(&name).await?;
        OperationHandle::new(operation, self.ctx.operations.clone()).result(timeout).await?;
        info!(model = %name, "Model deleted");
        Ok(())
    }
}
