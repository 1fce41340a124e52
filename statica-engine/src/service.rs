// Statica - static website hosting over HTTP, powered by Pulumi
// Copyright (C) 2025 Statica Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Site operations.
//!
//! Each site is one stack: a website bucket, an `index.html` object, and a
//! public-read policy. The service translates site operations into stack
//! operations and engine errors into the conditions the API reports.

use std::sync::Arc;

use statica_core::{DeployedSite, SiteProgram, WEBSITE_URL_OUTPUT};

use crate::engine::{StackEngine, StackHandle, StackOutputs};
use crate::error::{EngineError, SiteError};

/// Stack configuration key carrying the deploy region.
pub const AWS_REGION_KEY: &str = "aws:region";

/// Drives the site lifecycle against a stack engine.
pub struct SiteService {
    engine: Arc<dyn StackEngine>,
    region: String,
}

impl SiteService {
    pub fn new(engine: Arc<dyn StackEngine>, region: impl Into<String>) -> Self {
        Self {
            engine,
            region: region.into(),
        }
    }

    /// Provision a new site and deploy its content.
    ///
    /// Fails with [`SiteError::AlreadyExists`] before deploying anything
    /// when a site of this id is already provisioned.
    pub async fn create_site(&self, id: &str, content: &str) -> Result<DeployedSite, SiteError> {
        let program = SiteProgram::new(content);
        let handle = self
            .engine
            .create_stack(id, &program)
            .await
            .map_err(|e| match e {
                EngineError::StackAlreadyExists(_) => SiteError::AlreadyExists(id.to_string()),
                other => SiteError::DeployFailed {
                    id: id.to_string(),
                    source: other,
                },
            })?;

        let outputs = self
            .configure_and_up(handle.as_ref())
            .await
            .map_err(|e| SiteError::DeployFailed {
                id: id.to_string(),
                source: e,
            })?;

        let site = site_from_outputs(id, &outputs)?;
        tracing::info!(site = %id, url = %site.url, "site deployed");
        Ok(site)
    }

    /// Redeploy an existing site with new content.
    pub async fn update_site(&self, id: &str, content: &str) -> Result<DeployedSite, SiteError> {
        let program = SiteProgram::new(content);
        let handle = self
            .engine
            .select_stack(id, Some(&program))
            .await
            .map_err(|e| match e {
                EngineError::StackNotFound(_) => SiteError::NotFound(id.to_string()),
                other => SiteError::DeployFailed {
                    id: id.to_string(),
                    source: other,
                },
            })?;

        let outputs = self
            .configure_and_up(handle.as_ref())
            .await
            .map_err(|e| match e {
                EngineError::UpdateInProgress(_) => SiteError::ConcurrentUpdate(id.to_string()),
                other => SiteError::DeployFailed {
                    id: id.to_string(),
                    source: other,
                },
            })?;

        let site = site_from_outputs(id, &outputs)?;
        tracing::info!(site = %id, url = %site.url, "site redeployed");
        Ok(site)
    }

    /// Look up a deployed site without touching its resources.
    pub async fn get_site(&self, id: &str) -> Result<DeployedSite, SiteError> {
        let handle = self
            .engine
            .select_stack(id, None)
            .await
            .map_err(|e| match e {
                EngineError::StackNotFound(_) => SiteError::NotFound(id.to_string()),
                other => SiteError::ReadFailed {
                    id: id.to_string(),
                    source: other,
                },
            })?;

        let outputs = handle.outputs().await.map_err(|e| SiteError::ReadFailed {
            id: id.to_string(),
            source: e,
        })?;
        site_from_outputs(id, &outputs)
    }

    /// Tear down a site's resources and delete its state.
    pub async fn delete_site(&self, id: &str) -> Result<(), SiteError> {
        let handle = self
            .engine
            .select_stack(id, None)
            .await
            .map_err(|e| match e {
                EngineError::StackNotFound(_) => SiteError::NotFound(id.to_string()),
                other => SiteError::DestroyFailed {
                    id: id.to_string(),
                    source: other,
                },
            })?;

        handle
            .set_config(AWS_REGION_KEY, &self.region)
            .await
            .map_err(|e| SiteError::DestroyFailed {
                id: id.to_string(),
                source: e,
            })?;

        handle
            .destroy()
            .await
            .map_err(|e| SiteError::DestroyFailed {
                id: id.to_string(),
                source: e,
            })?;

        handle
            .remove()
            .await
            .map_err(|e| SiteError::CleanupFailed {
                id: id.to_string(),
                source: e,
            })?;

        tracing::info!(site = %id, "site destroyed");
        Ok(())
    }

    /// List the ids of every provisioned site.
    pub async fn list_sites(&self) -> Result<Vec<String>, SiteError> {
        let stacks = self
            .engine
            .list_stacks()
            .await
            .map_err(SiteError::ListFailed)?;
        Ok(stacks.into_iter().map(|s| s.name).collect())
    }

    async fn configure_and_up(
        &self,
        handle: &dyn StackHandle,
    ) -> Result<StackOutputs, EngineError> {
        handle.set_config(AWS_REGION_KEY, &self.region).await?;
        handle.up().await
    }
}

fn site_from_outputs(id: &str, outputs: &StackOutputs) -> Result<DeployedSite, SiteError> {
    let url = outputs
        .get(WEBSITE_URL_OUTPUT)
        .and_then(|v| v.as_str())
        .ok_or_else(|| SiteError::MissingOutput {
            id: id.to_string(),
            output: WEBSITE_URL_OUTPUT.to_string(),
        })?;
    Ok(DeployedSite::new(id, url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeEngine;
    use anyhow::Result;
    use pretty_assertions::assert_eq;

    fn make_service(engine: &Arc<FakeEngine>) -> SiteService {
        SiteService::new(engine.clone(), "us-west-2")
    }

    #[tokio::test]
    async fn test_create_site_deploys_and_returns_url() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        let service = make_service(&engine);

        let site = service.create_site("blog", "<h1>hello</h1>").await?;

        assert_eq!(site.id, "blog");
        assert_eq!(site.url, "blog.s3-website.test");
        assert_eq!(engine.deploy_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_site_sets_region_before_deploy() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        let service = make_service(&engine);

        service.create_site("blog", "<h1>hi</h1>").await?;

        let config = engine.stack_config("blog").ok_or_else(|| anyhow::anyhow!("no stack"))?;
        assert_eq!(config.get(AWS_REGION_KEY).map(String::as_str), Some("us-west-2"));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_site_records_content() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        let service = make_service(&engine);

        service.create_site("blog", "<h1>v1</h1>").await?;

        assert_eq!(engine.stack_content("blog").as_deref(), Some("<h1>v1</h1>"));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_duplicate_site_fails_without_deploying() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        let service = make_service(&engine);

        service.create_site("blog", "<h1>v1</h1>").await?;
        let err = service
            .create_site("blog", "<h1>v2</h1>")
            .await
            .expect_err("duplicate create should fail");

        assert!(matches!(err, SiteError::AlreadyExists(id) if id == "blog"));
        assert_eq!(engine.deploy_count(), 1);
        assert_eq!(engine.stack_content("blog").as_deref(), Some("<h1>v1</h1>"));
        Ok(())
    }

    #[tokio::test]
    async fn test_create_site_lock_reports_deploy_failure() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        engine.lock_next_up();
        let service = make_service(&engine);

        let err = service
            .create_site("blog", "<h1>hi</h1>")
            .await
            .expect_err("locked up should fail");

        // A brand-new stack nobody else knows about cannot meaningfully be
        // "busy"; report it as a deploy failure rather than a conflict.
        assert!(matches!(err, SiteError::DeployFailed { .. }));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_site_redeploys_new_content() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        let service = make_service(&engine);

        service.create_site("blog", "<h1>v1</h1>").await?;
        let site = service.update_site("blog", "<h1>v2</h1>").await?;

        assert_eq!(site.id, "blog");
        assert_eq!(site.url, "blog.s3-website.test");
        assert_eq!(engine.deploy_count(), 2);
        assert_eq!(engine.stack_content("blog").as_deref(), Some("<h1>v2</h1>"));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_site_reports_not_found() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        let service = make_service(&engine);

        let err = service
            .update_site("ghost", "<h1>hi</h1>")
            .await
            .expect_err("update of missing site should fail");

        assert!(matches!(err, SiteError::NotFound(id) if id == "ghost"));
        assert_eq!(engine.deploy_count(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_locked_site_reports_concurrent_update() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        let service = make_service(&engine);

        service.create_site("blog", "<h1>v1</h1>").await?;
        engine.lock_next_up();

        let err = service
            .update_site("blog", "<h1>v2</h1>")
            .await
            .expect_err("locked update should fail");

        assert!(matches!(err, SiteError::ConcurrentUpdate(id) if id == "blog"));
        // The deployed content is untouched.
        assert_eq!(engine.stack_content("blog").as_deref(), Some("<h1>v1</h1>"));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_site_returns_deployed_url() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        let service = make_service(&engine);

        service.create_site("blog", "<h1>hi</h1>").await?;
        let site = service.get_site("blog").await?;

        assert_eq!(site.id, "blog");
        assert_eq!(site.url, "blog.s3-website.test");
        // Reads never deploy.
        assert_eq!(engine.deploy_count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_missing_site_reports_not_found() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        let service = make_service(&engine);

        let err = service
            .get_site("ghost")
            .await
            .expect_err("get of missing site should fail");

        assert!(matches!(err, SiteError::NotFound(id) if id == "ghost"));
        Ok(())
    }

    #[tokio::test]
    async fn test_get_site_that_never_deployed_reports_missing_output() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        engine.seed_stack("half-made");
        let service = make_service(&engine);

        let err = service
            .get_site("half-made")
            .await
            .expect_err("get without outputs should fail");

        assert!(matches!(
            err,
            SiteError::MissingOutput { ref output, .. } if output == WEBSITE_URL_OUTPUT
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_site_destroys_and_removes_state() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        let service = make_service(&engine);

        service.create_site("blog", "<h1>hi</h1>").await?;
        service.delete_site("blog").await?;

        assert!(!engine.has_stack("blog"));
        assert_eq!(service.list_sites().await?, Vec::<String>::new());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_site_reports_not_found() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        let service = make_service(&engine);

        let err = service
            .delete_site("ghost")
            .await
            .expect_err("delete of missing site should fail");

        assert!(matches!(err, SiteError::NotFound(id) if id == "ghost"));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_locked_site_reports_destroy_failure() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        let service = make_service(&engine);

        service.create_site("blog", "<h1>hi</h1>").await?;
        engine.lock_next_destroy();

        let err = service
            .delete_site("blog")
            .await
            .expect_err("locked destroy should fail");

        assert!(matches!(err, SiteError::DestroyFailed { .. }));
        // Stack state survives a failed destroy.
        assert!(engine.has_stack("blog"));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_site_sets_region_before_destroy() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        engine.seed_stack("blog");
        engine.lock_next_destroy();
        let service = make_service(&engine);

        let err = service
            .delete_site("blog")
            .await
            .expect_err("locked destroy should fail");
        assert!(matches!(err, SiteError::DestroyFailed { .. }));

        // The seeded stack started with no config at all, so the region here
        // was written by the delete before it attempted the destroy.
        let config = engine
            .stack_config("blog")
            .ok_or_else(|| anyhow::anyhow!("no stack"))?;
        assert_eq!(
            config.get(AWS_REGION_KEY).map(String::as_str),
            Some("us-west-2")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_remove_failure_reports_cleanup_failure() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        let service = make_service(&engine);

        service.create_site("blog", "<h1>hi</h1>").await?;
        engine.fail_next_remove();

        let err = service
            .delete_site("blog")
            .await
            .expect_err("failed removal should fail");

        assert!(matches!(err, SiteError::CleanupFailed { .. }));
        // Resources are destroyed, but the stack record lingers with no
        // outputs to serve.
        assert!(engine.has_stack("blog"));
        assert!(matches!(
            service.get_site("blog").await,
            Err(SiteError::MissingOutput { .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_sites_returns_all_ids() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        let service = make_service(&engine);

        assert_eq!(service.list_sites().await?, Vec::<String>::new());

        service.create_site("alpha", "<p>a</p>").await?;
        service.create_site("beta", "<p>b</p>").await?;

        assert_eq!(service.list_sites().await?, vec!["alpha", "beta"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_list_sites_failure_is_reported() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        engine.fail_next_list();
        let service = make_service(&engine);

        let err = service
            .list_sites()
            .await
            .expect_err("listing should fail");

        assert!(matches!(err, SiteError::ListFailed(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_deploy_failure_is_reported_with_source() -> Result<()> {
        let engine = Arc::new(FakeEngine::new());
        engine.fail_next_up("creating S3 Bucket: AccessDenied");
        let service = make_service(&engine);

        let err = service
            .create_site("blog", "<h1>hi</h1>")
            .await
            .expect_err("failed up should fail");

        match err {
            SiteError::DeployFailed { id, source } => {
                assert_eq!(id, "blog");
                assert!(source.to_string().contains("AccessDenied"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        Ok(())
    }
}
