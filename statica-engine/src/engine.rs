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

//! Stack engine abstraction.
//!
//! A stack engine manages named stacks inside one project and hands out
//! per-stack handles. The production implementation wraps the Pulumi CLI;
//! tests swap in an in-memory fake.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use statica_core::SiteProgram;

use crate::error::EngineError;

/// Stack outputs as reported by the engine, keyed by output name.
pub type StackOutputs = serde_json::Map<String, serde_json::Value>;

/// Creates, opens, and lists named stacks.
///
/// An engine scopes every operation to a single project. Stack names are
/// unique within that project and double as site identifiers.
#[async_trait]
pub trait StackEngine: Send + Sync {
    /// Create a brand-new stack and return a handle to it.
    ///
    /// Fails with [`EngineError::StackAlreadyExists`] when a stack of this
    /// name already exists in the project.
    async fn create_stack(
        &self,
        name: &str,
        program: &SiteProgram,
    ) -> Result<Box<dyn StackHandle>, EngineError>;

    /// Open an existing stack and return a handle to it.
    ///
    /// `program` is the desired program for a subsequent deploy; pass
    /// `None` when the handle is only used to read outputs or destroy.
    /// Fails with [`EngineError::StackNotFound`] when no such stack exists.
    async fn select_stack(
        &self,
        name: &str,
        program: Option<&SiteProgram>,
    ) -> Result<Box<dyn StackHandle>, EngineError>;

    /// List every stack in the project.
    async fn list_stacks(&self) -> Result<Vec<StackSummary>, EngineError>;

    /// Install a resource plugin ahead of the first deployment.
    async fn install_plugin(&self, name: &str, version: &str) -> Result<(), EngineError>;

    /// Report the engine version, verifying the backing tool is reachable.
    async fn version(&self) -> Result<String, EngineError>;
}

/// Handle to one stack.
///
/// A handle owns the staged workspace for the stack, so configuration set
/// through it is visible to the deploy that follows. Dropping a handle
/// discards the workspace; the stack itself lives on in the backend until
/// [`StackHandle::remove`] is called.
#[async_trait]
pub trait StackHandle: Send + Sync {
    /// Name of the stack this handle points at.
    fn name(&self) -> &str;

    /// Set one configuration value on the stack.
    async fn set_config(&self, key: &str, value: &str) -> Result<(), EngineError>;

    /// Deploy the staged program and return the resulting outputs.
    ///
    /// Fails with [`EngineError::UpdateInProgress`] when another update
    /// holds the stack lock.
    async fn up(&self) -> Result<StackOutputs, EngineError>;

    /// Read the current outputs without deploying.
    async fn outputs(&self) -> Result<StackOutputs, EngineError>;

    /// Tear down every resource in the stack, leaving its state behind.
    async fn destroy(&self) -> Result<(), EngineError>;

    /// Delete the stack and its state from the backend.
    async fn remove(self: Box<Self>) -> Result<(), EngineError>;
}

/// One row of a stack listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StackSummary {
    pub name: String,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub update_in_progress: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_stack_summary_decodes_full_listing_row() -> anyhow::Result<()> {
        let json = r#"{
            "name": "my-site",
            "current": true,
            "lastUpdate": "2025-06-01T12:00:00.000Z",
            "updateInProgress": false,
            "resourceCount": 4,
            "url": "file://~"
        }"#;

        let summary: StackSummary = serde_json::from_str(json)?;
        assert_eq!(summary.name, "my-site");
        assert!(summary.current);
        assert!(!summary.update_in_progress);
        assert_eq!(summary.resource_count, Some(4));
        Ok(())
    }

    #[test]
    fn test_stack_summary_tolerates_minimal_row() -> anyhow::Result<()> {
        let summary: StackSummary = serde_json::from_str(r#"{"name": "bare"}"#)?;
        assert_eq!(summary.name, "bare");
        assert!(!summary.current);
        assert!(!summary.update_in_progress);
        assert_eq!(summary.last_update, None);
        assert_eq!(summary.resource_count, None);
        Ok(())
    }

    #[test]
    fn test_stack_summary_ignores_unknown_fields() -> anyhow::Result<()> {
        let json = r#"{"name": "extra", "orgName": "whoever", "somethingNew": 1}"#;
        let summary: StackSummary = serde_json::from_str(json)?;
        assert_eq!(summary.name, "extra");
        Ok(())
    }
}
