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

//! Scratch workspaces for CLI invocations.
//!
//! Every stack operation runs inside a throwaway directory holding a
//! rendered `Pulumi.yaml`. The directory is removed when the workspace is
//! dropped, so nothing accumulates across requests.

use std::path::Path;

use serde::Serialize;
use statica_core::SiteProgram;
use tempfile::TempDir;

use crate::error::EngineError;

/// File name the CLI expects the project manifest under.
pub const PROJECT_MANIFEST: &str = "Pulumi.yaml";

const YAML_RUNTIME: &str = "yaml";

// A flattened `None` body serializes to nothing, leaving a bare manifest.
#[derive(Serialize)]
struct ProjectManifest<'a> {
    name: &'a str,
    runtime: &'a str,
    #[serde(flatten)]
    program: Option<&'a SiteProgram>,
}

/// A staged workspace directory owning its manifest.
///
/// Holds the [`TempDir`] guard; the directory disappears on drop.
pub struct StackWorkspace {
    dir: TempDir,
}

impl StackWorkspace {
    /// Stage a workspace for `project`, rendering `program` into the
    /// manifest when one is given. Operations that only read outputs or
    /// destroy do not need a program body.
    pub async fn stage(
        project: &str,
        program: Option<&SiteProgram>,
    ) -> Result<Self, EngineError> {
        let dir = TempDir::new()?;

        let manifest = ProjectManifest {
            name: project,
            runtime: YAML_RUNTIME,
            program,
        };
        let rendered = serde_yaml::to_string(&manifest)?;
        tokio::fs::write(dir.path().join(PROJECT_MANIFEST), rendered).await?;

        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_stage_writes_manifest_with_program() -> anyhow::Result<()> {
        let program = SiteProgram::new("<h1>staged</h1>");
        let workspace = StackWorkspace::stage("statica", Some(&program)).await?;

        let rendered =
            tokio::fs::read_to_string(workspace.path().join(PROJECT_MANIFEST)).await?;
        let manifest: serde_yaml::Value = serde_yaml::from_str(&rendered)?;

        assert_eq!(manifest["name"].as_str(), Some("statica"));
        assert_eq!(manifest["runtime"].as_str(), Some("yaml"));
        assert!(manifest.get("resources").is_some());
        assert!(manifest.get("outputs").is_some());
        assert_eq!(
            manifest["resources"]["index"]["properties"]["content"].as_str(),
            Some("<h1>staged</h1>")
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_stage_without_program_renders_bare_manifest() -> anyhow::Result<()> {
        let workspace = StackWorkspace::stage("statica", None).await?;

        let rendered =
            tokio::fs::read_to_string(workspace.path().join(PROJECT_MANIFEST)).await?;
        let manifest: serde_yaml::Value = serde_yaml::from_str(&rendered)?;

        assert_eq!(manifest["name"].as_str(), Some("statica"));
        assert_eq!(manifest["runtime"].as_str(), Some("yaml"));
        assert!(manifest.get("resources").is_none());
        assert!(manifest.get("outputs").is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_workspace_directory_is_removed_on_drop() -> anyhow::Result<()> {
        let workspace = StackWorkspace::stage("statica", None).await?;
        let path = workspace.path().to_path_buf();
        assert!(path.exists());

        drop(workspace);
        assert!(!path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_each_workspace_gets_its_own_directory() -> anyhow::Result<()> {
        let a = StackWorkspace::stage("statica", None).await?;
        let b = StackWorkspace::stage("statica", None).await?;
        assert_ne!(a.path(), b.path());
        Ok(())
    }
}
