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

//! In-memory stack engine for tests.
//!
//! Behaves like the CLI engine as far as callers can observe: duplicate
//! creates and missing stacks fail with the same typed errors, deploys
//! produce a `websiteUrl` output, and failure injection covers the paths a
//! real backend would exercise.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use statica_core::{SiteProgram, WEBSITE_URL_OUTPUT};

use crate::engine::{StackEngine, StackHandle, StackOutputs, StackSummary};
use crate::error::EngineError;

#[derive(Default)]
struct FakeState {
    stacks: BTreeMap<String, FakeStack>,
    plugin_installs: Vec<(String, String)>,
    deploy_count: usize,
    lock_next_up: bool,
    lock_next_destroy: bool,
    fail_next_up: Option<String>,
    fail_next_remove: bool,
    fail_next_list: bool,
}

#[derive(Default, Clone)]
struct FakeStack {
    config: BTreeMap<String, String>,
    program: Option<SiteProgram>,
    outputs: StackOutputs,
    deployed: bool,
}

/// Shared-state fake engine. Clones and handles all point at the same
/// stack table, so assertions see what operations did.
#[derive(Default, Clone)]
pub struct FakeEngine {
    state: Arc<Mutex<FakeState>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake engine state poisoned")
    }

    /// Number of deploys run across every stack.
    pub fn deploy_count(&self) -> usize {
        self.state().deploy_count
    }

    pub fn has_stack(&self, name: &str) -> bool {
        self.state().stacks.contains_key(name)
    }

    /// Configuration set on a stack, if it exists.
    pub fn stack_config(&self, name: &str) -> Option<BTreeMap<String, String>> {
        self.state().stacks.get(name).map(|s| s.config.clone())
    }

    /// Index content of the last program deployed to a stack, as staged.
    pub fn stack_content(&self, name: &str) -> Option<String> {
        self.state()
            .stacks
            .get(name)
            .and_then(|s| s.program.as_ref())
            .map(|p| p.resources.index.properties.content.clone())
    }

    pub fn plugin_installs(&self) -> Vec<(String, String)> {
        self.state().plugin_installs.clone()
    }

    /// Register a stack that exists but has never deployed, so it has no
    /// outputs yet.
    pub fn seed_stack(&self, name: &str) {
        self.state()
            .stacks
            .insert(name.to_string(), FakeStack::default());
    }

    /// Make the next `up` fail as if the stack lock were held.
    pub fn lock_next_up(&self) {
        self.state().lock_next_up = true;
    }

    /// Make the next `destroy` fail as if the stack lock were held.
    pub fn lock_next_destroy(&self) {
        self.state().lock_next_destroy = true;
    }

    /// Make the next `up` fail with the given stderr.
    pub fn fail_next_up(&self, stderr: &str) {
        self.state().fail_next_up = Some(stderr.to_string());
    }

    /// Make the next stack removal fail, leaving the stack's state behind.
    pub fn fail_next_remove(&self) {
        self.state().fail_next_remove = true;
    }

    /// Make the next listing fail.
    pub fn fail_next_list(&self) {
        self.state().fail_next_list = true;
    }
}

#[async_trait]
impl StackEngine for FakeEngine {
    async fn create_stack(
        &self,
        name: &str,
        program: &SiteProgram,
    ) -> Result<Box<dyn StackHandle>, EngineError> {
        let mut state = self.state();
        if state.stacks.contains_key(name) {
            return Err(EngineError::StackAlreadyExists(name.to_string()));
        }
        state.stacks.insert(name.to_string(), FakeStack::default());

        Ok(Box::new(FakeHandle {
            name: name.to_string(),
            program: Some(program.clone()),
            state: self.state.clone(),
        }))
    }

    async fn select_stack(
        &self,
        name: &str,
        program: Option<&SiteProgram>,
    ) -> Result<Box<dyn StackHandle>, EngineError> {
        if !self.state().stacks.contains_key(name) {
            return Err(EngineError::StackNotFound(name.to_string()));
        }

        Ok(Box::new(FakeHandle {
            name: name.to_string(),
            program: program.cloned(),
            state: self.state.clone(),
        }))
    }

    async fn list_stacks(&self) -> Result<Vec<StackSummary>, EngineError> {
        let mut state = self.state();
        if state.fail_next_list {
            state.fail_next_list = false;
            return Err(EngineError::CommandFailed {
                command: "pulumi stack ls --json".to_string(),
                stderr: "error: could not list stacks".to_string(),
            });
        }

        Ok(state
            .stacks
            .keys()
            .map(|name| StackSummary {
                name: name.clone(),
                current: false,
                update_in_progress: false,
                last_update: None,
                resource_count: None,
                url: None,
            })
            .collect())
    }

    async fn install_plugin(&self, name: &str, version: &str) -> Result<(), EngineError> {
        self.state()
            .plugin_installs
            .push((name.to_string(), version.to_string()));
        Ok(())
    }

    async fn version(&self) -> Result<String, EngineError> {
        Ok("v3.0.0 (fake)".to_string())
    }
}

struct FakeHandle {
    name: String,
    program: Option<SiteProgram>,
    state: Arc<Mutex<FakeState>>,
}

impl FakeHandle {
    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().expect("fake engine state poisoned")
    }
}

#[async_trait]
impl StackHandle for FakeHandle {
    fn name(&self) -> &str {
        &self.name
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), EngineError> {
        let mut state = self.state();
        let stack = state
            .stacks
            .get_mut(&self.name)
            .ok_or_else(|| EngineError::StackNotFound(self.name.clone()))?;
        stack.config.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn up(&self) -> Result<StackOutputs, EngineError> {
        let mut state = self.state();
        if let Some(stderr) = state.fail_next_up.take() {
            return Err(EngineError::CommandFailed {
                command: "pulumi up --yes --skip-preview".to_string(),
                stderr,
            });
        }
        if state.lock_next_up {
            state.lock_next_up = false;
            return Err(EngineError::UpdateInProgress(self.name.clone()));
        }

        state.deploy_count += 1;
        let url = format!("{}.s3-website.test", self.name);
        let stack = state
            .stacks
            .get_mut(&self.name)
            .ok_or_else(|| EngineError::StackNotFound(self.name.clone()))?;
        stack.program = self.program.clone();
        stack.deployed = true;
        stack.outputs = StackOutputs::new();
        stack
            .outputs
            .insert(WEBSITE_URL_OUTPUT.to_string(), serde_json::Value::String(url));
        Ok(stack.outputs.clone())
    }

    async fn outputs(&self) -> Result<StackOutputs, EngineError> {
        let state = self.state();
        let stack = state
            .stacks
            .get(&self.name)
            .ok_or_else(|| EngineError::StackNotFound(self.name.clone()))?;
        Ok(stack.outputs.clone())
    }

    async fn destroy(&self) -> Result<(), EngineError> {
        let mut state = self.state();
        if state.lock_next_destroy {
            state.lock_next_destroy = false;
            return Err(EngineError::UpdateInProgress(self.name.clone()));
        }
        let stack = state
            .stacks
            .get_mut(&self.name)
            .ok_or_else(|| EngineError::StackNotFound(self.name.clone()))?;
        stack.outputs.clear();
        stack.deployed = false;
        Ok(())
    }

    async fn remove(self: Box<Self>) -> Result<(), EngineError> {
        let mut state = self.state();
        if state.fail_next_remove {
            state.fail_next_remove = false;
            return Err(EngineError::CommandFailed {
                command: format!("pulumi stack rm --yes {}", self.name),
                stderr: "error: could not remove stack state".to_string(),
            });
        }
        state
            .stacks
            .remove(&self.name)
            .map(|_| ())
            .ok_or_else(|| EngineError::StackNotFound(self.name.clone()))
    }
}
