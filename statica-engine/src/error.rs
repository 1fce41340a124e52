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

//! Error types for the stack engine and the site operations built on it.

use thiserror::Error;

/// Errors surfaced by a stack engine.
///
/// The first three variants are recognized conditions the service layer
/// maps to specific HTTP statuses; everything else is an operational
/// failure reported as-is.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("stack '{0}' already exists")]
    StackAlreadyExists(String),

    #[error("no stack named '{0}'")]
    StackNotFound(String),

    #[error("another update is in progress for stack '{0}'")]
    UpdateInProgress(String),

    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("failed to decode `{command}` output: {source}")]
    Decode {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to render project manifest: {0}")]
    Manifest(#[from] serde_yaml::Error),

    #[error("failed to stage workspace: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors for the site operations exposed over HTTP.
///
/// Each variant corresponds to one response the API can give; the web
/// layer maps them to statuses without inspecting message text.
#[derive(Error, Debug)]
pub enum SiteError {
    #[error("site '{0}' already exists")]
    AlreadyExists(String),

    #[error("site '{0}' not found")]
    NotFound(String),

    #[error("site '{0}' already has an update in progress")]
    ConcurrentUpdate(String),

    #[error("failed to deploy site '{id}': {source}")]
    DeployFailed {
        id: String,
        #[source]
        source: EngineError,
    },

    #[error("failed to read site '{id}': {source}")]
    ReadFailed {
        id: String,
        #[source]
        source: EngineError,
    },

    #[error("failed to destroy site '{id}': {source}")]
    DestroyFailed {
        id: String,
        #[source]
        source: EngineError,
    },

    #[error("failed to remove state for site '{id}': {source}")]
    CleanupFailed {
        id: String,
        #[source]
        source: EngineError,
    },

    #[error("deployment of site '{id}' produced no '{output}' output")]
    MissingOutput { id: String, output: String },

    #[error("failed to list sites: {0}")]
    ListFailed(#[source] EngineError),
}
