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

use anyhow::{Context, Result};
use statica_engine::EngineConfig;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub project_name: String,
    pub aws_region: String,
    pub pulumi_bin: String,
    pub pulumi_backend_url: Option<String>,
    pub pulumi_passphrase: Option<String>,
    pub aws_plugin_version: Option<String>,
    pub max_content_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "statica".to_string()),
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "us-west-2".to_string()),
            pulumi_bin: env::var("PULUMI_BIN").unwrap_or_else(|_| "pulumi".to_string()),
            pulumi_backend_url: env::var("PULUMI_BACKEND_URL").ok(),
            pulumi_passphrase: env::var("PULUMI_CONFIG_PASSPHRASE").ok(),
            aws_plugin_version: env::var("AWS_PLUGIN_VERSION").ok(),
            max_content_size: env::var("MAX_CONTENT_SIZE")
                .unwrap_or_else(|_| "1048576".to_string()) // 1MB default
                .parse()
                .unwrap_or(1_048_576),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Engine settings derived from this configuration. The AWS plugin
    /// version stays out: it drives the startup preflight, not the engine.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            project: self.project_name.clone(),
            pulumi_bin: self.pulumi_bin.clone(),
            backend_url: self.pulumi_backend_url.clone(),
            passphrase: self.pulumi_passphrase.clone(),
        }
    }
}
