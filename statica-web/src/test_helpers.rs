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

#[cfg(test)]
use crate::{config::Config, state::AppState};
#[cfg(test)]
use statica_engine::{testing::FakeEngine, SiteService};
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        project_name: "statica-test".to_string(),
        aws_region: "us-west-2".to_string(),
        pulumi_bin: "pulumi".to_string(),
        pulumi_backend_url: None,
        pulumi_passphrase: None,
        aws_plugin_version: None,
        max_content_size: 1_048_576,
    }
}

#[cfg(test)]
pub fn create_test_app_state() -> AppState {
    create_test_app_state_with_engine().0
}

#[cfg(test)]
pub fn create_test_app_state_with_engine() -> (AppState, Arc<FakeEngine>) {
    let engine = Arc::new(FakeEngine::new());
    let config = test_config();
    let service = SiteService::new(engine.clone(), config.aws_region.clone());

    (AppState::new(Arc::new(service), config), engine)
}
