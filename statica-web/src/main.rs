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
use statica_engine::{PulumiEngine, SiteService, StackEngine};
use statica_web::{config::Config, routes, state::AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "statica_web=debug,statica_engine=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Starting Statica server");

    // Verify the engine is usable before accepting requests
    let engine = PulumiEngine::new(config.engine_config());
    let version = engine
        .version()
        .await
        .context("Failed to run the pulumi CLI; is it installed and on PATH?")?;
    info!("Engine: pulumi {}", version);

    if let Some(plugin_version) = &config.aws_plugin_version {
        info!("Installing AWS resource plugin {}", plugin_version);
        engine
            .install_plugin("aws", plugin_version)
            .await
            .with_context(|| format!("Failed to install AWS resource plugin {plugin_version}"))?;
    }

    // Create application state
    let service = SiteService::new(Arc::new(engine), config.aws_region.clone());
    let state = AppState::new(Arc::new(service), config.clone());

    // Create router
    let app = routes::create_router(state);

    // Start server
    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
