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

use crate::{handlers, AppState};
use axum::extract::DefaultBodyLimit;
use axum::{routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let max_content_size = state.config.max_content_size;

    Router::new()
        // Health check
        .route("/health", get(health))
        // Site collection
        .route(
            "/sites",
            get(handlers::list_sites_handler).post(handlers::create_site_handler),
        )
        // Individual sites
        .route(
            "/sites/{id}",
            get(handlers::get_site_handler)
                .put(handlers::update_site_handler)
                .delete(handlers::delete_site_handler),
        )
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(max_content_size))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

// Health check handler
async fn health() -> &'static str {
    "OK"
}
