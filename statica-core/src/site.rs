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

use serde::{Deserialize, Serialize};

/// Maximum length of a site id. Site ids double as engine stack names,
/// which are capped at 100 characters.
pub const MAX_SITE_ID_LEN: usize = 100;

/// A site that has been deployed at least once: its id plus the website
/// endpoint the engine exported for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeployedSite {
    pub id: String,
    pub url: String,
}

impl DeployedSite {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// Validate a caller-supplied site id before it is used as a stack name.
///
/// Stack names may only contain alphanumeric characters, hyphens,
/// underscores, and periods.
pub fn validate_site_id(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("Site id cannot be empty".to_string());
    }

    if id.len() > MAX_SITE_ID_LEN {
        return Err(format!(
            "Site id cannot exceed {} characters",
            MAX_SITE_ID_LEN
        ));
    }

    if let Some(bad) = id
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        return Err(format!(
            "Site id may only contain alphanumeric characters, hyphens, underscores, and periods (found {:?})",
            bad
        ));
    }

    Ok(())
}
