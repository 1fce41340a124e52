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

/// Logical name of the bucket resource inside a site program.
///
/// Resource names are stable constants rather than something derived from
/// the stack name: the engine scopes resource identity by stack, so every
/// site program can reuse the same names without collision.
pub const BUCKET_RESOURCE: &str = "s3-website-bucket";

/// Logical name of the `index.html` object resource.
pub const INDEX_RESOURCE: &str = "index";

/// Logical name of the public-read bucket policy resource.
pub const POLICY_RESOURCE: &str = "bucketPolicy";

/// Object key the site content is uploaded under.
pub const INDEX_KEY: &str = "index.html";

/// MIME type of the uploaded content.
pub const INDEX_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Name of the program output bound to the bucket's website endpoint.
pub const WEBSITE_URL_OUTPUT: &str = "websiteUrl";

const BUCKET_TYPE: &str = "aws:s3/bucket:Bucket";
const OBJECT_TYPE: &str = "aws:s3/bucketObject:BucketObject";
const POLICY_TYPE: &str = "aws:s3/bucketPolicy:BucketPolicy";

/// The body of a declarative site program: exactly one website bucket, one
/// `index.html` object carrying the caller's HTML, one public-read bucket
/// policy, and a single `websiteUrl` output.
///
/// The body is project-agnostic; the engine wraps it in a project manifest
/// (`name` + `runtime`) when it stages a workspace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SiteProgram {
    pub resources: ProgramResources,
    pub outputs: ProgramOutputs,
}

impl SiteProgram {
    /// Build the program for the given HTML content. Pure: never fails,
    /// touches no network.
    pub fn new(content: &str) -> Self {
        let bucket_ref = interpolate(BUCKET_RESOURCE, "id");

        Self {
            resources: ProgramResources {
                bucket: BucketResource {
                    resource_type: BUCKET_TYPE.to_string(),
                    properties: BucketProperties {
                        website: BucketWebsite {
                            index_document: INDEX_KEY.to_string(),
                        },
                    },
                },
                index: IndexObjectResource {
                    resource_type: OBJECT_TYPE.to_string(),
                    properties: IndexObjectProperties {
                        bucket: bucket_ref.clone(),
                        content: escape_literal(content),
                        key: INDEX_KEY.to_string(),
                        content_type: INDEX_CONTENT_TYPE.to_string(),
                    },
                },
                policy: BucketPolicyResource {
                    resource_type: POLICY_TYPE.to_string(),
                    properties: BucketPolicyProperties {
                        bucket: bucket_ref.clone(),
                        policy: PolicyJson {
                            to_json: PolicyDocument {
                                version: "2012-10-17".to_string(),
                                statement: vec![PolicyStatement {
                                    effect: "Allow".to_string(),
                                    principal: "*".to_string(),
                                    action: vec!["s3:GetObject".to_string()],
                                    resource: vec![format!("arn:aws:s3:::{}/*", bucket_ref)],
                                }],
                            },
                        },
                    },
                },
            },
            outputs: ProgramOutputs {
                website_url: interpolate(BUCKET_RESOURCE, "websiteEndpoint"),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgramResources {
    #[serde(rename = "s3-website-bucket")]
    pub bucket: BucketResource,
    pub index: IndexObjectResource,
    #[serde(rename = "bucketPolicy")]
    pub policy: BucketPolicyResource,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub properties: BucketProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketProperties {
    pub website: BucketWebsite,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BucketWebsite {
    pub index_document: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexObjectResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub properties: IndexObjectProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexObjectProperties {
    pub bucket: String,
    pub content: String,
    pub key: String,
    pub content_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketPolicyResource {
    #[serde(rename = "type")]
    pub resource_type: String,
    pub properties: BucketPolicyProperties,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BucketPolicyProperties {
    pub bucket: String,
    pub policy: PolicyJson,
}

/// Wraps the policy document in the engine's `fn::toJSON` builtin so the
/// policy reaches the provider as a JSON string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyJson {
    #[serde(rename = "fn::toJSON")]
    pub to_json: PolicyDocument,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<PolicyStatement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: String,
    pub principal: String,
    pub action: Vec<String>,
    pub resource: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgramOutputs {
    #[serde(rename = "websiteUrl")]
    pub website_url: String,
}

fn interpolate(resource: &str, property: &str) -> String {
    format!("${{{}.{}}}", resource, property)
}

/// Escape interpolation openers in caller content so the engine uploads the
/// HTML verbatim instead of evaluating `${...}` sequences inside it.
fn escape_literal(content: &str) -> String {
    content.replace("${", "$${")
}
