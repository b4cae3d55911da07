// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;
pub type Result<T> = std::result::Result<T, StackError>;

/// Every failure a deployment can hit.
///
/// Variants carry rendered messages instead of source errors so the type is
/// `Clone`: a single upstream failure is handed to every `Output` that
/// subscribed to it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    #[error("Provisioning failed for {resource_type} '{name}': {message}")]
    Provisioning {
        resource_type: String,
        name: String,
        message: String,
    },

    #[error("Kubernetes API error: {0}")]
    KubeError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Resource not found: {resource_type} '{name}' in namespace '{namespace}'")]
    NotFound {
        resource_type: String,
        name: String,
        namespace: String,
    },

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("TOML parse error: {0}")]
    TomlParse(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl From<kube::Error> for StackError {
    fn from(err: kube::Error) -> Self {
        StackError::KubeError(err.to_string())
    }
}

impl From<std::io::Error> for StackError {
    fn from(err: std::io::Error) -> Self {
        StackError::Io(err.to_string())
    }
}

impl From<serde_yaml::Error> for StackError {
    fn from(err: serde_yaml::Error) -> Self {
        StackError::Yaml(err.to_string())
    }
}

impl From<toml::de::Error> for StackError {
    fn from(err: toml::de::Error) -> Self {
        StackError::TomlParse(err.to_string())
    }
}

impl From<serde_json::Error> for StackError {
    fn from(err: serde_json::Error) -> Self {
        StackError::Json(err.to_string())
    }
}

impl StackError {
    pub fn provisioning(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Provisioning {
            resource_type: resource_type.into(),
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn not_found(
        resource_type: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}
