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

use crate::domain::config::validator::{
    is_subdomain_of, is_valid_dns_1035_label, is_valid_dns_label,
};
use crate::infrastructure::constants::*;
use crate::shared::error::{Result, StackError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::read_to_string;

// ============================================================================
// Stack configuration file
// ============================================================================

/// Stack configuration loaded from TOML.
///
/// ```toml
/// [config]
/// "websrv1:setting" = "hello world"
///
/// [stack]
/// app_name = "hello"
/// domain_name = "pulumidemo.t8rsk8s.io"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StackConfig {
    /// Namespaced values, keyed `<namespace>:<key>`.
    pub config: BTreeMap<String, String>,
    pub stack: StackSettings,
}

impl StackConfig {
    /// Load configuration from TOML file
    pub fn from<T: AsRef<str>>(path: T) -> Result<Self> {
        let content = read_to_string(path.as_ref()).map_err(|e| {
            StackError::Io(format!("Failed to read config file {}: {}", path.as_ref(), e))
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let conf: Self = toml::from_str(content)?;
        Ok(conf)
    }

    pub fn get(&self, namespace: &str, key: &str) -> Option<&str> {
        self.config
            .get(&format!("{}:{}", namespace, key))
            .map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.config.insert(key.into(), value.into());
    }

    /// Value rendered by the web app. Unset and empty both fall back to the
    /// default literal.
    pub fn display_value(&self) -> String {
        match self.get(CONFIG_NAMESPACE, CONFIG_KEY_SETTING) {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => DEFAULT_DISPLAY_VALUE.to_string(),
        }
    }
}

// ============================================================================
// Stack settings
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StackSettings {
    pub app_name: String,
    pub namespace: String,
    pub replicas: i32,
    pub availability_zones: u32,
    pub instance_type: String,
    pub node_desired_size: u32,
    pub node_min_size: u32,
    pub node_max_size: u32,
    pub zone_name: String,
    pub domain_name: String,
    pub image_tag: String,
    pub build_context: String,
    pub platform: String,
}

impl Default for StackSettings {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            replicas: DEFAULT_STACK_REPLICAS,
            availability_zones: DEFAULT_AVAILABILITY_ZONES,
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
            node_desired_size: DEFAULT_NODE_COUNT,
            node_min_size: DEFAULT_NODE_COUNT,
            node_max_size: DEFAULT_NODE_COUNT,
            zone_name: DEFAULT_ZONE_NAME.to_string(),
            domain_name: DEFAULT_DOMAIN_NAME.to_string(),
            image_tag: DEFAULT_IMAGE_TAG.to_string(),
            build_context: DEFAULT_BUILD_CONTEXT.to_string(),
            platform: DEFAULT_PLATFORM.to_string(),
        }
    }
}

impl StackSettings {
    pub fn load_balancer_name(&self) -> String {
        format!("{}{}", self.app_name, SUFFIX_LOAD_BALANCER)
    }

    pub fn url(&self) -> String {
        format!("https://{}", self.domain_name)
    }

    pub fn validate(&self) -> Result<()> {
        // Every object name is `<app_name><suffix>`; Service names need a
        // DNS-1035 label, so the longest suffixed name must still fit.
        if !is_valid_dns_1035_label(&self.app_name) {
            return Err(StackError::ValidationError(format!(
                "Invalid app_name '{}'. Must be a lowercase DNS-1035 label (start with a letter)",
                self.app_name
            )));
        }

        if self.app_name.len() > MAX_APP_NAME_LENGTH {
            return Err(StackError::ValidationError(format!(
                "app_name '{}' is {} characters; at most {} fit before the '{}' suffix",
                self.app_name,
                self.app_name.len(),
                MAX_APP_NAME_LENGTH,
                SUFFIX_CONFIG
            )));
        }

        if !is_valid_dns_label(&self.namespace) {
            return Err(StackError::ValidationError(format!(
                "Invalid namespace '{}'. Must be a lowercase DNS-1123 label",
                self.namespace
            )));
        }

        if self.replicas <= 0 {
            return Err(StackError::ValidationError(
                "replicas must be > 0".to_string(),
            ));
        }

        if self.availability_zones == 0 {
            return Err(StackError::ValidationError(
                "availability_zones must be > 0".to_string(),
            ));
        }

        if self.node_min_size > self.node_desired_size
            || self.node_desired_size > self.node_max_size
        {
            return Err(StackError::ValidationError(format!(
                "Node group sizes must satisfy min <= desired <= max (got {}/{}/{})",
                self.node_min_size, self.node_desired_size, self.node_max_size
            )));
        }

        if self.instance_type.is_empty() {
            return Err(StackError::ValidationError(
                "instance_type cannot be empty".to_string(),
            ));
        }

        if !is_subdomain_of(&self.domain_name, &self.zone_name) {
            return Err(StackError::ValidationError(format!(
                "Domain '{}' is not within zone '{}'",
                self.domain_name, self.zone_name
            )));
        }

        Ok(())
    }
}
