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

//! `-D key=value` overrides.
//!
//! Keys containing `:` are namespaced stack values (`websrv1:setting`).
//! Keys prefixed with `stack.` override a field of the `[stack]` table.

use crate::domain::config::StackConfig;
use crate::shared::error::{Result, StackError};
use std::collections::HashMap;
use std::str::FromStr;

/// Parse dynamic configuration properties from -D key=value format
pub fn parse_dynamic_configs(configs: &[String]) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();

    for config in configs {
        let parts: Vec<&str> = config.splitn(2, '=').collect();
        if parts.len() != 2 {
            return Err(StackError::ConfigError(format!(
                "Invalid config format: '{}'. Expected 'key=value'",
                config
            )));
        }

        let key = parts[0].trim();
        let value = parts[1].trim();

        if key.is_empty() {
            return Err(StackError::ConfigError(format!(
                "Empty key in config: '{}'",
                config
            )));
        }

        map.insert(key.to_string(), value.to_string());
    }

    Ok(map)
}

fn parse_number<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        StackError::ConfigError(format!("Invalid number for {}: '{}'", key, value))
    })
}

pub fn apply_overrides(configs: &HashMap<String, String>, config: &mut StackConfig) -> Result<()> {
    for (key, value) in configs {
        if key.contains(':') {
            config.set(key.clone(), value.clone());
            continue;
        }

        let Some(field) = key.strip_prefix("stack.") else {
            return Err(StackError::ConfigError(format!(
                "Unknown config key '{}'. Use '<namespace>:<key>' or 'stack.<field>'",
                key
            )));
        };

        let settings = &mut config.stack;
        match field {
            "app-name" => settings.app_name = value.clone(),
            "namespace" => settings.namespace = value.clone(),
            "replicas" => settings.replicas = parse_number(key, value)?,
            "availability-zones" => settings.availability_zones = parse_number(key, value)?,
            "instance-type" => settings.instance_type = value.clone(),
            "node-desired-size" => settings.node_desired_size = parse_number(key, value)?,
            "node-min-size" => settings.node_min_size = parse_number(key, value)?,
            "node-max-size" => settings.node_max_size = parse_number(key, value)?,
            "zone-name" => settings.zone_name = value.clone(),
            "domain-name" => settings.domain_name = value.clone(),
            "image-tag" => settings.image_tag = value.clone(),
            "build-context" => settings.build_context = value.clone(),
            "platform" => settings.platform = value.clone(),
            _ => {
                return Err(StackError::ConfigError(format!(
                    "Unknown stack setting '{}'",
                    field
                )))
            }
        }
    }

    Ok(())
}
