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

//! Environment variable builder for the web app container
//!
//! Plain values come first, then downward-API values. The IaC metadata
//! ConfigMap is injected whole via `envFrom`.

use k8s_openapi::api::core::v1::{
    ConfigMapEnvSource, EnvFromSource, EnvVar, EnvVarSource, ObjectFieldSelector,
};

pub struct EnvironmentBuilder {
    display_value: String,
    port: i32,
    config_map_name: Option<String>,
}

impl EnvironmentBuilder {
    pub fn new(display_value: String, port: i32) -> Self {
        Self {
            display_value,
            port,
            config_map_name: None,
        }
    }

    pub fn with_config_map(mut self, name: String) -> Self {
        self.config_map_name = Some(name);
        self
    }

    pub fn build(&self) -> Vec<EnvVar> {
        let mut env_vars = Vec::new();
        env_vars.extend(self.build_app_env_vars());
        env_vars.extend(self.build_k8s_env_vars());
        env_vars
    }

    pub fn build_env_from(&self) -> Option<Vec<EnvFromSource>> {
        self.config_map_name.as_ref().map(|name| {
            vec![EnvFromSource {
                config_map_ref: Some(ConfigMapEnvSource {
                    name: name.clone(),
                    optional: Some(false),
                }),
                ..Default::default()
            }]
        })
    }

    fn build_app_env_vars(&self) -> Vec<EnvVar> {
        vec![
            EnvVar {
                name: "DISPLAY_VALUE".to_string(),
                value: Some(self.display_value.clone()),
                ..Default::default()
            },
            EnvVar {
                name: "PORT".to_string(),
                value: Some(self.port.to_string()),
                ..Default::default()
            },
        ]
    }

    fn build_k8s_env_vars(&self) -> Vec<EnvVar> {
        vec![
            field_ref_env("KUBERNETES_NAMESPACE", "metadata.namespace"),
            field_ref_env("NODE_NAME", "spec.nodeName"),
            field_ref_env("POD_IP", "status.podIP"),
        ]
    }
}

fn field_ref_env(name: &str, field_path: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value_from: Some(EnvVarSource {
            field_ref: Some(ObjectFieldSelector {
                field_path: field_path.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }),
        ..Default::default()
    }
}
