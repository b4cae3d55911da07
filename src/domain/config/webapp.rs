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

use crate::infrastructure::constants::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ServiceType {
    #[default]
    ClusterIP,
    LoadBalancer,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::ClusterIP => "ClusterIP",
            ServiceType::LoadBalancer => "LoadBalancer",
        }
    }
}

/// Infrastructure facts surfaced to the running app.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IacMetadata {
    pub region: String,
    pub instance_type: String,
    pub service_type: ServiceType,
    pub dns: String,
    pub tls: String,
    pub nlb: String,
}

impl IacMetadata {
    pub fn to_data(&self) -> BTreeMap<String, String> {
        let mut data = BTreeMap::new();
        data.insert("REGION".to_string(), self.region.clone());
        data.insert("INSTANCE_TYPE".to_string(), self.instance_type.clone());
        data.insert(
            "SERVICE_TYPE".to_string(),
            self.service_type.as_str().to_string(),
        );
        data.insert("DNS".to_string(), self.dns.clone());
        data.insert("TLS".to_string(), self.tls.clone());
        data.insert("NLB".to_string(), self.nlb.clone());
        data
    }
}

/// Fully resolved web app parameters, ready to render manifests from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebAppSpec {
    pub name: String,
    pub namespace: String,
    pub image: String,
    pub display_value: String,
    pub replicas: i32,
    pub metadata: IacMetadata,
}

impl WebAppSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            image: image.into(),
            display_value: DEFAULT_DISPLAY_VALUE.to_string(),
            replicas: DEFAULT_COMPONENT_REPLICAS,
            metadata: IacMetadata::default(),
        }
    }

    pub fn config_map_name(&self) -> String {
        format!("{}{}", self.name, SUFFIX_CONFIG)
    }

    pub fn deployment_name(&self) -> String {
        format!("{}{}", self.name, SUFFIX_DEPLOYMENT)
    }

    pub fn service_name(&self) -> String {
        format!("{}{}", self.name, SUFFIX_SERVICE)
    }

    /// Pod annotation value that forces a rollout when the display value
    /// changes. Only the byte length is hashed, so same-length edits do not
    /// roll the pods.
    pub fn config_hash(&self) -> String {
        self.display_value.len().to_string()
    }
}

/// Status strings reported through the IaC metadata.
pub fn tls_status(certificate_arn: &str) -> &'static str {
    if certificate_arn.is_empty() {
        "disabled"
    } else {
        "enabled (ACM)"
    }
}

pub fn primary_instance_type(instance_types: &[String]) -> String {
    instance_types
        .first()
        .cloned()
        .unwrap_or_else(|| UNKNOWN_INSTANCE_TYPE.to_string())
}
