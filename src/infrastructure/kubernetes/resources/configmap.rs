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

use crate::domain::config::WebAppSpec;
use crate::infrastructure::kubernetes::resources::pod::LabeledResourceBuilder;
use crate::shared::error::Result;
use k8s_openapi::api::core::v1::ConfigMap;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Builds the ConfigMap carrying the IaC metadata of a web app.
pub struct ConfigMapBuilder {
    spec: WebAppSpec,
}

impl LabeledResourceBuilder for ConfigMapBuilder {
    fn app_name(&self) -> &str {
        &self.spec.name
    }
}

impl ConfigMapBuilder {
    pub fn new(spec: WebAppSpec) -> Self {
        Self { spec }
    }

    pub fn build(&self) -> Result<ConfigMap> {
        let metadata = ObjectMeta {
            name: Some(self.spec.config_map_name()),
            namespace: Some(self.spec.namespace.clone()),
            labels: Some(self.get_labels()),
            ..Default::default()
        };

        let config_map = ConfigMap {
            metadata,
            data: Some(self.spec.metadata.to_data()),
            ..Default::default()
        };

        Ok(config_map)
    }
}
