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
use crate::infrastructure::constants::*;
use crate::infrastructure::kubernetes::resources::pod::{
    EnvironmentBuilder, PodBuilder, ProbeBuilder, SecurityContextBuilder,
};
use crate::shared::error::{Result, StackError};
use k8s_openapi::api::apps::v1::{
    Deployment, DeploymentSpec, DeploymentStrategy, RollingUpdateDeployment,
};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, PodSpec, PodTemplateSpec, ResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

pub struct DeploymentBuilder {
    spec: WebAppSpec,
}

impl PodBuilder for DeploymentBuilder {
    fn app_name(&self) -> &str {
        &self.spec.name
    }

    fn build_main_container(&self) -> Result<Container> {
        let env = EnvironmentBuilder::new(self.spec.display_value.clone(), CONTAINER_PORT)
            .with_config_map(self.spec.config_map_name());

        Ok(Container {
            name: self.main_container_name().to_string(),
            image: Some(self.spec.image.clone()),
            ports: Some(vec![ContainerPort {
                container_port: CONTAINER_PORT,
                ..Default::default()
            }]),
            env: Some(env.build()),
            env_from: env.build_env_from(),
            resources: Some(build_resources()),
            security_context: Some(SecurityContextBuilder::build_container()),
            liveness_probe: Some(ProbeBuilder::build_liveness(CONTAINER_PORT)),
            readiness_probe: Some(ProbeBuilder::build_readiness(CONTAINER_PORT)),
            ..Default::default()
        })
    }

    fn build_pod_template(&self) -> Result<PodTemplateSpec> {
        let mut annotations = BTreeMap::new();
        annotations.insert(
            CONFIG_HASH_ANNOTATION.to_string(),
            self.spec.config_hash(),
        );

        Ok(PodTemplateSpec {
            metadata: Some(ObjectMeta {
                labels: Some(self.get_labels()),
                annotations: Some(annotations),
                ..Default::default()
            }),
            spec: Some(PodSpec {
                security_context: Some(SecurityContextBuilder::build_pod()),
                containers: vec![self.build_main_container()?],
                ..Default::default()
            }),
        })
    }

    fn main_container_name(&self) -> &'static str {
        CONTAINER_NAME_APP
    }
}

impl DeploymentBuilder {
    pub fn new(spec: WebAppSpec) -> Self {
        Self { spec }
    }

    pub fn build(&self) -> Result<Deployment> {
        if self.spec.image.is_empty() {
            return Err(StackError::InvalidResource(format!(
                "Deployment {} requires an image",
                self.spec.deployment_name()
            )));
        }

        let metadata = ObjectMeta {
            name: Some(self.spec.deployment_name()),
            namespace: Some(self.spec.namespace.clone()),
            labels: Some(self.get_labels()),
            ..Default::default()
        };

        let deployment = Deployment {
            metadata,
            spec: Some(DeploymentSpec {
                replicas: Some(self.spec.replicas),
                strategy: Some(DeploymentStrategy {
                    type_: Some(STRATEGY_TYPE_ROLLING_UPDATE.to_string()),
                    rolling_update: Some(RollingUpdateDeployment {
                        max_surge: Some(IntOrString::Int(MAX_SURGE)),
                        max_unavailable: Some(IntOrString::Int(MAX_UNAVAILABLE)),
                    }),
                }),
                selector: LabelSelector {
                    match_labels: Some(self.get_selector_labels()),
                    ..Default::default()
                },
                template: self.build_pod_template()?,
                ..Default::default()
            }),
            ..Default::default()
        };

        Ok(deployment)
    }
}

fn build_resources() -> ResourceRequirements {
    let mut requests = BTreeMap::new();
    requests.insert("cpu".to_string(), Quantity(CPU_REQUEST.to_string()));
    requests.insert("memory".to_string(), Quantity(MEMORY_REQUEST.to_string()));

    let mut limits = BTreeMap::new();
    limits.insert("cpu".to_string(), Quantity(CPU_LIMIT.to_string()));
    limits.insert("memory".to_string(), Quantity(MEMORY_LIMIT.to_string()));

    ResourceRequirements {
        requests: Some(requests),
        limits: Some(limits),
        ..Default::default()
    }
}
