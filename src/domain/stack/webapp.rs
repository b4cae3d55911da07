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

//! Web app component: IaC metadata ConfigMap, Deployment and ClusterIP
//! Service, applied through a workload provider.

use crate::domain::config::{IacMetadata, ServiceType, WebAppSpec};
use crate::domain::stack::{Output, StackContext};
use crate::infrastructure::constants::{
    DEFAULT_COMPONENT_REPLICAS, DEFAULT_NAMESPACE, SUFFIX_CONFIG, SUFFIX_DEPLOYMENT, SUFFIX_SERVICE,
};
use crate::infrastructure::kubernetes::resources::{
    ConfigMapBuilder, DeploymentBuilder, ServiceBuilder,
};
use crate::infrastructure::kubernetes::WorkloadProvider;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use tracing::debug;

pub const WEBAPP_KIND: &str = "kubestack:webapp:WebApp";

pub struct WebAppArgs {
    pub image: Output<String>,
    pub display_value: Output<String>,
    /// Defaults to 1.
    pub replicas: Option<i32>,
    /// Defaults to `default`.
    pub namespace: Option<String>,
    pub region: Output<String>,
    pub instance_type: Output<String>,
    pub service_type: ServiceType,
    pub dns: String,
    pub tls: Output<String>,
    pub nlb: String,
}

pub struct WebApp {
    pub name: String,
    pub config_map: Output<ConfigMap>,
    pub deployment: Output<Deployment>,
    pub service: Output<Service>,
    pub service_name: Output<String>,
    pub deployment_name: Output<String>,
}

impl WebAppArgs {
    /// Resolves every input into a plain spec for the manifest builders.
    pub fn resolve_spec(&self, name: &str) -> Output<WebAppSpec> {
        let name = name.to_string();
        let namespace = self
            .namespace
            .clone()
            .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
        let replicas = self.replicas.unwrap_or(DEFAULT_COMPONENT_REPLICAS);
        let service_type = self.service_type;
        let dns = self.dns.clone();
        let nlb = self.nlb.clone();

        let metadata = self.region.zip3(&self.instance_type, &self.tls);
        self.image.zip3(&self.display_value, &metadata).apply(
            move |(image, display_value, (region, instance_type, tls))| WebAppSpec {
                name,
                namespace,
                image,
                display_value,
                replicas,
                metadata: IacMetadata {
                    region,
                    instance_type,
                    service_type,
                    dns,
                    tls,
                    nlb,
                },
            },
        )
    }
}

impl WebApp {
    pub fn new(
        ctx: &mut StackContext,
        name: &str,
        args: WebAppArgs,
        provider: &Output<WorkloadProvider>,
    ) -> Self {
        let spec = args.resolve_spec(name);
        let target = spec.zip(provider);

        let config_map = ctx.register(
            format!("{}{}", name, SUFFIX_CONFIG),
            target.apply_async(|(spec, provider)| async move {
                let config_map = ConfigMapBuilder::new(spec).build()?;
                provider.api.apply_configmap(&config_map).await
            }),
        );

        // Pods read the ConfigMap through envFrom, so it must exist first.
        let deployment = ctx.register(
            format!("{}{}", name, SUFFIX_DEPLOYMENT),
            target
                .after(&config_map)
                .apply_async(|(spec, provider)| async move {
                    let deployment = DeploymentBuilder::new(spec).build()?;
                    debug!(
                        name = ?deployment.metadata.name,
                        "Applying web app deployment"
                    );
                    provider.api.apply_deployment(&deployment).await
                }),
        );

        let service = ctx.register(
            format!("{}{}", name, SUFFIX_SERVICE),
            target.apply_async(|(spec, provider)| async move {
                let service = ServiceBuilder::for_web_app(&spec).build()?;
                provider.api.apply_service(&service).await
            }),
        );

        let service_name = service.apply(|s| s.metadata.name.unwrap_or_default());
        let deployment_name = deployment.apply(|d| d.metadata.name.unwrap_or_default());

        let component_id = config_map
            .after(&deployment)
            .after(&service)
            .apply(|cm| cm.metadata.namespace.unwrap_or_default());
        ctx.record(WEBAPP_KIND, name, component_id.apply({
            let name = name.to_string();
            move |namespace| format!("{}/{}", namespace, name)
        }));

        Self {
            name: name.to_string(),
            config_map,
            deployment,
            service,
            service_name,
            deployment_name,
        }
    }
}
