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

use crate::domain::config::{ServiceType, WebAppSpec};
use crate::infrastructure::constants::*;
use crate::infrastructure::kubernetes::resources::pod::LabeledResourceBuilder;
use crate::shared::error::Result;
use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use std::collections::BTreeMap;

pub struct ServiceBuilder {
    name: String,
    namespace: String,
    app_name: String,
    service_type: ServiceType,
    ports: Vec<(&'static str, i32)>,
    annotations: BTreeMap<String, String>,
    with_labels: bool,
}

impl LabeledResourceBuilder for ServiceBuilder {
    fn app_name(&self) -> &str {
        &self.app_name
    }
}

impl ServiceBuilder {
    /// In-cluster service fronting the web app on port 80.
    pub fn for_web_app(spec: &WebAppSpec) -> Self {
        Self {
            name: spec.service_name(),
            namespace: spec.namespace.clone(),
            app_name: spec.name.clone(),
            service_type: ServiceType::ClusterIP,
            ports: vec![(PORT_NAME_HTTP, SERVICE_PORT_HTTP)],
            annotations: BTreeMap::new(),
            with_labels: true,
        }
    }

    /// Network load balancer terminating TLS with `certificate_arn`.
    pub fn load_balancer(
        name: String,
        namespace: String,
        app_name: String,
        certificate_arn: String,
    ) -> Self {
        let mut annotations = BTreeMap::new();
        annotations.insert(LB_TYPE_ANNOTATION.to_string(), "nlb".to_string());
        annotations.insert(LB_SSL_CERT_ANNOTATION.to_string(), certificate_arn);
        annotations.insert(
            LB_BACKEND_PROTOCOL_ANNOTATION.to_string(),
            "http".to_string(),
        );
        annotations.insert(
            LB_SSL_PORTS_ANNOTATION.to_string(),
            SERVICE_PORT_HTTPS.to_string(),
        );

        Self {
            name,
            namespace,
            app_name,
            service_type: ServiceType::LoadBalancer,
            ports: vec![
                (PORT_NAME_HTTPS, SERVICE_PORT_HTTPS),
                (PORT_NAME_HTTP, SERVICE_PORT_HTTP),
            ],
            annotations,
            with_labels: false,
        }
    }

    pub fn build(&self) -> Result<Service> {
        let ports = self
            .ports
            .iter()
            .map(|(name, port)| self.create_service_port(name, *port))
            .collect();

        let metadata = ObjectMeta {
            name: Some(self.name.clone()),
            namespace: Some(self.namespace.clone()),
            labels: if self.with_labels {
                Some(self.get_labels())
            } else {
                None
            },
            annotations: if self.annotations.is_empty() {
                None
            } else {
                Some(self.annotations.clone())
            },
            ..Default::default()
        };

        let service = Service {
            metadata,
            spec: Some(ServiceSpec {
                type_: Some(self.service_type.as_str().to_string()),
                ports: Some(ports),
                selector: Some(self.get_selector_labels()),
                ..Default::default()
            }),
            ..Default::default()
        };

        Ok(service)
    }

    fn create_service_port(&self, name: &str, port: i32) -> ServicePort {
        ServicePort {
            name: Some(name.to_string()),
            port,
            target_port: Some(IntOrString::Int(CONTAINER_PORT)),
            protocol: Some(PROTOCOL_TCP.to_string()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_ip_service() {
        let spec = WebAppSpec::new("hello", "img");
        let svc = ServiceBuilder::for_web_app(&spec).build().unwrap();

        assert_eq!(svc.metadata.name.as_deref(), Some("hello-svc"));
        let svc_spec = svc.spec.unwrap();
        assert_eq!(svc_spec.type_.as_deref(), Some("ClusterIP"));
        let ports = svc_spec.ports.unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].port, 80);
        assert_eq!(ports[0].target_port, Some(IntOrString::Int(3000)));
        assert_eq!(
            svc_spec.selector.unwrap().get("app").map(String::as_str),
            Some("hello")
        );
    }

    #[test]
    fn test_load_balancer_service() {
        let svc = ServiceBuilder::load_balancer(
            "hello-lb".to_string(),
            "default".to_string(),
            "hello".to_string(),
            "arn:aws:acm:us-west-2:123:certificate/abc".to_string(),
        )
        .build()
        .unwrap();

        let annotations = svc.metadata.annotations.unwrap();
        assert_eq!(annotations[LB_TYPE_ANNOTATION], "nlb");
        assert_eq!(
            annotations[LB_SSL_CERT_ANNOTATION],
            "arn:aws:acm:us-west-2:123:certificate/abc"
        );
        assert_eq!(annotations[LB_BACKEND_PROTOCOL_ANNOTATION], "http");
        assert_eq!(annotations[LB_SSL_PORTS_ANNOTATION], "443");

        let svc_spec = svc.spec.unwrap();
        assert_eq!(svc_spec.type_.as_deref(), Some("LoadBalancer"));
        let ports: Vec<(Option<String>, i32)> = svc_spec
            .ports
            .unwrap()
            .into_iter()
            .map(|p| (p.name, p.port))
            .collect();
        assert_eq!(
            ports,
            vec![
                (Some("https".to_string()), 443),
                (Some("http".to_string()), 80)
            ]
        );
    }
}
