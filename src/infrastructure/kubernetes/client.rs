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

use crate::domain::credentials::CredentialDocument;
use crate::infrastructure::cloud::Resource;
use crate::infrastructure::constants::{
    DEFAULT_NAMESPACE, FIELD_MANAGER, LB_CHECK_INTERVAL_SECONDS, LB_MAX_WAIT_SECONDS,
};
use crate::shared::error::StackError;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{ConfigMap, Service};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Patch, PatchParams, PostParams};
use kube::{Api, Client, Resource as KubeResource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Declarative access to the workloads running inside the cluster.
#[async_trait::async_trait]
pub trait WorkloadApi: Send + Sync {
    async fn apply_configmap(&self, configmap: &ConfigMap) -> Result<ConfigMap, StackError>;

    async fn apply_deployment(&self, deployment: &Deployment) -> Result<Deployment, StackError>;

    async fn apply_service(&self, service: &Service) -> Result<Service, StackError>;

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, StackError>;
}

/// Turns a credential document into a handle on the cluster it describes.
#[async_trait::async_trait]
pub trait WorkloadConnector: Send + Sync {
    async fn connect(&self, document: &CredentialDocument)
        -> Result<WorkloadProvider, StackError>;
}

/// Workload API handle bootstrapped from a credential document.
#[derive(Clone)]
pub struct WorkloadProvider {
    pub context: String,
    pub api: Arc<dyn WorkloadApi>,
}

impl WorkloadProvider {
    pub fn new(context: impl Into<String>, api: Arc<dyn WorkloadApi>) -> Self {
        Self {
            context: context.into(),
            api,
        }
    }
}

impl Debug for WorkloadProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkloadProvider")
            .field("context", &self.context)
            .finish()
    }
}

impl Resource for WorkloadProvider {
    const KIND: &'static str = "pulumi:providers:kubernetes";

    fn id(&self) -> String {
        self.context.clone()
    }
}

fn namespaced_id(meta: &ObjectMeta) -> String {
    format!(
        "{}/{}",
        meta.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE),
        meta.name.as_deref().unwrap_or_default()
    )
}

impl Resource for ConfigMap {
    const KIND: &'static str = "kubernetes:core/v1:ConfigMap";

    fn id(&self) -> String {
        namespaced_id(&self.metadata)
    }
}

impl Resource for Deployment {
    const KIND: &'static str = "kubernetes:apps/v1:Deployment";

    fn id(&self) -> String {
        namespaced_id(&self.metadata)
    }
}

impl Resource for Service {
    const KIND: &'static str = "kubernetes:core/v1:Service";

    fn id(&self) -> String {
        namespaced_id(&self.metadata)
    }
}

pub struct KubeWorkloadClient {
    client: Client,
    namespace: String,
}

impl KubeWorkloadClient {
    pub fn from_client(client: Client, namespace: String) -> Self {
        Self { client, namespace }
    }

    pub async fn from_kubeconfig(
        kubeconfig: kube::config::Kubeconfig,
        namespace: String,
        context: Option<String>,
    ) -> Result<Self, StackError> {
        use kube::config::KubeConfigOptions;

        let config_options = KubeConfigOptions {
            context,
            cluster: None,
            user: None,
        };

        let config = kube::Config::from_custom_kubeconfig(kubeconfig, &config_options)
            .await
            .map_err(|e| {
                StackError::KubeError(format!("Failed to create Kubernetes config: {}", e))
            })?;

        let client = Client::try_from(config).map_err(|e| {
            StackError::KubeError(format!("Failed to create Kubernetes client: {}", e))
        })?;

        Ok(Self { client, namespace })
    }

    fn namespace_of<K: KubeResource>(&self, resource: &K) -> String {
        resource
            .meta()
            .namespace
            .clone()
            .unwrap_or_else(|| self.namespace.clone())
    }

    /// Server-side apply when the object exists, create otherwise.
    async fn apply_namespaced<K>(&self, resource: &K, kind: &str) -> Result<K, StackError>
    where
        K: KubeResource<Scope = NamespaceResourceScope>
            + Clone
            + Debug
            + Serialize
            + DeserializeOwned,
        <K as KubeResource>::DynamicType: Default,
    {
        let namespace = self.namespace_of(resource);
        let api: Api<K> = Api::namespaced(self.client.clone(), &namespace);
        let name = resource
            .meta()
            .name
            .as_ref()
            .ok_or_else(|| StackError::ConfigError(format!("{} name is required", kind)))?;

        let applied = match api.get(name).await {
            Ok(_) => {
                let patch_params = PatchParams::apply(FIELD_MANAGER).force();
                let patch = serde_json::to_value(resource).map_err(|e| {
                    StackError::KubeError(format!("Failed to serialize {}: {}", kind, e))
                })?;
                api.patch(name, &patch_params, &Patch::Apply(patch)).await?
            }
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                let pp = PostParams::default();
                api.create(&pp, resource).await?
            }
            Err(e) => return Err(StackError::KubeError(e.to_string())),
        };

        info!(kind, namespace = %namespace, name = %name, "Applied");
        Ok(applied)
    }
}

#[async_trait::async_trait]
impl WorkloadApi for KubeWorkloadClient {
    async fn apply_configmap(&self, configmap: &ConfigMap) -> Result<ConfigMap, StackError> {
        self.apply_namespaced(configmap, "ConfigMap").await
    }

    async fn apply_deployment(&self, deployment: &Deployment) -> Result<Deployment, StackError> {
        self.apply_namespaced(deployment, "Deployment").await
    }

    async fn apply_service(&self, service: &Service) -> Result<Service, StackError> {
        let namespace = self.namespace_of(service);
        let api: Api<Service> = Api::namespaced(self.client.clone(), &namespace);
        let name = service
            .metadata
            .name
            .as_ref()
            .ok_or_else(|| StackError::ConfigError("Service name is required".to_string()))?;

        let applied = match api.get(name).await {
            Ok(existing) => {
                let mut service_to_patch = service.clone();
                if let (Some(existing_spec), Some(ref mut new_spec)) =
                    (&existing.spec, &mut service_to_patch.spec)
                {
                    new_spec.cluster_ip = existing_spec.cluster_ip.clone();
                    new_spec.cluster_ips = existing_spec.cluster_ips.clone();
                }

                let patch_params = PatchParams::apply(FIELD_MANAGER).force();
                let patch = serde_json::to_value(&service_to_patch).map_err(|e| {
                    StackError::KubeError(format!("Failed to serialize Service: {}", e))
                })?;
                api.patch(name, &patch_params, &Patch::Apply(patch)).await?
            }
            Err(kube::Error::Api(ae)) if ae.code == 404 => {
                let pp = PostParams::default();
                api.create(&pp, service).await?
            }
            Err(e) => return Err(StackError::KubeError(e.to_string())),
        };

        info!(kind = "Service", namespace = %namespace, name = %name, "Applied");
        Ok(applied)
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service, StackError> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        api.get(name).await.map_err(|e| {
            if let kube::Error::Api(ae) = e {
                if ae.code == 404 {
                    StackError::not_found("Service", name, namespace)
                } else {
                    StackError::KubeError(ae.message)
                }
            } else {
                StackError::KubeError(e.to_string())
            }
        })
    }
}

/// Connects to clusters through kube using the credential document.
pub struct KubeConnector {
    namespace: String,
    context: Option<String>,
}

impl KubeConnector {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            context: None,
        }
    }

    /// Selects a context other than the document's current one.
    pub fn with_context(mut self, context: Option<String>) -> Self {
        self.context = context;
        self
    }
}

#[async_trait::async_trait]
impl WorkloadConnector for KubeConnector {
    async fn connect(
        &self,
        document: &CredentialDocument,
    ) -> Result<WorkloadProvider, StackError> {
        let kubeconfig = document.parse()?;
        let context = self
            .context
            .clone()
            .or_else(|| kubeconfig.current_context.clone())
            .ok_or_else(|| {
                StackError::ConfigError("Kubeconfig has no current context".to_string())
            })?;

        let client = KubeWorkloadClient::from_kubeconfig(
            kubeconfig,
            self.namespace.clone(),
            Some(context.clone()),
        )
        .await?;
        debug!(context = %context, namespace = %self.namespace, "Connected workload client");
        Ok(WorkloadProvider::new(context, Arc::new(client)))
    }
}

/// First ingress hostname (or IP) published on a LoadBalancer service.
pub fn load_balancer_address(service: &Service) -> Option<String> {
    service
        .status
        .as_ref()
        .and_then(|status| status.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_ref())
        .and_then(|ingress| ingress.first())
        .and_then(|ingress| ingress.hostname.clone().or_else(|| ingress.ip.clone()))
}

/// Polls until the load balancer behind `name` has an address.
pub async fn wait_for_load_balancer(
    api: &dyn WorkloadApi,
    namespace: &str,
    name: &str,
) -> Result<String, StackError> {
    wait_for_load_balancer_with(
        api,
        namespace,
        name,
        Duration::from_secs(LB_MAX_WAIT_SECONDS),
        Duration::from_secs(LB_CHECK_INTERVAL_SECONDS),
    )
    .await
}

pub async fn wait_for_load_balancer_with(
    api: &dyn WorkloadApi,
    namespace: &str,
    name: &str,
    max_wait: Duration,
    interval: Duration,
) -> Result<String, StackError> {
    let mut waited = Duration::ZERO;

    loop {
        let service = api.get_service(namespace, name).await?;
        if let Some(address) = load_balancer_address(&service) {
            info!(service = %name, address = %address, "Load balancer ready");
            return Ok(address);
        }

        if waited >= max_wait {
            return Err(StackError::Timeout(format!(
                "Service {}/{} did not receive a load balancer address within {} seconds",
                namespace,
                name,
                max_wait.as_secs()
            )));
        }

        debug!(service = %name, waited = waited.as_secs(), "Waiting for load balancer");
        sleep(interval).await;
        waited += interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{service_json, MockService};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
    use std::collections::BTreeMap;

    fn test_configmap() -> ConfigMap {
        let mut data = BTreeMap::new();
        data.insert("REGION".to_string(), "us-west-2".to_string());
        ConfigMap {
            metadata: ObjectMeta {
                name: Some("hello-config".to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            data: Some(data),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_apply_creates_missing_configmap() {
        let created = serde_json::to_string(&test_configmap()).unwrap();
        let client = MockService::new()
            .on_post("/api/v1/namespaces/default/configmaps", 201, &created)
            .into_client();
        let workload = KubeWorkloadClient::from_client(client, "default".to_string());

        let applied = workload.apply_configmap(&test_configmap()).await.unwrap();
        assert_eq!(applied.metadata.name.as_deref(), Some("hello-config"));
    }

    #[tokio::test]
    async fn test_apply_patches_existing_configmap() {
        let existing = serde_json::to_string(&test_configmap()).unwrap();
        let client = MockService::new()
            .on_get("/api/v1/namespaces/default/configmaps/hello-config", 200, &existing)
            .on_patch("/api/v1/namespaces/default/configmaps/hello-config", 200, &existing)
            .into_client();
        let workload = KubeWorkloadClient::from_client(client, "default".to_string());

        let applied = workload.apply_configmap(&test_configmap()).await.unwrap();
        assert_eq!(
            applied.data.unwrap().get("REGION").map(String::as_str),
            Some("us-west-2")
        );
    }

    #[tokio::test]
    async fn test_get_missing_service_is_not_found() {
        let client = MockService::new().into_client();
        let workload = KubeWorkloadClient::from_client(client, "default".to_string());

        let err = workload.get_service("default", "hello-lb").await.unwrap_err();
        assert!(matches!(err, StackError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_wait_for_load_balancer_reads_hostname() {
        let client = MockService::new()
            .on_get(
                "/api/v1/namespaces/default/services/hello-lb",
                200,
                &service_json("hello-lb", "default", Some("abc.elb.amazonaws.com")),
            )
            .into_client();
        let workload = KubeWorkloadClient::from_client(client, "default".to_string());

        let hostname = wait_for_load_balancer(&workload, "default", "hello-lb")
            .await
            .unwrap();
        assert_eq!(hostname, "abc.elb.amazonaws.com");
    }

    #[tokio::test]
    async fn test_wait_for_load_balancer_times_out() {
        let client = MockService::new()
            .on_get(
                "/api/v1/namespaces/default/services/hello-lb",
                200,
                &service_json("hello-lb", "default", None),
            )
            .into_client();
        let workload = KubeWorkloadClient::from_client(client, "default".to_string());

        let err = wait_for_load_balancer_with(
            &workload,
            "default",
            "hello-lb",
            Duration::from_millis(20),
            Duration::from_millis(10),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StackError::Timeout(_)));
    }

    const TOKEN_KUBECONFIG: &str = "\
apiVersion: v1
kind: Config
clusters:
- name: local
  cluster:
    server: http://127.0.0.1:6443
contexts:
- name: local
  context:
    cluster: local
    user: local
- name: staging
  context:
    cluster: local
    user: local
current-context: local
users:
- name: local
  user:
    token: test-token
";

    #[tokio::test]
    async fn test_connector_uses_current_context() {
        let document = CredentialDocument::from_yaml(TOKEN_KUBECONFIG).unwrap();

        let provider = KubeConnector::new("apps").connect(&document).await.unwrap();
        assert_eq!(provider.context, "local");
    }

    #[tokio::test]
    async fn test_connector_selects_requested_context() {
        let document = CredentialDocument::from_yaml(TOKEN_KUBECONFIG).unwrap();

        let provider = KubeConnector::new("apps")
            .with_context(Some("staging".to_string()))
            .connect(&document)
            .await
            .unwrap();
        assert_eq!(provider.context, "staging");
    }

    #[tokio::test]
    async fn test_connector_rejects_unknown_context() {
        let document = CredentialDocument::from_yaml(TOKEN_KUBECONFIG).unwrap();

        let result = KubeConnector::new("apps")
            .with_context(Some("missing".to_string()))
            .connect(&document)
            .await;
        assert!(matches!(result, Err(StackError::KubeError(_))));
    }
}
