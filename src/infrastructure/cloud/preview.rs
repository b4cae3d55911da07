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

//! In-memory provider that answers every call with deterministic state.
//!
//! Used by `kubestack preview` and the tests to drive the whole stack without
//! touching a cloud account or a cluster.

use super::provider::{CloudProvider, ImageBuilder};
use super::types::*;
use crate::domain::credentials::CredentialDocument;
use crate::infrastructure::kubernetes::client::{WorkloadApi, WorkloadConnector, WorkloadProvider};
use crate::infrastructure::constants::DEFAULT_NAMESPACE;
use crate::shared::error::{Result, StackError};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::api::core::v1::{
    ConfigMap, LoadBalancerIngress, LoadBalancerStatus, Service, ServiceStatus,
};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub const PREVIEW_ACCOUNT_ID: &str = "123456789012";
pub const PREVIEW_REGION: &str = "us-west-2";
pub const PREVIEW_CA_DATA: &str = "LS0tLS1CRUdJTiBDRVJUSUZJQ0FURS0tLS0tCk1JSUMvakNDQWVhZ0F3SUJBZ0lCQURBTkJna3Foa2lHOXcwQkFRc0ZBREFWTVJNd0VRWURWUVFERXdwcmRXSmwKLS0tLS1FTkQgQ0VSVElGSUNBVEUtLS0tLQo=";

/// One call made against the preview provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCall {
    pub operation: String,
    pub name: String,
}

#[derive(Default)]
struct PreviewState {
    calls: Vec<ProviderCall>,
    failing: HashSet<String>,
    configmaps: BTreeMap<String, ConfigMap>,
    deployments: BTreeMap<String, Deployment>,
    services: BTreeMap<String, Service>,
}

fn lock(state: &Mutex<PreviewState>) -> MutexGuard<'_, PreviewState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Clone)]
pub struct PreviewProvider {
    region: String,
    state: Arc<Mutex<PreviewState>>,
}

impl Default for PreviewProvider {
    fn default() -> Self {
        Self::new(PREVIEW_REGION)
    }
}

impl PreviewProvider {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            state: Arc::new(Mutex::new(PreviewState::default())),
        }
    }

    /// Makes every call of `operation` fail with a provisioning error.
    pub fn failing_on(self, operation: &str) -> Self {
        lock(&self.state).failing.insert(operation.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        lock(&self.state).calls.clone()
    }

    pub fn calls_to(&self, operation: &str) -> Vec<ProviderCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.operation == operation)
            .collect()
    }

    pub fn applied_configmap(&self, namespace: &str, name: &str) -> Option<ConfigMap> {
        lock(&self.state).configmaps.get(&object_key(namespace, name)).cloned()
    }

    pub fn applied_deployment(&self, namespace: &str, name: &str) -> Option<Deployment> {
        lock(&self.state).deployments.get(&object_key(namespace, name)).cloned()
    }

    pub fn applied_service(&self, namespace: &str, name: &str) -> Option<Service> {
        lock(&self.state).services.get(&object_key(namespace, name)).cloned()
    }

    fn record(&self, operation: &str, resource_type: &str, name: &str) -> Result<()> {
        let mut state = lock(&self.state);
        state.calls.push(ProviderCall {
            operation: operation.to_string(),
            name: name.to_string(),
        });
        debug!(operation, name, "Preview call");
        if state.failing.contains(operation) {
            return Err(StackError::provisioning(
                resource_type,
                name,
                format!("{} rejected by preview provider", operation),
            ));
        }
        Ok(())
    }

    fn arn(&self, service: &str, resource: &str) -> String {
        format!(
            "arn:aws:{}:{}:{}:{}",
            service, self.region, PREVIEW_ACCOUNT_ID, resource
        )
    }
}

#[async_trait::async_trait]
impl CloudProvider for PreviewProvider {
    async fn create_vpc(&self, name: &str, args: &VpcArgs) -> Result<Vpc> {
        self.record("create_vpc", Vpc::KIND, name)?;
        let subnets = |kind: SubnetType, label: &str| -> Vec<String> {
            if !args.subnets.contains(&kind) {
                return Vec::new();
            }
            (0..args.availability_zones)
                .map(|az| format!("subnet-{}-{}-{}", name, label, az))
                .collect()
        };
        Ok(Vpc {
            vpc_id: format!("vpc-{}", name),
            public_subnet_ids: subnets(SubnetType::Public, "public"),
            private_subnet_ids: subnets(SubnetType::Private, "private"),
        })
    }

    async fn create_role(&self, name: &str, _args: &RoleArgs) -> Result<Role> {
        self.record("create_role", Role::KIND, name)?;
        Ok(Role {
            name: name.to_string(),
            arn: format!("arn:aws:iam::{}:role/{}", PREVIEW_ACCOUNT_ID, name),
        })
    }

    async fn attach_role_policy(
        &self,
        name: &str,
        args: &RolePolicyAttachmentArgs,
    ) -> Result<RolePolicyAttachment> {
        self.record("attach_role_policy", RolePolicyAttachment::KIND, name)?;
        Ok(RolePolicyAttachment {
            id: format!("{}/{}", args.role, args.policy_arn),
        })
    }

    async fn create_cluster(&self, name: &str, _args: &ClusterArgs) -> Result<Cluster> {
        self.record("create_cluster", Cluster::KIND, name)?;
        Ok(Cluster {
            name: name.to_string(),
            arn: self.arn("eks", &format!("cluster/{}", name)),
            endpoint: format!("https://{}.gr7.{}.eks.amazonaws.com", name, self.region),
            certificate_authority: CertificateAuthority {
                data: PREVIEW_CA_DATA.to_string(),
            },
        })
    }

    async fn create_node_group(&self, name: &str, args: &NodeGroupArgs) -> Result<NodeGroup> {
        self.record("create_node_group", NodeGroup::KIND, name)?;
        Ok(NodeGroup {
            id: format!("{}:{}", args.cluster_name, name),
            instance_types: args.instance_types.clone(),
        })
    }

    async fn create_repository(&self, name: &str, _args: &RepositoryArgs) -> Result<Repository> {
        self.record("create_repository", Repository::KIND, name)?;
        Ok(Repository {
            name: name.to_string(),
            registry_id: PREVIEW_ACCOUNT_ID.to_string(),
        })
    }

    async fn caller_identity(&self) -> Result<CallerIdentity> {
        self.record("caller_identity", "aws:getCallerIdentity", "current")?;
        Ok(CallerIdentity {
            account_id: PREVIEW_ACCOUNT_ID.to_string(),
        })
    }

    async fn region(&self) -> Result<Region> {
        self.record("region", "aws:getRegion", "current")?;
        Ok(Region {
            name: self.region.clone(),
        })
    }

    async fn registry_authorization(&self, registry_id: &str) -> Result<RegistryCredentials> {
        self.record("registry_authorization", "aws:ecr:getAuthorizationToken", registry_id)?;
        Ok(RegistryCredentials {
            username: "AWS".to_string(),
            password: format!("preview-token-{}", registry_id),
        })
    }

    async fn lookup_zone(&self, name: &str) -> Result<HostedZone> {
        self.record("lookup_zone", "aws:route53:getZone", name)?;
        Ok(HostedZone {
            zone_id: "Z0PREVIEW".to_string(),
            name: name.to_string(),
        })
    }

    async fn create_certificate(&self, name: &str, args: &CertificateArgs) -> Result<Certificate> {
        self.record("create_certificate", Certificate::KIND, name)?;
        Ok(Certificate {
            arn: self.arn("acm", &format!("certificate/{}", name)),
            domain_validation_options: vec![DomainValidationOption {
                resource_record_name: format!("_preview.{}.", args.domain_name),
                resource_record_type: "CNAME".to_string(),
                resource_record_value: format!("_preview.acm-validations.aws.{}", name),
            }],
        })
    }

    async fn create_record(&self, name: &str, args: &RecordArgs) -> Result<Record> {
        self.record("create_record", Record::KIND, name)?;
        Ok(Record {
            name: args.name.clone(),
            fqdn: args.name.trim_end_matches('.').to_string(),
        })
    }

    async fn validate_certificate(
        &self,
        name: &str,
        args: &CertificateValidationArgs,
    ) -> Result<CertificateValidation> {
        self.record("validate_certificate", CertificateValidation::KIND, name)?;
        Ok(CertificateValidation {
            certificate_arn: args.certificate_arn.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ImageBuilder for PreviewProvider {
    async fn build_and_push(&self, name: &str, args: &ImageArgs) -> Result<Image> {
        self.record("build_and_push", Image::KIND, name)?;
        Ok(Image {
            image_name: args.image_name.clone(),
            repo_digest: format!("{}@sha256:{:0>64}", args.image_name, args.image_name.len()),
        })
    }
}

#[async_trait::async_trait]
impl WorkloadConnector for PreviewProvider {
    async fn connect(&self, document: &CredentialDocument) -> Result<WorkloadProvider> {
        let kubeconfig = document.parse()?;
        let context = kubeconfig.current_context.unwrap_or_default();
        self.record("connect", WorkloadProvider::KIND, &context)?;
        Ok(WorkloadProvider::new(context, Arc::new(self.clone())))
    }
}

// Applied objects are keyed `<namespace>/<name>` like the API server scopes them.
fn object_key(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

/// Name and store key of an object; an unset namespace means `default`.
fn object_identity(meta: &ObjectMeta) -> Result<(String, String)> {
    let name = meta
        .name
        .clone()
        .ok_or_else(|| StackError::InvalidResource("metadata.name is required".to_string()))?;
    let namespace = meta.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE);
    let key = object_key(namespace, &name);
    Ok((name, key))
}

#[async_trait::async_trait]
impl WorkloadApi for PreviewProvider {
    async fn apply_configmap(&self, configmap: &ConfigMap) -> Result<ConfigMap> {
        let (name, key) = object_identity(&configmap.metadata)?;
        self.record("apply_configmap", "kubernetes:core/v1:ConfigMap", &name)?;
        lock(&self.state).configmaps.insert(key, configmap.clone());
        Ok(configmap.clone())
    }

    async fn apply_deployment(&self, deployment: &Deployment) -> Result<Deployment> {
        let (name, key) = object_identity(&deployment.metadata)?;
        self.record("apply_deployment", "kubernetes:apps/v1:Deployment", &name)?;
        lock(&self.state).deployments.insert(key, deployment.clone());
        Ok(deployment.clone())
    }

    async fn apply_service(&self, service: &Service) -> Result<Service> {
        let (name, key) = object_identity(&service.metadata)?;
        self.record("apply_service", "kubernetes:core/v1:Service", &name)?;

        let mut applied = service.clone();
        let is_load_balancer = service
            .spec
            .as_ref()
            .and_then(|spec| spec.type_.as_deref())
            == Some("LoadBalancer");
        if is_load_balancer {
            applied.status = Some(ServiceStatus {
                load_balancer: Some(LoadBalancerStatus {
                    ingress: Some(vec![LoadBalancerIngress {
                        hostname: Some(format!(
                            "{}-{}.elb.{}.amazonaws.com",
                            name, PREVIEW_ACCOUNT_ID, self.region
                        )),
                        ..Default::default()
                    }]),
                }),
                ..Default::default()
            });
        }

        lock(&self.state).services.insert(key, applied.clone());
        Ok(applied)
    }

    async fn get_service(&self, namespace: &str, name: &str) -> Result<Service> {
        self.record("get_service", "kubernetes:core/v1:Service", name)?;
        lock(&self.state)
            .services
            .get(&object_key(namespace, name))
            .cloned()
            .ok_or_else(|| StackError::not_found("Service", name, namespace))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credentials::{build_credential_document, ClusterAccessInputs};
    use k8s_openapi::api::core::v1::ServiceSpec;

    #[tokio::test]
    async fn test_cluster_endpoint_uses_region() {
        let provider = PreviewProvider::new("eu-central-1");
        let cluster = provider
            .create_cluster(
                "eks-cluster",
                &ClusterArgs {
                    role_arn: "arn".to_string(),
                    subnet_ids: vec![],
                },
            )
            .await
            .unwrap();

        assert_eq!(
            cluster.endpoint,
            "https://eks-cluster.gr7.eu-central-1.eks.amazonaws.com"
        );
        assert_eq!(cluster.certificate_authority.data, PREVIEW_CA_DATA);
        assert_eq!(provider.calls_to("create_cluster").len(), 1);
    }

    #[tokio::test]
    async fn test_vpc_subnets_per_zone() {
        let provider = PreviewProvider::default();
        let vpc = provider
            .create_vpc(
                "eks-vpc",
                &VpcArgs {
                    availability_zones: 3,
                    nat_gateways: NatGatewayStrategy::Single,
                    subnets: vec![SubnetType::Public, SubnetType::Private],
                },
            )
            .await
            .unwrap();

        assert_eq!(vpc.public_subnet_ids.len(), 3);
        assert_eq!(vpc.private_subnet_ids.len(), 3);
    }

    #[tokio::test]
    async fn test_failing_operation() {
        let provider = PreviewProvider::default().failing_on("create_repository");
        let err = provider
            .create_repository("app-ecr", &RepositoryArgs { force_delete: true })
            .await
            .unwrap_err();

        assert!(matches!(err, StackError::Provisioning { .. }));
        assert_eq!(provider.calls_to("create_repository").len(), 1);
    }

    #[tokio::test]
    async fn test_load_balancer_service_gets_hostname() {
        let provider = PreviewProvider::default();
        let service = Service {
            metadata: ObjectMeta {
                name: Some("hello-lb".to_string()),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                type_: Some("LoadBalancer".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        provider.apply_service(&service).await.unwrap();

        let fetched = provider.get_service("default", "hello-lb").await.unwrap();
        let hostname = crate::infrastructure::kubernetes::client::load_balancer_address(&fetched);
        assert_eq!(
            hostname.as_deref(),
            Some("hello-lb-123456789012.elb.us-west-2.amazonaws.com")
        );
    }

    #[tokio::test]
    async fn test_objects_are_scoped_by_namespace() {
        let provider = PreviewProvider::default();
        let service = Service {
            metadata: ObjectMeta {
                name: Some("hello-lb".to_string()),
                namespace: Some("apps".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        provider.apply_service(&service).await.unwrap();

        assert!(provider.get_service("apps", "hello-lb").await.is_ok());
        let err = provider.get_service("default", "hello-lb").await.unwrap_err();
        assert!(matches!(err, StackError::NotFound { .. }));

        assert!(provider.applied_service("apps", "hello-lb").is_some());
        assert!(provider.applied_service("default", "hello-lb").is_none());
    }

    #[tokio::test]
    async fn test_connect_uses_document_context() {
        let provider = PreviewProvider::default();
        let document = build_credential_document(&ClusterAccessInputs::new(
            "https://example.com",
            PREVIEW_CA_DATA,
            "eks-cluster",
        ))
        .unwrap();

        let workload = provider.connect(&document).await.unwrap();
        assert_eq!(workload.context, "eks-cluster");
        assert_eq!(provider.calls_to("connect").len(), 1);
    }
}
