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

use super::types::*;
use crate::shared::error::Result;

/// Network, identity, compute, registry, certificate and DNS provisioning.
///
/// Every call resolves once the provider reports the resource ready; failures
/// are returned as-is and never retried here.
#[async_trait::async_trait]
pub trait CloudProvider: Send + Sync {
    async fn create_vpc(&self, name: &str, args: &VpcArgs) -> Result<Vpc>;

    async fn create_role(&self, name: &str, args: &RoleArgs) -> Result<Role>;

    async fn attach_role_policy(
        &self,
        name: &str,
        args: &RolePolicyAttachmentArgs,
    ) -> Result<RolePolicyAttachment>;

    async fn create_cluster(&self, name: &str, args: &ClusterArgs) -> Result<Cluster>;

    async fn create_node_group(&self, name: &str, args: &NodeGroupArgs) -> Result<NodeGroup>;

    async fn create_repository(&self, name: &str, args: &RepositoryArgs) -> Result<Repository>;

    async fn caller_identity(&self) -> Result<CallerIdentity>;

    async fn region(&self) -> Result<Region>;

    /// Short-lived push credentials for a provisioned registry.
    async fn registry_authorization(&self, registry_id: &str) -> Result<RegistryCredentials>;

    async fn lookup_zone(&self, name: &str) -> Result<HostedZone>;

    async fn create_certificate(&self, name: &str, args: &CertificateArgs) -> Result<Certificate>;

    async fn create_record(&self, name: &str, args: &RecordArgs) -> Result<Record>;

    /// Resolves once the certificate has been validated through its records.
    async fn validate_certificate(
        &self,
        name: &str,
        args: &CertificateValidationArgs,
    ) -> Result<CertificateValidation>;
}

/// Builds a container image from a local context and pushes it.
#[async_trait::async_trait]
pub trait ImageBuilder: Send + Sync {
    async fn build_and_push(&self, name: &str, args: &ImageArgs) -> Result<Image>;
}
