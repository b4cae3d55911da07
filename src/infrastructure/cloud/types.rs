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

//! Arguments and resolved state of the cloud resources the stack declares.

/// Something the stack registers and tracks until it is provisioned.
pub trait Resource {
    /// Type token, e.g. `aws:eks:Cluster`.
    const KIND: &'static str;

    /// Provider-assigned identifier once provisioned.
    fn id(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NatGatewayStrategy {
    None,
    Single,
    OnePerAz,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubnetType {
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpcArgs {
    pub availability_zones: u32,
    pub nat_gateways: NatGatewayStrategy,
    pub subnets: Vec<SubnetType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vpc {
    pub vpc_id: String,
    pub public_subnet_ids: Vec<String>,
    pub private_subnet_ids: Vec<String>,
}

impl Resource for Vpc {
    const KIND: &'static str = "awsx:ec2:Vpc";

    fn id(&self) -> String {
        self.vpc_id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleArgs {
    pub assume_role_policy: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    pub arn: String,
}

impl Resource for Role {
    const KIND: &'static str = "aws:iam:Role";

    fn id(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePolicyAttachmentArgs {
    pub role: String,
    pub policy_arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePolicyAttachment {
    pub id: String,
}

impl Resource for RolePolicyAttachment {
    const KIND: &'static str = "aws:iam:RolePolicyAttachment";

    fn id(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterArgs {
    pub role_arn: String,
    pub subnet_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateAuthority {
    /// Base64-encoded CA bundle.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub name: String,
    pub arn: String,
    pub endpoint: String,
    pub certificate_authority: CertificateAuthority,
}

impl Resource for Cluster {
    const KIND: &'static str = "aws:eks:Cluster";

    fn id(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalingConfig {
    pub desired_size: u32,
    pub min_size: u32,
    pub max_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeGroupArgs {
    pub cluster_name: String,
    pub node_role_arn: String,
    pub subnet_ids: Vec<String>,
    pub instance_types: Vec<String>,
    pub scaling: ScalingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeGroup {
    pub id: String,
    pub instance_types: Vec<String>,
}

impl Resource for NodeGroup {
    const KIND: &'static str = "aws:eks:NodeGroup";

    fn id(&self) -> String {
        self.id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryArgs {
    pub force_delete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub name: String,
    pub registry_id: String,
}

impl Resource for Repository {
    const KIND: &'static str = "aws:ecr:Repository";

    fn id(&self) -> String {
        self.name.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
}

/// Short-lived registry login.
#[derive(Clone, PartialEq, Eq)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryArgs {
    pub server: String,
    pub credentials: RegistryCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageArgs {
    pub image_name: String,
    pub context: String,
    pub platform: String,
    pub registry: RegistryArgs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub image_name: String,
    pub repo_digest: String,
}

impl Resource for Image {
    const KIND: &'static str = "docker:index:Image";

    fn id(&self) -> String {
        self.repo_digest.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    pub zone_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMethod {
    Dns,
    Email,
}

impl ValidationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMethod::Dns => "DNS",
            ValidationMethod::Email => "EMAIL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateArgs {
    pub domain_name: String,
    pub validation_method: ValidationMethod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainValidationOption {
    pub resource_record_name: String,
    pub resource_record_type: String,
    pub resource_record_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub arn: String,
    pub domain_validation_options: Vec<DomainValidationOption>,
}

impl Resource for Certificate {
    const KIND: &'static str = "aws:acm:Certificate";

    fn id(&self) -> String {
        self.arn.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordArgs {
    pub name: String,
    pub record_type: String,
    pub zone_id: String,
    pub records: Vec<String>,
    pub ttl: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub fqdn: String,
}

impl Resource for Record {
    const KIND: &'static str = "aws:route53:Record";

    fn id(&self) -> String {
        self.fqdn.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateValidationArgs {
    pub certificate_arn: String,
    pub validation_record_fqdns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateValidation {
    pub certificate_arn: String,
}

impl Resource for CertificateValidation {
    const KIND: &'static str = "aws:acm:CertificateValidation";

    fn id(&self) -> String {
        self.certificate_arn.clone()
    }
}

/// IAM trust policy letting `service` assume a role.
pub fn assume_role_policy(service: &str) -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": service },
            "Action": "sts:AssumeRole"
        }]
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assume_role_policy() {
        let policy: serde_json::Value =
            serde_json::from_str(&assume_role_policy("eks.amazonaws.com")).unwrap();
        assert_eq!(policy["Version"], "2012-10-17");
        assert_eq!(
            policy["Statement"][0]["Principal"]["Service"],
            "eks.amazonaws.com"
        );
        assert_eq!(policy["Statement"][0]["Action"], "sts:AssumeRole");
    }

    #[test]
    fn test_registry_credentials_debug_is_redacted() {
        let creds = RegistryCredentials {
            username: "AWS".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{:?}", creds);
        assert!(rendered.contains("AWS"));
        assert!(!rendered.contains("hunter2"));
    }
}
