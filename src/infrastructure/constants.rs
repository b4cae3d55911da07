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

/// Configuration
pub const CONFIG_NAMESPACE: &str = "websrv1";
pub const CONFIG_KEY_SETTING: &str = "setting";
pub const DEFAULT_DISPLAY_VALUE: &str = "abc123";
pub const CONF_FILE_ENV: &str = "KUBESTACK_CONF_FILE";

/// Stack identity
pub const PROJECT_NAME: &str = "kubestack";
pub const DEFAULT_STACK_NAME: &str = "dev";
pub const NLB_ENABLED: &str = "enabled";

/// Stack defaults
pub const DEFAULT_APP_NAME: &str = "hello";
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_STACK_REPLICAS: i32 = 2;
pub const DEFAULT_COMPONENT_REPLICAS: i32 = 1;
pub const DEFAULT_AVAILABILITY_ZONES: u32 = 2;
pub const DEFAULT_INSTANCE_TYPE: &str = "t3.medium";
pub const DEFAULT_NODE_COUNT: u32 = 2;
pub const DEFAULT_ZONE_NAME: &str = "t8rsk8s.io";
pub const DEFAULT_DOMAIN_NAME: &str = "pulumidemo.t8rsk8s.io";
pub const DEFAULT_IMAGE_TAG: &str = "app-v4";
pub const DEFAULT_BUILD_CONTEXT: &str = "./app";
pub const DEFAULT_PLATFORM: &str = "linux/amd64";
pub const UNKNOWN_INSTANCE_TYPE: &str = "unknown";

/// Resource names
pub const VPC_NAME: &str = "eks-vpc";
pub const CLUSTER_ROLE_NAME: &str = "eks-cluster-role";
pub const CLUSTER_POLICY_ATTACHMENT_NAME: &str = "eks-cluster-policy";
pub const CLUSTER_NAME: &str = "eks-cluster";
pub const NODE_ROLE_NAME: &str = "eks-node-role";
pub const NODE_POLICY_ATTACHMENT_PREFIX: &str = "node-policy-";
pub const NODE_GROUP_NAME: &str = "eks-node-group";
pub const REPOSITORY_NAME: &str = "app-ecr";
pub const IMAGE_NAME: &str = "app-image";
pub const CERTIFICATE_NAME: &str = "cert";
pub const CERT_VALIDATION_RECORD_NAME: &str = "cert-validation";
pub const CERT_VALIDATION_NAME: &str = "cert-validation-waiter";
pub const WORKLOAD_PROVIDER_NAME: &str = "k8s";
pub const APP_DNS_RECORD_NAME: &str = "app-dns";

/// IAM
pub const EKS_SERVICE_PRINCIPAL: &str = "eks.amazonaws.com";
pub const EC2_SERVICE_PRINCIPAL: &str = "ec2.amazonaws.com";
pub const EKS_CLUSTER_POLICY_ARN: &str = "arn:aws:iam::aws:policy/AmazonEKSClusterPolicy";
pub const NODE_POLICY_ARNS: &[&str] = &[
    "arn:aws:iam::aws:policy/AmazonEKSWorkerNodePolicy",
    "arn:aws:iam::aws:policy/AmazonEKS_CNI_Policy",
    "arn:aws:iam::aws:policy/AmazonEC2ContainerRegistryReadOnly",
];

/// Registry
pub const REGISTRY_USERNAME: &str = "AWS";

/// DNS
pub const CERT_VALIDATION_TTL: u32 = 60;
pub const APP_DNS_TTL: u32 = 300;
pub const RECORD_TYPE_CNAME: &str = "CNAME";

/// Credential document
pub const KUBECONFIG_API_VERSION: &str = "v1";
pub const KUBECONFIG_KIND: &str = "Config";
pub const EXEC_API_VERSION: &str = "client.authentication.k8s.io/v1beta1";
pub const EXEC_COMMAND: &str = "aws";

/// Container
pub const CONTAINER_NAME_APP: &str = "app";
pub const CONTAINER_PORT: i32 = 3000;
pub const RUN_AS_USER: i64 = 1001;
pub const FS_GROUP: i64 = 1001;
pub const CPU_REQUEST: &str = "100m";
pub const MEMORY_REQUEST: &str = "128Mi";
pub const CPU_LIMIT: &str = "200m";
pub const MEMORY_LIMIT: &str = "256Mi";

/// Health check configuration
pub const PROBE_PATH: &str = "/";
pub const LIVENESS_INITIAL_DELAY: i32 = 10;
pub const LIVENESS_PERIOD: i32 = 10;
pub const LIVENESS_TIMEOUT: i32 = 2;
pub const LIVENESS_FAILURE_THRESHOLD: i32 = 3;
pub const READINESS_INITIAL_DELAY: i32 = 5;
pub const READINESS_PERIOD: i32 = 5;
pub const READINESS_TIMEOUT: i32 = 2;
pub const READINESS_FAILURE_THRESHOLD: i32 = 2;

/// Rolling update settings
pub const STRATEGY_TYPE_ROLLING_UPDATE: &str = "RollingUpdate";
pub const MAX_SURGE: i32 = 1;
pub const MAX_UNAVAILABLE: i32 = 0;

/// Resource labels and annotations
pub const LABEL_APP: &str = "app";
pub const CONFIG_HASH_ANNOTATION: &str = "pulumi.com/configHash";
pub const LB_TYPE_ANNOTATION: &str = "service.beta.kubernetes.io/aws-load-balancer-type";
pub const LB_SSL_CERT_ANNOTATION: &str = "service.beta.kubernetes.io/aws-load-balancer-ssl-cert";
pub const LB_BACKEND_PROTOCOL_ANNOTATION: &str =
    "service.beta.kubernetes.io/aws-load-balancer-backend-protocol";
pub const LB_SSL_PORTS_ANNOTATION: &str = "service.beta.kubernetes.io/aws-load-balancer-ssl-ports";

/// Service names and suffixes
pub const SUFFIX_DEPLOYMENT: &str = "-dep";
pub const SUFFIX_SERVICE: &str = "-svc";
pub const SUFFIX_CONFIG: &str = "-config";
pub const SUFFIX_LOAD_BALANCER: &str = "-lb";

/// Longest app name whose suffixed object names stay within 63 characters
pub const MAX_APP_NAME_LENGTH: usize = 63 - SUFFIX_CONFIG.len();

/// Ports
pub const SERVICE_PORT_HTTP: i32 = 80;
pub const SERVICE_PORT_HTTPS: i32 = 443;
pub const PORT_NAME_HTTP: &str = "http";
pub const PORT_NAME_HTTPS: &str = "https";
pub const PROTOCOL_TCP: &str = "TCP";

/// Load balancer wait
pub const LB_MAX_WAIT_SECONDS: u64 = 300;
pub const LB_CHECK_INTERVAL_SECONDS: u64 = 5;

/// Field manager used for server-side apply
pub const FIELD_MANAGER: &str = "kubestack";
