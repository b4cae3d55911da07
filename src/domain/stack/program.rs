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

//! The stack program: network, cluster, registry, certificate, web app and
//! DNS, wired together only through [`Output`] data flow.

use crate::domain::config::{
    primary_instance_type, tls_status, ServiceType, StackConfig, StackSettings,
};
use crate::domain::credentials::credential_document_output;
use crate::domain::stack::webapp::{WebApp, WebAppArgs};
use crate::domain::stack::{Output, StackContext};
use crate::infrastructure::cloud::*;
use crate::infrastructure::constants::*;
use crate::infrastructure::kubernetes::resources::ServiceBuilder;
use crate::infrastructure::kubernetes::{
    wait_for_load_balancer, WorkloadConnector, WorkloadProvider,
};
use crate::shared::error::{Result, StackError};
use std::sync::Arc;
use tracing::info;

/// External systems the program provisions through.
#[derive(Clone)]
pub struct Collaborators {
    pub cloud: Arc<dyn CloudProvider>,
    pub images: Arc<dyn ImageBuilder>,
    pub workloads: Arc<dyn WorkloadConnector>,
}

impl Collaborators {
    pub fn new(
        cloud: Arc<dyn CloudProvider>,
        images: Arc<dyn ImageBuilder>,
        workloads: Arc<dyn WorkloadConnector>,
    ) -> Self {
        Self {
            cloud,
            images,
            workloads,
        }
    }

    /// Every collaborator backed by the same in-memory provider.
    pub fn preview(provider: &PreviewProvider) -> Self {
        Self {
            cloud: Arc::new(provider.clone()),
            images: Arc::new(provider.clone()),
            workloads: Arc::new(provider.clone()),
        }
    }
}

fn create_role(cloud: &Arc<dyn CloudProvider>, name: &'static str, service: &str) -> Output<Role> {
    let cloud = cloud.clone();
    let args = RoleArgs {
        assume_role_policy: assume_role_policy(service),
    };
    Output::new(async move { cloud.create_role(name, &args).await })
}

fn attach_policy(
    cloud: &Arc<dyn CloudProvider>,
    name: String,
    role: &Output<Role>,
    policy_arn: &str,
) -> Output<RolePolicyAttachment> {
    let cloud = cloud.clone();
    let policy_arn = policy_arn.to_string();
    role.apply_async(move |role| async move {
        let args = RolePolicyAttachmentArgs {
            role: role.name,
            policy_arn,
        };
        cloud.attach_role_policy(&name, &args).await
    })
}

/// Declares the TLS-terminating load balancer in front of `web_app` and
/// returns its published hostname.
///
/// The service is applied once the app's deployment exists.
pub fn declare_load_balancer(
    ctx: &mut StackContext,
    settings: &StackSettings,
    provider: &Output<WorkloadProvider>,
    web_app: &WebApp,
    certificate_arn: Output<String>,
) -> Output<String> {
    let name = settings.load_balancer_name();
    let namespace = settings.namespace.clone();

    let load_balancer = ctx.register(name.clone(), {
        let name = name.clone();
        let namespace = namespace.clone();
        let app_name = settings.app_name.clone();
        provider
            .zip(&certificate_arn)
            .after(&web_app.deployment)
            .apply_async(move |(provider, certificate_arn)| async move {
                let service =
                    ServiceBuilder::load_balancer(name, namespace, app_name, certificate_arn)
                        .build()?;
                provider.api.apply_service(&service).await
            })
    });

    provider
        .after(&load_balancer)
        .apply_async(move |provider| async move {
            wait_for_load_balancer(provider.api.as_ref(), &namespace, &name).await
        })
}

/// Declares every resource and export of the stack on `ctx`.
///
/// Nothing is provisioned here; `ctx.finish()` drives the declarations.
pub fn deploy_stack(
    ctx: &mut StackContext,
    config: &StackConfig,
    collaborators: &Collaborators,
) -> Result<()> {
    let settings = config.stack.clone();
    settings.validate()?;
    let display_value = config.display_value();
    let cloud = &collaborators.cloud;

    info!(
        app = %settings.app_name,
        domain = %settings.domain_name,
        "Declaring stack resources"
    );

    // Network
    let vpc = ctx.register(VPC_NAME, {
        let cloud = cloud.clone();
        let args = VpcArgs {
            availability_zones: settings.availability_zones,
            nat_gateways: NatGatewayStrategy::Single,
            subnets: vec![SubnetType::Public, SubnetType::Private],
        };
        Output::new(async move { cloud.create_vpc(VPC_NAME, &args).await })
    });

    // Control plane
    let cluster_role = ctx.register(
        CLUSTER_ROLE_NAME,
        create_role(cloud, CLUSTER_ROLE_NAME, EKS_SERVICE_PRINCIPAL),
    );
    let cluster_policy = attach_policy(
        cloud,
        CLUSTER_POLICY_ATTACHMENT_NAME.to_string(),
        &cluster_role,
        EKS_CLUSTER_POLICY_ARN,
    );
    ctx.register(CLUSTER_POLICY_ATTACHMENT_NAME, cluster_policy);

    let cluster = ctx.register(CLUSTER_NAME, {
        let cloud = cloud.clone();
        cluster_role
            .zip(&vpc)
            .apply_async(move |(role, vpc)| async move {
                let mut subnet_ids = vpc.public_subnet_ids;
                subnet_ids.extend(vpc.private_subnet_ids);
                let args = ClusterArgs {
                    role_arn: role.arn,
                    subnet_ids,
                };
                cloud.create_cluster(CLUSTER_NAME, &args).await
            })
    });

    // Worker nodes
    let node_role = ctx.register(
        NODE_ROLE_NAME,
        create_role(cloud, NODE_ROLE_NAME, EC2_SERVICE_PRINCIPAL),
    );
    for (i, policy_arn) in NODE_POLICY_ARNS.iter().enumerate() {
        let name = format!("{}{}", NODE_POLICY_ATTACHMENT_PREFIX, i);
        let attachment = attach_policy(cloud, name.clone(), &node_role, policy_arn);
        ctx.register(name, attachment);
    }

    let node_group = ctx.register(NODE_GROUP_NAME, {
        let cloud = cloud.clone();
        let instance_types = vec![settings.instance_type.clone()];
        let scaling = ScalingConfig {
            desired_size: settings.node_desired_size,
            min_size: settings.node_min_size,
            max_size: settings.node_max_size,
        };
        cluster
            .zip3(&node_role, &vpc)
            .after(&cluster_role)
            .apply_async(move |(cluster, node_role, vpc)| async move {
                let args = NodeGroupArgs {
                    cluster_name: cluster.name,
                    node_role_arn: node_role.arn,
                    subnet_ids: vpc.private_subnet_ids,
                    instance_types,
                    scaling,
                };
                cloud.create_node_group(NODE_GROUP_NAME, &args).await
            })
    });

    // Registry and image
    let repository = ctx.register(REPOSITORY_NAME, {
        let cloud = cloud.clone();
        Output::new(async move {
            cloud
                .create_repository(REPOSITORY_NAME, &RepositoryArgs { force_delete: true })
                .await
        })
    });

    let identity = {
        let cloud = cloud.clone();
        Output::new(async move { cloud.caller_identity().await })
    };
    let region = {
        let cloud = cloud.clone();
        Output::new(async move { cloud.region().await }).apply(|region| region.name)
    };

    let server = identity
        .zip(&region)
        .apply(|(identity, region)| format!("{}.dkr.ecr.{}.amazonaws.com", identity.account_id, region));
    let image_name = {
        let tag = settings.image_tag.clone();
        server
            .zip(&repository)
            .apply(move |(server, repository)| format!("{}/{}:{}", server, repository.name, tag))
    };

    // The token is only requested once the repository exists.
    let registry_credentials = {
        let cloud = cloud.clone();
        repository.apply_async(move |repository| async move {
            let token = cloud.registry_authorization(&repository.registry_id).await?;
            Ok(RegistryCredentials {
                username: REGISTRY_USERNAME.to_string(),
                password: token.password,
            })
        })
    };

    let image = ctx.register(IMAGE_NAME, {
        let images = collaborators.images.clone();
        let context = settings.build_context.clone();
        let platform = settings.platform.clone();
        image_name
            .zip3(&server, &registry_credentials)
            .after(&repository)
            .apply_async(move |(image_name, server, credentials)| async move {
                let args = ImageArgs {
                    image_name,
                    context,
                    platform,
                    registry: RegistryArgs {
                        server,
                        credentials,
                    },
                };
                images.build_and_push(IMAGE_NAME, &args).await
            })
    });

    // TLS certificate
    let zone = {
        let cloud = cloud.clone();
        let zone_name = settings.zone_name.clone();
        Output::new(async move { cloud.lookup_zone(&zone_name).await })
    };

    let certificate = ctx.register(CERTIFICATE_NAME, {
        let cloud = cloud.clone();
        let args = CertificateArgs {
            domain_name: settings.domain_name.clone(),
            validation_method: ValidationMethod::Dns,
        };
        Output::new(async move { cloud.create_certificate(CERTIFICATE_NAME, &args).await })
    });

    let validation_record = ctx.register(CERT_VALIDATION_RECORD_NAME, {
        let cloud = cloud.clone();
        certificate
            .zip(&zone)
            .apply_async(move |(certificate, zone)| async move {
                let option = certificate
                    .domain_validation_options
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        StackError::provisioning(
                            Certificate::KIND,
                            CERTIFICATE_NAME,
                            "certificate has no domain validation options",
                        )
                    })?;
                let args = RecordArgs {
                    name: option.resource_record_name,
                    record_type: option.resource_record_type,
                    zone_id: zone.zone_id,
                    records: vec![option.resource_record_value],
                    ttl: CERT_VALIDATION_TTL,
                };
                cloud.create_record(CERT_VALIDATION_RECORD_NAME, &args).await
            })
    });

    let certificate_validation = ctx.register(CERT_VALIDATION_NAME, {
        let cloud = cloud.clone();
        certificate
            .zip(&validation_record)
            .apply_async(move |(certificate, record)| async move {
                let args = CertificateValidationArgs {
                    certificate_arn: certificate.arn,
                    validation_record_fqdns: vec![record.fqdn],
                };
                cloud.validate_certificate(CERT_VALIDATION_NAME, &args).await
            })
    });

    // Cluster access
    let kubeconfig = credential_document_output(
        &cluster.apply(|c| c.endpoint),
        &cluster.apply(|c| c.certificate_authority.data),
        &cluster.apply(|c| c.name),
    );

    let workload_provider = ctx.register(WORKLOAD_PROVIDER_NAME, {
        let connector = collaborators.workloads.clone();
        kubeconfig
            .after(&cluster)
            .apply_async(move |document| async move { connector.connect(&document).await })
    });

    // Web app
    let instance_type = node_group.apply(|group| primary_instance_type(&group.instance_types));
    let tls = certificate.apply(|certificate| tls_status(&certificate.arn).to_string());

    let web_app = WebApp::new(
        ctx,
        &settings.app_name,
        WebAppArgs {
            image: image.apply(|image| image.image_name),
            display_value: Output::ready(display_value),
            replicas: Some(settings.replicas),
            namespace: Some(settings.namespace.clone()),
            region: region.clone(),
            instance_type,
            service_type: ServiceType::LoadBalancer,
            dns: settings.domain_name.clone(),
            tls,
            nlb: NLB_ENABLED.to_string(),
        },
        &workload_provider,
    );

    // Public entry point
    let load_balancer_hostname = declare_load_balancer(
        ctx,
        &settings,
        &workload_provider,
        &web_app,
        certificate_validation.apply(|validation| validation.certificate_arn),
    );

    ctx.register(APP_DNS_RECORD_NAME, {
        let cloud = cloud.clone();
        let domain_name = settings.domain_name.clone();
        zone.zip(&load_balancer_hostname)
            .apply_async(move |(zone, hostname)| async move {
                let args = RecordArgs {
                    name: domain_name,
                    record_type: RECORD_TYPE_CNAME.to_string(),
                    zone_id: zone.zone_id,
                    records: vec![hostname],
                    ttl: APP_DNS_TTL,
                };
                cloud.create_record(APP_DNS_RECORD_NAME, &args).await
            })
    });

    ctx.export("region", region);
    ctx.export("clusterName", cluster.apply(|c| c.name));
    ctx.export("kubeconfig", kubeconfig.apply(|document| document.into_string()));
    ctx.export("vpcId", vpc.apply(|v| v.vpc_id));
    ctx.export("serviceName", web_app.service_name.clone());
    ctx.export("url", Output::ready(settings.url()));
    ctx.export("certificateArn", certificate.apply(|c| c.arn));
    ctx.export("loadBalancerHostname", load_balancer_hostname);

    Ok(())
}
