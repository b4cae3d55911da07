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

//! Stack commands

use crate::cli::display::TableRenderer;
use crate::domain::config::{
    apply_overrides, parse_dynamic_configs, tls_status, IacMetadata, ServiceType, StackConfig,
    WebAppSpec,
};
use crate::domain::credentials::{
    build_credential_document, ClusterAccessInputs, CredentialDocument,
};
use crate::domain::stack::{
    declare_load_balancer, deploy_stack, Collaborators, Output, StackContext, WebApp, WebAppArgs,
};
use crate::infrastructure::cloud::PreviewProvider;
use crate::infrastructure::constants::{
    CONF_FILE_ENV, DEFAULT_STACK_NAME, NLB_ENABLED, PROJECT_NAME,
};
use crate::infrastructure::kubernetes::resources::{
    ConfigMapBuilder, DeploymentBuilder, ServiceBuilder,
};
use crate::infrastructure::kubernetes::{KubeConnector, WorkloadConnector};
use anyhow::Context;
use clap::{Args, Parser};

/// Configuration sources shared by the stack commands.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to the stack configuration file (TOML)
    /// If not provided, KUBESTACK_CONF_FILE is used, then built-in defaults
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<String>,

    /// Dynamic configuration properties to override any settings (-D key=value)
    ///
    /// Config values: <namespace>:<key>, e.g. websrv1:setting
    /// Stack: stack.app-name, stack.namespace, stack.replicas, stack.availability-zones
    /// Nodes: stack.instance-type, stack.node-desired-size, stack.node-min-size, stack.node-max-size
    /// DNS: stack.zone-name, stack.domain-name
    /// Image: stack.image-tag, stack.build-context, stack.platform
    ///
    /// Example: -Dwebsrv1:setting=hello -Dstack.replicas=3
    #[arg(short = 'D', value_name = "KEY=VALUE")]
    pub properties: Vec<String>,
}

impl ConfigArgs {
    /// Loads the configuration file and applies `-D` overrides on top.
    pub fn load(&self) -> anyhow::Result<StackConfig> {
        self.load_with_fallback(std::env::var(CONF_FILE_ENV).ok())
    }

    /// Like [`ConfigArgs::load`], with `fallback_file` standing in for the
    /// `KUBESTACK_CONF_FILE` lookup.
    pub fn load_with_fallback(
        &self,
        fallback_file: Option<String>,
    ) -> anyhow::Result<StackConfig> {
        let mut config = if let Some(ref path) = self.config_file {
            StackConfig::from(path)?
        } else if let Some(path) = fallback_file {
            StackConfig::from(&path)?
        } else {
            eprintln!("ℹ️  No configuration file specified, using default settings");
            StackConfig::default()
        };

        if !self.properties.is_empty() {
            let configs = parse_dynamic_configs(&self.properties)
                .map_err(|e| anyhow::anyhow!("Failed to parse dynamic configs: {}", e))?;
            apply_overrides(&configs, &mut config)?;
        }

        Ok(config)
    }
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewCommand {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Stack name shown in the summary
    #[arg(long, default_value = DEFAULT_STACK_NAME)]
    pub stack: String,

    /// Region reported by the preview provider
    #[arg(long, default_value = "us-west-2")]
    pub region: String,

    /// Print the full kubeconfig output after the tables
    #[arg(long)]
    pub show_kubeconfig: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct KubeconfigCommand {
    /// API server endpoint of the cluster
    #[arg(long)]
    pub endpoint: String,

    /// Base64-encoded certificate authority data
    #[arg(long)]
    pub ca_data: String,

    /// Cluster name; also used as the context and user name
    #[arg(long)]
    pub cluster_name: String,

    /// Write the kubeconfig to PATH instead of stdout
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct RenderCommand {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Container image; defaults to <app-name>:<image-tag>
    #[arg(long)]
    pub image: Option<String>,

    /// Region surfaced in the app metadata
    #[arg(long, default_value = "us-west-2")]
    pub region: String,

    /// ACM certificate ARN; the load balancer service is rendered only when set
    #[arg(long)]
    pub certificate_arn: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeployAppCommand {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Path to kubeconfig file
    /// If not specified, uses default kubeconfig resolution (KUBECONFIG env or ~/.kube/config)
    #[arg(long)]
    pub kubeconfig: Option<String>,

    /// Kubernetes context to use
    /// If not specified, uses current context from kubeconfig
    #[arg(long)]
    pub context: Option<String>,

    /// Namespace override (defaults to stack.namespace)
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Container image to run
    #[arg(long)]
    pub image: String,

    /// Region surfaced in the app metadata
    #[arg(long, default_value = "us-west-2")]
    pub region: String,

    /// ACM certificate ARN; when set, the TLS load balancer is applied too
    #[arg(long)]
    pub certificate_arn: Option<String>,
}

impl PreviewCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let config = self.config.load()?;
        let provider = PreviewProvider::new(self.region.clone());

        let mut ctx = StackContext::new(PROJECT_NAME, self.stack.clone());
        deploy_stack(&mut ctx, &config, &Collaborators::preview(&provider))
            .context("Failed to declare stack")?;

        let summary = ctx
            .finish()
            .await
            .map_err(|e| anyhow::anyhow!("Preview failed: {}", e))?;

        let renderer = TableRenderer::new();
        println!("{}", renderer.render_resources(PROJECT_NAME, &self.stack, &summary.resources));
        println!("{}", renderer.render_outputs(&summary.outputs));

        if self.show_kubeconfig {
            if let Some(kubeconfig) = summary.output("kubeconfig") {
                println!("{}", kubeconfig.trim_end());
            }
        }

        println!(
            "Stack {} previewed successfully! ({} provider calls)",
            self.stack,
            provider.calls().len()
        );
        Ok(())
    }
}

impl KubeconfigCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let inputs = ClusterAccessInputs::new(&self.endpoint, &self.ca_data, &self.cluster_name);
        let document = build_credential_document(&inputs)
            .map_err(|e| anyhow::anyhow!("Failed to build kubeconfig: {}", e))?;

        match self.output {
            Some(ref path) => {
                std::fs::write(path, document.as_str())
                    .with_context(|| format!("Failed to write kubeconfig to {}", path))?;
                println!("✓ Kubeconfig for {} written to {}", self.cluster_name, path);
            }
            None => println!("{}", document.as_str().trim_end()),
        }

        Ok(())
    }
}

/// A blank `--certificate-arn` counts as not given.
fn requested_certificate(arn: &Option<String>) -> Option<&str> {
    arn.as_deref().filter(|arn| !arn.trim().is_empty())
}

impl RenderCommand {
    pub fn certificate_arn(&self) -> Option<&str> {
        requested_certificate(&self.certificate_arn)
    }

    pub async fn execute(&self) -> anyhow::Result<()> {
        let config = self.config.load()?;
        config.stack.validate()?;

        let image = self.image.clone().unwrap_or_else(|| {
            format!("{}:{}", config.stack.app_name, config.stack.image_tag)
        });
        let spec = web_app_spec(&config, image, &self.region, self.certificate_arn());

        let manifests = render_manifests(
            &spec,
            &config.stack.load_balancer_name(),
            self.certificate_arn(),
        )?;
        println!("{}", manifests);
        Ok(())
    }
}

impl DeployAppCommand {
    pub fn certificate_arn(&self) -> Option<&str> {
        requested_certificate(&self.certificate_arn)
    }

    pub async fn execute(&self) -> anyhow::Result<()> {
        let mut config = self.config.load()?;
        if let Some(ref namespace) = self.namespace {
            config.stack.namespace = namespace.clone();
        }
        let settings = config.stack.clone();
        settings.validate()?;

        let document = match self.kubeconfig {
            Some(ref path) => CredentialDocument::read(path),
            None => CredentialDocument::from_default_location(),
        }
        .map_err(|e| anyhow::anyhow!("Failed to load kubeconfig: {}", e))?;

        let connector =
            KubeConnector::new(settings.namespace.clone()).with_context(self.context.clone());
        let workload = connector
            .connect(&document)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create workload client: {}", e))?;
        println!("ℹ️  Using kubeconfig context {}", workload.context);
        let provider = Output::ready(workload);

        let certificate_arn = self.certificate_arn().unwrap_or_default().to_string();
        let mut ctx = StackContext::new(PROJECT_NAME, settings.namespace.clone());
        let web_app = WebApp::new(
            &mut ctx,
            &settings.app_name,
            WebAppArgs {
                image: Output::ready(self.image.clone()),
                display_value: Output::ready(config.display_value()),
                replicas: Some(settings.replicas),
                namespace: Some(settings.namespace.clone()),
                region: Output::ready(self.region.clone()),
                instance_type: Output::ready(settings.instance_type.clone()),
                service_type: ServiceType::LoadBalancer,
                dns: settings.domain_name.clone(),
                tls: Output::ready(tls_status(&certificate_arn).to_string()),
                nlb: NLB_ENABLED.to_string(),
            },
            &provider,
        );
        ctx.export("serviceName", web_app.service_name.clone());
        ctx.export("deploymentName", web_app.deployment_name.clone());

        if self.certificate_arn().is_some() {
            println!(
                "ℹ️  Waiting for load balancer {} (this can take a few minutes)",
                settings.load_balancer_name()
            );
            let hostname = declare_load_balancer(
                &mut ctx,
                &settings,
                &provider,
                &web_app,
                Output::ready(certificate_arn),
            );
            ctx.export("loadBalancerHostname", hostname);
        }

        let summary = ctx
            .finish()
            .await
            .map_err(|e| anyhow::anyhow!("Deployment failed: {}", e))?;

        let renderer = TableRenderer::new();
        println!("{}", renderer.render_outputs(&summary.outputs));
        println!("Web app {} deployed successfully!", settings.app_name);
        Ok(())
    }
}

/// Web app parameters derived from local configuration, without a cluster.
pub fn web_app_spec(
    config: &StackConfig,
    image: String,
    region: &str,
    certificate_arn: Option<&str>,
) -> WebAppSpec {
    let settings = &config.stack;
    WebAppSpec {
        namespace: settings.namespace.clone(),
        display_value: config.display_value(),
        replicas: settings.replicas,
        metadata: IacMetadata {
            region: region.to_string(),
            instance_type: settings.instance_type.clone(),
            service_type: ServiceType::LoadBalancer,
            dns: settings.domain_name.clone(),
            tls: tls_status(certificate_arn.unwrap_or_default()).to_string(),
            nlb: NLB_ENABLED.to_string(),
        },
        ..WebAppSpec::new(settings.app_name.clone(), image)
    }
}

/// Renders the app manifests as one multi-document YAML stream.
pub fn render_manifests(
    spec: &WebAppSpec,
    load_balancer_name: &str,
    certificate_arn: Option<&str>,
) -> anyhow::Result<String> {
    let mut documents = vec![
        serde_yaml::to_string(&ConfigMapBuilder::new(spec.clone()).build()?)?,
        serde_yaml::to_string(&DeploymentBuilder::new(spec.clone()).build()?)?,
        serde_yaml::to_string(&ServiceBuilder::for_web_app(spec).build()?)?,
    ];

    if let Some(arn) = certificate_arn {
        let service = ServiceBuilder::load_balancer(
            load_balancer_name.to_string(),
            spec.namespace.clone(),
            spec.name.clone(),
            arn.to_string(),
        )
        .build()?;
        documents.push(serde_yaml::to_string(&service)?);
    }

    Ok(documents.join("---\n").trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::Service;
    use serde::Deserialize;
    use std::io::Write;

    #[test]
    fn test_config_args_defaults_with_overrides() {
        let args = ConfigArgs {
            config_file: None,
            properties: vec![
                "websrv1:setting=hello".to_string(),
                "stack.replicas=4".to_string(),
            ],
        };

        let config = args.load_with_fallback(None).unwrap();
        assert_eq!(config.display_value(), "hello");
        assert_eq!(config.stack.replicas, 4);
    }

    #[test]
    fn test_config_args_file_then_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[config]\n\"websrv1:setting\" = \"from-file\"\n\n[stack]\napp_name = \"web\""
        )
        .unwrap();

        let args = ConfigArgs {
            config_file: Some(file.path().to_string_lossy().to_string()),
            properties: vec!["stack.namespace=apps".to_string()],
        };

        let config = args.load().unwrap();
        assert_eq!(config.display_value(), "from-file");
        assert_eq!(config.stack.app_name, "web");
        assert_eq!(config.stack.namespace, "apps");
    }

    #[test]
    fn test_config_args_env_file_fallback() {
        let mut env_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(env_file, "[stack]\napp_name = \"from-env\"").unwrap();
        let env_path = env_file.path().to_string_lossy().to_string();

        let args = ConfigArgs::default();
        let config = args.load_with_fallback(Some(env_path.clone())).unwrap();
        assert_eq!(config.stack.app_name, "from-env");

        let mut cli_file = tempfile::NamedTempFile::new().unwrap();
        writeln!(cli_file, "[stack]\napp_name = \"from-cli\"").unwrap();
        let args = ConfigArgs {
            config_file: Some(cli_file.path().to_string_lossy().to_string()),
            properties: vec![],
        };
        let config = args.load_with_fallback(Some(env_path)).unwrap();
        assert_eq!(config.stack.app_name, "from-cli");
    }

    #[test]
    fn test_config_args_rejects_bad_property() {
        let args = ConfigArgs {
            config_file: None,
            properties: vec!["no-equals-sign".to_string()],
        };
        assert!(args.load_with_fallback(None).is_err());
    }

    #[test]
    fn test_blank_certificate_arn_is_ignored() {
        let render = RenderCommand {
            config: ConfigArgs::default(),
            image: None,
            region: "us-west-2".to_string(),
            certificate_arn: Some("".to_string()),
        };
        assert_eq!(render.certificate_arn(), None);

        let deploy = DeployAppCommand {
            config: ConfigArgs::default(),
            kubeconfig: None,
            context: None,
            namespace: None,
            image: "hello:app-v4".to_string(),
            region: "us-west-2".to_string(),
            certificate_arn: Some("  ".to_string()),
        };
        assert_eq!(deploy.certificate_arn(), None);

        let arn = "arn:aws:acm:us-west-2:123456789012:certificate/abc";
        let deploy = DeployAppCommand {
            certificate_arn: Some(arn.to_string()),
            ..deploy
        };
        assert_eq!(deploy.certificate_arn(), Some(arn));

        let spec = web_app_spec(
            &StackConfig::default(),
            "hello:app-v4".to_string(),
            "us-west-2",
            render.certificate_arn(),
        );
        assert_eq!(spec.metadata.tls, "disabled");
        let rendered = render_manifests(&spec, "hello-lb", render.certificate_arn()).unwrap();
        assert_eq!(rendered.matches("---\n").count(), 2);
    }

    #[test]
    fn test_web_app_spec_from_config() {
        let config = StackConfig::default();
        let spec = web_app_spec(&config, "hello:app-v4".to_string(), "eu-west-1", None);

        assert_eq!(spec.name, "hello");
        assert_eq!(spec.replicas, 2);
        assert_eq!(spec.display_value, "abc123");
        assert_eq!(spec.metadata.region, "eu-west-1");
        assert_eq!(spec.metadata.tls, "disabled");
        assert_eq!(spec.metadata.dns, "pulumidemo.t8rsk8s.io");
    }

    #[test]
    fn test_render_manifests_documents() {
        let config = StackConfig::default();
        let arn = "arn:aws:acm:us-west-2:123456789012:certificate/abc";
        let spec = web_app_spec(&config, "hello:app-v4".to_string(), "us-west-2", Some(arn));

        let without_lb = render_manifests(&spec, "hello-lb", None).unwrap();
        assert_eq!(without_lb.matches("---\n").count(), 2);

        let rendered = render_manifests(&spec, "hello-lb", Some(arn)).unwrap();
        let kinds: Vec<String> = serde_yaml::Deserializer::from_str(&rendered)
            .map(|doc| {
                let value = serde_yaml::Value::deserialize(doc).unwrap();
                value["kind"].as_str().unwrap_or_default().to_string()
            })
            .collect();
        assert_eq!(kinds, vec!["ConfigMap", "Deployment", "Service", "Service"]);

        let last = rendered.split("---\n").last().unwrap();
        let service: Service = serde_yaml::from_str(last).unwrap();
        assert_eq!(service.metadata.name.as_deref(), Some("hello-lb"));
        assert_eq!(
            service.metadata.annotations.unwrap()
                ["service.beta.kubernetes.io/aws-load-balancer-ssl-cert"],
            arn
        );
    }

    #[tokio::test]
    async fn test_kubeconfig_command_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kubeconfig");

        let cmd = KubeconfigCommand {
            endpoint: "https://example.eks.amazonaws.com".to_string(),
            ca_data: "Q0E=".to_string(),
            cluster_name: "eks-cluster".to_string(),
            output: Some(path.to_string_lossy().to_string()),
        };
        cmd.execute().await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("server: https://example.eks.amazonaws.com"));
        assert!(written.contains("current-context: eks-cluster"));
    }

    #[tokio::test]
    async fn test_preview_command_runs() {
        let config_file = tempfile::NamedTempFile::new().unwrap();
        let cmd = PreviewCommand {
            config: ConfigArgs {
                config_file: Some(config_file.path().to_string_lossy().to_string()),
                properties: vec![],
            },
            stack: "dev".to_string(),
            region: "us-west-2".to_string(),
            show_kubeconfig: false,
        };
        cmd.execute().await.unwrap();
    }
}
