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

// CLI command definitions

use super::stack::{DeployAppCommand, KubeconfigCommand, PreviewCommand, RenderCommand};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "kubestack",
    version,
    about = "EKS web stack declarations and cluster credentials",
    long_about = "Declares an EKS cluster with a TLS-fronted web app, previews the resource graph and renders the cluster kubeconfig"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Run the stack program against the in-memory preview provider
    Preview(PreviewCommand),

    /// Render the kubeconfig for a provisioned cluster
    Kubeconfig(KubeconfigCommand),

    /// Print the web app manifests as YAML
    Render(RenderCommand),

    /// Apply the web app and its load balancer to an existing cluster
    DeployApp(DeployAppCommand),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preview_with_properties() {
        let args = CliArgs::try_parse_from([
            "kubestack",
            "preview",
            "-D",
            "websrv1:setting=hello",
            "-Dstack.replicas=3",
        ])
        .unwrap();

        match args.command {
            Commands::Preview(cmd) => {
                assert_eq!(
                    cmd.config.properties,
                    vec!["websrv1:setting=hello", "stack.replicas=3"]
                );
                assert!(cmd.config.config_file.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_kubeconfig_requires_cluster_inputs() {
        assert!(CliArgs::try_parse_from(["kubestack", "kubeconfig"]).is_err());

        let args = CliArgs::try_parse_from([
            "kubestack",
            "kubeconfig",
            "--endpoint",
            "https://example.eks.amazonaws.com",
            "--ca-data",
            "Q0E=",
            "--cluster-name",
            "eks-cluster",
        ])
        .unwrap();
        assert!(matches!(args.command, Commands::Kubeconfig(_)));
    }

    #[test]
    fn test_parse_deploy_app() {
        let args = CliArgs::try_parse_from([
            "kubestack",
            "deploy-app",
            "--kubeconfig",
            "/tmp/kubeconfig",
            "--image",
            "repo/app:v1",
        ])
        .unwrap();

        match args.command {
            Commands::DeployApp(cmd) => {
                assert_eq!(cmd.kubeconfig.as_deref(), Some("/tmp/kubeconfig"));
                assert_eq!(cmd.image, "repo/app:v1");
                assert!(cmd.certificate_arn.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
