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

//! Cluster access credential document.
//!
//! The document is a kubeconfig whose single user authenticates by running
//! `aws eks get-token`, so no long-lived secret is embedded and the token is
//! minted fresh whenever a client needs one.

use crate::domain::stack::Output;
use crate::infrastructure::constants::{
    EXEC_API_VERSION, EXEC_COMMAND, KUBECONFIG_API_VERSION, KUBECONFIG_KIND,
};
use crate::shared::error::{Result, StackError};
use kube::config::Kubeconfig;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Cluster attributes that only exist once the cluster has been provisioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterAccessInputs {
    pub endpoint: String,
    pub ca_data: String,
    pub cluster_id: String,
}

impl ClusterAccessInputs {
    pub fn new(
        endpoint: impl Into<String>,
        ca_data: impl Into<String>,
        cluster_id: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            ca_data: ca_data.into(),
            cluster_id: cluster_id.into(),
        }
    }
}

/// Rendered kubeconfig text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialDocument(String);

impl CredentialDocument {
    /// Accepts kubeconfig text written elsewhere, rejecting anything kube
    /// cannot load.
    pub fn from_yaml(text: impl Into<String>) -> Result<Self> {
        let document = Self(text.into());
        document.parse()?;
        Ok(document)
    }

    /// Reads a kubeconfig file from disk.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            StackError::ConfigError(format!(
                "Failed to read kubeconfig {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml(text)
    }

    /// Uses kube's default resolution (`KUBECONFIG`, then `~/.kube/config`).
    pub fn from_default_location() -> Result<Self> {
        let kubeconfig = Kubeconfig::read()
            .map_err(|e| StackError::ConfigError(format!("Failed to load kubeconfig: {}", e)))?;
        Ok(Self(serde_yaml::to_string(&kubeconfig)?))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Parses the document with kube's kubeconfig loader.
    pub fn parse(&self) -> Result<Kubeconfig> {
        Kubeconfig::from_yaml(&self.0)
            .map_err(|e| StackError::ConfigError(format!("Invalid kubeconfig: {}", e)))
    }
}

impl fmt::Display for CredentialDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CredentialDocument {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Field order of these structs is the key order of the rendered document.

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct KubeconfigFile<'a> {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    clusters: Vec<NamedCluster<'a>>,
    contexts: Vec<NamedContext<'a>>,
    current_context: &'a str,
    kind: &'static str,
    preferences: BTreeMap<String, String>,
    users: Vec<NamedUser<'a>>,
}

#[derive(Serialize)]
struct NamedCluster<'a> {
    cluster: ClusterEntry<'a>,
    name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct ClusterEntry<'a> {
    certificate_authority_data: &'a str,
    server: &'a str,
}

#[derive(Serialize)]
struct NamedContext<'a> {
    context: ContextEntry<'a>,
    name: &'a str,
}

#[derive(Serialize)]
struct ContextEntry<'a> {
    cluster: &'a str,
    user: &'a str,
}

#[derive(Serialize)]
struct NamedUser<'a> {
    name: &'a str,
    user: UserEntry<'a>,
}

#[derive(Serialize)]
struct UserEntry<'a> {
    exec: ExecEntry<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExecEntry<'a> {
    api_version: &'static str,
    command: &'static str,
    args: Vec<&'a str>,
}

/// Renders the credential document for a provisioned cluster.
///
/// Pure formatting: identical inputs give byte-identical output, and empty
/// inputs still render a well-formed (if unusable) document.
pub fn build_credential_document(inputs: &ClusterAccessInputs) -> Result<CredentialDocument> {
    let name = inputs.cluster_id.as_str();

    let file = KubeconfigFile {
        api_version: KUBECONFIG_API_VERSION,
        clusters: vec![NamedCluster {
            cluster: ClusterEntry {
                certificate_authority_data: &inputs.ca_data,
                server: &inputs.endpoint,
            },
            name,
        }],
        contexts: vec![NamedContext {
            context: ContextEntry {
                cluster: name,
                user: name,
            },
            name,
        }],
        current_context: name,
        kind: KUBECONFIG_KIND,
        preferences: BTreeMap::new(),
        users: vec![NamedUser {
            name,
            user: UserEntry {
                exec: ExecEntry {
                    api_version: EXEC_API_VERSION,
                    command: EXEC_COMMAND,
                    args: vec!["eks", "get-token", "--cluster-name", name],
                },
            },
        }],
    };

    let text = serde_yaml::to_string(&file)?;
    debug!(cluster_id = %name, "Rendered credential document");
    Ok(CredentialDocument(text))
}

/// Schedules [`build_credential_document`] to run once the cluster endpoint,
/// CA bundle and name have all resolved.
pub fn credential_document_output(
    endpoint: &Output<String>,
    ca_data: &Output<String>,
    cluster_id: &Output<String>,
) -> Output<CredentialDocument> {
    endpoint
        .zip3(ca_data, cluster_id)
        .try_apply(|(endpoint, ca_data, cluster_id)| {
            build_credential_document(&ClusterAccessInputs {
                endpoint,
                ca_data,
                cluster_id,
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_inputs() -> ClusterAccessInputs {
        ClusterAccessInputs::new("https://x.example:6443", "BASE64DATA", "demo-cluster")
    }

    #[test]
    fn test_document_layout() {
        let doc = build_credential_document(&demo_inputs()).unwrap();
        let expected = "\
apiVersion: v1
clusters:
- cluster:
    certificate-authority-data: BASE64DATA
    server: https://x.example:6443
  name: demo-cluster
contexts:
- context:
    cluster: demo-cluster
    user: demo-cluster
  name: demo-cluster
current-context: demo-cluster
kind: Config
preferences: {}
users:
- name: demo-cluster
  user:
    exec:
      apiVersion: client.authentication.k8s.io/v1beta1
      command: aws
      args:
      - eks
      - get-token
      - --cluster-name
      - demo-cluster
";
        assert_eq!(doc.as_str(), expected);
    }

    #[test]
    fn test_parses_with_kube_loader() {
        let doc = build_credential_document(&demo_inputs()).unwrap();
        let kubeconfig = doc.parse().unwrap();

        assert_eq!(kubeconfig.clusters.len(), 1);
        assert_eq!(kubeconfig.contexts.len(), 1);
        assert_eq!(kubeconfig.auth_infos.len(), 1);
        assert_eq!(kubeconfig.current_context.as_deref(), Some("demo-cluster"));
        assert_eq!(kubeconfig.clusters[0].name, "demo-cluster");
        assert_eq!(kubeconfig.auth_infos[0].name, "demo-cluster");
    }

    #[test]
    fn test_read_written_document() {
        let doc = build_credential_document(&demo_inputs()).unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), doc.as_str()).unwrap();

        let read = CredentialDocument::read(file.path()).unwrap();
        assert_eq!(read, doc);
    }

    #[test]
    fn test_from_yaml_rejects_malformed_text() {
        let err = CredentialDocument::from_yaml("clusters: [unterminated").unwrap_err();
        assert!(matches!(err, StackError::ConfigError(_)));

        let err = CredentialDocument::read("/nonexistent/kubeconfig").unwrap_err();
        assert!(matches!(err, StackError::ConfigError(_)));
    }

    #[test]
    fn test_empty_inputs_still_render() {
        let doc = build_credential_document(&ClusterAccessInputs::new("", "", "")).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(doc.as_str()).unwrap();
        assert_eq!(value["clusters"][0]["cluster"]["server"].as_str(), Some(""));
        assert_eq!(value["current-context"].as_str(), Some(""));
    }

    #[tokio::test]
    async fn test_output_waits_for_cluster_attributes() {
        let endpoint = Output::ready("https://x.example:6443".to_string());
        let ca_data = Output::ready("BASE64DATA".to_string());
        let cluster_id = Output::ready("demo-cluster".to_string());

        let doc = credential_document_output(&endpoint, &ca_data, &cluster_id)
            .resolve()
            .await
            .unwrap();
        assert_eq!(doc, build_credential_document(&demo_inputs()).unwrap());
    }

    #[tokio::test]
    async fn test_output_propagates_cluster_failure() {
        let endpoint = Output::ready("https://x.example:6443".to_string());
        let ca_data: Output<String> =
            Output::failed(StackError::provisioning("Cluster", "eks-cluster", "create failed"));
        let cluster_id = Output::ready("demo-cluster".to_string());

        let err = credential_document_output(&endpoint, &ca_data, &cluster_id)
            .resolve()
            .await
            .unwrap_err();
        assert!(matches!(err, StackError::Provisioning { .. }));
    }
}
