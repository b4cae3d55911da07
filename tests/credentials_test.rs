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

#[cfg(test)]
mod tests {
    use kubestack::domain::credentials::credential_document_output;
    use kubestack::*;

    fn demo_inputs() -> ClusterAccessInputs {
        ClusterAccessInputs::new("https://x.example:6443", "BASE64DATA", "demo-cluster")
    }

    #[test]
    fn test_document_is_deterministic() {
        let first = build_credential_document(&demo_inputs()).unwrap();
        let second = build_credential_document(&demo_inputs()).unwrap();
        assert_eq!(first.as_str(), second.as_str());
    }

    #[test]
    fn test_document_is_well_formed() {
        let document = build_credential_document(&demo_inputs()).unwrap();
        let kubeconfig = document.parse().unwrap();

        assert_eq!(kubeconfig.api_version.as_deref(), Some("v1"));
        assert_eq!(kubeconfig.kind.as_deref(), Some("Config"));
        assert_eq!(kubeconfig.current_context.as_deref(), Some("demo-cluster"));
        assert_eq!(kubeconfig.clusters.len(), 1);
        assert_eq!(kubeconfig.contexts.len(), 1);
        assert_eq!(kubeconfig.auth_infos.len(), 1);
    }

    #[test]
    fn test_fields_are_copied_verbatim() {
        let document = build_credential_document(&demo_inputs()).unwrap();
        let kubeconfig = document.parse().unwrap();

        let cluster = kubeconfig.clusters[0].cluster.as_ref().unwrap();
        assert_eq!(cluster.server.as_deref(), Some("https://x.example:6443"));
        assert_eq!(
            cluster.certificate_authority_data.as_deref(),
            Some("BASE64DATA")
        );
    }

    #[test]
    fn test_cluster_id_names_every_entry() {
        let document = build_credential_document(&demo_inputs()).unwrap();
        let kubeconfig = document.parse().unwrap();

        assert_eq!(kubeconfig.clusters[0].name, "demo-cluster");
        assert_eq!(kubeconfig.contexts[0].name, "demo-cluster");
        assert_eq!(kubeconfig.auth_infos[0].name, "demo-cluster");

        let context = kubeconfig.contexts[0].context.as_ref().unwrap();
        assert_eq!(context.cluster, "demo-cluster");

        let raw: serde_yaml::Value = serde_yaml::from_str(document.as_str()).unwrap();
        assert_eq!(raw["contexts"][0]["context"]["user"].as_str(), Some("demo-cluster"));

        let exec = &raw["users"][0]["user"]["exec"];
        assert_eq!(
            exec["apiVersion"].as_str(),
            Some("client.authentication.k8s.io/v1beta1")
        );
        assert_eq!(exec["command"].as_str(), Some("aws"));
        let args: Vec<&str> = exec["args"]
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(|arg| arg.as_str())
            .collect();
        assert_eq!(args, vec!["eks", "get-token", "--cluster-name", "demo-cluster"]);
    }

    #[test]
    fn test_empty_inputs_still_render() {
        let document = build_credential_document(&ClusterAccessInputs::new("", "", "")).unwrap();
        assert!(document.as_str().contains("apiVersion: v1"));
        assert!(document.as_str().contains("kind: Config"));
    }

    #[tokio::test]
    async fn test_output_waits_for_all_inputs() {
        let endpoint = Output::new(async {
            tokio::task::yield_now().await;
            Ok("https://x.example:6443".to_string())
        });
        let ca_data = Output::ready("BASE64DATA".to_string());
        let cluster_id = Output::ready("demo-cluster".to_string());

        let document = credential_document_output(&endpoint, &ca_data, &cluster_id)
            .resolve()
            .await
            .unwrap();
        assert_eq!(document, build_credential_document(&demo_inputs()).unwrap());
    }

    #[tokio::test]
    async fn test_output_propagates_upstream_failure() {
        let endpoint: Output<String> =
            Output::failed(StackError::provisioning("aws:eks:Cluster", "eks-cluster", "boom"));
        let ca_data = Output::ready("BASE64DATA".to_string());
        let cluster_id = Output::ready("demo-cluster".to_string());

        let err = credential_document_output(&endpoint, &ca_data, &cluster_id)
            .resolve()
            .await
            .unwrap_err();
        assert_eq!(
            err,
            StackError::provisioning("aws:eks:Cluster", "eks-cluster", "boom")
        );
    }

    #[test]
    fn test_display_value_fallback() {
        let config = StackConfig::default();
        assert_eq!(config.display_value(), "abc123");

        let config = StackConfig::parse("[config]\n\"websrv1:setting\" = \"\"\n").unwrap();
        assert_eq!(config.display_value(), "abc123");

        let config = StackConfig::parse("[config]\n\"websrv1:setting\" = \"custom\"\n").unwrap();
        assert_eq!(config.display_value(), "custom");
    }
}
