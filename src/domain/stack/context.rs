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

//! Deployment context handed to the stack program.
//!
//! Declaring a resource only wires up its [`Output`]; nothing runs until
//! [`StackContext::finish`] drives every declaration and export together.

use crate::domain::stack::Output;
use crate::infrastructure::cloud::Resource;
use crate::shared::error::{Result, StackError};
use futures::future::try_join_all;
use std::collections::BTreeMap;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub kind: String,
    pub name: String,
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StackSummary {
    /// In declaration order.
    pub resources: Vec<ResourceRecord>,
    pub outputs: BTreeMap<String, String>,
}

impl StackSummary {
    pub fn resource(&self, name: &str) -> Option<&ResourceRecord> {
        self.resources.iter().find(|r| r.name == name)
    }

    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs.get(name).map(String::as_str)
    }
}

pub struct StackContext {
    project: String,
    stack: String,
    resources: Vec<Output<ResourceRecord>>,
    exports: Vec<(String, Output<String>)>,
}

impl StackContext {
    pub fn new(project: impl Into<String>, stack: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            stack: stack.into(),
            resources: Vec::new(),
            exports: Vec::new(),
        }
    }

    /// Declares a resource; it is provisioned by `finish` even if nothing
    /// else consumes it.
    pub fn register<T>(&mut self, name: impl Into<String>, output: Output<T>) -> Output<T>
    where
        T: Resource + Clone + Send + Sync + 'static,
    {
        let id = output.apply(|resource| resource.id());
        self.record(T::KIND, name, id);
        output
    }

    /// Declares a record whose identifier is computed by `id`.
    pub fn record(&mut self, kind: &str, name: impl Into<String>, id: Output<String>) {
        let kind = kind.to_string();
        let name = name.into();
        self.resources.push(id.apply(move |id| ResourceRecord { kind, name, id }));
    }

    pub fn export(&mut self, name: impl Into<String>, value: Output<String>) {
        self.exports.push((name.into(), value));
    }

    pub fn declared_resources(&self) -> usize {
        self.resources.len()
    }

    /// Drives every declaration and export. The first failure aborts the
    /// deployment and is returned as-is.
    pub async fn finish(self) -> Result<StackSummary> {
        info!(
            project = %self.project,
            stack = %self.stack,
            resources = self.resources.len(),
            exports = self.exports.len(),
            "Deploying stack"
        );

        let resources = Output::all(self.resources);
        let exports = try_join_all(self.exports.into_iter().map(|(name, value)| async move {
            let value = value.resolve().await?;
            Ok::<_, StackError>((name, value))
        }));

        let (resources, exports) = futures::try_join!(resources.resolve(), exports)?;

        info!(resources = resources.len(), "Stack deployed");
        Ok(StackSummary {
            resources,
            outputs: exports.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::cloud::Vpc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn vpc(id: &str) -> Vpc {
        Vpc {
            vpc_id: id.to_string(),
            public_subnet_ids: vec![],
            private_subnet_ids: vec![],
        }
    }

    #[tokio::test]
    async fn test_unconsumed_resources_are_provisioned() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut ctx = StackContext::new("demo", "dev");

        let counter = calls.clone();
        ctx.register(
            "eks-vpc",
            Output::new(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(vpc("vpc-1"))
            }),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let summary = ctx.finish().await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            summary.resources,
            vec![ResourceRecord {
                kind: "awsx:ec2:Vpc".to_string(),
                name: "eks-vpc".to_string(),
                id: "vpc-1".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_exports() {
        let mut ctx = StackContext::new("demo", "dev");
        let vpc = ctx.register("eks-vpc", Output::ready(vpc("vpc-1")));
        ctx.export("vpcId", vpc.apply(|v| v.vpc_id));
        ctx.export("url", Output::ready("https://example.com".to_string()));

        let summary = ctx.finish().await.unwrap();
        assert_eq!(summary.output("vpcId"), Some("vpc-1"));
        assert_eq!(summary.output("url"), Some("https://example.com"));
        assert!(summary.resource("eks-vpc").is_some());
    }

    #[tokio::test]
    async fn test_failure_aborts() {
        let mut ctx = StackContext::new("demo", "dev");
        let failed: Output<Vpc> =
            Output::failed(StackError::provisioning("aws:ec2:Vpc", "eks-vpc", "quota"));
        let vpc = ctx.register("eks-vpc", failed);
        ctx.export("vpcId", vpc.apply(|v| v.vpc_id));

        let err = ctx.finish().await.unwrap_err();
        assert_eq!(
            err,
            StackError::provisioning("aws:ec2:Vpc", "eks-vpc", "quota")
        );
    }
}
