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

//! Non-root security contexts for the app pod and its container.

use crate::infrastructure::constants::{FS_GROUP, RUN_AS_USER};
use k8s_openapi::api::core::v1::{Capabilities, PodSecurityContext, SecurityContext};

pub struct SecurityContextBuilder;

impl SecurityContextBuilder {
    pub fn build_pod() -> PodSecurityContext {
        PodSecurityContext {
            run_as_non_root: Some(true),
            run_as_user: Some(RUN_AS_USER),
            fs_group: Some(FS_GROUP),
            ..Default::default()
        }
    }

    pub fn build_container() -> SecurityContext {
        SecurityContext {
            allow_privilege_escalation: Some(false),
            run_as_non_root: Some(true),
            run_as_user: Some(RUN_AS_USER),
            capabilities: Some(Capabilities {
                drop: Some(vec!["ALL".to_string()]),
                ..Default::default()
            }),
            // The app writes to its working directory.
            read_only_root_filesystem: Some(false),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_drops_all_capabilities() {
        let ctx = SecurityContextBuilder::build_container();
        assert_eq!(ctx.allow_privilege_escalation, Some(false));
        assert_eq!(ctx.run_as_user, Some(1001));
        assert_eq!(
            ctx.capabilities.unwrap().drop,
            Some(vec!["ALL".to_string()])
        );
        assert_eq!(ctx.read_only_root_filesystem, Some(false));
    }

    #[test]
    fn test_pod_runs_as_non_root() {
        let ctx = SecurityContextBuilder::build_pod();
        assert_eq!(ctx.run_as_non_root, Some(true));
        assert_eq!(ctx.run_as_user, Some(1001));
        assert_eq!(ctx.fs_group, Some(1001));
    }
}
