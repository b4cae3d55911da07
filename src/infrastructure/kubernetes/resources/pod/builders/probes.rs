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

use crate::infrastructure::constants::*;
use k8s_openapi::api::core::v1::{HTTPGetAction, Probe};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

pub struct ProbeBuilder;

impl ProbeBuilder {
    pub fn build_http_probe(
        port: i32,
        initial_delay: i32,
        period: i32,
        timeout: i32,
        failure_threshold: i32,
    ) -> Probe {
        Probe {
            http_get: Some(HTTPGetAction {
                path: Some(PROBE_PATH.to_string()),
                port: IntOrString::Int(port),
                ..Default::default()
            }),
            initial_delay_seconds: Some(initial_delay),
            period_seconds: Some(period),
            timeout_seconds: Some(timeout),
            failure_threshold: Some(failure_threshold),
            ..Default::default()
        }
    }

    pub fn build_liveness(port: i32) -> Probe {
        Self::build_http_probe(
            port,
            LIVENESS_INITIAL_DELAY,
            LIVENESS_PERIOD,
            LIVENESS_TIMEOUT,
            LIVENESS_FAILURE_THRESHOLD,
        )
    }

    pub fn build_readiness(port: i32) -> Probe {
        Self::build_http_probe(
            port,
            READINESS_INITIAL_DELAY,
            READINESS_PERIOD,
            READINESS_TIMEOUT,
            READINESS_FAILURE_THRESHOLD,
        )
    }
}
