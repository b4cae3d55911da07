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

use crate::infrastructure::constants::LABEL_APP;
use crate::shared::error::Result;
use k8s_openapi::api::core::v1::{Container, PodTemplateSpec};
use std::collections::BTreeMap;

pub trait PodBuilder {
    fn app_name(&self) -> &str;

    fn get_labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_APP.to_string(), self.app_name().to_string());
        labels
    }

    fn get_selector_labels(&self) -> BTreeMap<String, String> {
        self.get_labels()
    }

    fn build_main_container(&self) -> Result<Container>;

    fn build_pod_template(&self) -> Result<PodTemplateSpec>;

    fn main_container_name(&self) -> &'static str;
}

pub trait LabeledResourceBuilder {
    fn app_name(&self) -> &str;

    fn get_labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_APP.to_string(), self.app_name().to_string());
        labels
    }

    fn get_selector_labels(&self) -> BTreeMap<String, String> {
        self.get_labels()
    }
}
