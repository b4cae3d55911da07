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

//! Status icons for CLI output

/// Status icons for different states
pub struct StatusIcon;

impl StatusIcon {
    /// Success icon (resource provisioned)
    pub const SUCCESS: &'static str = "✓";

    /// Warning icon (empty value)
    pub const WARNING: &'static str = "⚠";

    /// Pending icon (no identifier yet)
    pub const PENDING: &'static str = "⏳";

    /// Get status icon for a resource identifier
    pub fn get_resource_icon(id: &str) -> &'static str {
        if id.is_empty() {
            Self::PENDING
        } else {
            Self::SUCCESS
        }
    }
}
