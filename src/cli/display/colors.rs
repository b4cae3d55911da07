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

//! Color theme for CLI output

use comfy_table::Color as TableColor;

/// Color theme for terminal output
#[derive(Debug, Clone)]
pub struct ColorTheme {
    pub success: TableColor,
    pub warning: TableColor,
    pub info: TableColor,
    pub muted: TableColor,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            success: TableColor::Green,
            warning: TableColor::Yellow,
            info: TableColor::Cyan,
            muted: TableColor::DarkGrey,
        }
    }
}

impl ColorTheme {
    /// Color for a resource id; unresolved ids are muted
    pub fn get_id_color(&self, id: &str) -> TableColor {
        if id.is_empty() {
            self.muted
        } else {
            self.success
        }
    }

    /// Color keyed on the provider family of a resource type token
    /// (`aws:...`, `awsx:...`, `kubernetes:...`, `docker:...`)
    pub fn get_kind_color(&self, kind: &str) -> TableColor {
        match provider_family(kind) {
            "aws" | "awsx" => TableColor::DarkYellow,
            "kubernetes" => TableColor::Blue,
            "docker" => self.info,
            _ => TableColor::Magenta,
        }
    }
}

/// Package part of a type token. Provider resources
/// (`pulumi:providers:<pkg>`) report the package they configure.
pub fn provider_family(kind: &str) -> &str {
    let mut parts = kind.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("pulumi"), Some("providers"), Some(package)) => package,
        (Some(package), _, _) => package,
        _ => "",
    }
}

/// Convert comfy_table::Color to colored::Color string representation
pub fn table_color_to_colored_str(color: TableColor) -> &'static str {
    match color {
        TableColor::Green => "green",
        TableColor::Yellow | TableColor::DarkYellow => "yellow",
        TableColor::Red => "red",
        TableColor::Cyan => "cyan",
        TableColor::Blue => "blue",
        TableColor::Magenta => "magenta",
        TableColor::DarkGrey => "bright black",
        _ => "white",
    }
}
