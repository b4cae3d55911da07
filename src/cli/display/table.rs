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

//! Table rendering for CLI output

use super::colors::table_color_to_colored_str;
use super::{ColorTheme, StatusIcon};
use crate::domain::stack::ResourceRecord;
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use std::collections::BTreeMap;

/// Longest single-line output value shown before truncation
const MAX_VALUE_WIDTH: usize = 80;

/// Table renderer for formatted output
pub struct TableRenderer {
    theme: ColorTheme,
}

impl Default for TableRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRenderer {
    /// Create a new table renderer with default theme
    pub fn new() -> Self {
        Self {
            theme: ColorTheme::default(),
        }
    }

    /// Render declared resources in declaration order
    pub fn render_resources(
        &self,
        project: &str,
        stack: &str,
        resources: &[ResourceRecord],
    ) -> String {
        if resources.is_empty() {
            return format!("No resources declared in {}/{}", project, stack);
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("#").set_alignment(CellAlignment::Right),
                Cell::new("NAME").set_alignment(CellAlignment::Left),
                Cell::new("TYPE").set_alignment(CellAlignment::Left),
                Cell::new("ID").set_alignment(CellAlignment::Left),
                Cell::new("STATUS").set_alignment(CellAlignment::Center),
            ]);

        for (i, resource) in resources.iter().enumerate() {
            table.add_row(vec![
                Cell::new(i + 1).set_alignment(CellAlignment::Right),
                Cell::new(&resource.name),
                Cell::new(&resource.kind).fg(self.theme.get_kind_color(&resource.kind)),
                Cell::new(summarize_value(&resource.id))
                    .fg(self.theme.get_id_color(&resource.id)),
                Cell::new(StatusIcon::get_resource_icon(&resource.id))
                    .fg(self.theme.get_id_color(&resource.id))
                    .set_alignment(CellAlignment::Center),
            ]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ {}/{} {} ─╮\n",
            project.color(table_color_to_colored_str(self.theme.info)),
            stack,
            format!("[{} resources]", resources.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output.push('\n');
        output.push_str(&format!(
            "Legend: {} Provisioned  {} Pending\n",
            StatusIcon::SUCCESS.green(),
            StatusIcon::PENDING.bright_black()
        ));

        output
    }

    /// Render stack outputs; multi-line values are summarized
    pub fn render_outputs(&self, outputs: &BTreeMap<String, String>) -> String {
        if outputs.is_empty() {
            return "No stack outputs".to_string();
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("OUTPUT").set_alignment(CellAlignment::Left),
                Cell::new("VALUE").set_alignment(CellAlignment::Left),
            ]);

        for (name, value) in outputs {
            let cell = if value.is_empty() {
                Cell::new(format!("{} (empty)", StatusIcon::WARNING)).fg(self.theme.warning)
            } else {
                Cell::new(summarize_value(value))
            };
            table.add_row(vec![Cell::new(name).fg(self.theme.info), cell]);
        }

        let mut output = String::new();
        output.push_str(&format!(
            "╭─ Outputs {} ─╮\n",
            format!("[{}]", outputs.len()).bright_black()
        ));
        output.push_str(&table.to_string());
        output
    }
}

/// Shortens a value for a table cell.
pub fn summarize_value(value: &str) -> String {
    let lines = value.lines().count();
    if lines > 1 {
        return format!("<{} lines>", lines);
    }

    if value.chars().count() > MAX_VALUE_WIDTH {
        let head: String = value.chars().take(MAX_VALUE_WIDTH - 1).collect();
        return format!("{}…", head);
    }

    value.to_string()
}
