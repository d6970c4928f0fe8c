//! Pretty printer
//!
//! Renders a relation as a two-rule ASCII box: a heading row with the
//! relation name, a header row of column names, and the data region.
//! Text columns align left, numeric columns align right. A grouped
//! cell expands vertically into one physical line per element; scalar
//! cells in the same logical row are vertically centered against the
//! tallest group, and a rule separates logical rows whenever the
//! relation has a grouped column. The overall width grows round-robin
//! across columns until the relation name fits the heading.

use crate::core::types::DataType;
use crate::core::value::Value;

use super::Relation;

struct ColumnPreview {
    name: String,
    align_left: bool,
    /// One entry per logical row, one string per physical line.
    cells: Vec<Vec<String>>,
    width: usize,
}

impl Relation {
    /// Render the relation as a table.
    pub fn format_table(&self) -> String {
        if self.columns.is_empty() {
            return self.format_name_box();
        }

        let mut previews = self.build_previews();
        self.adjust_widths(&mut previews);

        let total: usize = 1 + previews.iter().map(|p| p.width + 3).sum::<usize>();
        let rule: String = {
            let mut line = String::from("+");
            for preview in &previews {
                line.push_str(&"-".repeat(preview.width + 2));
                line.push('+');
            }
            line
        };

        let mut out = String::new();
        // heading
        out.push('+');
        out.push_str(&"-".repeat(total - 2));
        out.push_str("+\n");
        out.push_str(&format!("| {} |\n", center(&self.name, total - 4)));
        // header
        out.push_str(&rule);
        out.push('\n');
        for preview in &previews {
            out.push_str(&format!("| {} ", center(&preview.name, preview.width)));
        }
        out.push_str("|\n");
        out.push_str(&rule);
        out.push('\n');
        // data region
        let separate_rows = self.columns.iter().any(|c| c.signature().is_grouped());
        let rows = self.num_rows();
        for row in 0..rows {
            let height = previews
                .iter()
                .map(|p| p.cells[row].len())
                .max()
                .unwrap_or(1)
                .max(1);
            for line in 0..height {
                for preview in &previews {
                    let lines = &preview.cells[row];
                    let offset = (height - lines.len().min(height)) / 2;
                    let content = if line >= offset && line - offset < lines.len() {
                        lines[line - offset].as_str()
                    } else {
                        ""
                    };
                    out.push_str(&format!(
                        "| {} ",
                        align(content, preview.width, preview.align_left)
                    ));
                }
                out.push_str("|\n");
            }
            if separate_rows && row + 1 < rows {
                out.push_str(&rule);
                out.push('\n');
            }
        }
        // footer
        out.push_str(&rule);
        out.push_str("\n\n");
        out
    }

    /// Write the rendered table to stdout.
    pub fn print(&self) {
        print!("{}", self.format_table());
    }

    /// A relation without columns prints its name box alone.
    fn format_name_box(&self) -> String {
        let width = self.name.len() + 4;
        let rule = format!("+{}+", "-".repeat(width - 2));
        format!("{}\n| {} |\n{}\n", rule, self.name, rule)
    }

    fn build_previews(&self) -> Vec<ColumnPreview> {
        self.columns
            .iter()
            .map(|column| {
                let name = column.signature().name.clone();
                let mut width = name.len();
                let mut cells = Vec::with_capacity(column.num_rows());
                for row in 0..column.num_rows() {
                    let lines = match column.get_row(row) {
                        Ok(value) => cell_lines(value),
                        Err(_) => Vec::new(),
                    };
                    for line in &lines {
                        width = width.max(line.len());
                    }
                    cells.push(lines);
                }
                ColumnPreview {
                    name,
                    align_left: column.signature().data_type == DataType::Text,
                    cells,
                    width,
                }
            })
            .collect()
    }

    /// Widen columns round-robin until the relation name fits the
    /// heading row.
    fn adjust_widths(&self, previews: &mut [ColumnPreview]) {
        let mut total: usize = 1 + previews.iter().map(|p| p.width + 3).sum::<usize>();
        let mut index = 0;
        while self.name.len() + 4 >= total {
            previews[index].width += 1;
            total += 1;
            index = (index + 1) % previews.len();
        }
    }
}

/// Physical lines of one cell: one line for a scalar, one per element
/// for a grouped cell.
fn cell_lines(value: Value) -> Vec<String> {
    match value {
        Value::IntGroup(v) => v.into_iter().map(|x| x.to_string()).collect(),
        Value::FloatGroup(v) => v.into_iter().map(|x| x.to_string()).collect(),
        Value::TextGroup(v) => v,
        scalar => vec![scalar.to_string()],
    }
}

fn center(text: &str, width: usize) -> String {
    if text.len() >= width {
        return text.to_string();
    }
    let back = (width - text.len() + 1) / 2;
    let front = width - text.len() - back;
    format!("{}{}{}", " ".repeat(front), text, " ".repeat(back))
}

fn align(text: &str, width: usize, left: bool) -> String {
    if text.len() >= width {
        return text.to_string();
    }
    let pad = " ".repeat(width - text.len());
    if left {
        format!("{}{}", text, pad)
    } else {
        format!("{}{}", pad, text)
    }
}
