//! Markdown Exporter
//!
//! Formats a [`FunctionDoc`] and its caller/callee outlines as Markdown.

use crate::domain::document::FunctionDoc;
use crate::domain::tree::OutlineEntry;
use crate::ports::DocumentRenderer;

const UNKNOWN: &str = "不明";
const NONE_ENTRY: &str = "- なし";

pub struct MarkdownExporter;

impl MarkdownExporter {
    /// Outline entries as a nested bullet list, two spaces per level.
    pub fn outline_lines(entries: &[OutlineEntry]) -> Vec<String> {
        if entries.is_empty() {
            return vec![NONE_ENTRY.to_string()];
        }
        entries
            .iter()
            .map(|entry| {
                let indent = "  ".repeat(entry.depth);
                match (entry.is_summary(), entry.annotation) {
                    (true, Some(annotation)) => format!("{}- ({})", indent, annotation),
                    (_, Some(annotation)) => format!("{}- {} ({})", indent, entry.label, annotation),
                    (_, None) => format!("{}- {}", indent, entry.label),
                }
            })
            .collect()
    }
}

impl DocumentRenderer for MarkdownExporter {
    fn render_function(&self, doc: &FunctionDoc) -> String {
        let mut lines: Vec<String> = Vec::new();

        if !doc.name.is_empty() {
            lines.push(format!("# {}", doc.name));
            lines.push(String::new());
        }

        push_text_section(&mut lines, "## 目的", &doc.purpose);
        push_text_section(&mut lines, "## 概要", &doc.summary);

        if !doc.arguments.is_empty() {
            lines.push("## 引数".to_string());
            lines.push(String::new());
            for (n, arg) in doc.arguments.iter().enumerate() {
                lines.push(format!("### 引数 {}", n + 1));
                if !arg.name.is_empty() {
                    lines.push(format!("- 名前: {}", arg.name));
                }
                if !arg.ty.is_empty() {
                    lines.push(format!("- 型: {}", arg.ty));
                }
                if !arg.description.is_empty() {
                    lines.push(format!("- 説明: {}", arg.description));
                }
                lines.push(String::new());
            }
        }

        if let Some(rv) = doc.return_value.as_ref().filter(|rv| !rv.is_empty()) {
            lines.push("## 戻り値".to_string());
            lines.push(String::new());
            if !rv.ty.is_empty() {
                lines.push(format!("- 型: {}", rv.ty));
            }
            if !rv.description.is_empty() {
                lines.push(format!("- 説明: {}", rv.description));
            }
            lines.push(String::new());
        }

        let remarks = remark_bullets(&doc.remarks);
        if !remarks.is_empty() {
            lines.push("## 備考".to_string());
            lines.push(String::new());
            lines.extend(remarks);
            lines.push(String::new());
        }

        if !doc.steps.is_empty() {
            lines.push("## 処理の流れ".to_string());
            lines.push(String::new());
            for (n, step) in doc.steps.iter().enumerate() {
                lines.push(format!("{}. {}", n + 1, step));
            }
            lines.push(String::new());
        }

        if !doc.queries.is_empty() {
            lines.push("## データベースクエリ".to_string());
            lines.push(String::new());
            for (n, query) in doc.queries.iter().enumerate() {
                lines.push(format!("### クエリ {}", n + 1));
                lines.push(String::new());
                lines.push("説明:".to_string());
                lines.push(or_unknown(&query.description).to_string());
                lines.push(String::new());
                lines.push("擬似SQL:".to_string());
                lines.push(or_unknown(&query.pseudo_sql).to_string());
                lines.push(String::new());
            }
        }

        while lines.last().is_some_and(|line| line.is_empty()) {
            lines.pop();
        }
        lines.join("\n")
    }

    fn render_dependencies(&self, callers: &[OutlineEntry], callees: &[OutlineEntry]) -> String {
        let mut lines = vec!["## Caller".to_string(), String::new()];
        lines.extend(Self::outline_lines(callers));
        lines.push(String::new());
        lines.push("## Callee".to_string());
        lines.push(String::new());
        lines.extend(Self::outline_lines(callees));
        lines.join("\n")
    }
}

fn push_text_section(lines: &mut Vec<String>, heading: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    lines.push(heading.to_string());
    lines.push(String::new());
    lines.extend(text.lines().map(|line| line.trim_end().to_string()));
    lines.push(String::new());
}

fn remark_bullets(remarks: &str) -> Vec<String> {
    remarks
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            if line.starts_with("- ") {
                line.to_string()
            } else if let Some(rest) = line.strip_prefix('-') {
                format!("- {}", rest.trim())
            } else {
                format!("- {}", line)
            }
        })
        .collect()
}

fn or_unknown(text: &str) -> &str {
    if text.is_empty() {
        UNKNOWN
    } else {
        text
    }
}
