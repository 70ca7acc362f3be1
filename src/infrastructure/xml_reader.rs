//! XML Documentation Reader
//!
//! Parses `<function>` documentation records with quick-xml into a small
//! element tree, then extracts the fields of a [`FunctionDoc`].

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use crate::domain::document::{Argument, FunctionDoc, Query, ReturnValue};
use crate::error::{ConvertError, Result};
use crate::ports::DocumentParser;

/// A value consisting of exactly one `<...>` token.
static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<[^<>]+>$").expect("valid regex"));

pub const ROOT_TAG: &str = "function";

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Element {
    tag: String,
    children: Vec<Node>,
}

impl Element {
    fn new(tag: String) -> Self {
        Self {
            tag,
            children: Vec::new(),
        }
    }

    /// First direct child element named `tag`.
    fn find(&self, tag: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(e) if e.tag == tag => Some(e),
            _ => None,
        })
    }

    /// All direct child elements named `tag`, in document order.
    fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(e) if e.tag == tag => Some(e),
            _ => None,
        })
    }

    /// All descendant text in document order.
    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }
}

fn parse_tree(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                stack.push(Element::new(tag));
            }
            Event::Empty(empty) => {
                let tag = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
                let element = Element::new(tag);
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(element)),
                    None => return Ok(element),
                }
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(ConvertError::Incomplete("unexpected closing tag".to_string()));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(Node::Element(element)),
                    None => return Ok(element),
                }
            }
            Event::Text(text) => {
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(Node::Text(text.unescape()?.into_owned()));
                }
            }
            Event::CData(cdata) => {
                if let Some(parent) = stack.last_mut() {
                    let raw = cdata.into_inner();
                    parent
                        .children
                        .push(Node::Text(String::from_utf8_lossy(&raw).into_owned()));
                }
            }
            Event::Eof => {
                return Err(ConvertError::Incomplete(match stack.last() {
                    Some(open) => format!("unclosed element <{}>", open.tag),
                    None => "no root element".to_string(),
                }));
            }
            // Declarations, comments, processing instructions, doctypes.
            _ => {}
        }
    }
}

/// Normalised text content of an optional node.
fn extract_text(node: Option<&Element>) -> String {
    let Some(node) = node else {
        return String::new();
    };
    let mut raw = String::new();
    node.collect_text(&mut raw);
    normalize_text(&raw)
}

/// Line endings to LF, common indentation removed, trimmed, `<token>` unwrapped.
pub fn normalize_text(raw: &str) -> String {
    let unified = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = dedent(&unified);
    let text = text.trim();
    if BRACKETED.is_match(text) {
        text[1..text.len() - 1].trim().to_string()
    } else {
        text.to_string()
    }
}

/// Remove the longest common leading whitespace from every non-blank line.
/// Whitespace-only lines are emptied.
fn dedent(text: &str) -> String {
    let mut margin: Option<&str> = None;
    for line in text.split('\n') {
        if line.trim_matches(|c| c == ' ' || c == '\t').is_empty() {
            continue;
        }
        let indent_len = line.len() - line.trim_start_matches(|c| c == ' ' || c == '\t').len();
        let indent = &line[..indent_len];
        margin = Some(match margin {
            None => indent,
            Some(current) => common_prefix(current, indent),
        });
    }
    let margin = margin.unwrap_or("");

    text.split('\n')
        .map(|line| {
            if line.trim_matches(|c| c == ' ' || c == '\t').is_empty() {
                ""
            } else {
                line.strip_prefix(margin).unwrap_or(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn common_prefix<'a>(a: &'a str, b: &str) -> &'a str {
    let len = a
        .bytes()
        .zip(b.bytes())
        .take_while(|(x, y)| x == y)
        .count();
    &a[..len]
}

/// Build a [`FunctionDoc`] from an XML string.
pub fn parse_function_doc(xml: &str) -> Result<FunctionDoc> {
    let root = parse_tree(xml)?;
    if root.tag != ROOT_TAG {
        return Err(ConvertError::UnexpectedRoot(root.tag));
    }

    let arguments = root
        .find("arguments")
        .map(|args| {
            args.find_all("arg")
                .map(|arg| Argument {
                    name: extract_text(arg.find("name")),
                    ty: extract_text(arg.find("type")),
                    description: extract_text(arg.find("description")),
                })
                .collect()
        })
        .unwrap_or_default();

    let return_value = root.find("return-value").map(|rv| ReturnValue {
        ty: extract_text(rv.find("type")),
        description: extract_text(rv.find("description")),
    });

    let steps = root
        .find("process-flow")
        .map(|flow| {
            flow.find_all("step")
                .map(|step| extract_text(Some(step)))
                .filter(|step| !step.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let queries = root
        .find("database-queries")
        .map(|queries| {
            queries
                .find_all("query")
                .map(|query| Query {
                    description: extract_text(query.find("description")),
                    pseudo_sql: extract_text(query.find("pseudo-sql")),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(FunctionDoc {
        name: extract_text(root.find("name")),
        purpose: extract_text(root.find("purpose")),
        summary: extract_text(root.find("summary")),
        arguments,
        return_value,
        remarks: extract_text(root.find("remarks")),
        steps,
        queries,
    })
}

pub struct XmlDocumentParser;

impl DocumentParser for XmlDocumentParser {
    fn parse(&self, path: &Path) -> Result<FunctionDoc> {
        let xml = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
        parse_function_doc(&xml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<function>
    <name>open_session</name>
    <purpose>
        Opens a session.
        Retries once on timeout.
    </purpose>
    <arguments>
        <arg><name>host</name><type>&lt;char *&gt;</type><description>Target host</description></arg>
        <arg><name>port</name></arg>
    </arguments>
    <return-value><type>int</type></return-value>
    <!-- reviewer note -->
    <process-flow>
        <step>Resolve host</step>
        <step>   </step>
        <step><![CDATA[Connect & <handshake>]]></step>
    </process-flow>
    <database-queries>
        <query><pseudo-sql>SELECT 1</pseudo-sql></query>
    </database-queries>
</function>
"#;

    #[test]
    fn test_parse_sample_document() {
        let doc = parse_function_doc(SAMPLE).unwrap();
        assert_eq!(doc.name, "open_session");
        assert_eq!(doc.purpose, "Opens a session.\nRetries once on timeout.");
        assert_eq!(doc.summary, "");
        assert_eq!(doc.arguments.len(), 2);
        assert_eq!(doc.arguments[0].ty, "char *");
        assert_eq!(doc.arguments[1].description, "");
        assert_eq!(doc.return_value.as_ref().unwrap().ty, "int");
        assert_eq!(doc.steps, vec!["Resolve host", "Connect & <handshake>"]);
        assert_eq!(doc.queries[0].description, "");
        assert_eq!(doc.queries[0].pseudo_sql, "SELECT 1");
    }

    #[test]
    fn test_wrong_root_rejected() {
        let err = parse_function_doc("<module><name>x</name></module>").unwrap_err();
        assert!(matches!(err, ConvertError::UnexpectedRoot(tag) if tag == "module"));
    }

    #[test]
    fn test_truncated_document_rejected() {
        let err = parse_function_doc("<function><name>x</name>").unwrap_err();
        assert!(matches!(err, ConvertError::Incomplete(_)));
        assert!(parse_function_doc("").is_err());
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("\r\n    a\r\n      b\r\n"), "a\n  b");
        assert_eq!(normalize_text("  <int>  "), "int");
        assert_eq!(normalize_text("<a> and <b>"), "<a> and <b>");
        assert_eq!(normalize_text("x\n   \ny"), "x\n\ny");
    }

    #[test]
    fn test_nested_text_is_concatenated() {
        let doc = parse_function_doc("<function><summary>Calls <b>fast</b> path</summary></function>")
            .unwrap();
        assert_eq!(doc.summary, "Calls fast path");
    }
}
