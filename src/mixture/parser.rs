//! Reads results files back into [`MixtureBlock`]s.
//!
//! The text is a brace-nested node format: a bare word names a node, the
//! following `{ ... }` holds its `name = value` pairs and child nodes. Blocks
//! appended by consecutive runs touch (`}MixtureRatioData`), so braces are
//! treated as separators anywhere on a line.

use crate::error::{PropMixError, Result};
use crate::mixture::block::{
    MixtureBlock, BLOCK_NODE, PRESSURE_NODE, RATIO_KEY, ROW_KEY, ROW_WIDTH,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigNode {
    pub name: String,
    pub values: Vec<(String, String)>,
    pub nodes: Vec<ConfigNode>,
    /// 1-based line the node name appeared on.
    pub line: usize,
}

impl ConfigNode {
    fn new(name: String, line: usize) -> Self {
        Self {
            name,
            line,
            ..Self::default()
        }
    }

    pub fn get_value(&self, name: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_values(&self, name: &str) -> Vec<&str> {
        self.values
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn get_node(&self, name: &str) -> Option<&ConfigNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

enum Segment<'a> {
    Open,
    Close,
    Text(&'a str),
}

fn split_braces(line: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut start = 0;

    for (i, c) in line.char_indices() {
        if c == '{' || c == '}' {
            segments.push(Segment::Text(&line[start..i]));
            segments.push(if c == '{' {
                Segment::Open
            } else {
                Segment::Close
            });
            start = i + 1;
        }
    }
    segments.push(Segment::Text(&line[start..]));

    segments
}

/// Parses the node structure of `text`, returning the top-level nodes.
pub fn parse_nodes(text: &str) -> Result<Vec<ConfigNode>> {
    let mut stack = vec![ConfigNode::default()];
    let mut pending: Option<(String, usize)> = None;
    let mut last_line = 0;

    for (index, raw_line) in text.lines().enumerate() {
        let line_no = index + 1;
        last_line = line_no;
        let line = match raw_line.find("//") {
            Some(pos) => &raw_line[..pos],
            None => raw_line,
        };

        for segment in split_braces(line) {
            match segment {
                Segment::Open => {
                    let (name, opened_at) = pending.take().ok_or(PropMixError::BlockParse {
                        line: line_no,
                        message: "'{' without a node name".to_string(),
                    })?;
                    stack.push(ConfigNode::new(name, opened_at));
                }
                Segment::Close => {
                    if let Some((name, _)) = pending.take() {
                        return Err(PropMixError::BlockParse {
                            line: line_no,
                            message: format!("expected '{{' after {}", name),
                        });
                    }
                    if stack.len() < 2 {
                        return Err(PropMixError::BlockParse {
                            line: line_no,
                            message: "unbalanced '}'".to_string(),
                        });
                    }
                    if let Some(node) = stack.pop() {
                        if let Some(parent) = stack.last_mut() {
                            parent.nodes.push(node);
                        }
                    }
                }
                Segment::Text(segment) => {
                    let segment = segment.trim();
                    if segment.is_empty() {
                        continue;
                    }
                    if let Some((name, _)) = pending.take() {
                        return Err(PropMixError::BlockParse {
                            line: line_no,
                            message: format!("expected '{{' after {}", name),
                        });
                    }
                    match segment.split_once('=') {
                        Some((key, value)) => {
                            if let Some(node) = stack.last_mut() {
                                node.values
                                    .push((key.trim().to_string(), value.trim().to_string()));
                            }
                        }
                        None => pending = Some((segment.to_string(), line_no)),
                    }
                }
            }
        }
    }

    if let Some((name, line)) = pending {
        return Err(PropMixError::BlockParse {
            line,
            message: format!("node {} has no body", name),
        });
    }

    if stack.len() > 1 {
        let open = &stack[stack.len() - 1];
        return Err(PropMixError::BlockParse {
            line: last_line,
            message: format!("node {} opened at line {} is not closed", open.name, open.line),
        });
    }

    Ok(stack.pop().map(|root| root.nodes).unwrap_or_default())
}

/// Splits a `key` value the way engine configs read pressure rows.
pub fn split_row(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn block_from_node(node: &ConfigNode) -> Result<MixtureBlock> {
    let of_ratio = node.get_value(RATIO_KEY).ok_or(PropMixError::BlockParse {
        line: node.line,
        message: format!("{} has no {}", BLOCK_NODE, RATIO_KEY),
    })?;

    let pressure = node.get_node(PRESSURE_NODE).ok_or(PropMixError::BlockParse {
        line: node.line,
        message: format!(
            "{} at {} = {} has no {}",
            BLOCK_NODE, RATIO_KEY, of_ratio, PRESSURE_NODE
        ),
    })?;

    let mut keys = Vec::new();
    for (row, value) in pressure.get_values(ROW_KEY).into_iter().enumerate() {
        let fields = split_row(value);
        if fields.len() != ROW_WIDTH {
            return Err(PropMixError::BlockParse {
                line: pressure.line,
                message: format!(
                    "row {} at {} = {} has {} values, expected {}",
                    row, RATIO_KEY, of_ratio, fields.len(), ROW_WIDTH
                ),
            });
        }
        keys.push(fields);
    }

    Ok(MixtureBlock {
        of_ratio: of_ratio.to_string(),
        keys,
    })
}

/// Parses every `MixtureRatioData` block in a results file.
pub fn parse_blocks(text: &str) -> Result<Vec<MixtureBlock>> {
    parse_nodes(text)?
        .iter()
        .map(|node| {
            if node.name != BLOCK_NODE {
                return Err(PropMixError::BlockParse {
                    line: node.line,
                    message: format!("unexpected node {}", node.name),
                });
            }
            block_from_node(node)
        })
        .collect()
}
