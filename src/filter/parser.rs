//! # Selection Expression Parser
//!
//! Grammar:
//!
//! ```text
//! expr := term (',' term)*
//! term := identifier ['(' expr ')']
//! ```
//!
//! Whitespace is insignificant. `*` alone selects everything.
//! Bracket balance is validated before any parsing happens.

use std::str::FromStr;

use super::errors::{FilterError, FilterResult};
use super::tree::{FilterNode, FilterTree};

const OPEN: u8 = b'(';
const CLOSE: u8 = b')';
const SEPARATOR: u8 = b',';

/// Check that every `(` has a matching `)` and no `)` comes first
pub fn validate(expression: &str) -> FilterResult<()> {
    let mut depth: usize = 0;

    for (position, byte) in expression.bytes().enumerate() {
        match byte {
            OPEN => depth += 1,
            CLOSE => {
                if depth == 0 {
                    return Err(FilterError::UnexpectedClose(position));
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(FilterError::UnclosedGroup(depth));
    }
    Ok(())
}

/// Parse a selection expression into a filter tree
pub fn parse(expression: &str) -> FilterResult<FilterTree> {
    validate(expression)?;

    let compact: String = expression.chars().filter(|c| !c.is_whitespace()).collect();
    if compact == "*" {
        return Ok(FilterTree::wildcard());
    }
    if compact.is_empty() {
        return Ok(FilterTree::new());
    }

    let (nodes, _) = parse_terms(&compact, 0);
    Ok(FilterTree::from_nodes(nodes))
}

/// Scan terms starting at `start` until a closing bracket or the end.
///
/// Returns the parsed siblings and the index just past the `)` that ended
/// this group (or the input length at top level).
fn parse_terms(input: &str, start: usize) -> (Vec<FilterNode>, usize) {
    let bytes = input.as_bytes();
    let mut nodes = Vec::new();
    let mut token_start = start;
    let mut i = start;

    while i < bytes.len() {
        match bytes[i] {
            OPEN => {
                let value = &input[token_start..i];
                let (children, next) = parse_terms(input, i + 1);
                // A group with no name selects nothing
                if !value.is_empty() {
                    nodes.push(FilterNode {
                        value: value.to_string(),
                        children: FilterTree::from_nodes(children),
                    });
                }
                i = next;
                token_start = next;
                continue;
            }
            SEPARATOR => {
                push_leaf(&mut nodes, &input[token_start..i]);
                token_start = i + 1;
            }
            CLOSE => {
                push_leaf(&mut nodes, &input[token_start..i]);
                return (nodes, i + 1);
            }
            _ => {}
        }
        i += 1;
    }

    if token_start < bytes.len() {
        push_leaf(&mut nodes, &input[token_start..]);
    }
    (nodes, bytes.len())
}

fn push_leaf(nodes: &mut Vec<FilterNode>, token: &str) {
    if !token.is_empty() {
        nodes.push(FilterNode::leaf(token));
    }
}

impl FromStr for FilterTree {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
