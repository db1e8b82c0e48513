//! Canonical serializer

use crate::node::StoryNode;
use std::io::{self, Write};

/// Write the canonical text of a story
///
/// Emits `(<kind>`, raw lines verbatim, attributes as `  <key> = <value>` in
/// key order, children in order, then `)<kind>`. Uses an explicit stack, so
/// arbitrarily deep trees are safe.
///
/// # Errors
/// Propagates errors from the writer.
pub fn write_story<W: Write>(node: &StoryNode, out: &mut W) -> io::Result<()> {
    let mut stack: Vec<(&StoryNode, usize)> = Vec::new();
    write_head(node, out)?;
    stack.push((node, 0));

    while let Some(top) = stack.last_mut() {
        let (current, index) = *top;
        if let Some(child) = current.children().get(index) {
            top.1 += 1;
            write_head(child, out)?;
            stack.push((child, 0));
        } else {
            writeln!(out, "){}", current.kind())?;
            stack.pop();
        }
    }
    Ok(())
}

fn write_head<W: Write>(node: &StoryNode, out: &mut W) -> io::Result<()> {
    writeln!(out, "({}", node.kind())?;
    for line in node.lines() {
        writeln!(out, "{line}")?;
    }
    for (key, value) in node.attributes() {
        writeln!(out, "  {key} = {value}")?;
    }
    Ok(())
}
