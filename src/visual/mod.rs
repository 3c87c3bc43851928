//! Human readable dumps of trees and rings.
//!
//! Tree dumps nest internal nodes with box drawing branches:
//!
//! ```text
//! Internal Node [Hash: f150e850...]
//! ├── Left:
//! │   Leaf Node:
//! │   ├── Data: x
//! │   └── Hash: 2d711642...
//! └── Right:
//!     Leaf Node:
//!     ├── Data: y
//!     └── Hash: a1fce436...
//! ```
//!
//! Ring dumps print one `Node(...)` line per member.  With
//! [`VisualOptions::color`] set, every digest is wrapped in a 24-bit ANSI colour
//! taken from its first three bytes.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::hash::Digest;
use crate::merkle::{Node, Tree};
use crate::ring::{Ring, RingNode};

const LEAF_DATA_CHARS: usize = 20;
const RING_DATA_CHARS: usize = 10;
const RING_HASH_CHARS: usize = 6;
const ANSI_RESET: &str = "\x1b[0m";

/// Rendering knobs shared by tree and ring dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualOptions {
    /// Deepest level rendered; `None` renders the whole tree.
    pub max_depth: Option<usize>,
    /// Number of hex characters shown for tree digests.
    pub prefix_len: usize,
    /// Emit ANSI colour escapes.
    pub color: bool,
    /// Halve colour channels for dark terminals.
    pub dark_mode: bool,
}

impl Default for VisualOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            prefix_len: 8,
            color: false,
            dark_mode: true,
        }
    }
}

/// ANSI foreground escape derived from the digest's first three bytes.
pub fn digest_color(digest: &Digest, dark_mode: bool) -> String {
    let [mut r, mut g, mut b] = [digest.as_bytes()[0], digest.as_bytes()[1], digest.as_bytes()[2]];
    if dark_mode {
        r /= 2;
        g /= 2;
        b /= 2;
    }
    format!("\x1b[38;2;{};{};{}m", r, g, b)
}

fn paint(text: &str, digest: &Digest, options: &VisualOptions) -> String {
    if options.color {
        format!("{}{}{}", digest_color(digest, options.dark_mode), text, ANSI_RESET)
    } else {
        text.to_owned()
    }
}

/// Writes the indented tree dump to `sink`.
pub fn write_tree<W: Write>(sink: &mut W, tree: &Tree, options: &VisualOptions) -> io::Result<()> {
    write_node(sink, tree.root(), "", 0, options)
}

fn write_node<W: Write>(
    sink: &mut W,
    node: &Node,
    prefix: &str,
    depth: usize,
    options: &VisualOptions,
) -> io::Result<()> {
    if options.max_depth.is_some_and(|max| depth > max) {
        return writeln!(sink, "{}...", prefix);
    }
    let hash = paint(
        &format!("{}...", node.digest().short_hex(options.prefix_len)),
        node.digest(),
        options,
    );
    match node {
        Node::Internal(internal) => {
            writeln!(sink, "{}Internal Node [Hash: {}]", prefix, hash)?;
            writeln!(sink, "{}├── Left:", prefix)?;
            write_node(sink, internal.left(), &format!("{}│   ", prefix), depth + 1, options)?;
            if let Some(right) = internal.right() {
                writeln!(sink, "{}└── Right:", prefix)?;
                write_node(sink, right, &format!("{}    ", prefix), depth + 1, options)?;
            }
            Ok(())
        }
        Node::Leaf(leaf) => {
            writeln!(sink, "{}Leaf Node:", prefix)?;
            writeln!(sink, "{}├── Data: {}", prefix, leaf.chunk().preview(LEAF_DATA_CHARS))?;
            writeln!(sink, "{}└── Hash: {}", prefix, hash)
        }
    }
}

/// Writes one line per ring node to `sink`.
pub fn write_ring<W: Write>(sink: &mut W, ring: &Ring, options: &VisualOptions) -> io::Result<()> {
    for node in ring.nodes() {
        writeln!(sink, "{}", paint(&ring_line(node), node.digest(), options))?;
    }
    Ok(())
}

fn ring_line(node: &RingNode) -> String {
    format!(
        "Node(Data: {}, Hash: {}, Next Hash: {})",
        node.chunk().preview(RING_DATA_CHARS),
        node.digest().short_hex(RING_HASH_CHARS),
        node.next_digest().short_hex(RING_HASH_CHARS)
    )
}

fn into_string(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

pub fn render_tree(tree: &Tree, options: &VisualOptions) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write_tree(&mut buf, tree, options);
    into_string(buf)
}

pub fn render_ring(ring: &Ring, options: &VisualOptions) -> String {
    let mut buf = Vec::new();
    let _ = write_ring(&mut buf, ring, options);
    into_string(buf)
}

/// Prints the tree dump to stdout. Write errors are logged, never returned.
pub fn print_tree(tree: &Tree, options: &VisualOptions) {
    let stdout = io::stdout();
    if let Err(err) = write_tree(&mut stdout.lock(), tree, options) {
        warn!(error = %err, "failed to print tree");
    }
}

/// Prints the ring dump to stdout. Write errors are logged, never returned.
pub fn print_ring(ring: &Ring, options: &VisualOptions) {
    let stdout = io::stdout();
    if let Err(err) = write_ring(&mut stdout.lock(), ring, options) {
        warn!(error = %err, "failed to print ring");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;
    use crate::hash::HashAlgorithm;

    fn tree(items: &[&str]) -> Tree {
        Tree::build(
            items.iter().map(|item| Chunk::from(*item)).collect(),
            HashAlgorithm::Sha256,
            Some(1),
        )
        .unwrap()
    }

    #[test]
    fn odd_tree_omits_missing_right_branch() {
        let dump = render_tree(&tree(&["x", "y", "z"]), &VisualOptions::default());
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 17);
        assert!(lines[0].starts_with("Internal Node [Hash: "));
        assert_eq!(lines[1], "├── Left:");
        assert_eq!(lines[4], "│   │   Leaf Node:");
        assert_eq!(lines[5], "│   │   ├── Data: x");
        assert_eq!(lines[7], "│   └── Right:");
        assert_eq!(lines[11], "└── Right:");
        assert_eq!(lines[13], "    ├── Left:");
        assert!(lines[16].starts_with("    │   └── Hash: "));
        assert!(lines[16].ends_with("..."));
        assert_eq!(dump.matches("Right:").count(), 2);
    }

    #[test]
    fn max_depth_truncates() {
        let options = VisualOptions {
            max_depth: Some(0),
            ..VisualOptions::default()
        };
        let dump = render_tree(&tree(&["a", "b"]), &options);
        assert_eq!(dump.lines().collect::<Vec<_>>()[2], "│   ...");
        assert!(!dump.contains("Leaf Node:"));
    }

    #[test]
    fn leaf_data_is_truncated() {
        let dump = render_tree(&tree(&["abcdefghijklmnopqrstuvwxyz"]), &VisualOptions::default());
        assert!(dump.contains("├── Data: abcdefghijklmnopqrst\n"));
    }

    #[test]
    fn colour_follows_digest_prefix() {
        let mut bytes = [0u8; 32];
        bytes[..3].copy_from_slice(&[0xff, 0x80, 0x01]);
        let digest = Digest::from(bytes);
        assert_eq!(digest_color(&digest, false), "\x1b[38;2;255;128;1m");
        assert_eq!(digest_color(&digest, true), "\x1b[38;2;127;64;0m");
    }

    #[test]
    fn ring_lines_use_short_fields() {
        let ring = Ring::build(
            vec![Chunk::from("state-number-one"), Chunk::from("two")],
            HashAlgorithm::Sha256,
        )
        .unwrap();
        let dump = render_ring(&ring, &VisualOptions::default());
        let first = dump.lines().next().unwrap();
        let hash = ring.nodes()[0].digest().short_hex(6);
        let next = ring.nodes()[1].digest().short_hex(6);
        assert_eq!(
            first,
            format!("Node(Data: state-numb, Hash: {hash}, Next Hash: {next})")
        );
    }

    #[test]
    fn coloured_ring_lines_are_reset() {
        let ring = Ring::build(vec![Chunk::from("a")], HashAlgorithm::Sha256).unwrap();
        let options = VisualOptions {
            color: true,
            ..VisualOptions::default()
        };
        let dump = render_ring(&ring, &options);
        assert!(dump.starts_with("\x1b[38;2;"));
        assert!(dump.ends_with("\x1b[0m\n"));
    }
}
