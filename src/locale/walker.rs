//! Key-Path Walker over locale documents.
//!
//! ロケールドキュメントの全リーフを (KeyPath, 値) ペアとして深さ優先で列挙する。

use serde_json::Value;

use crate::types::KeyPath;

/// A leaf yielded by [`LeafWalker`].
#[derive(Debug, Clone)]
pub struct Leaf<'doc> {
    /// Position of the leaf within the document.
    pub path: KeyPath,
    /// The leaf value itself.
    pub value: &'doc Value,
}

impl<'doc> Leaf<'doc> {
    /// The leaf's string content, if it is a translatable text leaf.
    ///
    /// Numbers, booleans and nulls return `None`; they are preserved
    /// verbatim on write-back and never classified.
    #[must_use]
    pub fn text(&self) -> Option<&'doc str> {
        self.value.as_str()
    }
}

/// Depth-first iterator over every leaf of a JSON tree.
///
/// Objects are visited in document key order (`serde_json` with
/// `preserve_order`), arrays element-wise with index segments, so the
/// sequence is deterministic for a given input. The iterator is finite and
/// restartable: call [`walk_leaves`] again for a fresh pass.
#[derive(Debug)]
pub struct LeafWalker<'doc> {
    /// Pending subtrees, pushed in reverse so pops follow document order.
    stack: Vec<(KeyPath, &'doc Value)>,
}

/// Enumerates every leaf of `document` depth-first.
#[must_use]
pub fn walk_leaves(document: &Value) -> LeafWalker<'_> {
    LeafWalker { stack: vec![(KeyPath::root(), document)] }
}

impl<'doc> Iterator for LeafWalker<'doc> {
    type Item = Leaf<'doc>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((path, value)) = self.stack.pop() {
            match value {
                Value::Object(map) => {
                    for (key, child) in map.iter().rev() {
                        self.stack.push((path.child(key), child));
                    }
                }
                Value::Array(items) => {
                    for (index, child) in items.iter().enumerate().rev() {
                        self.stack.push((path.index(index), child));
                    }
                }
                _ => return Some(Leaf { path, value }),
            }
        }
        None
    }
}

/// Counts the translatable (string) leaves of a document.
///
/// This is the coverage denominator: it is always taken from the reference
/// document so a target missing whole sections scores down instead of
/// simply not being counted.
#[must_use]
pub fn count_translatable_leaves(document: &Value) -> usize {
    walk_leaves(document).filter(|leaf| leaf.text().is_some()).count()
}
