//! Locale document loading, persistence and leaf enumeration.

/// Locale document type and path-convention detection
mod document;
/// Key-path walker over document trees
mod walker;

pub use document::{
    DocumentError,
    LocaleDocument,
    detect_language_from_path,
    detect_namespace_from_path,
};
pub use walker::{
    Leaf,
    LeafWalker,
    count_translatable_leaves,
    walk_leaves,
};
