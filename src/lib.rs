//! i18n-site-tools
//!
//! 多言語マーケティングサイトのためのロケール整合ツール群:
//! ロケールツリーの照合・分類・マージ・カバレッジ集計と、
//! リードフォーム送信パイプライン

pub mod classify;
pub mod cli;
pub mod config;
pub mod coverage;
pub mod forms;
pub mod glossary;
pub mod locale;
pub mod merge;
pub mod reconcile;
pub mod report;
pub mod types;

// よく使う型を再エクスポート
pub use classify::{
    ClassificationLabel,
    Classifier,
};
pub use glossary::Glossary;
pub use merge::{
    MergePolicy,
    Merger,
};
pub use reconcile::Reconciler;
pub use types::KeyPath;
