//! LayoutView - NTFS file layout inspector
//!
//! Asks the filesystem how a single file is laid out on disk and presents the
//! answer as a tree of name/value facts.
//!
//! # Features
//!
//! - **Layout Walker**: decodes `FSCTL_QUERY_FILE_LAYOUT` pages into names,
//!   streams, extents and timestamps
//! - **Allocated Ranges**: enumerates the populated regions of sparse files
//! - **Layout Tree**: node store with selection, expansion and sorting
//!
//! # Example
//!
//! ```no_run
//! use layoutview::{LayoutInspector, LayoutTree};
//!
//! fn main() -> layoutview::Result<()> {
//!     let mut tree = LayoutTree::new();
//!     LayoutInspector::new(r"C:\Windows\notepad.exe").inspect(&mut tree)?;
//!
//!     for id in tree.children(None) {
//!         if let Some(node) = tree.find(id) {
//!             println!("{}: {}", node.name, node.value);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod format;
pub mod inspector;
pub mod layout_tree;
pub mod logging;
pub mod ntfs;
pub mod settings;

// Re-export main types
pub use error::{LayoutError, Result};
pub use format::{format_grouped, format_reference, format_size};
pub use inspector::{LayoutConfig, LayoutInspector};
pub use layout_tree::{Column, LayoutNode, LayoutTree, NodeId, SortKey, SortOrder};
pub use ntfs::{AllocatedRange, LayoutSource, MetadataOptimization, PageStatus, WalkStats};
pub use settings::Settings;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
