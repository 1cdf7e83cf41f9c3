//! Layout Inspector
//!
//! Orchestrates one inspection: resolve the file and its volume, fetch the
//! metadata optimization counters, then run the layout walker into a tree.

use crate::error::{LayoutError, Result};
use crate::layout_tree::LayoutTree;
use crate::ntfs::layout::{LayoutSource, LayoutWalker, WalkStats, DEFAULT_LAYOUT_BUFFER_SIZE};
use crate::ntfs::ranges::{scan_allocated_ranges, AllocatedRangeSource};
use crate::ntfs::structs::{QueryFileLayoutInput, QUERY_FILE_LAYOUT_INCLUDE_ALL};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::time::{Duration, Instant};

// ============================================================================
// Inspector Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// Response buffer size for each page
    pub buffer_size: usize,
    /// `QUERY_FILE_LAYOUT_INCLUDE_*` flags
    pub include_flags: u32,
    /// Ask for the metadata optimization counters
    pub query_metadata_optimization: bool,
    /// Show a spinner while the query runs
    pub show_progress: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_LAYOUT_BUFFER_SIZE,
            include_flags: QUERY_FILE_LAYOUT_INCLUDE_ALL,
            query_metadata_optimization: true,
            show_progress: false,
        }
    }
}

/// Status line shown when an enumeration fails
pub fn status_message(err: &LayoutError) -> String {
    format!("Unable to query file layout information:\n{}", err)
}

// ============================================================================
// Layout Inspector
// ============================================================================

pub struct LayoutInspector {
    path: String,
    config: LayoutConfig,
}

impl LayoutInspector {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            config: LayoutConfig::default(),
        }
    }

    pub fn with_config(mut self, config: LayoutConfig) -> Self {
        self.config = config;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Inspect the file on its own volume.
    ///
    /// Nodes decoded before a failure stay in `tree`.
    #[cfg(windows)]
    pub fn inspect(&self, tree: &mut LayoutTree) -> Result<WalkStats> {
        let mut source = crate::ntfs::winapi::VolumeLayoutSource::open(&self.path)?;
        self.inspect_with(&mut source, tree)
    }

    #[cfg(not(windows))]
    pub fn inspect(&self, _tree: &mut LayoutTree) -> Result<WalkStats> {
        Err(LayoutError::NotSupported(self.path.clone()))
    }

    /// Run the enumeration against any layout source
    pub fn inspect_with<S: LayoutSource + ?Sized>(
        &self,
        source: &mut S,
        tree: &mut LayoutTree,
    ) -> Result<WalkStats> {
        let start = Instant::now();
        let reference_number = source.file_reference_number()?;

        let optimization = if self.config.query_metadata_optimization {
            source.metadata_optimization().unwrap_or_else(|| {
                warn!("metadata optimization counters unavailable for {}", self.path);
                Default::default()
            })
        } else {
            Default::default()
        };

        let progress = self.spinner();
        let input = QueryFileLayoutInput::for_file(reference_number, self.config.include_flags);
        let result = LayoutWalker::new(tree, optimization).run(source, input, self.config.buffer_size);

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        match &result {
            Ok(stats) => info!(
                "{}: {} entries, {} names, {} streams in {:.2?}",
                self.path,
                stats.entries,
                stats.names,
                stats.streams,
                start.elapsed()
            ),
            Err(e) => warn!("{}: {}", self.path, e),
        }

        result
    }

    /// Report every allocated range of the file
    #[cfg(windows)]
    pub fn allocated_ranges<F>(&self, callback: F) -> Result<u64>
    where
        F: FnMut(u64, u64) -> bool,
    {
        let mut source = crate::ntfs::winapi::FileRangeSource::open(&self.path)?;
        self.allocated_ranges_with(&mut source, callback)
    }

    #[cfg(not(windows))]
    pub fn allocated_ranges<F>(&self, _callback: F) -> Result<u64>
    where
        F: FnMut(u64, u64) -> bool,
    {
        Err(LayoutError::NotSupported(self.path.clone()))
    }

    pub fn allocated_ranges_with<S, F>(&self, source: &mut S, callback: F) -> Result<u64>
    where
        S: AllocatedRangeSource + ?Sized,
        F: FnMut(u64, u64) -> bool,
    {
        let count = scan_allocated_ranges(source, callback)?;
        info!("{}: {} allocated ranges", self.path, count);
        Ok(count)
    }

    fn spinner(&self) -> Option<ProgressBar> {
        if !self.config.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Querying layout of {}", self.path));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}
