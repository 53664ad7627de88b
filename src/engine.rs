use std::fs::File;
use std::path::Path;
use std::time::Instant;

use memmap2::Mmap;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{AggregateError, Result};
use crate::merge::{merge_tables, MergedResult};
use crate::scanner::LineScanner;
use crate::segment::{plan_segments_with, Segment, MIN_SEGMENT_SIZE, SNAP_LOOKAHEAD};
use crate::table::{AggregationTable, DEFAULT_CAPACITY, DEFAULT_MAX_CAPACITY};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub parallelism: usize,
    pub min_segment_size: usize,
    pub snap_lookahead: usize,
    pub table_capacity: usize,
    pub max_table_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

impl EngineConfig {
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism: parallelism.max(1),
            min_segment_size: MIN_SEGMENT_SIZE,
            snap_lookahead: SNAP_LOOKAHEAD,
            table_capacity: DEFAULT_CAPACITY,
            max_table_capacity: DEFAULT_MAX_CAPACITY,
        }
    }

    pub fn with_min_segment_size(mut self, min_segment_size: usize) -> Self {
        self.min_segment_size = min_segment_size;
        self
    }

    pub fn with_snap_lookahead(mut self, snap_lookahead: usize) -> Self {
        self.snap_lookahead = snap_lookahead;
        self
    }

    pub fn with_table_capacity(mut self, capacity: usize, max_capacity: usize) -> Self {
        self.table_capacity = capacity;
        self.max_table_capacity = max_capacity;
        self
    }
}

/// One aggregation run's context: its settings and the worker pool that
/// scans segments. Every shard table is owned by the task that fills it.
pub struct Engine {
    config: EngineConfig,
    pool: rayon::ThreadPool,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.parallelism)
            .build()
            .map_err(|e| AggregateError::ThreadPool(e.to_string()))?;
        Ok(Self { config, pool })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Maps `path` read-only and aggregates it.
    pub fn process_file<P: AsRef<Path>>(&self, path: P) -> Result<MergedResult> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(MergedResult::default());
        }
        // SAFETY: the mapping is read-only and the file is not modified during the run.
        let mmap = unsafe { Mmap::map(&file)? };
        self.aggregate(&mmap)
    }

    /// Plans segments, scans them in parallel and merges the shard tables.
    /// Any shard failure fails the whole run.
    pub fn aggregate(&self, data: &[u8]) -> Result<MergedResult> {
        let started = Instant::now();
        let segments = plan_segments_with(
            data,
            self.config.parallelism,
            self.config.min_segment_size,
            self.config.snap_lookahead,
        )?;

        let merged = self.pool.install(|| {
            let tables = segments
                .par_iter()
                .map(|segment| self.scan_segment(data, *segment))
                .collect::<Result<Vec<_>>>()?;
            merge_tables(tables)
        })?;

        info!(
            bytes = data.len(),
            segments = segments.len(),
            stations = merged.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "aggregation finished"
        );
        Ok(merged)
    }

    fn scan_segment(&self, data: &[u8], segment: Segment) -> Result<AggregationTable> {
        let mut table = AggregationTable::with_capacity(
            self.config.table_capacity,
            self.config.max_table_capacity,
        );
        let mut records = 0u64;
        for record in LineScanner::for_segment(data, segment) {
            let record = record?;
            table.put_or_merge(record.key, record.hash, record.temperature)?;
            records += 1;
        }
        debug!(
            start = segment.start,
            end = segment.end,
            records,
            stations = table.len(),
            "scanned segment"
        );
        Ok(table)
    }
}
