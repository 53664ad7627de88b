use ahash::AHashMap;
use rayon::prelude::*;

use crate::error::Result;
use crate::stats::Statistic;
use crate::table::AggregationTable;

type StationMap = AHashMap<Box<[u8]>, Statistic>;

/// Per-station statistics across all shards, sorted by station name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedResult {
    stations: Vec<(String, Statistic)>,
}

impl MergedResult {
    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn get(&self, station: &str) -> Option<&Statistic> {
        self.stations
            .binary_search_by(|(name, _)| name.as_str().cmp(station))
            .ok()
            .map(|index| &self.stations[index].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Statistic)> {
        self.stations.iter().map(|(name, stat)| (name.as_str(), stat))
    }
}

fn merge_maps(mut global: StationMap, mut local: StationMap) -> StationMap {
    if global.len() < local.len() {
        std::mem::swap(&mut global, &mut local);
    }
    for (station, stats) in local {
        global
            .entry(station)
            .and_modify(|gstats| *gstats = gstats.combine(stats))
            .or_insert(stats);
    }
    global
}

/// Reduces shard tables pairwise in parallel. Must only be called once every
/// shard has finished.
pub fn merge_tables(tables: Vec<AggregationTable>) -> Result<MergedResult> {
    let merged = tables
        .into_par_iter()
        .map(|table| table.into_entries().collect::<StationMap>())
        .reduce(StationMap::new, merge_maps);

    let mut stations: Vec<(Box<[u8]>, Statistic)> = merged.into_iter().collect();
    stations.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let stations = stations
        .into_iter()
        .map(|(key, stat)| -> Result<(String, Statistic)> {
            Ok((String::from_utf8(key.into_vec())?, stat))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(MergedResult { stations })
}
