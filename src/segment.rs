use memchr::memchr;
use tracing::debug;

use crate::error::{AggregateError, Result};

/// Below this many bytes per shard the input is scanned as one segment.
pub const MIN_SEGMENT_SIZE: usize = 1_000_000;

/// How far past a naive boundary to look for a line terminator.
pub const SNAP_LOOKAHEAD: usize = 64;

/// A record-aligned byte range `[start, end)` of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Splits `data` into `parallelism` contiguous segments using the default limits.
pub fn plan_segments(data: &[u8], parallelism: usize) -> Result<Vec<Segment>> {
    plan_segments_with(data, parallelism, MIN_SEGMENT_SIZE, SNAP_LOOKAHEAD)
}

/// Splits `data` into `parallelism` contiguous segments whose interior
/// boundaries sit just past a `\n`. Lines must be shorter than `lookahead`
/// for every boundary to snap.
pub fn plan_segments_with(
    data: &[u8],
    parallelism: usize,
    min_segment_size: usize,
    lookahead: usize,
) -> Result<Vec<Segment>> {
    let len = data.len();
    let parallelism = parallelism.max(1);
    let segment_size = len / parallelism;

    if parallelism == 1 || segment_size < min_segment_size {
        debug!(len, "input too small to split, using one segment");
        return Ok(vec![Segment { start: 0, end: len }]);
    }

    let mut segments = Vec::with_capacity(parallelism);
    let mut start = 0;
    for i in 1..=parallelism {
        let end = if i == parallelism {
            len
        } else {
            snap_boundary(data, i * segment_size, lookahead)?.max(start)
        };
        segments.push(Segment { start, end });
        start = end;
    }

    debug!(len, segments = segments.len(), segment_size, "planned segments");
    Ok(segments)
}

/// Moves `boundary` forward to the byte after the next `\n`.
fn snap_boundary(data: &[u8], boundary: usize, lookahead: usize) -> Result<usize> {
    let window_end = (boundary + lookahead).min(data.len());
    match memchr(b'\n', &data[boundary..window_end]) {
        Some(offset) => Ok(boundary + offset + 1),
        // the tail is a final record without a terminator
        None if window_end == data.len() => Ok(data.len()),
        None => Err(AggregateError::SegmentAlignment { boundary, lookahead }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(count: usize) -> Vec<u8> {
        (0..count)
            .flat_map(|i| format!("Station{};{}.{}\n", i % 7, i % 40, i % 10).into_bytes())
            .collect()
    }

    fn assert_partition(data: &[u8], segments: &[Segment]) {
        assert_eq!(segments.first().unwrap().start, 0);
        assert_eq!(segments.last().unwrap().end, data.len());
        for pair in segments.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for segment in segments {
            assert!(segment.start <= segment.end);
            if segment.start > 0 && segment.start < data.len() {
                assert_eq!(data[segment.start - 1], b'\n');
            }
        }
    }

    #[test]
    fn test_small_input_is_one_segment() {
        let data = lines(100);
        let segments = plan_segments(&data, 8).unwrap();
        assert_eq!(segments, vec![Segment { start: 0, end: data.len() }]);
    }

    #[test]
    fn test_empty_input() {
        let segments = plan_segments(&[], 4).unwrap();
        assert_eq!(segments, vec![Segment { start: 0, end: 0 }]);
        assert!(segments[0].is_empty());
    }

    #[test]
    fn test_boundaries_snap_to_line_starts() {
        let data = lines(1000);
        let segments = plan_segments_with(&data, 6, 1, SNAP_LOOKAHEAD).unwrap();
        assert_eq!(segments.len(), 6);
        assert_partition(&data, &segments);
    }

    #[test]
    fn test_boundary_inside_long_name() {
        // 40-byte names make every naive boundary fall mid-record
        let mut data = Vec::new();
        for i in 0..50 {
            data.extend_from_slice(format!("{:0>40};{}.5\n", i, i % 10).as_bytes());
        }
        let segments = plan_segments_with(&data, 7, 1, SNAP_LOOKAHEAD).unwrap();
        assert_partition(&data, &segments);
    }

    #[test]
    fn test_unsnappable_boundary_is_error() {
        let mut data = vec![b'x'; 300];
        data.extend_from_slice(b";1.0\n");
        let err = plan_segments_with(&data, 2, 1, SNAP_LOOKAHEAD).unwrap_err();
        assert!(matches!(
            err,
            AggregateError::SegmentAlignment { boundary: 152, lookahead: SNAP_LOOKAHEAD }
        ));
    }

    #[test]
    fn test_unterminated_tail_snaps_to_end() {
        let data = b"A;1.0\nB;2.0\nCCCCCCCC;3.0".to_vec();
        let segments = plan_segments_with(&data, 2, 1, SNAP_LOOKAHEAD).unwrap();
        assert_partition(&data, &segments);
        assert_eq!(segments[0].end, data.len());
        assert!(segments[1].is_empty());
    }
}
