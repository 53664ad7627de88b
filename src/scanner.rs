//! Allocation-free record scanner.
//!
//! A scanner walks one record-aligned byte range and yields borrowed station
//! names together with their hash and the temperature in tenths of a degree.
//! Nothing is read at or past the end of the range.

use crate::error::{AggregateError, Result};
use crate::segment::Segment;

/// Longest station name accepted, in bytes.
pub const MAX_KEY_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub key: &'a [u8],
    pub hash: u32,
    pub temperature: i16,
}

/// Multiplicative string hash, `h = h * 31 + b`.
#[inline]
pub fn hash_key(key: &[u8]) -> u32 {
    key.iter()
        .fold(0u32, |h, &b| h.wrapping_mul(31).wrapping_add(b as u32))
}

pub struct LineScanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> LineScanner<'a> {
    /// Scans `data[start..end]`. Error offsets are reported relative to `data`.
    pub fn new(data: &'a [u8], start: usize, end: usize) -> Self {
        Self {
            data: &data[..end],
            pos: start,
        }
    }

    pub fn for_segment(data: &'a [u8], segment: Segment) -> Self {
        Self::new(data, segment.start, segment.end)
    }

    fn next_record(&mut self) -> Result<Record<'a>> {
        let data = self.data;
        let line_start = self.pos;
        let mut pos = line_start;
        let mut hash = 0u32;

        loop {
            match data.get(pos) {
                Some(b';') => break,
                Some(b'\n') | None => {
                    return Err(AggregateError::parse(pos, "missing ';' delimiter"))
                }
                Some(_) if pos - line_start == MAX_KEY_LEN => {
                    return Err(AggregateError::KeyTooLong {
                        offset: line_start,
                        max: MAX_KEY_LEN,
                    })
                }
                Some(&b) => {
                    hash = hash.wrapping_mul(31).wrapping_add(b as u32);
                    pos += 1;
                }
            }
        }

        let key = &data[line_start..pos];
        let (temperature, mut pos) = parse_temperature_at(data, pos + 1)?;

        if data.get(pos) == Some(&b'\r') {
            pos += 1;
        }
        match data.get(pos) {
            Some(b'\n') => pos += 1,
            // last record of the input may be unterminated
            None => {}
            Some(_) => return Err(AggregateError::parse(pos, "expected end of line")),
        }

        self.pos = pos;
        Ok(Record {
            key,
            hash,
            temperature,
        })
    }
}

impl<'a> Iterator for LineScanner<'a> {
    type Item = Result<Record<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }
        let result = self.next_record();
        if result.is_err() {
            self.pos = self.data.len();
        }
        Some(result)
    }
}

/// Parses a complete temperature token such as `-12.3` or `4.5` into tenths.
pub fn parse_temperature(token: &[u8]) -> Result<i16> {
    let (value, consumed) = parse_temperature_at(token, 0)?;
    if consumed != token.len() {
        return Err(AggregateError::parse(consumed, "trailing bytes after temperature"));
    }
    Ok(value)
}

/// Accepts exactly `-?d.d` or `-?dd.d`.
fn parse_temperature_at(data: &[u8], mut pos: usize) -> Result<(i16, usize)> {
    let negative = data.get(pos) == Some(&b'-');
    if negative {
        pos += 1;
    }

    let first = digit(data, pos)?;
    let value = if data.get(pos + 1) == Some(&b'.') {
        let tenths = digit(data, pos + 2)?;
        pos += 3;
        first * 10 + tenths
    } else {
        let second = digit(data, pos + 1)?;
        if data.get(pos + 2) != Some(&b'.') {
            return Err(AggregateError::parse(pos + 2, "expected '.'"));
        }
        let tenths = digit(data, pos + 3)?;
        pos += 4;
        first * 100 + second * 10 + tenths
    };

    Ok((if negative { -value } else { value }, pos))
}

#[inline]
fn digit(data: &[u8], pos: usize) -> Result<i16> {
    match data.get(pos) {
        Some(&b) if b.is_ascii_digit() => Ok((b - b'0') as i16),
        _ => Err(AggregateError::parse(pos, "expected digit")),
    }
}
