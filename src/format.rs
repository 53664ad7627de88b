use std::fmt;

use crate::merge::MergedResult;
use crate::stats::Statistic;

/// A value in tenths printed with exactly one decimal digit.
struct Tenths(i64);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{}", sign, abs / 10, abs % 10)
    }
}

/// `min/mean/max`
impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            Tenths(self.min as i64),
            Tenths(self.mean_tenths()),
            Tenths(self.max as i64)
        )
    }
}

/// `{Station1=min/mean/max, Station2=min/mean/max}`
impl fmt::Display for MergedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        let mut stations = self.iter().peekable();
        while let Some((station, stat)) = stations.next() {
            write!(f, "{}={}", station, stat)?;
            if stations.peek().is_some() {
                f.write_str(", ")?;
            }
        }
        f.write_str("}")
    }
}
