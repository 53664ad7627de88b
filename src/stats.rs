/// Running summary for one station. Temperatures are tenths of a degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Statistic {
    pub min: i16,
    pub max: i16,
    pub sum: i64,
    pub count: u64,
}

impl Statistic {
    pub fn new(value: i16) -> Self {
        Self {
            min: value,
            max: value,
            sum: value as i64,
            count: 1,
        }
    }

    #[inline]
    pub fn record(&mut self, value: i16) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
        self.sum += value as i64;
        self.count += 1;
    }

    /// Associative and commutative, so shard results may be folded in any order.
    pub fn combine(self, other: Statistic) -> Statistic {
        Statistic {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
            sum: self.sum + other.sum,
            count: self.count + other.count,
        }
    }

    /// Mean in tenths, rounded half away from zero.
    pub fn mean_tenths(&self) -> i64 {
        let count = self.count as i64;
        if self.sum >= 0 {
            (self.sum + count / 2) / count
        } else {
            -((-self.sum + count / 2) / count)
        }
    }
}
