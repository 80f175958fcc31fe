use core::{fmt, ops::Add};

use serde::{Deserialize, Serialize};

/// An inclusive byte range `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryRange {
    min: u64,
    max: u64,
}

impl MemoryRange {
    /// The empty range `[0, 0]`.
    pub const EMPTY: Self = Self { min: 0, max: 0 };

    /// An exact size.
    pub const fn of(bytes: u64) -> Self {
        Self {
            min: bytes,
            max: bytes,
        }
    }

    /// A range between two sizes, in either order.
    pub fn between(a: u64, b: u64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Lower bound.
    pub const fn min(&self) -> u64 {
        self.min
    }

    /// Upper bound.
    pub const fn max(&self) -> u64 {
        self.max
    }

    /// Scales both bounds by `factor`, saturating.
    pub const fn times(self, factor: u64) -> Self {
        Self {
            min: self.min.saturating_mul(factor),
            max: self.max.saturating_mul(factor),
        }
    }
}

impl Add for MemoryRange {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            min: self.min.saturating_add(rhs.min),
            max: self.max.saturating_add(rhs.max),
        }
    }
}

impl core::iter::Sum for MemoryRange {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::EMPTY, Add::add)
    }
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            f.write_str(&human_readable(self.min))
        } else {
            write!(f, "[{} ... {}]", human_readable(self.min), human_readable(self.max))
        }
    }
}

/// Formats `bytes` with binary units, e.g. `512 Bytes`, `2 MiB`.
pub(crate) fn human_readable(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];
    if bytes < 1024 {
        return format!("{bytes} Bytes");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.0} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_add_and_scale() {
        let a = MemoryRange::of(10);
        let b = MemoryRange::between(30, 5);
        assert_eq!((a + b).min(), 15);
        assert_eq!((a + b).max(), 40);
        assert_eq!(b.times(3), MemoryRange::between(15, 90));
    }

    #[test]
    fn display_uses_binary_units() {
        assert_eq!(MemoryRange::of(512).to_string(), "512 Bytes");
        assert_eq!(MemoryRange::of(2 * 1024 * 1024).to_string(), "2 MiB");
        assert_eq!(
            MemoryRange::between(1024, 4096).to_string(),
            "[1 KiB ... 4 KiB]"
        );
    }
}
