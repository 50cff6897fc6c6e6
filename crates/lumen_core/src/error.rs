use thiserror::Error;

/// A fixed-capacity table was indexed past its end.
///
/// Lights, material texture slots and sampler slots all mirror fixed-size
/// arrays on the GPU side, so out-of-range indices are rejected instead of
/// growing the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind} index {index} is out of range (capacity {capacity})")]
pub struct CapacityError {
    pub kind: &'static str,
    pub index: usize,
    pub capacity: usize,
}

impl CapacityError {
    /// Returns `Ok(index)` when it is below `capacity`.
    pub fn check(kind: &'static str, index: usize, capacity: usize) -> Result<usize, Self> {
        if index < capacity {
            Ok(index)
        } else {
            Err(Self {
                kind,
                index,
                capacity,
            })
        }
    }
}
