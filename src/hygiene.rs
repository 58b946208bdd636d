//! Growth and sort/de-duplication hygiene for record collections.
use log::error;
use std::cmp::Ordering;
use thiserror::Error;

/// Minimum capacity allocated when a collection first grows.
pub(crate) const MIN_CAPACITY: usize = 128;

/// Collection growth related errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("collection growth failed")]
    Growth(#[from] std::collections::TryReserveError),
}

/// What to do when a collection cannot grow. The policy is injected
/// per collection at construction, never process-wide.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocPolicy {
    /// Report the failure to the caller as a recoverable error
    #[default]
    Propagate,
    /// Log and abort the process
    Abort,
}

/// Record ordering and redundancy, the key tuple every ingesting
/// reader relies on after its hygiene pass.
pub(crate) trait Hygiene {
    /// Total order of the sort key tuple.
    fn order(&self, other: &Self) -> Ordering;
    /// True when `self` repeats the identity of an already kept record.
    fn redundant_with(&self, other: &Self) -> bool;
}

/// Appends `value`, doubling capacity (from [`MIN_CAPACITY`] up) when
/// exhausted. Allocation failure follows the collection's policy.
pub(crate) fn push_grow<T>(
    data: &mut Vec<T>,
    value: T,
    policy: AllocPolicy,
) -> Result<(), Error> {
    if data.len() == data.capacity() {
        let target = if data.capacity() == 0 {
            MIN_CAPACITY
        } else {
            data.capacity() * 2
        };
        if let Err(e) = data.try_reserve_exact(target - data.len()) {
            match policy {
                AllocPolicy::Propagate => return Err(e.into()),
                AllocPolicy::Abort => {
                    error!("collection growth failed past {} records: {}", data.len(), e);
                    std::process::abort();
                },
            }
        }
    }
    data.push(value);
    Ok(())
}

/// Stable-sorts by the key tuple, collapses adjacent redundant records
/// keeping the first occurrence, and trims capacity to the surviving
/// count. Idempotent.
pub(crate) fn sort_unique<T: Hygiene>(data: &mut Vec<T>) {
    if data.is_empty() {
        return;
    }
    data.sort_by(T::order);
    let mut kept = 1;
    for i in 1..data.len() {
        if !data[i].redundant_with(&data[kept - 1]) {
            data.swap(kept, i);
            kept += 1;
        }
    }
    data.truncate(kept);
    data.shrink_to_fit();
}

#[cfg(test)]
mod test {
    use super::*;

    impl Hygiene for (i32, i32) {
        fn order(&self, other: &Self) -> Ordering {
            self.cmp(other)
        }
        fn redundant_with(&self, other: &Self) -> bool {
            self.0 == other.0
        }
    }

    #[test]
    fn push_doubles_capacity() {
        let mut data: Vec<u64> = Vec::new();
        for i in 0..MIN_CAPACITY {
            push_grow(&mut data, i as u64, AllocPolicy::Propagate).unwrap();
            assert_eq!(data.capacity(), MIN_CAPACITY);
        }
        push_grow(&mut data, 0, AllocPolicy::Propagate).unwrap();
        assert_eq!(data.capacity(), 2 * MIN_CAPACITY);
    }

    #[test]
    fn sort_unique_keeps_first() {
        // second field marks insertion order within an equal key
        let mut data = vec![(3, 0), (1, 0), (1, 1), (2, 0), (1, 2)];
        sort_unique(&mut data);
        assert_eq!(data, vec![(1, 0), (2, 0), (3, 0)]);
        assert_eq!(data.capacity(), 3);
    }

    #[test]
    fn sort_unique_idempotent() {
        let mut data = vec![(5, 0), (4, 0), (4, 1), (6, 0)];
        sort_unique(&mut data);
        let once = data.clone();
        sort_unique(&mut data);
        assert_eq!(data, once);
    }

    #[test]
    fn sort_unique_empty() {
        let mut data: Vec<(i32, i32)> = Vec::new();
        sort_unique(&mut data);
        assert!(data.is_empty());
    }
}
