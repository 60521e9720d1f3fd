//! Hint-and-advance walk over a virtual memory map
//!
//! The map of a live process cannot be listed up front and may hold any
//! number of regions. The walk keeps a cursor, asks the map for the region
//! at or after it, and moves the cursor to that region's end. The cursor
//! strictly increases on every step, so the walk ends after at most one
//! step per region below the top of the address space.

use crate::config::ScannerConfig;
use crate::core::types::{
    MemoryRegion, RegionInfo, RegionQuery, ScanError, DEFAULT_NESTING_DEPTH,
};
use tracing::{debug, trace, warn};

/// Region search over any [`RegionQuery`] source
///
/// Every query is issued at the scanner's fixed nesting depth. The depth a
/// host reports back is kept in [`RegionInfo::depth`] and never fed into
/// the next query.
#[derive(Debug, Clone)]
pub struct RegionScanner<Q> {
    map: Q,
    depth: u32,
}

impl<Q: RegionQuery> RegionScanner<Q> {
    /// Scanner at the default nesting depth of one level
    pub fn new(map: Q) -> Self {
        Self::with_depth(map, DEFAULT_NESTING_DEPTH)
    }

    pub fn with_depth(map: Q, depth: u32) -> Self {
        RegionScanner { map, depth }
    }

    pub fn from_config(map: Q, config: &ScannerConfig) -> Self {
        Self::with_depth(map, config.nesting_depth)
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// One raw query: the region containing `address`, or the first after it
    pub fn region_at(&self, address: u64) -> Result<Option<RegionInfo>, ScanError> {
        self.map.query_region(address, self.depth)
    }

    /// Iterates regions whose base is at or after `hint`, in address order
    ///
    /// A region straddling `hint` is stepped over. The walk ends at the top
    /// of the address space. A query error, or an entry that fails to move
    /// the cursor forward, is yielded once as an error and ends the walk.
    pub fn walk(&self, hint: u64) -> RegionWalk<'_, Q> {
        RegionWalk {
            map: &self.map,
            depth: self.depth,
            cursor: Some(hint),
        }
    }

    /// First region at or after `hint` whose size is at least `min_size`
    ///
    /// # Errors
    ///
    /// [`ScanError::NoRegionFound`] when the walk reaches the end of the
    /// address space first; [`ScanError::Unknown`] when a query fails.
    pub fn find_at_least(&self, hint: u64, min_size: u64) -> Result<MemoryRegion, ScanError> {
        for step in self.walk(hint) {
            let region = step?;
            if region.size >= min_size {
                debug!(hint, min_size, found = %region.region(), "region found");
                return Ok(region.region());
            }
        }
        debug!(hint, min_size, "no region found");
        Err(ScanError::NoRegionFound)
    }

    /// Tries each threshold in `sizes` in order, returning the first match
    ///
    /// Only [`ScanError::NoRegionFound`] moves on to the next threshold.
    pub fn find_first_of(&self, hint: u64, sizes: &[u64]) -> Result<MemoryRegion, ScanError> {
        for &min_size in sizes {
            match self.find_at_least(hint, min_size) {
                Err(ScanError::NoRegionFound) => continue,
                result => return result,
            }
        }
        Err(ScanError::NoRegionFound)
    }
}

/// Iterator returned by [`RegionScanner::walk`]
#[derive(Debug)]
pub struct RegionWalk<'a, Q> {
    map: &'a Q,
    depth: u32,
    cursor: Option<u64>,
}

impl<Q: RegionQuery> Iterator for RegionWalk<'_, Q> {
    type Item = Result<RegionInfo, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut cursor = self.cursor.take()?;

        loop {
            let region = match self.map.query_region(cursor, self.depth) {
                Ok(Some(region)) => region,
                Ok(None) => return None,
                Err(err) => return Some(Err(err)),
            };
            trace!(cursor, region = %region.region(), depth = region.depth, "scan step");

            let base = region.base.as_u64();
            let end = match region.end() {
                Some(end) => end.as_u64(),
                // Last region of the address space: nothing can follow it
                None if base >= cursor => return Some(Ok(region)),
                None => return None,
            };

            if end <= cursor {
                warn!(cursor, region = %region.region(), "region map did not advance");
                return Some(Err(ScanError::NoRegionFound));
            }

            if base < cursor {
                cursor = end;
                continue;
            }

            self.cursor = Some(end);
            return Some(Ok(region));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{Address, Protection};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    fn info(base: u64, size: u64, depth: u32) -> RegionInfo {
        RegionInfo {
            base: Address::new(base),
            size,
            depth,
            protection: Protection::READ_WRITE,
        }
    }

    fn region(base: u64, size: u64) -> MemoryRegion {
        MemoryRegion::new(Address::new(base), size)
    }

    /// One complete sorted map per nesting level; deeper queries fall back
    /// to the deepest level that exists
    struct LayeredMap {
        levels: Vec<Vec<RegionInfo>>,
        queried_depths: RefCell<Vec<u32>>,
    }

    impl LayeredMap {
        fn flat(regions: Vec<RegionInfo>) -> Self {
            Self::layered(vec![regions])
        }

        fn layered(levels: Vec<Vec<RegionInfo>>) -> Self {
            LayeredMap {
                levels,
                queried_depths: RefCell::new(Vec::new()),
            }
        }
    }

    impl RegionQuery for LayeredMap {
        fn query_region(&self, address: u64, depth: u32) -> Result<Option<RegionInfo>, ScanError> {
            self.queried_depths.borrow_mut().push(depth);
            let level = (depth as usize).min(self.levels.len() - 1);
            Ok(self.levels[level]
                .iter()
                .find(|r| r.end().map_or(true, |end| end.as_u64() > address))
                .copied())
        }
    }

    /// Always answers with the same entry, regardless of the cursor
    struct StuckMap(RegionInfo);

    impl RegionQuery for StuckMap {
        fn query_region(&self, _: u64, _: u32) -> Result<Option<RegionInfo>, ScanError> {
            Ok(Some(self.0))
        }
    }

    struct FailingMap;

    impl RegionQuery for FailingMap {
        fn query_region(&self, _: u64, _: u32) -> Result<Option<RegionInfo>, ScanError> {
            Err(ScanError::Unknown(268435459))
        }
    }

    fn sample() -> LayeredMap {
        LayeredMap::flat(vec![
            info(0x1000, 0x1000, 0),
            info(0x4000, 0x3000, 0),
            info(0x10000, 0x100000, 0),
        ])
    }

    #[test]
    fn test_zero_threshold_returns_first_region_after_hint() {
        let scanner = RegionScanner::new(sample());
        assert_eq!(scanner.find_at_least(0, 0), Ok(region(0x1000, 0x1000)));
        assert_eq!(scanner.find_at_least(0x2000, 0), Ok(region(0x4000, 0x3000)));
    }

    #[test]
    fn test_threshold_skips_small_regions() {
        let scanner = RegionScanner::new(sample());
        assert_eq!(scanner.find_at_least(0, 0x2000), Ok(region(0x4000, 0x3000)));
        assert_eq!(
            scanner.find_at_least(0, 0x10000),
            Ok(region(0x10000, 0x100000))
        );
        assert_eq!(
            scanner.find_at_least(0, 0x100001),
            Err(ScanError::NoRegionFound)
        );
    }

    #[test]
    fn test_straddled_region_is_stepped_over() {
        let scanner = RegionScanner::new(sample());
        assert_eq!(scanner.find_at_least(0x1800, 0), Ok(region(0x4000, 0x3000)));
        assert_eq!(
            scanner.region_at(0x1800),
            Ok(Some(info(0x1000, 0x1000, 0)))
        );
    }

    #[test]
    fn test_hint_past_last_region() {
        let scanner = RegionScanner::new(sample());
        assert_eq!(
            scanner.find_at_least(0x200000, 0),
            Err(ScanError::NoRegionFound)
        );
        assert_eq!(scanner.region_at(0x200000), Ok(None));
        assert_eq!(scanner.walk(u64::MAX).count(), 0);
    }

    #[test]
    fn test_walk_visits_every_region_in_order() {
        let scanner = RegionScanner::new(sample());
        let bases: Vec<u64> = scanner
            .walk(0)
            .map(|step| step.unwrap().base.as_u64())
            .collect();
        assert_eq!(bases, vec![0x1000, 0x4000, 0x10000]);
    }

    #[test]
    fn test_region_ending_at_top_of_address_space() {
        let top = u64::MAX - 0xFFFF;
        let scanner = RegionScanner::new(LayeredMap::flat(vec![
            info(0x1000, 0x1000, 0),
            info(top, 0x10000, 0),
        ]));

        assert_eq!(scanner.find_at_least(0x2000, 0x8000), Ok(region(top, 0x10000)));
        assert_eq!(
            scanner.find_at_least(0x2000, 0x20000),
            Err(ScanError::NoRegionFound)
        );
        assert_eq!(scanner.walk(0).count(), 2);
        // Straddling the last region leaves nothing after the hint
        assert_eq!(scanner.walk(top + 1).count(), 0);
    }

    #[test]
    fn test_non_advancing_entry_stops_walk() {
        let scanner = RegionScanner::new(StuckMap(info(0x1000, 0x1000, 0)));
        let steps: Vec<_> = scanner.walk(0x3000).collect();
        assert_eq!(steps, vec![Err(ScanError::NoRegionFound)]);

        let empty = RegionScanner::new(StuckMap(info(0x5000, 0, 0)));
        assert_eq!(empty.find_at_least(0x5000, 0), Err(ScanError::NoRegionFound));
    }

    #[test]
    fn test_query_errors_propagate() {
        let scanner = RegionScanner::new(FailingMap);
        assert_eq!(
            scanner.find_at_least(0, 0),
            Err(ScanError::Unknown(268435459))
        );
        assert_eq!(
            scanner.find_first_of(0, &[0x1000, 0]),
            Err(ScanError::Unknown(268435459))
        );
        assert_eq!(scanner.walk(0).count(), 1);
    }

    #[test]
    fn test_find_first_of_falls_back() {
        let scanner = RegionScanner::new(sample());
        assert_eq!(
            scanner.find_first_of(0, &[0x1000_0000, 0x3000]),
            Ok(region(0x4000, 0x3000))
        );
        assert_eq!(
            scanner.find_first_of(0, &[0x1000_0000, 0x2000_0000]),
            Err(ScanError::NoRegionFound)
        );
        assert_eq!(scanner.find_first_of(0, &[]), Err(ScanError::NoRegionFound));
    }

    #[test]
    fn test_nesting_depth_selects_map_level() {
        let levels = vec![
            vec![info(0x1000, 0x8000, 0)],
            vec![info(0x1000, 0x2000, 1), info(0x3000, 0x6000, 1)],
        ];

        let top = RegionScanner::with_depth(LayeredMap::layered(levels.clone()), 0);
        assert_eq!(top.find_at_least(0, 0x4000), Ok(region(0x1000, 0x8000)));

        let nested = RegionScanner::new(LayeredMap::layered(levels));
        assert_eq!(nested.depth(), 1);
        assert_eq!(nested.find_at_least(0, 0x4000), Ok(region(0x3000, 0x6000)));
        assert_eq!(nested.region_at(0x1000).unwrap().unwrap().depth, 1);
    }

    #[test]
    fn test_reported_depth_is_not_fed_back() {
        let map = LayeredMap::flat(vec![info(0x1000, 0x1000, 4), info(0x2000, 0x1000, 7)]);
        let scanner = RegionScanner::with_depth(&map, 2);
        assert_eq!(scanner.walk(0).count(), 2);
        assert!(map.queried_depths.borrow().iter().all(|&d| d == 2));
    }

    #[test]
    fn test_from_config() {
        let config = ScannerConfig { nesting_depth: 0 };
        let scanner = RegionScanner::from_config(sample(), &config);
        assert_eq!(scanner.depth(), 0);
    }
}
