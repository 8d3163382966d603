//! The heap pool: a contiguous reserved range of units at a fixed base
//! address, allocated by bumping a monotone index and committed lazily in
//! page-aligned chunks. Nothing is ever returned to the kernel; freed units
//! go to the quarantine instead.

use memory_units::Bytes;

use crate::config;
use crate::imp;
use crate::{AllocErr, PAGE_SIZE, POOL_ADDR, UNIT_SIZE};

/// How far past the current need each commit extends, in units (32 KiB).
pub(crate) const COMMIT_STEP: usize = (1 << 15) / UNIT_SIZE;

pub(crate) struct Pool {
    /// Reserved size, units. Unit offsets below this are "owned" addresses.
    size: usize,
    /// Bump index: units below it have been handed out.
    ptr: usize,
    /// Committed units: memory below it is backed by pages.
    mmap: usize,
}

impl Pool {
    /// An empty pool; nothing is owned or committed until `init` runs.
    pub(crate) const fn new() -> Pool {
        Pool {
            size: 0,
            ptr: 0,
            mmap: 0,
        }
    }

    /// Commit the first chunk at the fixed base and arm the bump index.
    pub(crate) fn init(&mut self, size_units: usize) -> Result<(), AllocErr> {
        heap_assert!(size_units >= COMMIT_STEP);
        imp::map_fixed(
            POOL_ADDR,
            Bytes(COMMIT_STEP * UNIT_SIZE),
            config::populate(),
        )?;
        self.size = size_units;
        self.ptr = 0;
        self.mmap = COMMIT_STEP;
        Ok(())
    }

    /// Units handed out so far.
    pub(crate) fn allocated(&self) -> usize {
        self.ptr
    }

    /// Allocate `units` fresh units, returning the unit offset of the first.
    ///
    /// Fails with `AllocErr` when the reservation is exhausted. Growing the
    /// committed region cannot fail softly: the pool must stay contiguous at
    /// its base, so a refused or relocated mapping aborts.
    pub(crate) fn alloc(&mut self, units: usize) -> Result<usize, AllocErr> {
        let unit = self.ptr;
        let end = unit.checked_add(units).ok_or(AllocErr)?;
        if end > self.size {
            return Err(AllocErr);
        }
        if end > self.mmap {
            let page_units = PAGE_SIZE / UNIT_SIZE;
            let mut next = end + COMMIT_STEP;
            if next % page_units != 0 {
                next += page_units - next % page_units;
            }
            if next > self.size {
                next = self.size;
            }
            let start = self.mmap;
            heap_assert!(next > start);
            if imp::map_fixed(
                POOL_ADDR + start * UNIT_SIZE,
                Bytes((next - start) * UNIT_SIZE),
                config::populate(),
            )
            .is_err()
            {
                error!(
                    "failed to allocate {} bytes for malloc pool",
                    (next - start) * UNIT_SIZE
                );
            }
            debug!(
                "GROW {:#x}..{:#x}",
                POOL_ADDR + start * UNIT_SIZE,
                POOL_ADDR + next * UNIT_SIZE
            );
            self.mmap = next;
        }
        self.ptr = end;
        Ok(unit)
    }
}
