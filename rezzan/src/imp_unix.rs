//! Platform layer: fixed-address mappings, randomness, the heap mutex, and
//! delegation to the underlying libc allocator for pointers this crate does
//! not own.

use core::cell::UnsafeCell;
use core::mem;
use core::sync::atomic::{AtomicUsize, Ordering};

use memory_units::Bytes;

use crate::AllocErr;

/// Map `len` bytes of anonymous read/write memory at exactly `addr`.
///
/// The pools must stay contiguous at their configured bases, so a kernel
/// answer at any other address is failure.
pub(crate) fn map_fixed(addr: usize, len: Bytes, populate: bool) -> Result<(), AllocErr> {
    unsafe {
        let mut flags = libc::MAP_PRIVATE | libc::MAP_ANON | libc::MAP_FIXED;
        if populate {
            flags |= libc::MAP_POPULATE;
        }
        let got = libc::mmap(
            addr as *mut libc::c_void,
            len.0,
            libc::PROT_READ | libc::PROT_WRITE,
            flags,
            -1,
            0,
        );
        if got == libc::MAP_FAILED || got as usize != addr {
            Err(AllocErr)
        } else {
            Ok(())
        }
    }
}

/// Drop write access to `len` bytes at `addr`.
pub(crate) fn protect_read(addr: usize, len: Bytes) {
    unsafe {
        libc::mprotect(addr as *mut libc::c_void, len.0, libc::PROT_READ);
    }
}

/// Fill `len` bytes at `ptr` with kernel randomness.
pub(crate) fn fill_random(ptr: *mut u8, len: usize) -> Result<(), AllocErr> {
    let got = unsafe { libc::getrandom(ptr as *mut libc::c_void, len, 0) };
    if got == len as libc::ssize_t {
        Ok(())
    } else {
        Err(AllocErr)
    }
}

pub(crate) fn stderr_is_tty() -> bool {
    unsafe { libc::isatty(libc::STDERR_FILENO) != 0 }
}

pub(crate) fn set_enomem() {
    unsafe {
        *libc::__errno_location() = libc::ENOMEM;
    }
}

// The underlying allocator, for delegation while disabled and for pointers
// outside the pool.
extern "C" {
    pub(crate) fn __libc_malloc(size: usize) -> *mut libc::c_void;
    pub(crate) fn __libc_free(ptr: *mut libc::c_void);
    pub(crate) fn __libc_realloc(ptr: *mut libc::c_void, size: usize) -> *mut libc::c_void;
    pub(crate) fn __libc_calloc(nmemb: usize, size: usize) -> *mut libc::c_void;
}

/// Delegate `malloc_usable_size` to the next definition in link order. glibc
/// has no `__libc_` spelling of it, so the first call looks it up with
/// `dlsym(RTLD_NEXT, ...)` and caches the result.
pub(crate) unsafe fn libc_malloc_usable_size(ptr: *mut libc::c_void) -> usize {
    type UsableSize = unsafe extern "C" fn(*mut libc::c_void) -> usize;
    static LOOKUP: AtomicUsize = AtomicUsize::new(0);

    let mut raw = LOOKUP.load(Ordering::Relaxed);
    if raw == 0 {
        raw = libc::dlsym(
            libc::RTLD_NEXT,
            b"malloc_usable_size\0".as_ptr() as *const libc::c_char,
        ) as usize;
        if raw == 0 {
            error!("failed to find libc malloc_usable_size()");
        }
        LOOKUP.store(raw, Ordering::Relaxed);
    }
    let f: UsableSize = mem::transmute(raw);
    f(ptr)
}

// Align to the cache line size on an i7 to prevent false sharing.
#[repr(align(64))]
pub(crate) struct Exclusive<T> {
    lock: UnsafeCell<libc::pthread_mutex_t>,
    inner: UnsafeCell<T>,
}

// Exclusive hands out access to `inner` only under `lock`.
unsafe impl<T: Send> Sync for Exclusive<T> {}

impl<T> Exclusive<T> {
    /// Wrap `inner` behind a statically initialized pthread mutex.
    pub(crate) const fn new(inner: T) -> Exclusive<T> {
        Exclusive {
            lock: UnsafeCell::new(libc::PTHREAD_MUTEX_INITIALIZER),
            inner: UnsafeCell::new(inner),
        }
    }

    /// Get exclusive, mutable access to the inner value.
    ///
    /// # Safety
    ///
    /// Does not assert that `pthread`s calls return OK, unless the
    /// "extra_assertions" feature is enabled. This means that if `f` re-enters
    /// this method for the same `Exclusive` instance, there will be undetected
    /// mutable aliasing, which is UB.
    #[inline]
    pub(crate) unsafe fn with_exclusive_access<F, U>(&self, f: F) -> U
    where
        for<'x> F: FnOnce(&'x mut T) -> U,
    {
        let code = libc::pthread_mutex_lock(&mut *self.lock.get());
        heap_assert_eq!(code, 0, "pthread_mutex_lock should run OK");

        let result = f(&mut *self.inner.get());

        let code = libc::pthread_mutex_unlock(&mut *self.lock.get());
        heap_assert_eq!(code, 0, "pthread_mutex_unlock should run OK");

        result
    }
}
