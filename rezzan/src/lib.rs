/*!

## About

`rezzan`: a runtime heap-safety checker that rides along with a program via
allocator interposition.

Every heap allocation is wrapped with cryptographically unforgeable "nonce"
tokens at 8-byte aligned word boundaries, and the common libc memory routines
(`memcpy`, `memmove`, `strlen` and friends) verify those tokens before they
touch a byte. Out-of-bounds reads and writes, use-after-free, double-free and
bad-free all land on a poisoned token and stop the process with an illegal
instruction, deterministically.

The poison is in-band: there is no shadow memory to maintain. A secret 8-byte
nonce lives in a read-only page at a fixed low address; a word is poisoned
when it holds the negated nonce. In the default 61-bit token mode the low 3
bits of each token are a "boundary" field recording how many bytes of the
preceding word are valid user data, which buys byte-level precision for
overflow detection at 8-byte alignment.

## Using `rezzan`

As an `LD_PRELOAD` interposer, build the `cdylib` with the `preload` feature
and the nightly `c_variadic` interceptors if you want `printf` checking:

```text
cargo build --release --features preload
LD_PRELOAD=target/release/librezzan.so ./a.out
```

As a Rust global allocator:

```
#[global_allocator]
static ALLOC: rezzan::Rezzan = rezzan::Rezzan;
# fn main() {}
```

## `cargo` Features

- **extra_assertions**: Enable various extra, expensive integrity assertions
  on the allocator's internal structures. Useful when debugging `rezzan`
  itself. Runtime self-checks of freshly allocated objects are a separate,
  environment-driven switch (`REZZAN_CHECKS`).

- **nightly**: Enable nightly-only Rust features: the C-variadic `snprintf`
  and `printf` interceptors.

- **preload**: Build the standalone interposer: drops `std` and provides the
  panic handler the `cdylib`/`staticlib` artifacts need to stand alone.

## Implementation Notes and Constraints

- All allocations are sized in 16-byte units and returned 16-byte aligned.
  A request of `size` bytes occupies `ceil((size + 8) / 16)` units, so at
  least one trailing token of redzone always exists, and the token before
  the allocation base is always poisoned (the "base marker" `free` uses to
  reject non-base pointers).

- The heap is a single contiguous pool reserved at a fixed virtual address
  and committed lazily; memory is never returned to the kernel. Freed
  regions sit fully poisoned in a size-classed quarantine until the
  quarantined volume crosses a threshold, after which allocations prefer to
  recycle them (zeroed on reuse).

- One global mutex serializes every allocator state mutation. Token tests in
  the interceptors are lockless single 8-byte reads; the right redzone
  marker of a new allocation is poisoned before the mutex is released, so
  any thread that can see the pointer sees a valid marker.

```text
+------------------------------------------------------------------------------+
| Pool (reserved at a fixed base, committed lazily, bump allocated)            |
|                                                                              |
|  unit 0     allocation A (2 units)              freed B (quarantined)        |
| +--------+ +--------------------------------+ +---------------------------+  |
| | t | t  | | user bytes ...    | t | t | t  | | t | t | t | t | t | t | t |  |
| +--------+ +--------------------------------+ +---------------------------+  |
|  sentinel    ^ 16-byte aligned   redzone        every word poisoned          |
+------------------------------------------------------------------------------+
                                                   |            ^
                                         reuse     |            | free
                                         (zeroed)  v            |
+---------------------------------------------+------------------------------+
| Quarantine: 20 size-classed FIFO lists of (offset, length) nodes           |
+----------------------------------------------------------------------------+
```

 */

#![cfg_attr(feature = "preload", no_std)]
#![cfg_attr(feature = "nightly", feature(c_variadic))]
#![no_builtins]
#![deny(missing_docs)]

use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(all(target_os = "linux", target_arch = "x86_64"))] {
        // Supported.
    } else {
        compile_error! {
            "rezzan only supports x86_64 Linux: the pools live at fixed \
             virtual addresses and violations trap with ud2"
        }
    }
}

#[macro_use]
mod diag;

mod check;
mod config;
mod imp_unix;
mod intercept;
mod pool;
mod quarantine;
mod token;

use imp_unix as imp;

use core::alloc::{GlobalAlloc, Layout};
use core::fmt::Write;
use core::mem;
use core::ptr;

use libc::c_void;
use memory_units::{Bytes, RoundUpTo, Words};

use pool::Pool;
use quarantine::Quarantine;
use token::Token;

/// The OS page size, in bytes.
pub(crate) const PAGE_SIZE: usize = 4096;

/// One token: 8 bytes.
pub(crate) const TOKEN_SIZE: usize = mem::size_of::<Token>();

/// One unit, the allocation quantum: two tokens.
pub(crate) const UNIT_SIZE: usize = mem::size_of::<token::Unit>();

/// Fixed address of the read-only nonce page.
pub(crate) const NONCE_ADDR: usize = 0x10000;

/// Fixed base address of the heap pool.
pub(crate) const POOL_ADDR: usize = 0xaaa_0000_0000;

/// Fixed base address of the quarantine node arena.
pub(crate) const QUARANTINE_ADDR: usize = 0xaa9_0000_0000;

/// Default reserved pool size: 2 GiB.
const DEFAULT_POOL_SIZE: usize = 1 << 31;

/// Default quarantine threshold: 256 MiB, the ASan default.
const DEFAULT_QUARANTINE_SIZE: usize = 1 << 28;

/// Allocation failure.
pub(crate) struct AllocErr;

struct Heap {
    pool: Pool,
    quarantine: Quarantine,
}

impl Heap {
    const fn new() -> Heap {
        Heap {
            pool: Pool::new(),
            quarantine: Quarantine::new(),
        }
    }
}

/// The process-wide allocator state, behind the one global mutex.
static HEAP: imp::Exclusive<Heap> = imp::Exclusive::new(Heap::new());

/// The address of the unit at pool-relative offset `unit`.
#[inline]
fn unit_addr(unit: usize) -> usize {
    POOL_ADDR + unit * UNIT_SIZE
}

/// Whether `addr` lies inside the reserved pool, i.e. is owned by us.
#[inline]
fn pool_contains(addr: usize) -> bool {
    addr >= POOL_ADDR && addr < POOL_ADDR + config::pool_units() * UNIT_SIZE
}

/// Units needed for a user request: `ceil((size + 8) / 16)`, which always
/// leaves room for at least one trailing redzone token.
fn request_units(size: usize) -> Option<usize> {
    let bytes = size.checked_add(TOKEN_SIZE)?;
    let bytes = match bytes % UNIT_SIZE {
        0 => bytes,
        r => bytes.checked_add(UNIT_SIZE - r)?,
    };
    Some(bytes / UNIT_SIZE)
}

/// Allocate `size` bytes of checked heap memory.
///
/// The pointer is 16-byte aligned; the word before it and every word past
/// the last user byte's word are poisoned. Quarantine reuse returns zeroed
/// memory, as do fresh pool pages. Exhaustion returns null with `ENOMEM`.
#[no_mangle]
pub unsafe extern "C" fn rezzan_malloc(size: usize) -> *mut c_void {
    if !config::active() {
        return imp::__libc_malloc(size);
    }

    // A zero-size request allocates a single byte.
    let size = if size == 0 { 1 } else { size };
    let units = match request_units(size) {
        Some(units) => units,
        None => {
            imp::set_enomem();
            return ptr::null_mut();
        }
    };

    let claimed = HEAP.with_exclusive_access(|heap| claim_locked(heap, units, size));
    let (addr, from_quarantine) = match claimed {
        Some(claimed) => claimed,
        None => {
            imp::set_enomem();
            return ptr::null_mut();
        }
    };

    // Quarantined memory is stale; zero every word the user can see. Fresh
    // pool pages arrive zeroed from the kernel.
    if from_quarantine {
        let words: Words = Bytes(size).round_up_to();
        for i in 0..words.0 {
            token::zero((addr + i * TOKEN_SIZE) as *mut Token);
        }
    }

    // Poison the rest of the redzone, walking backward until the word
    // holding the last user byte.
    let end = addr + size;
    let mut tok = addr + units * UNIT_SIZE - 2 * TOKEN_SIZE;
    while tok >= end {
        token::poison(tok as *mut Token, size);
        tok -= TOKEN_SIZE;
    }

    debug!(
        "malloc({}) = {:#x} [units={} ({} bytes), alloc={}]",
        size,
        addr,
        units,
        units * UNIT_SIZE,
        if from_quarantine { "Q" } else { "P" }
    );
    if config::checks() {
        self_check(addr, size, units, from_quarantine);
    }

    addr as *mut c_void
}

/// The lock-held half of `malloc`: pick a region from the quarantine (once
/// its usage crosses the threshold) or the pool, and poison the right
/// marker. The marker goes in before the lock is released: a thread that
/// learns this pointer must also observe a poisoned redzone.
fn claim_locked(heap: &mut Heap, units: usize, size: usize) -> Option<(usize, bool)> {
    let mut unit = None;
    if heap.quarantine.usage() > config::quarantine_units() {
        unit = heap.quarantine.alloc(units);
    }
    let from_quarantine = unit.is_some();
    let unit = match unit {
        Some(unit) => unit,
        None => heap.pool.alloc(units).ok()?,
    };

    let addr = unit_addr(unit);
    let last = (addr + units * UNIT_SIZE - TOKEN_SIZE) as *mut Token;
    unsafe { token::poison(last, size) };

    Some((addr, from_quarantine))
}

/// Consistency checks on a freshly returned allocation (`REZZAN_CHECKS`).
unsafe fn self_check(addr: usize, size: usize, units: usize, from_quarantine: bool) {
    let tag = if from_quarantine { "Q" } else { "P" };
    if addr % UNIT_SIZE != 0 {
        error!("invalid object alignment detected; {:#x} % 16 != 0", addr);
    }
    if size >= units * UNIT_SIZE {
        error!(
            "invalid object length detected; {} >= {}",
            size,
            units * UNIT_SIZE
        );
    }
    if addr + units * UNIT_SIZE - TOKEN_SIZE < addr + size {
        error!(
            "invalid object length detected; no room for the right marker \
             [ptr={:#x}, size={}, alloc={}]",
            addr, size, tag
        );
    }
    if !token::is_poisoned((addr - TOKEN_SIZE) as *const Token) {
        error!(
            "invalid object base detected [ptr={:#x}, size={}, alloc={}]",
            addr, size, tag
        );
    }
    let mut i = 0;
    while i * TOKEN_SIZE < size {
        if token::is_poisoned((addr + i * TOKEN_SIZE) as *const Token) {
            error!(
                "invalid object initialization detected [size={}, alloc={}]",
                size, tag
            );
        }
        i += 1;
    }
    if !token::is_poisoned((addr + i * TOKEN_SIZE) as *const Token) {
        error!(
            "invalid redzone detected; missing token [size={}, alloc={}]",
            size, tag
        );
    }
    i += 1;
    while i < 2 * units {
        if !token::is_poisoned((addr + i * TOKEN_SIZE) as *const Token) {
            error!(
                "invalid redzone detected; missing extra token [size={}, alloc={}]",
                size, tag
            );
        }
        i += 1;
    }
}

/// Free a pointer returned by [`rezzan_malloc`].
///
/// The region is poisoned word by word and quarantined; it is not handed
/// back to the kernel or reused immediately. Misaligned pointers, pointers
/// that are not an allocation base, and double frees are fatal. Pointers
/// outside the pool belong to the underlying allocator and are delegated.
#[no_mangle]
pub unsafe extern "C" fn rezzan_free(ptr: *mut c_void) {
    if ptr.is_null() {
        return;
    }
    if !config::active() {
        return imp::__libc_free(ptr);
    }

    debug!("free({:p})", ptr);
    let addr = ptr as usize;
    if addr % UNIT_SIZE != 0 {
        error!(
            "bad free detected with pointer {:p}; pointer is not 16-byte aligned",
            ptr
        );
    }
    if !pool_contains(addr) {
        // Not allocated by us.
        return imp::__libc_free(ptr);
    }
    if token::is_poisoned(addr as *const Token) {
        error!(
            "bad or double-free detected with pointer {:p}; memory is already poisoned",
            ptr
        );
    }
    if !token::is_poisoned((addr - TOKEN_SIZE) as *const Token) {
        error!(
            "bad free detected with pointer {:p}; pointer does not point to \
             the base of the object",
            ptr
        );
    }

    // Poison the freed words; the walk stops at the existing right redzone,
    // which also recovers the object's unit count.
    let mut words = 0;
    while !token::is_poisoned((addr + words * TOKEN_SIZE) as *const Token) {
        token::poison((addr + words * TOKEN_SIZE) as *mut Token, 0);
        words += 1;
    }
    let mut size64 = words + 1;
    if size64 % 2 == 1 {
        size64 += 1;
    }
    let units = size64 / 2;

    let unit = (addr - POOL_ADDR) / UNIT_SIZE;
    HEAP.with_exclusive_access(|heap| heap.quarantine.insert(unit, units));
}

/// Resize an allocation: allocate, copy, free.
///
/// The old length is recovered by walking tokens and is therefore word
/// granular; the copy is a private byte loop that may lap up to 7 bytes into
/// the old region's own redzone tail without tripping a check.
#[no_mangle]
pub unsafe extern "C" fn rezzan_realloc(ptr: *mut c_void, size: usize) -> *mut c_void {
    if !config::active() {
        return imp::__libc_realloc(ptr, size);
    }
    if ptr.is_null() {
        return rezzan_malloc(size);
    }
    let addr = ptr as usize;
    if addr % UNIT_SIZE != 0 {
        error!(
            "bad realloc detected with pointer {:p}; pointer is not 16-byte aligned",
            ptr
        );
    }
    if !pool_contains(addr) {
        // Not allocated by us.
        return imp::__libc_realloc(ptr, size);
    }

    let mut old_words = 0;
    while !token::is_poisoned((addr + old_words * TOKEN_SIZE) as *const Token) {
        old_words += 1;
    }
    let old_size = old_words * TOKEN_SIZE;
    let copy = if old_size < size { old_size } else { size };

    let new_ptr = rezzan_malloc(size);
    if new_ptr.is_null() {
        return new_ptr;
    }
    debug!("realloc({:p}, {}) = {:p} [copy={}]", ptr, size, new_ptr, copy);

    let d = new_ptr as *mut u8;
    let s = ptr as *const u8;
    for i in 0..copy {
        *d.add(i) = *s.add(i);
    }

    rezzan_free(ptr);
    new_ptr
}

/// Allocate zeroed memory for `nmemb` elements of `size` bytes.
///
/// `rezzan_malloc` already guarantees zeroed memory, so this only multiplies
/// (with an overflow check) and, under `REZZAN_CHECKS`, re-verifies every
/// byte.
#[no_mangle]
pub unsafe extern "C" fn rezzan_calloc(nmemb: usize, size: usize) -> *mut c_void {
    if !config::active() {
        return imp::__libc_calloc(nmemb, size);
    }
    let total = match nmemb.checked_mul(size) {
        Some(total) => total,
        None => {
            imp::set_enomem();
            return ptr::null_mut();
        }
    };
    let ptr = rezzan_malloc(total);
    if !ptr.is_null() && config::checks() {
        let p = ptr as *const u8;
        for i in 0..total {
            if *p.add(i) != 0 {
                error!("invalid calloc allocation; byte {} is non-zero", i);
            }
        }
    }
    ptr
}

/// The usable size of an allocation: the unpoisoned words from `ptr` to the
/// right redzone, in bytes. Foreign pointers delegate to the next
/// `malloc_usable_size` in link order.
#[no_mangle]
pub unsafe extern "C" fn malloc_usable_size(ptr: *mut c_void) -> usize {
    let addr = ptr as usize;
    if !config::active() || !pool_contains(addr) {
        // Not allocated by us.
        return imp::libc_malloc_usable_size(ptr);
    }
    let mut words = 0;
    while !token::is_poisoned((addr + words * TOKEN_SIZE) as *const Token) {
        words += 1;
    }
    words * TOKEN_SIZE
}

/// The interposed `malloc`.
#[no_mangle]
pub unsafe extern "C" fn malloc(size: usize) -> *mut c_void {
    rezzan_malloc(size)
}

/// The interposed `free`.
#[no_mangle]
pub unsafe extern "C" fn free(ptr: *mut c_void) {
    rezzan_free(ptr)
}

/// The interposed `realloc`.
#[no_mangle]
pub unsafe extern "C" fn realloc(ptr: *mut c_void, size: usize) -> *mut c_void {
    rezzan_realloc(ptr, size)
}

/// The interposed `calloc`.
#[no_mangle]
pub unsafe extern "C" fn calloc(nmemb: usize, size: usize) -> *mut c_void {
    rezzan_calloc(nmemb, size)
}

/// `operator new(size_t)`. C++ `new` may not return null, so exhaustion is
/// fatal here.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn _Znwm(size: usize) -> *mut c_void {
    let ptr = rezzan_malloc(size);
    if ptr.is_null() {
        error!("failed to allocate memory: out of memory");
    }
    ptr
}

/// `operator new[](size_t)`.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn _Znam(size: usize) -> *mut c_void {
    _Znwm(size)
}

/// `operator new(size_t, nothrow)`: null on failure.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn _ZnwmRKSt9nothrow_t(size: usize, _nothrow: *const c_void) -> *mut c_void {
    rezzan_malloc(size)
}

/// `operator new[](size_t, nothrow)`: null on failure.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn _ZnamRKSt9nothrow_t(size: usize, _nothrow: *const c_void) -> *mut c_void {
    rezzan_malloc(size)
}

/// `operator delete(void*)`.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn _ZdlPv(ptr: *mut c_void) {
    rezzan_free(ptr)
}

/// `operator delete[](void*)`.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn _ZdaPv(ptr: *mut c_void) {
    rezzan_free(ptr)
}

/// Sized `operator delete(void*, size_t)`; the size hint is unused, the
/// tokens already know.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn _ZdlPvm(ptr: *mut c_void, _size: usize) {
    rezzan_free(ptr)
}

/// Sized `operator delete[](void*, size_t)`.
#[no_mangle]
#[allow(non_snake_case)]
pub unsafe extern "C" fn _ZdaPvm(ptr: *mut c_void, _size: usize) {
    rezzan_free(ptr)
}

/// A handle for using the checker as a Rust `#[global_allocator]`.
///
/// The unit quantum fixes the alignment guarantee at 16 bytes; requests for
/// larger alignments report exhaustion.
pub struct Rezzan;

unsafe impl GlobalAlloc for Rezzan {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout.align() > UNIT_SIZE {
            return ptr::null_mut();
        }
        rezzan_malloc(layout.size()) as *mut u8
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        rezzan_free(ptr as *mut c_void);
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        if layout.align() > UNIT_SIZE {
            return ptr::null_mut();
        }
        rezzan_calloc(1, layout.size()) as *mut u8
    }

    unsafe fn realloc(&self, ptr: *mut u8, _layout: Layout, new_size: usize) -> *mut u8 {
        rezzan_realloc(ptr as *mut c_void, new_size) as *mut u8
    }
}

/// Process-wide initialization: read the `REZZAN_*` options, map the nonce
/// page and the pools at their fixed addresses, and poison the underflow
/// sentinel. Runs from `.init_array` before user code; safe to call again
/// (idempotent under the heap mutex).
#[no_mangle]
pub extern "C" fn rezzan_init() {
    unsafe {
        HEAP.with_exclusive_access(|heap| init_locked(heap));
    }
}

fn init_locked(heap: &mut Heap) {
    if config::inited() {
        return;
    }
    config::set_tty(imp::stderr_is_tty());
    config::set_stats(config::get_config(b"REZZAN_STATS\0", 0) != 0);
    if config::get_config(b"REZZAN_DISABLED\0", 0) != 0 {
        // Leave every entry point delegating to libc.
        config::set_inited(true);
        return;
    }

    let bits = config::get_config(b"REZZAN_NONCE_SIZE\0", 61);
    match bits {
        61 | 64 => {}
        _ => error!("invalid nonce size ({}); must be one of {{61,64}}", bits),
    }
    config::set_nonce_bits(bits as u8);

    let quarantine_bytes = config::get_config(b"REZZAN_QUARANTINE_SIZE\0", DEFAULT_QUARANTINE_SIZE);
    config::set_quarantine_units(quarantine_bytes / UNIT_SIZE);

    let pool_bytes = config::get_config(b"REZZAN_POOL_SIZE\0", DEFAULT_POOL_SIZE);
    if pool_bytes < pool::COMMIT_STEP * UNIT_SIZE {
        error!(
            "invalid pool size ({}); must be at least {}",
            pool_bytes,
            pool::COMMIT_STEP * UNIT_SIZE
        );
    }
    if pool_bytes % PAGE_SIZE != 0 {
        error!(
            "invalid pool size ({}); must be divisible by the page size ({})",
            pool_bytes, PAGE_SIZE
        );
    }
    config::set_pool_units(pool_bytes / UNIT_SIZE);

    config::set_debug(config::get_config(b"REZZAN_DEBUG\0", 0) != 0);
    config::set_checks(config::get_config(b"REZZAN_CHECKS\0", 0) != 0);
    config::set_populate(config::get_config(b"REZZAN_POPULATE\0", 0) != 0);

    // The nonce page: kernel randomness behind a read-only mapping at the
    // fixed low address the token primitives load from.
    if imp::map_fixed(NONCE_ADDR, Bytes(PAGE_SIZE), false).is_err() {
        error!("failed to allocate nonce memory of size {}", PAGE_SIZE);
    }
    if imp::fill_random(NONCE_ADDR as *mut u8, TOKEN_SIZE).is_err() {
        error!("failed to initialize random nonce");
    }
    if bits == 61 {
        // The boundary bits must be clear so `(nonce & !7) == nonce`.
        let word = NONCE_ADDR as *mut u64;
        unsafe { *word &= !token::BOUNDARY_MASK };
    }
    imp::protect_read(NONCE_ADDR, Bytes(PAGE_SIZE));

    if heap.pool.init(pool_bytes / UNIT_SIZE).is_err() {
        error!("failed to allocate memory pool of size {}", pool_bytes);
    }
    if heap.quarantine.init(quarantine_bytes / UNIT_SIZE).is_err() {
        error!("failed to allocate quarantine pool");
    }

    // Unit 0 is the permanent underflow sentinel.
    match heap.pool.alloc(1) {
        Ok(unit) => {
            heap_assert_eq!(unit, 0);
            let base = unit_addr(unit);
            unsafe {
                token::poison(base as *mut Token, 0);
                token::poison((base + TOKEN_SIZE) as *mut Token, 0);
            }
        }
        Err(AllocErr) => error!("failed to reserve the underflow sentinel"),
    }

    config::set_enabled(true);
    config::set_inited(true);
}

/// Process finalization: print usage statistics when `REZZAN_STATS` is set.
/// Runs from `.fini_array`.
#[no_mangle]
pub extern "C" fn rezzan_fini() {
    if !config::stats() {
        return;
    }
    let mut usage: libc::rusage = unsafe { mem::zeroed() };
    if unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) } < 0 {
        error!("failed to get resource usage");
    }
    let (allocated, quarantined) =
        unsafe { HEAP.with_exclusive_access(|heap| (heap.pool.allocated(), heap.quarantine.usage())) };

    let mut out = diag::STDOUT;
    let _ = writeln!(out, "maxrss          = {} bytes", usage.ru_maxrss as usize * 1024);
    let _ = writeln!(
        out,
        "pagefaults      = {} faults",
        (usage.ru_minflt + usage.ru_majflt) as usize
    );
    let _ = writeln!(out, "allocated       = {} bytes", allocated * UNIT_SIZE);
    let _ = writeln!(out, "quarantined     = {} bytes", quarantined * UNIT_SIZE);
}

#[used]
#[link_section = ".init_array"]
static INIT_HOOK: extern "C" fn() = rezzan_init;

#[used]
#[link_section = ".fini_array"]
static FINI_HOOK: extern "C" fn() = rezzan_fini;

#[cfg(feature = "preload")]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    diag::trap()
}
