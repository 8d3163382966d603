//! Behavior of the non-fatal paths: layout guarantees, quarantine reuse and
//! zeroing, realloc copying, usable sizes, delegation of foreign pointers,
//! and the checked string routines on valid inputs.

use libc::{c_char, c_void, size_t, wchar_t};
use std::ptr;

extern "C" {
    fn memmove(dst: *mut c_void, src: *const c_void, n: size_t) -> *mut c_void;
    fn strlen(s: *const c_char) -> size_t;
    fn strnlen(s: *const c_char, maxlen: size_t) -> size_t;
    fn strcpy(dst: *mut c_char, src: *const c_char) -> *mut c_char;
    fn strcat(dst: *mut c_char, src: *const c_char) -> *mut c_char;
    fn strncpy(dst: *mut c_char, src: *const c_char, n: size_t) -> *mut c_char;
    fn strncat(dst: *mut c_char, src: *const c_char, n: size_t) -> *mut c_char;
    fn __wcslen(s: *const wchar_t) -> size_t;
    fn wcscpy(dst: *mut wchar_t, src: *const wchar_t) -> *mut wchar_t;
}

fn checked_alloc(size: usize) -> *mut u8 {
    rezzan::rezzan_init();
    let ptr = unsafe { rezzan::rezzan_malloc(size) } as *mut u8;
    assert!(!ptr.is_null());
    ptr
}

#[test]
fn allocations_are_unit_aligned_and_disjoint() {
    let p = checked_alloc(10) as usize;
    let q = checked_alloc(10) as usize;
    assert_eq!(p % 16, 0);
    assert_eq!(q % 16, 0);
    assert_ne!(p, q);
    let lo = p.min(q);
    let hi = p.max(q);
    assert!(hi - lo >= 16, "user regions must not share a unit");
    unsafe {
        rezzan::rezzan_free(p as *mut c_void);
        rezzan::rezzan_free(q as *mut c_void);
    }
}

#[test]
fn every_user_byte_is_usable() {
    for size in 1..128usize {
        let p = checked_alloc(size);
        unsafe {
            for i in 0..size {
                *p.add(i) = (i % 251) as u8;
            }
            for i in 0..size {
                assert_eq!(*p.add(i), (i % 251) as u8);
            }
            rezzan::rezzan_free(p as *mut c_void);
        }
    }
}

#[test]
fn usable_size_is_word_rounded_and_inside_the_redzone() {
    for size in 1..64usize {
        let p = checked_alloc(size);
        let usable = unsafe { rezzan::malloc_usable_size(p as *mut c_void) };
        assert_eq!(usable % 8, 0);
        assert!(usable >= size);
        // Never as large as the full unit span: the right marker stays.
        let units = (size + 8 + 15) / 16;
        assert!(usable < units * 16);
        unsafe { rezzan::rezzan_free(p as *mut c_void) };
    }
}

#[test]
fn calloc_zeroes_and_rejects_overflow() {
    rezzan::rezzan_init();
    unsafe {
        let p = rezzan::rezzan_calloc(7, 13) as *mut u8;
        assert!(!p.is_null());
        for i in 0..7 * 13 {
            assert_eq!(*p.add(i), 0);
        }
        rezzan::rezzan_free(p as *mut c_void);

        let q = rezzan::rezzan_calloc(usize::MAX / 2, 3);
        assert!(q.is_null());
    }
}

#[test]
fn realloc_preserves_the_prefix_and_moves() {
    rezzan::rezzan_init();
    unsafe {
        let p = rezzan::rezzan_malloc(20) as *mut u8;
        for i in 0..20 {
            *p.add(i) = i as u8 + 1;
        }
        let q = rezzan::rezzan_realloc(p as *mut c_void, 40) as *mut u8;
        assert!(!q.is_null());
        for i in 0..20 {
            assert_eq!(*q.add(i), i as u8 + 1);
        }
        // The grown tail is writable.
        for i in 20..40 {
            *q.add(i) = 0xab;
        }
        rezzan::rezzan_free(q as *mut c_void);

        let p = rezzan::rezzan_realloc(ptr::null_mut(), 8) as *mut u8;
        assert!(!p.is_null());
        rezzan::rezzan_free(p as *mut c_void);
    }
}

#[test]
fn quarantine_reuse_returns_zeroed_regions() {
    rezzan::rezzan_init();

    // The quarantine threshold defaults to 256 MiB; freeing seventeen 16 MiB
    // objects pushes the quarantined volume past it, after which allocation
    // prefers recycling.
    const SIZE: usize = 16 << 20;
    const COUNT: usize = 17;

    let mut freed = Vec::new();
    unsafe {
        for _ in 0..COUNT {
            let p = rezzan::rezzan_malloc(SIZE) as *mut u8;
            assert!(!p.is_null());
            // Dirty the region so reuse has something to scrub.
            for i in (0..SIZE).step_by(4096) {
                *p.add(i) = 0xff;
            }
            freed.push(p as usize);
        }
        for &p in &freed {
            rezzan::rezzan_free(p as *mut c_void);
        }

        let r = rezzan::rezzan_malloc(SIZE) as *mut u8;
        assert!(!r.is_null());
        assert_eq!(r as usize % 16, 0);
        assert!(
            freed.contains(&(r as usize)),
            "allocation past the threshold should recycle a quarantined region"
        );
        for i in 0..SIZE {
            assert_eq!(*r.add(i), 0, "recycled byte {} was not scrubbed", i);
        }
        rezzan::rezzan_free(r as *mut c_void);
    }
}

#[test]
fn foreign_pointers_are_delegated() {
    rezzan::rezzan_init();
    unsafe {
        // posix_memalign is not interposed, so this pointer belongs to the
        // underlying allocator; free and malloc_usable_size must hand it
        // back rather than flag it.
        let mut raw: *mut c_void = ptr::null_mut();
        assert_eq!(libc::posix_memalign(&mut raw, 32, 100), 0);
        assert!(!raw.is_null());
        let _ = rezzan::malloc_usable_size(raw);
        libc::free(raw);
    }
}

#[test]
fn string_routines_round_trip() {
    rezzan::rezzan_init();
    unsafe {
        let p = checked_alloc(32) as *mut c_char;
        strcpy(p, b"hello\0".as_ptr() as *const c_char);
        assert_eq!(strlen(p), 5);
        strcat(p, b" world\0".as_ptr() as *const c_char);
        assert_eq!(strlen(p), 11);
        assert_eq!(
            std::ffi::CStr::from_ptr(p).to_str().unwrap(),
            "hello world"
        );

        let q = checked_alloc(32) as *mut c_char;
        strncpy(q, b"abc\0".as_ptr() as *const c_char, 8);
        assert_eq!(strlen(q), 3);
        // strncpy zero-fills to n.
        for i in 3..8 {
            assert_eq!(*q.add(i), 0);
        }
        strncat(q, b"defgh\0".as_ptr() as *const c_char, 2);
        assert_eq!(std::ffi::CStr::from_ptr(q).to_str().unwrap(), "abcde");

        assert_eq!(strnlen(q as *const c_char, 2), 2);

        rezzan::rezzan_free(p as *mut c_void);
        rezzan::rezzan_free(q as *mut c_void);
    }
}

#[test]
fn memmove_handles_overlap_both_ways() {
    rezzan::rezzan_init();
    unsafe {
        let p = checked_alloc(32);
        for i in 0..32 {
            *p.add(i) = i as u8;
        }
        // Forward overlap.
        memmove(p.add(4) as *mut c_void, p as *const c_void, 16);
        for i in 0..16 {
            assert_eq!(*p.add(4 + i), i as u8);
        }
        // Backward overlap.
        for i in 0..32 {
            *p.add(i) = i as u8;
        }
        memmove(p as *mut c_void, p.add(4) as *const c_void, 16);
        for i in 0..16 {
            assert_eq!(*p.add(i), (i + 4) as u8);
        }
        rezzan::rezzan_free(p as *mut c_void);
    }
}

#[test]
fn wide_routines_scale_and_delegate() {
    rezzan::rezzan_init();
    unsafe {
        let src: [wchar_t; 4] = ['a' as wchar_t, 'b' as wchar_t, 'c' as wchar_t, 0];
        assert_eq!(__wcslen(src.as_ptr()), 3);

        let dst = checked_alloc(4 * std::mem::size_of::<wchar_t>()) as *mut wchar_t;
        wcscpy(dst, src.as_ptr());
        assert_eq!(__wcslen(dst), 3);
        assert_eq!(*dst.add(1), 'b' as wchar_t);
        rezzan::rezzan_free(dst as *mut c_void);
    }
}
