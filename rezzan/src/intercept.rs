//! The interception layer: reimplementations of the libc memory and string
//! routines that verify poison tokens over every byte they are about to
//! touch, then do the work with plain byte loops.
//!
//! The loops stay loops: the crate is `#![no_builtins]`, so the compiler
//! cannot recognize one as a `memcpy` idiom and lower it into a call back
//! into this very module.

use core::mem;

use libc::{c_char, c_void, size_t, wchar_t};

use crate::check::check_window;
use crate::config;
use crate::diag;
use crate::token::{self, Token};
use crate::TOKEN_SIZE;

/// `memcpy`, with both ranges checked before any byte moves. Overlap is not
/// tolerated, as in the C contract.
#[no_mangle]
pub unsafe extern "C" fn memcpy(dst: *mut c_void, src: *const c_void, n: size_t) -> *mut c_void {
    check_window(dst as *const u8, n);
    check_window(src as *const u8, n);

    let d = dst as *mut u8;
    let s = src as *const u8;
    for i in 0..n {
        *d.add(i) = *s.add(i);
    }
    dst
}

/// `memmove`: checked like `memcpy`, copying backward when the ranges
/// overlap with `dst` above `src`.
#[no_mangle]
pub unsafe extern "C" fn memmove(dst: *mut c_void, src: *const c_void, n: size_t) -> *mut c_void {
    check_window(dst as *const u8, n);
    check_window(src as *const u8, n);

    let d = dst as *mut u8;
    let s = src as *const u8;
    if (d as usize) < (s as usize) {
        for i in 0..n {
            *d.add(i) = *s.add(i);
        }
    } else {
        let mut i = n;
        while i > 0 {
            i -= 1;
            *d.add(i) = *s.add(i);
        }
    }
    dst
}

/// `strlen`: verifies the word holding the first byte is not poisoned (a
/// scan must not start inside a redzone), then searches a word at a time for
/// the zero byte.
#[no_mangle]
pub unsafe extern "C" fn strlen(s: *const c_char) -> size_t {
    if config::active()
        && token::is_poisoned(((s as usize) & !(TOKEN_SIZE - 1)) as *const Token)
    {
        diag::trap();
    }

    // Byte-at-a-time until the scan pointer is word aligned.
    let mut p = s as *const u8;
    while (p as usize) % mem::size_of::<usize>() != 0 {
        if *p == 0 {
            return p as usize - s as usize;
        }
        p = p.add(1);
    }

    // `(w - lo) & !w & hi` is nonzero exactly when some byte of `w` is zero:
    // subtracting 1 from a zero byte borrows into the high bit its `!w` mask
    // leaves visible.
    const LO: usize = 0x0101_0101_0101_0101;
    const HI: usize = 0x8080_8080_8080_8080;
    let mut wp = p as *const usize;
    loop {
        let w = *wp;
        wp = wp.add(1);
        if w.wrapping_sub(LO) & !w & HI != 0 {
            let cp = (wp as *const u8).sub(mem::size_of::<usize>());
            for k in 0..mem::size_of::<usize>() {
                if *cp.add(k) == 0 {
                    return cp.add(k) as usize - s as usize;
                }
            }
        }
    }
}

/// `strnlen`: the same starting-word check, then a byte loop bounded by
/// `maxlen`.
#[no_mangle]
pub unsafe extern "C" fn strnlen(s: *const c_char, maxlen: size_t) -> size_t {
    if config::active()
        && token::is_poisoned(((s as usize) & !(TOKEN_SIZE - 1)) as *const Token)
    {
        diag::trap();
    }
    let p = s as *const u8;
    let mut i = 0;
    while i < maxlen {
        if *p.add(i) == 0 {
            break;
        }
        i += 1;
    }
    i
}

/// `strcpy` composed from `strlen` + `memcpy`, terminator included.
#[no_mangle]
pub unsafe extern "C" fn strcpy(dst: *mut c_char, src: *const c_char) -> *mut c_char {
    memcpy(dst as *mut c_void, src as *const c_void, strlen(src) + 1) as *mut c_char
}

/// `strcat`: `strcpy` onto the end of `dst`.
#[no_mangle]
pub unsafe extern "C" fn strcat(dst: *mut c_char, src: *const c_char) -> *mut c_char {
    strcpy(dst.add(strlen(dst)), src);
    dst
}

/// `strncpy`: copy at most `n` bytes and zero-fill the tail. Both the copy
/// and the fill are checked.
#[no_mangle]
pub unsafe extern "C" fn strncpy(dst: *mut c_char, src: *const c_char, n: size_t) -> *mut c_char {
    let len = strnlen(src, n);
    if len == n {
        return memcpy(dst as *mut c_void, src as *const c_void, n) as *mut c_char;
    }
    check_window(dst.add(len) as *const u8, n - len);
    for k in len..n {
        *dst.add(k) = 0;
    }
    memcpy(dst as *mut c_void, src as *const c_void, len + 1) as *mut c_char
}

/// `strncat`: write the terminator, then copy at most `n` bytes onto the end
/// of `dst`.
#[no_mangle]
pub unsafe extern "C" fn strncat(dst: *mut c_char, src: *const c_char, n: size_t) -> *mut c_char {
    let end = dst.add(strlen(dst));
    let len = strnlen(src, n);
    check_window(end.add(len) as *const u8, 1);
    *end.add(len) = 0;
    memcpy(end as *mut c_void, src as *const c_void, len);
    dst
}

/// `wmemcpy`: the narrow `memcpy` with the length scaled to wide characters.
#[no_mangle]
pub unsafe extern "C" fn __wmemcpy(
    dst: *mut wchar_t,
    src: *const wchar_t,
    n: size_t,
) -> *mut wchar_t {
    memcpy(
        dst as *mut c_void,
        src as *const c_void,
        n * mem::size_of::<wchar_t>(),
    ) as *mut wchar_t
}

/// `wcslen`: wide-character length scan.
#[no_mangle]
pub unsafe extern "C" fn __wcslen(s: *const wchar_t) -> size_t {
    let mut len = 0;
    while *s.add(len) != 0 {
        len += 1;
    }
    len
}

/// `wcscpy` composed from `__wcslen` + `__wmemcpy`, terminator included.
#[no_mangle]
pub unsafe extern "C" fn wcscpy(dst: *mut wchar_t, src: *const wchar_t) -> *mut wchar_t {
    __wmemcpy(dst, src, __wcslen(src) + 1)
}

// Defining C-variadic functions needs the nightly `c_variadic` feature, so
// the two formatted interceptors ride behind the `nightly` feature flag.
cfg_if::cfg_if! {
    if #[cfg(feature = "nightly")] {
        use core::ffi::VaList;
        use libc::c_int;

        extern "C" {
            fn vsnprintf(s: *mut c_char, n: size_t, format: *const c_char, ap: VaList) -> c_int;
            fn vfprintf(stream: *mut libc::FILE, format: *const c_char, ap: VaList) -> c_int;
            static mut stdout: *mut libc::FILE;
        }

        /// `snprintf`: the whole destination window is checked, formatting is
        /// delegated to the underlying `vsnprintf`.
        #[no_mangle]
        pub unsafe extern "C" fn snprintf(
            dst: *mut c_char,
            n: size_t,
            format: *const c_char,
            mut args: ...
        ) -> c_int {
            check_window(dst as *const u8, n);
            vsnprintf(dst, n, format, args.as_va_list())
        }

        /// `printf`: when `REZZAN_PRINTF` is set, every `%s` argument is
        /// checked for `strlen(arg)` bytes before the format string is handed
        /// to the underlying `vfprintf`. Only `%s` consumes an argument
        /// during the scan.
        #[no_mangle]
        pub unsafe extern "C" fn printf(format: *const c_char, mut args: ...) -> c_int {
            if config::get_config(b"REZZAN_PRINTF\0", 0) == 1 {
                args.with_copy(|mut ap| unsafe {
                    let mut p = format as *const u8;
                    while *p != 0 {
                        if *p == b'%' {
                            p = p.add(1);
                            if *p == 0 {
                                break;
                            }
                            if *p == b's' {
                                let arg: *const c_char = ap.arg();
                                let n = strlen(arg);
                                check_window(arg as *const u8, n);
                            }
                        }
                        p = p.add(1);
                    }
                });
            }
            vfprintf(stdout, format, args.as_va_list())
        }
    }
}
