//! Diagnostics without an allocator: formatted writes straight to the stderr
//! file descriptor, the illegal-instruction trap that terminates the process
//! on a safety violation, and the feature-gated integrity assertions over
//! the allocator's own structures.
//!
//! Nothing in here may allocate. `error!` can fire from inside `malloc` while
//! the heap lock is held, so the sink below writes byte slices with
//! `libc::write` and formats into no buffer at all.

use core::fmt::{self, Write};

// Integrity assertions on allocator internals (usage accounting, list
// linkage, mutex return codes). They cost real time on hot paths, so they
// compile away entirely unless the "extra_assertions" feature is on; the
// disabled arms still mention their operands, keeping call sites free of
// unused-variable warts.

#[cfg(feature = "extra_assertions")]
macro_rules! heap_assert {
    ( $cond:expr $( , $why:expr )* ) => {
        assert!($cond $( , $why )* )
    };
}

#[cfg(not(feature = "extra_assertions"))]
macro_rules! heap_assert {
    ( $cond:expr $( , $why:expr )* ) => {
        // Keep the operands nominally alive so call sites look the same
        // whichever way the feature falls.
        if false {
            let _ = $cond;
            $( let _ = $why; )*
        }
    };
}

#[cfg(feature = "extra_assertions")]
macro_rules! heap_assert_eq {
    ( $left:expr , $right:expr $( , $why:expr )* ) => {
        assert_eq!($left, $right $( , $why )* )
    };
}

#[cfg(not(feature = "extra_assertions"))]
macro_rules! heap_assert_eq {
    ( $left:expr , $right:expr $( , $why:expr )* ) => {
        if false {
            let _ = ($left, $right);
            $( let _ = $why; )*
        }
    };
}

/// Raise SIGILL. This is the exit channel for every safety violation and
/// fatal configuration error; nothing after a trap runs.
#[inline(always)]
pub(crate) fn trap() -> ! {
    unsafe { core::arch::asm!("ud2", options(noreturn)) }
}

/// A `fmt::Write` sink over an OS file descriptor.
pub(crate) struct Fd(pub libc::c_int);

pub(crate) const STDOUT: Fd = Fd(1);
pub(crate) const STDERR: Fd = Fd(2);

impl fmt::Write for Fd {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            let n = unsafe {
                libc::write(self.0, bytes.as_ptr() as *const libc::c_void, bytes.len())
            };
            if n <= 0 {
                return Err(fmt::Error);
            }
            bytes = &bytes[n as usize..];
        }
        Ok(())
    }
}

macro_rules! debug {
    ( $( $args:tt )* ) => {
        if crate::config::debug() {
            crate::diag::debug_line(file!(), line!(), format_args!( $( $args )* ));
        }
    };
}

macro_rules! error {
    ( $( $args:tt )* ) => {{
        crate::diag::error_line(file!(), line!(), format_args!( $( $args )* ));
        crate::diag::trap()
    }};
}

pub(crate) fn debug_line(file: &str, line: u32, args: fmt::Arguments) {
    let (pre, post) = color("\x1b[35m");
    let mut out = STDERR;
    let _ = write!(out, "{}DEBUG{}: {}: {}: ", pre, post, file, line);
    let _ = out.write_fmt(args);
    let _ = out.write_str("\n");
}

pub(crate) fn error_line(file: &str, line: u32, args: fmt::Arguments) {
    let (pre, post) = color("\x1b[31m");
    let mut out = STDERR;
    let _ = write!(out, "{}error{}: {}: {}: ", pre, post, file, line);
    let _ = out.write_fmt(args);
    let _ = out.write_str("\n");
}

fn color(code: &'static str) -> (&'static str, &'static str) {
    if crate::config::tty() {
        (code, "\x1b[0m")
    } else {
        ("", "")
    }
}
