//! The poison-window check: given a byte range some routine is about to
//! touch, assert that none of the covering 8-byte words is poisoned, and in
//! 61-bit mode that the range does not run past the byte-precise boundary
//! recorded in the token that follows it.

use memory_units::{Bytes, RoundUpTo, Words};

use crate::config;
use crate::diag;
use crate::token::{self, Mode, Token};
use crate::{PAGE_SIZE, TOKEN_SIZE};

/// The covering window of the byte range `[addr, addr + n)`: the aligned
/// start address, the number of whole words to test, and how many bytes of
/// the final covered word the range claims (1..=8, or 0 for an empty cover).
fn window(addr: usize, n: usize) -> (usize, usize, usize) {
    let front = addr % TOKEN_SIZE;
    let start = addr - front;
    let total = n + front;
    let words: Words = Bytes(total).round_up_to();
    let claimed = if total == 0 {
        0
    } else {
        match total % TOKEN_SIZE {
            0 => TOKEN_SIZE,
            r => r,
        }
    };
    (start, words.0, claimed)
}

/// Abort (SIGILL) if any part of `[ptr, ptr + n)` is poisoned.
///
/// Every covering word is tested. In 61-bit mode the word immediately after
/// the cover is inspected as well: if it is a token whose boundary field says
/// fewer bytes of the final covered word are valid than the range claims, the
/// range runs past the end of an odd-length object without crossing into the
/// next aligned word, and that is a violation too. A boundary of 0 means the
/// word is fully valid, per the token encoding. The inspection is skipped
/// when the next word sits on a fresh page, which may not be mapped.
pub(crate) fn check_window(ptr: *const u8, n: usize) {
    if !config::active() {
        return;
    }
    // Touching no bytes checks no words. Zero-length copies legitimately
    // arrive with one-past-the-end or dangling pointers whose covering word
    // may not even be mapped.
    if n == 0 {
        return;
    }
    let (start, words, claimed) = window(ptr as usize, n);
    for i in 0..words {
        if unsafe { token::is_poisoned((start + i * TOKEN_SIZE) as *const Token) } {
            let word = unsafe { *((start + i * TOKEN_SIZE) as *const u64) };
            let nonce = crate::token::nonce();
            crate::diag::debug_line(file!(), line!(), format_args!("DBGTRAP ptr={:x} n={} start={:x} words={} i={} word={:x} nonce={:x}", ptr as usize, n, start, words, i, word, nonce));
            diag::trap();
        }
    }
    if claimed > 0 && Mode::current() == Mode::Bits61 {
        let tail = start + words * TOKEN_SIZE;
        if tail % PAGE_SIZE != 0 && unsafe { token::test61(tail as *const Token) } {
            let boundary = unsafe { token::boundary(tail as *const Token) } as usize;
            if boundary != 0 && boundary < claimed {
                diag::trap();
            }
        }
    }
}
