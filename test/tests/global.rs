//! Ordinary std workloads with the checker as the global allocator: every
//! Box, Vec, String and map node below lives inside the pool behind its own
//! redzones, and the compiler's slice copies route through the interposed
//! `memcpy`.

use std::collections::{BTreeMap, HashMap};
use std::ffi::{CStr, CString};
use std::thread;

#[global_allocator]
static A: rezzan::Rezzan = rezzan::Rezzan;

#[test]
fn collection_churn() {
    let mut by_hash = HashMap::new();
    let mut by_order = BTreeMap::new();
    for i in 0..1_000u32 {
        by_hash.insert(i, i.to_string());
        by_order.insert(i.to_string(), i);
    }
    for i in (0..1_000u32).step_by(2) {
        by_hash.remove(&i);
        by_order.remove(&i.to_string());
    }
    assert_eq!(by_hash.len(), 500);
    assert_eq!(by_order.len(), 500);
    assert_eq!(by_hash[&1], "1");
}

#[test]
fn vectors_grow_and_shrink() {
    // Doubling growth reallocs through every size class; shrink_to_fit
    // comes back down through the word-rounded realloc copy.
    let mut v = Vec::new();
    for i in 0..10_000u32 {
        v.push(i);
    }
    v.truncate(7);
    v.shrink_to_fit();
    assert_eq!(v, [0, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn odd_length_boxed_slices() {
    // One boxed slice per small length: each occupies its own unit with a
    // boundary-carrying token behind the last byte.
    let boxes: Vec<Box<[u8]>> = (1..64)
        .map(|n| vec![n as u8; n].into_boxed_slice())
        .collect();
    for (i, b) in boxes.iter().enumerate() {
        assert_eq!(b.len(), i + 1);
        assert!(b.iter().all(|&byte| byte == (i + 1) as u8));
    }
}

#[test]
fn strings_and_interposed_strlen() {
    let mut s = String::new();
    for i in 0..100 {
        s.push_str(&format!("{} ", i));
    }
    assert!(s.ends_with("99 "));

    // CStr::from_ptr measures through the interposed strlen, which first
    // tests the word holding the string's base.
    let c = CString::new(&s[..]).unwrap();
    let measured = unsafe { CStr::from_ptr(c.as_ptr()) };
    assert_eq!(measured.to_bytes().len(), s.len());
}

#[test]
fn concurrent_allocation() {
    // Four threads hammering the one heap mutex.
    let handles: Vec<_> = (0..4)
        .map(|t| {
            thread::spawn(move || {
                let mut held = Vec::new();
                for i in 0..200usize {
                    held.push(vec![t as u8; i % 53 + 1]);
                }
                held.iter().map(|v| v.len()).sum::<usize>()
            })
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap() > 0);
    }
}

#[test]
fn unwinding_panics_still_allocate() {
    // The panic payload is boxed through this allocator mid-unwind.
    assert!(thread::spawn(|| panic!()).join().is_err());
}
