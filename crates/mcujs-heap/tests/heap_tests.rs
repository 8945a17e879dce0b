//! Cross-module scenarios that exercise more than one component together.

use mcujs_heap::{Heap, HeapConfig};

fn heap() -> Heap {
    Heap::init(HeapConfig { capacity: 512 })
}

#[test]
fn test_long_object_key_spills_and_round_trips() {
    let mut h = heap();
    let obj = h.new_object().unwrap();
    let long_key = "a".repeat(40);
    let v = h.new_int(7).unwrap();
    h.object_set_child(obj, long_key.as_bytes(), v).unwrap();
    let got = h.object_get_child(obj, long_key.as_bytes());
    assert_eq!(h.get_integer(got), 7);
    h.unlock(got);
    h.unlock(v);
    h.unlock(obj);
}

#[test]
fn test_array_join_matches_javascript_semantics_for_holes() {
    let mut h = heap();
    let arr = h.new_array().unwrap();
    let a = h.new_int(1).unwrap();
    let b = h.new_int(2).unwrap();
    h.array_push(arr, a).unwrap();
    h.array_push(arr, b).unwrap();
    let joined = h.array_join(arr, b",").unwrap();
    let mut buf = [0u8; 8];
    let n = h.get_string(joined, &mut buf);
    assert_eq!(&buf[..n], b"1,2");
    h.unlock(joined);
    h.unlock(a);
    h.unlock(b);
    h.unlock(arr);
}

#[test]
fn test_numeric_string_predicates() {
    let mut h = heap();
    let int_str = h.new_string(b"42").unwrap();
    let float_str = h.new_string(b"4.2").unwrap();
    let not_numeric = h.new_string(b"4x2").unwrap();
    assert!(h.is_numeric_int(int_str, false));
    assert!(!h.is_numeric_int(float_str, false));
    assert!(h.is_numeric_int(float_str, true));
    assert!(!h.is_numeric_int(not_numeric, true));
    assert!(h.is_numeric_strict(int_str));
    h.unlock(int_str);
    h.unlock(float_str);
    h.unlock(not_numeric);
}

#[test]
fn test_trim_right_multiline_drops_trailing_whitespace_per_line() {
    let mut h = heap();
    let s = h.new_string(b"foo  \nbar\t\n  baz").unwrap();
    let trimmed = h.trim_right_multiline(s).unwrap();
    let mut buf = [0u8; 32];
    let n = h.get_string(trimmed, &mut buf);
    assert_eq!(&buf[..n], b"foo\nbar\n  baz");
    h.unlock(s);
    h.unlock(trimmed);
}

#[test]
fn test_line_col_index_round_trip() {
    let mut h = heap();
    let s = h.new_string(b"ab\ncde\nf").unwrap();
    let idx = h.index_of(s, 2, 2);
    let (line, col) = h.line_col_of(s, idx);
    assert_eq!((line, col), (2, 2));
    h.unlock(s);
}

#[test]
fn test_array_buffer_over_a_string_built_from_js_values() {
    let mut h = heap();
    let backing = h.new_string_of_length(8).unwrap();
    let view = h.new_array_buffer(backing, 0, 4, mcujs_heap::ViewType::I16).unwrap();
    let values = [10, -20, 30, -40];
    for (i, &val) in values.iter().enumerate() {
        let v = h.new_int(val).unwrap();
        h.array_buffer_set(view, i, v).unwrap();
        h.unlock(v);
    }
    let mut decoded = Vec::new();
    for i in 0..4 {
        let v = h.array_buffer_get(view, i).unwrap();
        decoded.push(h.get_integer(v));
        h.unlock(v);
    }
    assert_eq!(decoded, values);
    h.unlock(view);
    h.unlock(backing);
}

#[test]
fn test_gc_after_removing_one_edge_from_a_cycle_leaves_the_rest_reachable() {
    let mut h = heap();
    let a = h.new_object().unwrap();
    let b = h.new_object().unwrap();
    let root_ref = h.new_object().unwrap();
    h.object_set_child(a, b"next", b).unwrap();
    h.object_set_child(b, b"next", a).unwrap();
    h.object_set_child(h.root(), b"kept", root_ref).unwrap();
    h.object_set_child(root_ref, b"cycle_head", a).unwrap();
    h.unlock(a);
    h.unlock(b);
    h.unlock(root_ref);

    // `a`/`b` form a cycle, but `root_ref` (reachable from the heap root)
    // holds an edge into it, so GC must not reclaim either.
    assert!(!h.garbage_collect());
}
