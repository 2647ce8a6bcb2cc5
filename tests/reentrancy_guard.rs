use chain_table::DebugReentrancy;

#[test]
fn enter_and_exit_is_ok() {
    let r = DebugReentrancy::new();
    let _g = r.enter("find");
}

#[cfg(debug_assertions)]
#[test]
fn nested_entry_panics_in_debug() {
    let r = DebugReentrancy::default();
    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        let _outer = r.enter("process");
        let _inner = r.enter("delete");
    }));
    assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    // Unwinding released the outer guard.
    let _g = r.enter("find");
}

#[cfg(not(debug_assertions))]
#[test]
fn nested_entry_is_noop_in_release() {
    let r = DebugReentrancy::new();
    let _g1 = r.enter("find");
    let _g2 = r.enter("delete");
}
