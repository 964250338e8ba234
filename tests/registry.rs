// The process-wide handler slots accept exactly one assignment each.
use std::os::raw::{c_char, c_void};

use saxbridge::{ErrorKind, set_global_error_handler, set_global_warning_handler};

unsafe extern "C" fn first(_ctx: *mut c_void, _msg: *const c_char) {}

unsafe extern "C" fn second(_ctx: *mut c_void, _msg: *const c_char) {}

#[test]
fn slots_accept_exactly_one_assignment() {
    set_global_error_handler(first).expect("first error assignment");
    let err = set_global_error_handler(second).expect_err("second error assignment");
    assert_eq!(err.kind(), ErrorKind::Usage);

    set_global_warning_handler(first).expect("warning slot is independent");
    let err = set_global_warning_handler(second).expect_err("second warning assignment");
    assert_eq!(err.kind(), ErrorKind::Usage);
}
