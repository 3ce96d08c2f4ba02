//! Output capture through the public API.

use isotemplate::echo;
use isotemplate::templating::output::{self, Capture};

#[test]
fn test_capture_collects_writes() {
    let capture = Capture::begin();
    output::write("a");
    echo!("{}-{}", 1, 2);
    assert_eq!(capture.peek(), "a1-2");
    assert_eq!(capture.finish(), "a1-2");
    assert_eq!(output::depth(), 0);
}

#[test]
fn test_nested_captures_are_independent() {
    let outer = Capture::begin();
    echo!("outer ");
    let inner = Capture::begin();
    echo!("inner");
    assert_eq!(output::depth(), 2);
    assert_eq!(inner.finish(), "inner");
    echo!("again");
    assert_eq!(outer.finish(), "outer again");
}

#[test]
fn test_dropped_capture_discards_text() {
    let outer = Capture::begin();
    {
        let _inner = Capture::begin();
        echo!("lost");
    }
    assert_eq!(outer.finish(), "");
}

#[test]
fn test_panicking_body_leaves_no_capture_behind() {
    let result = std::panic::catch_unwind(|| {
        let _capture = Capture::begin();
        echo!("before panic");
        panic!("body blew up");
    });
    assert!(result.is_err());
    assert_eq!(output::depth(), 0);
}
