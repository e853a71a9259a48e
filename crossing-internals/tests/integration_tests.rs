//! Integration tests for the crossing-internals object storage.
//!
//! ## Object Tests
//! - `test_object_creation_and_type_info`: creation, type ids and type keys
//! - `test_object_display_and_debug`: formatting through the handler
//! - `test_object_sharing_and_counts`: clone/drop bookkeeping
//! - `test_object_copy_on_write`: unique mutation vs. shared storage
//! - `test_object_mutation_after_remote_release`: in-place mutation once a
//!   clone has been read and dropped on another thread
//! - `test_object_into_inner`: moving payloads out of unique and shared
//!   objects
//! - `test_object_drop_runs_once`: payload destructors run exactly once
//!
//! ## Consistency Tests
//! - `test_vtable_consistency`: objects of the same type share vtables and
//!   report consistent type information

use core::{
    any::TypeId,
    sync::atomic::{AtomicUsize, Ordering},
};
use std::{fmt, sync::Arc};

use crossing_internals::{RawObject, RawObjectRef, handlers::ObjectHandler};

#[derive(Debug, Clone, PartialEq)]
struct Point {
    x: i64,
    y: i64,
}

struct PointHandler;

impl ObjectHandler<Point> for PointHandler {
    fn type_key() -> &'static str {
        "testing.Point"
    }

    fn display(value: &Point, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "({}, {})", value.x, value.y)
    }

    fn debug(value: &Point, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(value, formatter)
    }
}

struct TextHandler;

impl ObjectHandler<String> for TextHandler {
    fn type_key() -> &'static str {
        "testing.Text"
    }

    fn display(value: &String, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(value, formatter)
    }

    fn debug(value: &String, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "Text({value:?})")
    }
}

/// Lets `format!` drive the erased formatting entry points.
struct Shown<'a> {
    object: RawObjectRef<'a>,
    debug: bool,
}

impl fmt::Display for Shown<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.debug {
            self.object.debug(formatter)
        } else {
            self.object.display(formatter)
        }
    }
}

#[test]
fn test_object_creation_and_type_info() {
    let point = RawObject::new::<Point, PointHandler>(Point { x: 1, y: 2 });
    let text = RawObject::new::<String, TextHandler>(String::from("hello"));

    let point_ref = point.as_ref();
    assert_eq!(point_ref.payload_type_id(), TypeId::of::<Point>());
    assert_eq!(point_ref.handler_type_id(), TypeId::of::<PointHandler>());
    assert_eq!(point_ref.type_key(), "testing.Point");
    assert!(point_ref.payload_type_name().ends_with("Point"));
    assert_eq!(point_ref.downcast::<Point>(), Some(&Point { x: 1, y: 2 }));
    assert!(point_ref.downcast::<String>().is_none());

    let text_ref = text.as_ref();
    assert_eq!(text_ref.type_key(), "testing.Text");
    assert_eq!(text_ref.payload_type_name(), "alloc::string::String");
    assert_eq!(
        text_ref.downcast::<String>().map(String::as_str),
        Some("hello")
    );
    assert!(!text_ref.ptr_eq(point_ref));
}

fn shown(object: RawObjectRef<'_>, debug: bool) -> String {
    format!("{}", Shown { object, debug })
}

#[test]
fn test_object_display_and_debug() {
    let point = RawObject::new::<Point, PointHandler>(Point { x: 3, y: -4 });
    let text = RawObject::new::<String, TextHandler>(String::from("hi"));

    assert_eq!(shown(point.as_ref(), false), "(3, -4)");
    assert_eq!(shown(point.as_ref(), true), "Point { x: 3, y: -4 }");
    assert_eq!(shown(text.as_ref(), false), "hi");
    assert_eq!(shown(text.as_ref(), true), "Text(\"hi\")");
}

#[test]
fn test_object_sharing_and_counts() {
    let original = RawObject::new::<Point, PointHandler>(Point { x: 0, y: 0 });
    assert_eq!(original.as_ref().strong_count(), 1);

    let copies: Vec<RawObject> = (0..5).map(|_| original.clone()).collect();
    assert_eq!(original.as_ref().strong_count(), 6);
    for copy in &copies {
        assert!(copy.as_ref().ptr_eq(original.as_ref()));
    }

    drop(copies);
    assert_eq!(original.as_ref().strong_count(), 1);
}

#[test]
fn test_object_copy_on_write() {
    let mut object = RawObject::new::<Point, PointHandler>(Point { x: 1, y: 1 });

    // SAFETY: The payload is a `Point`.
    let point = unsafe { object.downcast_mut_unique::<Point>() }.expect("object is unique");
    point.x = 10;
    assert_eq!(object.as_ref().downcast::<Point>(), Some(&Point { x: 10, y: 1 }));

    let shared = object.clone();
    assert!(!object.as_ref().is_unique());
    // SAFETY: The payload is a `Point`.
    assert!(unsafe { object.downcast_mut_unique::<Point>() }.is_none());

    drop(shared);
    // SAFETY: The payload is a `Point`.
    assert!(unsafe { object.downcast_mut_unique::<Point>() }.is_some());
}

/// Moves an object handle to another thread. Only used with `Send + Sync`
/// payloads.
struct ThreadObject(RawObject);

// SAFETY: Only constructed around `Point` payloads, which are `Send + Sync`.
unsafe impl Send for ThreadObject {}

#[test]
fn test_object_mutation_after_remote_release() {
    let mut object = RawObject::new::<Point, PointHandler>(Point { x: 3, y: 4 });

    for round in 0..16_i64 {
        let remote = ThreadObject(object.clone());
        let reader = std::thread::spawn(move || {
            let remote = remote;
            let point = remote.0.as_ref().downcast::<Point>().map(|p| p.x + p.y);
            drop(remote);
            point
        });
        assert_eq!(reader.join().ok().flatten(), Some(3 + 4 + 2 * round));

        assert!(object.as_ref().is_unique());
        // SAFETY: The payload is a `Point`.
        let point = unsafe { object.downcast_mut_unique::<Point>() }.expect("clone was released");
        point.x += 1;
        point.y += 1;
    }

    assert_eq!(object.as_ref().downcast::<Point>(), Some(&Point { x: 19, y: 20 }));
}

#[test]
fn test_object_into_inner() {
    let unique = RawObject::new::<Point, PointHandler>(Point { x: 5, y: 6 });
    // SAFETY: The payload is a `Point`.
    let point = unsafe { unique.into_inner_unchecked::<Point>() };
    assert_eq!(point, Point { x: 5, y: 6 });

    let shared = RawObject::new::<String, TextHandler>(String::from("kept"));
    let other = shared.clone();
    // SAFETY: The payload is a `String`.
    let text = unsafe { shared.into_inner_unchecked::<String>() };
    assert_eq!(text, "kept");
    assert_eq!(other.as_ref().strong_count(), 1);
}

#[derive(Clone)]
struct DropCounter(Arc<AtomicUsize>);

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

struct DropCounterHandler;

impl ObjectHandler<DropCounter> for DropCounterHandler {
    fn type_key() -> &'static str {
        "testing.DropCounter"
    }

    fn display(_value: &DropCounter, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("DropCounter")
    }

    fn debug(_value: &DropCounter, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("DropCounter")
    }
}

#[test]
fn test_object_drop_runs_once() {
    let drops = Arc::new(AtomicUsize::new(0));
    let object = RawObject::new::<DropCounter, DropCounterHandler>(DropCounter(drops.clone()));
    let copy = object.clone();

    drop(object);
    assert_eq!(drops.load(Ordering::SeqCst), 0);

    drop(copy);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn test_vtable_consistency() {
    let first = RawObject::new::<Point, PointHandler>(Point { x: 1, y: 1 });
    let second = RawObject::new::<Point, PointHandler>(Point { x: 2, y: 2 });

    assert!(!first.as_ref().ptr_eq(second.as_ref()));
    assert_eq!(
        first.as_ref().payload_type_id(),
        second.as_ref().payload_type_id()
    );
    assert_eq!(first.as_ref().type_key(), second.as_ref().type_key());
    assert_eq!(
        first.as_ref().handler_type_id(),
        second.as_ref().handler_type_id()
    );
}
