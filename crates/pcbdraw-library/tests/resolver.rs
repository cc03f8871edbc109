use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use pcbdraw_core::FootprintId;
use pcbdraw_library::{FootprintLibrary, LibraryError, MemoryLibrary, Resolver};

fn drawing(marker: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="2mm" height="1mm" viewBox="0 0 2 1"><rect id="{marker}" width="2" height="1"/></svg>"#
    )
}

fn xy() -> FootprintId {
    FootprintId::new("X", "Y")
}

#[test]
fn first_library_in_order_wins() {
    let a = MemoryLibrary::new("A").with(xy(), drawing("from_a"));
    let b = MemoryLibrary::new("B").with(xy(), drawing("from_b"));

    let ab = Resolver::new(vec![Box::new(a.clone()), Box::new(b.clone())]);
    let hit = ab.resolve(&xy()).unwrap().unwrap();
    assert_eq!(hit.library, "A");

    let ba = Resolver::new(vec![Box::new(b), Box::new(a)]);
    let hit = ba.resolve(&xy()).unwrap().unwrap();
    assert_eq!(hit.library, "B");
}

#[test]
fn later_library_fills_gaps() {
    let a = MemoryLibrary::new("A");
    let b = MemoryLibrary::new("B").with(xy(), drawing("only_b"));
    let r = Resolver::new(vec![Box::new(a), Box::new(b)]);
    assert_eq!(r.resolve(&xy()).unwrap().unwrap().library, "B");
    assert!(r.resolve(&FootprintId::new("X", "Z")).unwrap().is_none());
}

#[test]
fn broken_drawing_is_fatal() {
    let lib = MemoryLibrary::new("A").with(xy(), "<svg width=\"1mm\"");
    let r = Resolver::new(vec![Box::new(lib)]);
    let err = r.resolve(&xy()).unwrap_err();
    assert!(matches!(err, LibraryError::Drawing { .. }));
    assert!(err.to_string().contains("X:Y"));
}

/// Library that counts how often it is asked and is slow to answer.
struct Slow {
    calls: Arc<AtomicUsize>,
}

impl FootprintLibrary for Slow {
    fn name(&self) -> &str {
        "slow"
    }

    fn load(&self, _id: &FootprintId) -> Result<Option<String>, LibraryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(std::time::Duration::from_millis(20));
        Ok(Some(drawing("slow")))
    }
}

#[test]
fn concurrent_first_loads_parse_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let r = Resolver::new(vec![Box::new(Slow {
        calls: Arc::clone(&calls),
    })]);

    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..8).map(|_| s.spawn(|| r.resolve(&xy()))).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(r.cache().loads(), 1);
    let first = results[0].as_ref().unwrap().as_ref().unwrap();
    for other in &results[1..] {
        let other = other.as_ref().unwrap().as_ref().unwrap();
        assert!(Arc::ptr_eq(first, other));
    }
}

#[test]
fn misses_are_cached_too() {
    let lib = MemoryLibrary::new("A");
    let r = Resolver::new(vec![Box::new(lib)]);
    for _ in 0..3 {
        assert!(r.resolve(&xy()).unwrap().is_none());
    }
    assert_eq!(r.cache().loads(), 1);
}

#[test]
fn directory_libraries_resolve_in_order() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    for (dir, marker) in [(&first, "first"), (&second, "second")] {
        std::fs::create_dir(dir.path().join("X")).unwrap();
        std::fs::write(dir.path().join("X/Y.svg"), drawing(marker)).unwrap();
    }
    let r = Resolver::from_dirs(&[second.path(), first.path()]).unwrap();
    let hit = r.resolve(&xy()).unwrap().unwrap();
    assert!(hit.content[0].id() == Some("second"));
}
