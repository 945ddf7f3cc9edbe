#![cfg(feature = "tracing")]

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt;
use typed_atomic::AnyCell;

struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn capture(f: impl FnOnce()) -> String {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer_source = buffer.clone();
    let _guard = fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .with_writer(move || CaptureWriter {
            buffer: writer_source.clone(),
        })
        .with_ansi(false)
        .set_default();

    f();

    let output = buffer.lock().unwrap().clone();
    String::from_utf8(output).unwrap()
}

#[test]
fn first_store_is_traced() {
    let a: AnyCell = AnyCell::new();

    let output = capture(|| a.store(Arc::new(5u8)));
    assert!(output.contains("AnyCell type established"), "{output}");

    let output = capture(|| a.store(Arc::new(6u8)));
    assert!(!output.contains("AnyCell type established"), "{output}");
}

#[test]
fn type_violation_is_logged_before_panic() {
    let a: AnyCell = AnyCell::new();
    a.store(Arc::new(1u32));

    let output = capture(|| {
        let res = panic::catch_unwind(AssertUnwindSafe(|| a.store(Arc::new("text"))));
        assert!(res.is_err());
    });
    assert!(output.contains("ERROR"), "{output}");
    assert!(output.contains("inconsistently typed value for AnyCell"), "{output}");
    assert!(output.contains("op=\"store\""), "{output}");
}
