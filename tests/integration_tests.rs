//! Integration tests for the logging pipeline
//!
//! These tests verify:
//! - FIFO delivery across blocking and non-blocking calls
//! - Level thresholds per destination
//! - Shared rendering between destinations
//! - Close semantics and registration counting
//! - File output
//! - Suspension through the manager lock

use parking_lot::Mutex;
use rust_fanout_logger::destinations::{FileDestination, FileOptions, WriterDestination};
use rust_fanout_logger::{
    DestinationHandle, Fields, Flags, FormatKind, LogEntry, LogLevel, Logger, LoggerError,
    Result,
};
use std::fs;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().clone()).expect("utf8 output")
    }

    fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn text_destination(buf: &SharedBuf, flags: Flags) -> DestinationHandle {
    DestinationHandle::new(WriterDestination::text(buf.clone(), flags, true))
}

#[test]
fn test_blocking_call_observes_earlier_records() {
    let a = SharedBuf::default();
    let b = SharedBuf::default();
    let logger = Logger::builder()
        .queue_capacity(8)
        .destination(text_destination(&a, Flags::NEWLINE))
        .destination(text_destination(&b, Flags::NEWLINE))
        .build()
        .expect("logger");

    for i in 0..100 {
        logger.info(format!("async {}", i)).expect("enqueue");
    }
    logger.blocking().info("sync").expect("deliver");

    for out in [&a, &b] {
        let lines = out.lines();
        assert_eq!(lines.len(), 101);
        for (i, line) in lines[..100].iter().enumerate() {
            assert_eq!(line, &format!("async {}", i));
        }
        assert_eq!(lines[100], "sync");
    }
}

#[test]
fn test_warn_threshold() {
    let buf = SharedBuf::default();
    let logger = Logger::builder()
        .blocking(true)
        .destination(
            WriterDestination::text(buf.clone(), Flags::LEVEL | Flags::NEWLINE, true)
                .with_level(LogLevel::Warn),
        )
        .build()
        .expect("logger");

    for level in LogLevel::ALL {
        logger.log(level, "x").expect("log");
    }

    assert_eq!(buf.lines(), vec!["[WARN] x", "[ERROR] x", "[FATAL] x"]);
}

static RENDERS: AtomicUsize = AtomicUsize::new(0);

fn counting_render(buf: &mut Vec<u8>, entry: &LogEntry, flags: Flags) -> Result<()> {
    RENDERS.fetch_add(1, Ordering::SeqCst);
    rust_fanout_logger::core::render_text(buf, entry, flags)
}

#[test]
fn test_destinations_share_one_rendering() {
    let bufs: Vec<SharedBuf> = (0..3).map(|_| SharedBuf::default()).collect();
    let flags = Flags::TIME | Flags::MICRO | Flags::LEVEL | Flags::FIELDS | Flags::NEWLINE;

    let mut builder = Logger::builder().blocking(true).field("id", 42);
    for buf in &bufs {
        builder = builder.destination(WriterDestination::with_functions(
            buf.clone(),
            true,
            flags,
            FormatKind::Custom(100),
            counting_render,
            None,
        ));
    }
    let logger = builder.build().expect("logger");

    RENDERS.store(0, Ordering::SeqCst);
    logger.info("once").expect("log");
    logger.info("twice").expect("log");
    assert_eq!(RENDERS.load(Ordering::SeqCst), 2);

    let first = bufs[0].contents();
    assert!(first.contains("[INFO] once\n"));
    for buf in &bufs[1..] {
        assert_eq!(buf.contents(), first);
    }
}

#[test]
fn test_text_and_json_side_by_side() {
    let text = SharedBuf::default();
    let json = SharedBuf::default();
    let logger = Logger::builder()
        .blocking(true)
        .prefix("svc")
        .prefix("db")
        .field("attempt", 2)
        .destination(text_destination(
            &text,
            Flags::LAST_PREFIX | Flags::LEVEL | Flags::FIELDS | Flags::NEWLINE,
        ))
        .destination(WriterDestination::json(
            json.clone(),
            Flags::PREFIX | Flags::LEVEL | Flags::FIELDS_NESTED_OBJECT | Flags::NEWLINE,
            true,
        ))
        .build()
        .expect("logger");

    logger.error("timeout").expect("log");

    assert_eq!(text.contents(), "[db] [ERROR] timeout\n");
    assert_eq!(
        json.contents(),
        "{\"prefix\":[\"svc\",\"db\"],\"level\":\"ERROR\",\"fields\":{\"attempt\":2},\"msg\":\"timeout\"}\n"
    );
}

#[test]
fn test_close_semantics() {
    let buf = SharedBuf::default();
    let logger = Logger::builder()
        .destination(text_destination(&buf, Flags::NEWLINE))
        .build()
        .expect("logger");
    let derived = logger.add_prefix(["child"]).blocking();

    logger.info("before").expect("log");
    derived.close().expect("close");

    assert_eq!(buf.contents(), "before\n");
    assert!(matches!(logger.info("after"), Err(LoggerError::ManagerClosed)));
    assert!(matches!(derived.warn("after"), Err(LoggerError::ManagerClosed)));
    assert!(matches!(logger.close(), Err(LoggerError::ManagerClosed)));
    assert!(matches!(
        logger.add_destination(text_destination(&buf, Flags::NEWLINE)),
        Err(LoggerError::ManagerClosed)
    ));
    assert_eq!(buf.contents(), "before\n");
}

#[test]
fn test_double_registration_needs_two_closes() {
    let buf = SharedBuf::default();
    let shared = text_destination(&buf, Flags::NEWLINE);

    let first = Logger::builder()
        .blocking(true)
        .destination(shared.clone())
        .build()
        .expect("first");
    let second = Logger::builder()
        .blocking(true)
        .destination(shared.clone())
        .build()
        .expect("second");

    first.info("one").expect("log");
    first.close().expect("close first");

    second.info("two").expect("still open");
    second.close().expect("close second");

    assert_eq!(buf.contents(), "one\ntwo\n");
    let entry = LogEntry::new(LogLevel::Info, "late");
    assert!(matches!(
        shared.lock().deliver(&entry),
        Err(LoggerError::DestinationClosed)
    ));
}

#[test]
fn test_same_manager_registered_twice_closes_once_per_registration() {
    let buf = SharedBuf::default();
    let shared = text_destination(&buf, Flags::NEWLINE);
    let logger = Logger::builder()
        .blocking(true)
        .destination(shared.clone())
        .destination(shared.clone())
        .build()
        .expect("logger");

    logger.info("twice").expect("log");
    assert_eq!(buf.contents(), "twice\ntwice\n");

    assert!(logger.remove_destination(&shared));
    logger.info("once").expect("log");
    assert_eq!(buf.contents(), "twice\ntwice\nonce\n");

    logger.close().expect("close");
    let entry = LogEntry::new(LogLevel::Info, "late");
    // One registration was removed without a close, so one is still held
    assert!(shared.lock().deliver(&entry).is_ok());
}

#[test]
fn test_closed_destination_is_evicted() {
    let buf = SharedBuf::default();
    let other = SharedBuf::default();
    let dest = text_destination(&buf, Flags::NEWLINE);
    let logger = Logger::builder()
        .blocking(true)
        .destination(dest.clone())
        .destination(text_destination(&other, Flags::NEWLINE))
        .build()
        .expect("logger");

    dest.lock().close().expect("release");
    logger.info("after release").expect("log");

    assert_eq!(logger.manager().len(), 1);
    assert_eq!(logger.metrics().destinations_evicted(), 1);
    assert_eq!(other.contents(), "after release\n");
    assert_eq!(buf.contents(), "");
}

#[test]
fn test_file_destination_through_logger() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("app.log");

    let file = FileDestination::with_options(
        &path,
        FileOptions {
            flags: Flags::LEVEL | Flags::FIELDS | Flags::NEWLINE,
            level: LogLevel::Debug,
            ..FileOptions::default()
        },
    )
    .expect("file destination");

    let logger = Logger::builder()
        .destination(file)
        .build()
        .expect("logger");
    let request = logger.set_fields(Fields::new().with("path", "/a b"));

    for i in 0..20 {
        request.debug(format!("step {}", i)).expect("log");
    }
    logger.close().expect("close");

    let content = fs::read_to_string(&path).expect("read log");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 20);
    assert_eq!(lines[0], "[DEBUG] step 0");
    assert_eq!(lines[19], "[DEBUG] step 19");
}

#[test]
fn test_lock_suspends_delivery() {
    let buf = SharedBuf::default();
    let logger = Logger::builder()
        .destination(text_destination(&buf, Flags::NEWLINE))
        .build()
        .expect("logger");

    let guard = logger.lock();
    logger.info("queued").expect("enqueue");

    let blocking = logger.blocking();
    let waiter = thread::spawn(move || blocking.info("waits"));
    thread::sleep(Duration::from_millis(50));
    assert_eq!(buf.contents(), "");
    assert!(!waiter.is_finished());

    guard.unlock();
    waiter.join().expect("join").expect("delivered");
    assert_eq!(buf.contents(), "queued\nwaits\n");
}

#[test]
fn test_failure_callback_sees_errors() {
    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "disk gone"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    let failures = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&failures);
    let good = SharedBuf::default();
    let logger = Logger::builder()
        .blocking(true)
        .destination(WriterDestination::text(Broken, Flags::empty(), true).with_name("broken"))
        .destination(text_destination(&good, Flags::NEWLINE))
        .on_failure(Arc::new(move |name, err| {
            sink.lock().push(format!("{}: {}", name, err));
        }))
        .build()
        .expect("logger");

    logger.info("hello").expect("log never fails for delivery errors");

    assert_eq!(good.contents(), "hello\n");
    assert_eq!(logger.metrics().delivery_failures(), 1);
    let failures = failures.lock();
    assert_eq!(failures.len(), 1);
    assert!(failures[0].starts_with("broken: "));
}
