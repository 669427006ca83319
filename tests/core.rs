use eddy::{Notifier, Timer};

use std::cell::Cell;
use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

#[test]
fn run_with_zero_budget_never_blocks() {
    let start = std::time::Instant::now();
    let still_running = eddy::run(Some(Duration::ZERO));

    assert!(still_running);
    assert!(
        start.elapsed() < Duration::from_millis(50),
        "zero budget must be a single non-blocking poll pass"
    );
}

#[test]
fn notifications_are_counted_not_merged() {
    let notifier = Notifier::new();
    let fired = Rc::new(Cell::new(0));

    let counter = Rc::clone(&fired);
    assert!(eddy::add(&notifier, move || {
        counter.set(counter.get() + 1);
    }));

    assert!(notifier.notify());
    assert!(notifier.notify());
    assert!(notifier.notify());

    assert!(eddy::run(Some(Duration::from_millis(100))));
    assert_eq!(fired.get(), 3, "three notifies must yield three dispatches");

    assert!(eddy::remove(&notifier));
}

#[test]
fn periodic_timer_fires_once_per_interval() {
    let ticks = Rc::new(Cell::new(0));

    let counter = Rc::clone(&ticks);
    assert!(eddy::every(Duration::from_millis(100), move || {
        counter.set(counter.get() + 1);
    }));

    assert!(eddy::run(Some(Duration::from_millis(350))));
    assert_eq!(ticks.get(), 3, "expected fires at ~100, ~200, ~300 ms");
}

#[test]
fn rearming_restarts_the_phase() {
    let mut timer = Timer::new(Duration::from_millis(500));
    let fired = Rc::new(Cell::new(0));

    let counter = Rc::clone(&fired);
    assert!(eddy::add(&timer, move || {
        counter.set(counter.get() + 1);
    }));

    // Re-arm well before the original deadline: the next fire must be
    // one new interval after this call, not 500ms after the old arm.
    timer.set_interval(Duration::from_millis(50));
    assert_eq!(timer.interval(), Duration::from_millis(50));

    assert!(eddy::run(Some(Duration::from_millis(120))));
    assert_eq!(fired.get(), 2);

    assert!(eddy::remove(&timer));
}

#[test]
fn zero_interval_disarms_the_timer() {
    let mut timer = Timer::new(Duration::from_millis(10));
    let fired = Rc::new(Cell::new(0));

    let counter = Rc::clone(&fired);
    assert!(eddy::add(&timer, move || {
        counter.set(counter.get() + 1);
    }));

    timer.set_interval(Duration::ZERO);

    assert!(eddy::run(Some(Duration::from_millis(80))));
    assert_eq!(fired.get(), 0, "a disarmed timer must not fire");

    assert!(eddy::remove(&timer));
}

#[test]
fn remove_then_add_is_a_fresh_registration() {
    let notifier = Notifier::new();
    let fired = Rc::new(Cell::new(0));

    let counter = Rc::clone(&fired);
    assert!(eddy::add(&notifier, move || {
        counter.set(counter.get() + 1);
    }));

    assert!(notifier.notify());
    assert!(eddy::run(Some(Duration::from_millis(50))));
    assert_eq!(fired.get(), 1);

    assert!(eddy::remove(&notifier));
    assert!(!eddy::remove(&notifier), "second removal is a no-op");

    // Same descriptor, new handler: must register cleanly and carry
    // no residual drain state.
    let counter = Rc::clone(&fired);
    assert!(eddy::add(&notifier, move || {
        counter.set(counter.get() + 10);
    }));

    assert!(notifier.notify());
    assert!(eddy::run(Some(Duration::from_millis(50))));
    assert_eq!(fired.get(), 11);

    assert!(eddy::remove(&notifier));
}

#[test]
fn add_rejects_an_invalid_descriptor() {
    let bogus = eddy::Io::new(-1, false);
    assert!(!eddy::add(&bogus, || {}));
}

#[test]
fn stop_only_affects_the_calling_thread() {
    let worker = thread::spawn(|| {
        assert!(eddy::stop());
        // The pending stop signal is picked up by the next run call.
        assert!(!eddy::run(Some(Duration::from_secs(5))));
    });

    worker.join().expect("worker panicked");

    // This thread's loop never saw a stop signal.
    assert!(eddy::run(Some(Duration::from_millis(20))));
}

#[test]
fn notify_crosses_threads() {
    static DELIVERED: AtomicUsize = AtomicUsize::new(0);

    let notifier = Notifier::new();

    assert!(eddy::add(&notifier, || {
        DELIVERED.fetch_add(1, Ordering::SeqCst);
    }));

    thread::scope(|scope| {
        scope.spawn(|| {
            assert!(notifier.notify());
        });

        assert!(eddy::run(Some(Duration::from_millis(500))));
    });

    assert_eq!(DELIVERED.load(Ordering::SeqCst), 1);
    assert!(eddy::remove(&notifier));
}

#[test]
fn pending_and_read_report_byte_counts() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind listener");
    let addr = listener.local_addr().expect("failed to get local address");

    let mut peer = TcpStream::connect(addr).expect("failed to connect");
    let (local, _) = listener.accept().expect("failed to accept");

    peer.write_all(b"0123456789").expect("failed to write");
    peer.flush().expect("failed to flush");

    use std::os::fd::AsRawFd;
    let io = eddy::Io::new(local.as_raw_fd(), false);

    // A socket with bytes pending registers like any other source.
    assert!(eddy::add(&io, || {}));
    assert!(eddy::remove(&io));

    assert_eq!(io.pending(), 10);

    let mut buffer = [0u8; 20];
    assert_eq!(io.read(&mut buffer), 10);
    assert_eq!(&buffer[..10], b"0123456789");
    assert_eq!(io.pending(), 0);
}
