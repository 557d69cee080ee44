//! Scheduling details of the tick-driven kernel, driven by a manual tick.

use mesh_pal::rtos::{HostPort, RtosPal};
use mesh_pal::{Mailbox, Platform, Semaphore, Task, TaskParams, Timeout, Timer, TimerParams};
use mesh_status::Error;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};

fn manual() -> RtosPal<HostPort> {
    RtosPal::new(HostPort::manual(1000))
}

fn wait_for(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    cond()
}

#[test]
fn ticks_advance_only_from_the_tick_interrupt() {
    let pal = manual();
    assert_eq!(pal.tick_count(), 0);
    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(pal.tick_count(), 0);

    for _ in 0..5 {
        pal.kernel().tick_from_isr();
    }
    assert_eq!(pal.tick_count(), 5);
    assert_eq!(pal.tick_count_from_isr(), 5);
}

#[test]
fn receive_timeout_is_counted_in_ticks() {
    let pal = manual();
    let q = pal.queue_create(1, 1).expect("queue");
    let (tx, rx) = mpsc::channel();
    let waiter = q.clone();
    pal.task_create(&TaskParams::new("rx", 4096, 2), move || {
        let mut out = [0u8; 1];
        tx.send(waiter.receive(&mut out, Timeout::Millis(5))).ok();
    })
    .expect("task");

    assert!(wait_for(|| q.blocked().1 == 1));
    for _ in 0..4 {
        pal.kernel().tick_from_isr();
    }
    assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

    pal.kernel().tick_from_isr();
    let result = rx.recv_timeout(Duration::from_secs(2)).expect("result");
    assert_eq!(result, Err(Error::TimedOut));
    assert_eq!(q.blocked(), (0, 0));
}

#[test]
fn highest_priority_waiter_is_served_first() {
    let pal = manual();
    let q = pal.queue_create(2, 1).expect("queue");
    let (tx, rx) = mpsc::channel();

    for (blocked, name, priority) in [(1, "low", 1u8), (2, "high", 9)] {
        let (inbox, tx) = (q.clone(), tx.clone());
        pal.task_create(&TaskParams::new(name, 4096, priority), move || {
            let mut out = [0u8; 1];
            inbox.receive(&mut out, Timeout::Forever).expect("receive");
            tx.send(name).ok();
        })
        .expect("task");
        assert!(wait_for(|| q.blocked().1 == blocked));
    }

    q.send(&[1], Timeout::NoWait).expect("send");
    assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok("high"));
    q.send(&[2], Timeout::NoWait).expect("send");
    assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok("low"));
}

#[test]
fn timers_expire_on_tick_boundaries() {
    let pal = manual();
    let fired = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&fired);
    let timer = pal
        .timer_create(&TimerParams::one_shot("t", 3, 0), move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        })
        .expect("timer");
    timer.start(Timeout::NoWait).expect("start");

    pal.kernel().tick_from_isr();
    pal.kernel().tick_from_isr();
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    pal.kernel().tick_from_isr();
    assert!(wait_for(|| fired.load(Ordering::SeqCst) == 1));
    assert!(!timer.is_active());
}

/// About 34.7 days at 1000 Hz, past half the range of the tick counter.
const LONG_WAIT_MS: u32 = 3_000_000_000;

#[test]
fn long_bounded_send_keeps_waiting() {
    let pal = manual();
    let q = pal.queue_create(1, 1).expect("queue");
    q.send(&[1], Timeout::NoWait).expect("fill");

    let (tx, rx) = mpsc::channel();
    let outbox = q.clone();
    pal.task_create(&TaskParams::new("tx", 4096, 2), move || {
        tx.send(outbox.send(&[2], Timeout::Millis(LONG_WAIT_MS))).ok();
    })
    .expect("task");

    assert!(wait_for(|| q.blocked().0 == 1));
    for _ in 0..3 {
        pal.kernel().tick_from_isr();
    }
    assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());

    let mut out = [0u8; 1];
    q.receive(&mut out, Timeout::NoWait).expect("drain");
    assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok(Ok(())));
}

#[test]
fn long_delay_does_not_return_early() {
    let pal = manual();
    let (tx, rx) = mpsc::channel();
    let sleeper = pal.clone();
    pal.task_create(&TaskParams::new("sleeper", 4096, 2), move || {
        sleeper.delay_ms(LONG_WAIT_MS);
        tx.send(()).ok();
    })
    .expect("task");

    for _ in 0..3 {
        pal.kernel().tick_from_isr();
    }
    assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
}

#[test]
fn long_one_shot_timer_does_not_fire_early() {
    let pal = manual();
    let fired = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&fired);
    let timer = pal
        .timer_create(&TimerParams::one_shot("far", LONG_WAIT_MS, 0), move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        })
        .expect("timer");
    timer.start(Timeout::NoWait).expect("start");

    for _ in 0..5 {
        pal.kernel().tick_from_isr();
    }
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(fired.load(Ordering::SeqCst), 0);
    assert!(timer.is_active());
}

#[test]
fn periodic_timer_keeps_its_phase() {
    let pal = manual();
    let fired = Arc::new(AtomicUsize::new(0));
    let count = Arc::clone(&fired);
    let timer = pal
        .timer_create(&TimerParams::periodic("beat", 2, 0), move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        })
        .expect("timer");
    timer.start(Timeout::NoWait).expect("start");

    for expected in 1..=3 {
        pal.kernel().tick_from_isr();
        pal.kernel().tick_from_isr();
        assert!(wait_for(|| fired.load(Ordering::SeqCst) == expected));
    }
    pal.kernel().tick_from_isr();
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(fired.load(Ordering::SeqCst), 3);
    timer.destroy().expect("destroy");
}

#[test]
fn timer_service_is_a_registered_task() {
    let pal = manual();
    assert_eq!(pal.kernel().task_count(), 0);
    let timer = pal
        .timer_create(&TimerParams::periodic("p", 10, 0), |_| {})
        .expect("timer");
    assert_eq!(pal.kernel().task_count(), 1);
    let second = pal
        .timer_create(&TimerParams::periodic("q", 10, 0), |_| {})
        .expect("timer");
    assert_eq!(pal.kernel().task_count(), 1);
    timer.destroy().expect("destroy");
    second.destroy().expect("destroy");
}

#[test]
fn finished_tasks_leave_the_registry() {
    let pal = manual();
    let task = pal
        .task_create(&TaskParams::new("brief", 4096, 1), || {})
        .expect("task");
    assert!(wait_for(|| task.is_finished()));
    assert!(wait_for(|| pal.kernel().task_count() == 0));
    assert_eq!(pal.kernel().task_name(task.id()), None);
}

#[test]
fn semaphore_remembers_its_holder() {
    let pal = manual();
    let sem = pal.semaphore_create().expect("semaphore");
    assert_eq!(sem.holder(), None);
    sem.take(Timeout::NoWait).expect("take");
    assert_eq!(sem.holder(), Some(pal.current_task()));
    sem.give().expect("give");
    assert_eq!(sem.holder(), None);
}

#[test]
fn platform_heap_tracks_live_blocks() {
    use mesh_pal::Allocator;

    let pal = manual();
    let block = pal.allocate(32).expect("allocation");
    assert_eq!(pal.kernel().heap().live_allocations(), 1);
    unsafe { pal.free(block) };
    assert_eq!(pal.kernel().heap().live_allocations(), 0);
}

#[cfg(not(feature = "backend-thread"))]
#[test]
fn rtos_backend_is_the_default() {
    let pal: RtosPal<HostPort> = mesh_pal::default_platform();
    assert_eq!(pal.tick_rate_hz(), mesh_pal::config::DEFAULT_TICK_RATE_HZ);
}
