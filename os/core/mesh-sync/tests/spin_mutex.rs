use mesh_sync::{InterruptControl, IrqGuard, SpinMutex};
use std::cell::Cell;
use std::{panic, thread};

thread_local! {
    // Simulated per-core interrupt enable flag.
    static IRQ_ENABLED: Cell<bool> = const { Cell::new(true) };
    static MASK_CALLS: Cell<usize> = const { Cell::new(0) };
}

struct FakeIrq;

impl InterruptControl for FakeIrq {
    fn disable() -> bool {
        MASK_CALLS.with(|c| c.set(c.get() + 1));
        IRQ_ENABLED.with(|e| e.replace(false))
    }

    fn restore(were_enabled: bool) {
        if were_enabled {
            IRQ_ENABLED.with(|e| e.set(true));
        }
    }
}

fn irq_enabled() -> bool {
    IRQ_ENABLED.with(Cell::get)
}

#[test]
fn basic_lock_and_raii() {
    let m: SpinMutex<u32> = SpinMutex::new(0);

    {
        let mut g = m.lock();
        *g = 41;
    }

    {
        let mut g = m.lock();
        *g += 1;
        assert_eq!(*g, 42);
    }
    assert!(!m.is_locked());
}

#[test]
fn try_lock_semantics() {
    let m: SpinMutex<u8> = SpinMutex::new(1);

    let g1 = m.try_lock();
    assert!(g1.is_some());
    assert_eq!(**g1.as_ref().unwrap(), 1);

    assert!(m.try_lock().is_none());

    drop(g1);
    assert!(m.try_lock().is_some());
}

#[test]
fn interrupts_are_masked_while_held() {
    let m: SpinMutex<u32, FakeIrq> = SpinMutex::new(7);
    assert!(irq_enabled());
    {
        let g = m.lock();
        assert!(!irq_enabled());
        assert_eq!(*g, 7);
    }
    assert!(irq_enabled());
}

#[test]
fn nested_critical_sections_restore_only_outermost() {
    let a: SpinMutex<u32, FakeIrq> = SpinMutex::new(1);
    let b: SpinMutex<u32, FakeIrq> = SpinMutex::new(2);

    let ga = a.lock();
    {
        let gb = b.lock();
        assert_eq!(*ga + *gb, 3);
    }
    // inner guard saw interrupts already masked and must not unmask
    assert!(!irq_enabled());
    drop(ga);
    assert!(irq_enabled());
}

#[test]
fn failed_try_lock_restores_interrupts() {
    let m: SpinMutex<u32, FakeIrq> = SpinMutex::new(0);
    let held = m.lock();
    let before = MASK_CALLS.with(Cell::get);
    assert!(m.try_lock().is_none());
    assert_eq!(MASK_CALLS.with(Cell::get), before + 1);
    assert!(!irq_enabled());
    drop(held);
    assert!(irq_enabled());
}

#[test]
fn irq_guard_reports_previous_state() {
    let outer = IrqGuard::<FakeIrq>::new();
    assert!(outer.were_enabled());
    let inner = IrqGuard::<FakeIrq>::new();
    assert!(!inner.were_enabled());
    drop(inner);
    assert!(!irq_enabled());
    drop(outer);
    assert!(irq_enabled());
}

#[test]
fn get_mut_and_into_inner() {
    let mut m: SpinMutex<Vec<i32>> = SpinMutex::new(vec![1, 2, 3]);
    m.get_mut().push(4);
    assert_eq!(m.lock().as_slice(), &[1, 2, 3, 4]);
    assert_eq!(m.into_inner(), vec![1, 2, 3, 4]);
}

#[test]
fn contended_increments_are_exact_and_exclusive() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};

    let threads = 8;
    let iters = 5_000;

    let lock: Arc<SpinMutex<usize>> = Arc::new(SpinMutex::new(0));
    let in_cs = Arc::new(AtomicUsize::new(0));
    let start = Arc::new(Barrier::new(threads));

    let mut handles = Vec::with_capacity(threads);
    for _ in 0..threads {
        let lock = Arc::clone(&lock);
        let in_cs = Arc::clone(&in_cs);
        let start = Arc::clone(&start);
        handles.push(thread::spawn(move || {
            start.wait();
            for _ in 0..iters {
                lock.with_lock(|v| {
                    let prev = in_cs.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(prev, 0, "mutual exclusion violated");
                    *v += 1;
                    in_cs.fetch_sub(1, Ordering::SeqCst);
                });
                thread::yield_now();
            }
        }));
    }

    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(lock.with_lock(|v| *v), threads * iters);
    assert_eq!(in_cs.load(Ordering::SeqCst), 0);
}

#[test]
fn lock_is_released_on_panic() {
    let m: SpinMutex<u32, FakeIrq> = SpinMutex::new(0);

    let res = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        m.with_lock(|v| {
            *v = 123;
            panic!("boom");
        });
    }));
    assert!(res.is_err(), "expected panic");

    assert_eq!(m.with_lock(|v| *v), 123);
    assert!(irq_enabled());
}

#[test]
fn spin_mutex_is_sync_for_send_t() {
    fn takes_sync<S: Sync>(_s: &S) {}
    let m: SpinMutex<u8> = SpinMutex::new(0);
    takes_sync(&m);
}
