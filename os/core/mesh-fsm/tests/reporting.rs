//! Failure reports go through the `log` facade; this binary owns the
//! process-wide console logger.

use log::LevelFilter;
use mesh_console::ConsoleLogger;
use mesh_fsm::{Fsm, State};
use mesh_status::{Error, Result};
use std::sync::Mutex;

static LINES: Mutex<Vec<String>> = Mutex::new(Vec::new());

fn capture(line: &core::fmt::Arguments<'_>) {
    LINES.lock().unwrap().push(line.to_string());
}

#[derive(Default)]
struct Ctx {
    entered_b: bool,
}

fn broken(_ctx: &mut Ctx) -> Result<()> {
    Err(Error::NoData)
}

fn fine(_ctx: &mut Ctx) -> Result<()> {
    Ok(())
}

fn enter_b(ctx: &mut Ctx) -> Result<()> {
    ctx.entered_b = true;
    Ok(())
}

static STATES: [State<Ctx, u8>; 2] = [
    State::new(0, "A", broken).with_exit(broken),
    State::new(1, "B", fine).with_entry(enter_b),
];

fn to_b(_current: u8, _ctx: &Ctx) -> Option<&'static State<Ctx, u8>> {
    Some(&STATES[1])
}

#[test]
fn failing_actions_are_logged_without_blocking_the_transition() {
    ConsoleLogger::new(LevelFilter::Warn, capture)
        .init()
        .expect("logger");

    let mut fsm = Fsm::default();
    fsm.init(&STATES[0], to_b, "uploader").expect("init");
    let mut ctx = Ctx::default();

    assert_eq!(fsm.run(&mut ctx), Ok(()));
    assert_eq!(fsm.current_state_name(), Some("B"));
    assert!(ctx.entered_b);

    let lines = LINES.lock().unwrap().clone();
    assert_eq!(lines.len(), 2, "{lines:?}");
    assert!(lines[0].starts_with("[WARN]"));
    assert!(lines[0].contains("uploader: run of state A failed"));
    assert!(lines[1].contains("uploader: exit of state A failed"));
}
