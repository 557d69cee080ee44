use mesh_fsm::{Fsm, State};
use mesh_status::Result;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Mode {
    Idle,
}

#[derive(Default)]
struct Log {
    runs: u32,
    quiet_exits: u32,
    busy_entries: u32,
    busy_exits: u32,
    leave: bool,
}

fn run(ctx: &mut Log) -> Result<()> {
    ctx.runs += 1;
    Ok(())
}

fn quiet_exit(ctx: &mut Log) -> Result<()> {
    ctx.quiet_exits += 1;
    Ok(())
}

fn busy_entry(ctx: &mut Log) -> Result<()> {
    ctx.busy_entries += 1;
    Ok(())
}

fn busy_exit(ctx: &mut Log) -> Result<()> {
    ctx.busy_exits += 1;
    Ok(())
}

// Two rows that report the same id.
static QUIET: State<Log, Mode> = State::new(Mode::Idle, "QUIET", run).with_exit(quiet_exit);
static BUSY: State<Log, Mode> = State::new(Mode::Idle, "BUSY", run)
    .with_entry(busy_entry)
    .with_exit(busy_exit);

fn to_busy(_: Mode, ctx: &Log) -> Option<&'static State<Log, Mode>> {
    Some(if ctx.leave { &BUSY } else { &QUIET })
}

#[test]
fn distinct_rows_with_one_id_still_transition() {
    let mut fsm = Fsm::default();
    fsm.init(&QUIET, to_busy, "shared").unwrap();
    let mut log = Log::default();

    fsm.run(&mut log).unwrap();
    assert_eq!(fsm.current_state_name(), Some("QUIET"));
    assert_eq!(log.quiet_exits, 0);

    log.leave = true;
    fsm.run(&mut log).unwrap();
    assert_eq!(fsm.current_state_name(), Some("BUSY"));
    assert_eq!(log.quiet_exits, 1);
    assert_eq!(log.busy_entries, 1);
    assert_eq!(log.runs, 2);
}

#[test]
fn returning_the_current_row_runs_no_hooks() {
    let mut fsm = Fsm::default();
    fsm.init(&BUSY, to_busy, "shared").unwrap();
    let mut log = Log {
        leave: true,
        ..Log::default()
    };

    for _ in 0..3 {
        fsm.run(&mut log).unwrap();
    }
    assert_eq!(fsm.current_state_name(), Some("BUSY"));
    assert_eq!((log.busy_entries, log.busy_exits), (0, 0));
    assert_eq!(log.runs, 3);
}
