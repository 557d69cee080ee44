use mesh_fsm::{Fsm, State};
use mesh_status::{Error, Result};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Step {
    One,
    Two,
    Three,
    Four,
}

const DWELL: u32 = 3;

#[derive(Default)]
struct Counter {
    in_state: u32,
    runs: u32,
    entries: [u32; 4],
    exits: [u32; 4],
}

fn tick(ctx: &mut Counter) -> Result<()> {
    ctx.in_state += 1;
    ctx.runs += 1;
    Ok(())
}

macro_rules! hooks {
    ($entry:ident, $exit:ident, $idx:expr) => {
        fn $entry(ctx: &mut Counter) -> Result<()> {
            ctx.entries[$idx] += 1;
            ctx.in_state = 0;
            Ok(())
        }
        fn $exit(ctx: &mut Counter) -> Result<()> {
            ctx.exits[$idx] += 1;
            Ok(())
        }
    };
}

hooks!(enter_one, leave_one, 0);
hooks!(enter_two, leave_two, 1);
hooks!(enter_three, leave_three, 2);
hooks!(enter_four, leave_four, 3);

static CYCLE: [State<Counter, Step>; 4] = [
    State::new(Step::One, "ONE", tick).with_entry(enter_one).with_exit(leave_one),
    State::new(Step::Two, "TWO", tick).with_entry(enter_two).with_exit(leave_two),
    State::new(Step::Three, "THREE", tick).with_entry(enter_three).with_exit(leave_three),
    State::new(Step::Four, "FOUR", tick).with_entry(enter_four).with_exit(leave_four),
];

fn advance(current: Step, ctx: &Counter) -> Option<&'static State<Counter, Step>> {
    let idx = current as usize;
    if ctx.in_state < DWELL {
        Some(&CYCLE[idx])
    } else {
        Some(&CYCLE[(idx + 1) % CYCLE.len()])
    }
}

fn stuck(_current: Step, _ctx: &Counter) -> Option<&'static State<Counter, Step>> {
    None
}

fn machine() -> Fsm<'static, Counter, Step> {
    let mut fsm = Fsm::default();
    fsm.init(&CYCLE[0], advance, "cycle").expect("init");
    fsm
}

#[test]
fn four_state_cycle_follows_the_counter() {
    let mut fsm = machine();
    let mut ctx = Counter::default();
    let mut visited = Vec::new();

    for _ in 0..4 * DWELL {
        fsm.run(&mut ctx).expect("run");
        visited.push(fsm.current_state_name().expect("initialised"));
    }

    assert_eq!(
        visited,
        [
            "ONE", "ONE", "TWO", "TWO", "TWO", "THREE", "THREE", "THREE", "FOUR", "FOUR", "FOUR",
            "ONE"
        ]
    );
    assert_eq!(fsm.current_state_id(), Some(Step::One));
    assert_eq!(ctx.entries, [1, 1, 1, 1]);
    assert_eq!(ctx.exits, [1, 1, 1, 1]);
    assert_eq!(ctx.runs, 4 * DWELL);
}

#[test]
fn staying_put_fires_no_hooks() {
    let mut fsm = machine();
    let mut ctx = Counter::default();
    for _ in 0..DWELL - 1 {
        fsm.run(&mut ctx).expect("run");
    }
    assert_eq!(ctx.entries, [0; 4]);
    assert_eq!(ctx.exits, [0; 4]);
    assert_eq!(fsm.current_state_name(), Some("ONE"));
}

#[test]
fn missing_transition_is_reported_and_retried() {
    let mut fsm = Fsm::default();
    fsm.init(&CYCLE[1], stuck, "stuck").expect("init");
    let mut ctx = Counter::default();

    assert_eq!(fsm.run(&mut ctx), Err(Error::NoDevice));
    assert_eq!(fsm.run(&mut ctx), Err(Error::NoDevice));
    assert_eq!(ctx.runs, 2, "the state action still runs");
    assert_eq!(fsm.current_state_id(), Some(Step::Two));
    assert_eq!(ctx.exits, [0; 4]);
}

#[test]
fn uninitialised_machine_refuses_to_run() {
    let mut fsm: Fsm<'_, Counter, Step> = Fsm::default();
    assert!(!fsm.is_initialized());
    assert_eq!(fsm.current_state_name(), None);
    assert_eq!(fsm.run(&mut Counter::default()), Err(Error::InvalidArgument));
}

#[test]
fn init_validates_its_arguments() {
    static NAMELESS: State<Counter, Step> = State::new(Step::One, "", tick);

    let mut fsm = Fsm::default();
    assert_eq!(fsm.init(&CYCLE[0], advance, ""), Err(Error::InvalidArgument));
    assert_eq!(fsm.init(&NAMELESS, advance, "owner"), Err(Error::InvalidArgument));
    assert!(!fsm.is_initialized());

    fsm.init(&CYCLE[2], advance, "owner").expect("init");
    assert_eq!(fsm.owner(), "owner");
    assert_eq!(fsm.init(&CYCLE[0], advance, "again"), Err(Error::AlreadyDone));
    assert_eq!(fsm.current_state_id(), Some(Step::Three));
}
