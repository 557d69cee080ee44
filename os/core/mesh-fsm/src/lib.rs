//! # Table-driven state machine driver
//!
//! Protocol state machines are written as a static table of [`State`]s plus
//! a transition function. The owning task calls [`Fsm::run`] once per
//! scheduling period; each call runs the current state's action, asks the
//! transition function where to go next, and fires the exit and entry hooks
//! when the state changes.
//!
//! ```rust
//! use mesh_fsm::{Fsm, State};
//!
//! #[derive(Debug, Copy, Clone, PartialEq, Eq)]
//! enum Phase { Wait, Go }
//!
//! struct Ctx { polls: u32 }
//!
//! fn poll(ctx: &mut Ctx) -> mesh_status::Result<()> {
//!     ctx.polls += 1;
//!     Ok(())
//! }
//!
//! static STATES: [State<Ctx, Phase>; 2] = [
//!     State::new(Phase::Wait, "WAIT", poll),
//!     State::new(Phase::Go, "GO", poll),
//! ];
//!
//! fn next(_now: Phase, ctx: &Ctx) -> Option<&'static State<Ctx, Phase>> {
//!     Some(&STATES[usize::from(ctx.polls >= 3)])
//! }
//!
//! let mut fsm = Fsm::default();
//! fsm.init(&STATES[0], next, "blinker").unwrap();
//! let mut ctx = Ctx { polls: 0 };
//! while fsm.current_state_id() != Some(Phase::Go) {
//!     fsm.run(&mut ctx).unwrap();
//! }
//! assert_eq!(ctx.polls, 3);
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

mod fsm;
mod state;

pub use fsm::{Fsm, TransitionFn};
pub use state::{Action, State};
