use crate::state::{Action, State};
use log::{debug, warn};
use mesh_status::{Error, Result};

/// Chooses the state following `current`; `None` means no valid transition.
///
/// Returning the very row the machine is in (same address, so keep tables in
/// a `static`) stays put without hooks. Any other row is a transition, even
/// one that reuses the current id.
pub type TransitionFn<'t, C, S> = fn(current: S, ctx: &C) -> Option<&'t State<C, S>>;

/// A state machine instance driven by one owning task.
///
/// `Fsm::default()` is uninitialised; [`run`](Self::run) refuses to work
/// until [`init`](Self::init) succeeded.
pub struct Fsm<'t, C, S> {
    current: Option<&'t State<C, S>>,
    transition: Option<TransitionFn<'t, C, S>>,
    owner: &'t str,
}

impl<C, S> Default for Fsm<'_, C, S> {
    fn default() -> Self {
        Self {
            current: None,
            transition: None,
            owner: "",
        }
    }
}

impl<'t, C, S: Copy + Eq> Fsm<'t, C, S> {
    /// Places the machine in `initial`; no entry hook runs.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] for an empty owner or state name.
    /// - [`Error::AlreadyDone`] if the machine was initialised before.
    pub fn init(
        &mut self,
        initial: &'t State<C, S>,
        transition: TransitionFn<'t, C, S>,
        owner: &'t str,
    ) -> Result<()> {
        if owner.is_empty() || initial.name().is_empty() {
            return Err(Error::InvalidArgument);
        }
        if self.current.is_some() {
            return Err(Error::AlreadyDone);
        }
        self.current = Some(initial);
        self.transition = Some(transition);
        self.owner = owner;
        Ok(())
    }

    /// Runs one step: the current state's action, then at most one
    /// transition.
    ///
    /// Failing actions and hooks are logged and otherwise ignored; once a
    /// different next state is chosen, exit, switch and entry always
    /// complete.
    ///
    /// # Errors
    /// - [`Error::InvalidArgument`] if the machine is not initialised.
    /// - [`Error::NoDevice`] if the transition function found no next
    ///   state; the machine stays where it is.
    pub fn run(&mut self, ctx: &mut C) -> Result<()> {
        let (Some(current), Some(transition)) = (self.current, self.transition) else {
            return Err(Error::InvalidArgument);
        };

        self.report("run", current, current.run_action()(ctx));

        let Some(next) = transition(current.id(), ctx) else {
            debug!("{}: no transition out of {}", self.owner, current.name());
            return Err(Error::NoDevice);
        };
        if core::ptr::eq(next, current) {
            return Ok(());
        }

        self.invoke("exit", current, current.exit_action(), ctx);
        self.current = Some(next);
        debug!("{}: {} -> {}", self.owner, current.name(), next.name());
        self.invoke("entry", next, next.entry_action(), ctx);
        Ok(())
    }

    fn invoke(&self, hook: &str, state: &State<C, S>, action: Option<Action<C>>, ctx: &mut C) {
        if let Some(action) = action {
            self.report(hook, state, action(ctx));
        }
    }

    fn report(&self, hook: &str, state: &State<C, S>, result: Result<()>) {
        if let Err(e) = result {
            warn!("{}: {hook} of state {} failed: {e}", self.owner, state.name());
        }
    }

    pub fn current_state_name(&self) -> Option<&'static str> {
        self.current.map(State::name)
    }

    pub fn current_state_id(&self) -> Option<S> {
        self.current.map(State::id)
    }

    pub const fn owner(&self) -> &'t str {
        self.owner
    }

    pub const fn is_initialized(&self) -> bool {
        self.current.is_some()
    }
}
