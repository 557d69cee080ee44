use mesh_status::Result;

/// Work done on behalf of a state against the machine's context.
pub type Action<C> = fn(&mut C) -> Result<()>;

/// One row of a state table.
///
/// `C` is the context the actions operate on, `S` the identifier type
/// (usually a field-less enum).
pub struct State<C, S> {
    id: S,
    name: &'static str,
    run: Action<C>,
    on_entry: Option<Action<C>>,
    on_exit: Option<Action<C>>,
}

impl<C, S: Copy> State<C, S> {
    /// `name` must not be empty; [`Fsm::init`](crate::Fsm::init) rejects
    /// such states.
    pub const fn new(id: S, name: &'static str, run: Action<C>) -> Self {
        Self {
            id,
            name,
            run,
            on_entry: None,
            on_exit: None,
        }
    }

    #[must_use]
    pub const fn with_entry(self, on_entry: Action<C>) -> Self {
        Self {
            on_entry: Some(on_entry),
            ..self
        }
    }

    #[must_use]
    pub const fn with_exit(self, on_exit: Action<C>) -> Self {
        Self {
            on_exit: Some(on_exit),
            ..self
        }
    }

    pub const fn id(&self) -> S {
        self.id
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) const fn run_action(&self) -> Action<C> {
        self.run
    }

    pub(crate) const fn entry_action(&self) -> Option<Action<C>> {
        self.on_entry
    }

    pub(crate) const fn exit_action(&self) -> Option<Action<C>> {
        self.on_exit
    }
}

impl<C, S: core::fmt::Debug> core::fmt::Debug for State<C, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("State")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("on_entry", &self.on_entry.is_some())
            .field("on_exit", &self.on_exit.is_some())
            .finish_non_exhaustive()
    }
}
