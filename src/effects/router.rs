// Effect router
//
// Holds the handler currently giving meaning to `draw`/`weight`/`exit` on this
// thread. Installing a handler returns a `HandlerScope`; dropping the scope
// restores whatever was active before, on every exit path.

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::rc::Rc;
use tracing::{debug, trace, warn};

use super::cps::Step;
use super::handler::{DefaultHandler, Handler, Resumption};
use crate::error::{InferenceError, Result};

/// A handler as stored in the router slot.
pub type SharedHandler = Rc<RefCell<dyn Handler>>;

thread_local! {
    static ACTIVE: RefCell<Option<SharedHandler>> = const { RefCell::new(None) };
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Guard for an installed handler. Restores the previous handler when dropped.
#[must_use = "dropping the scope immediately uninstalls the handler"]
pub struct HandlerScope {
    previous: Option<Option<SharedHandler>>,
    depth: usize,
    name: &'static str,
    // the slot is thread-local
    _not_send: PhantomData<*const ()>,
}

impl HandlerScope {
    /// Nesting depth of the handler this scope installed (1 for the outermost).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Name of the handler this scope installed.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for HandlerScope {
    fn drop(&mut self) {
        let Some(previous) = self.previous.take() else {
            return;
        };
        let current_depth = DEPTH.with(Cell::get);
        if current_depth != self.depth {
            warn!(
                handler = self.name,
                expected = self.depth,
                actual = current_depth,
                "handler scopes released out of order"
            );
        }
        ACTIVE.with(|slot| *slot.borrow_mut() = previous);
        DEPTH.with(|d| d.set(self.depth - 1));
        debug!(handler = self.name, depth = self.depth, "restored previous handler");
    }
}

fn name_of(handler: &SharedHandler) -> &'static str {
    handler.try_borrow().map(|h| h.name()).unwrap_or("<busy>")
}

/// Make `handler` the active handler until the returned scope is dropped.
pub fn install(handler: SharedHandler) -> HandlerScope {
    let name = name_of(&handler);
    let previous = ACTIVE.with(|slot| slot.replace(Some(handler)));
    let depth = DEPTH.with(|d| {
        let depth = d.get() + 1;
        d.set(depth);
        depth
    });
    debug!(handler = name, depth, "installed handler");
    HandlerScope {
        previous: Some(previous),
        depth,
        name,
        _not_send: PhantomData,
    }
}

/// The installed handler, or `None` when the default handler is in effect.
pub fn current() -> Option<SharedHandler> {
    ACTIVE.with(|slot| slot.borrow().clone())
}

/// Whether no strategy is installed on this thread.
pub fn is_default() -> bool {
    ACTIVE.with(|slot| slot.borrow().is_none())
}

/// Number of handlers currently installed on this thread.
pub fn depth() -> usize {
    DEPTH.with(Cell::get)
}

/// Name of the handler effects are currently routed to.
pub fn active_name() -> &'static str {
    match current() {
        Some(handler) => name_of(&handler),
        None => "default",
    }
}

/// Forward `step` to the active handler.
pub fn dispatch(step: Step) -> Result<Resumption> {
    match current() {
        Some(handler) => {
            let mut active = handler
                .try_borrow_mut()
                .map_err(|_| InferenceError::Reentrant("active"))?;
            trace!(handler = active.name(), effect = %step.effect(), "dispatch");
            deliver(&mut *active, step)
        }
        None => {
            trace!(handler = "default", effect = %step.effect(), "dispatch");
            deliver(&mut DefaultHandler::new(), step)
        }
    }
}

fn deliver(handler: &mut dyn Handler, step: Step) -> Result<Resumption> {
    match step {
        Step::Draw { k, dist, params } => handler.draw(k, &dist, &params),
        Step::Weight { k, log_weight } => handler.weight(k, log_weight),
        Step::Exit(value) => handler.exit(value),
    }
}
