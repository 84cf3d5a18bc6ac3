//! Event listener registration with grouped cancellation.
//!
//! Every listener is registered against an [`AbortSignal`]. Aborting the
//! owning [`AbortController`] detaches all of its listeners at once, so a
//! disposed component never receives another callback.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Owner side of a cancellation flag.
#[derive(Debug, Default)]
pub struct AbortController {
    signal: AbortSignal,
}

impl AbortController {
    pub fn new() -> Self {
        Self::default()
    }

    /// A signal observing this controller.
    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// Abort every registration made with this controller's signal.
    pub fn abort(&self) {
        self.signal.aborted.set(true);
    }

    pub fn is_aborted(&self) -> bool {
        self.signal.is_aborted()
    }
}

/// Observer side of a cancellation flag. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct AbortSignal {
    aborted: Rc<Cell<bool>>,
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        self.aborted.get()
    }
}

struct Registration<E> {
    signal: AbortSignal,
    handler: Box<dyn FnMut(&E)>,
}

/// A list of callbacks for one kind of event.
pub struct Listeners<E> {
    registrations: Vec<Registration<E>>,
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self {
            registrations: Vec::new(),
        }
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("registrations", &self.registrations.len())
            .finish()
    }
}

impl<E> Listeners<E> {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback that lives until `signal` is aborted.
    pub fn add_listener(&mut self, signal: &AbortSignal, handler: impl FnMut(&E) + 'static) {
        if signal.is_aborted() {
            return;
        }
        self.registrations.push(Registration {
            signal: signal.clone(),
            handler: Box::new(handler),
        });
    }

    /// Deliver an event to every live listener, in registration order.
    ///
    /// Returns the number of listeners called.
    pub fn dispatch(&mut self, event: &E) -> usize {
        self.registrations.retain(|r| !r.signal.is_aborted());

        let mut delivered = 0;
        for registration in &mut self.registrations {
            // A handler may abort a signal shared with later listeners.
            if registration.signal.is_aborted() {
                continue;
            }
            (registration.handler)(event);
            delivered += 1;
        }
        delivered
    }

    /// Number of listeners that have not been aborted.
    pub fn len(&self) -> usize {
        self.registrations
            .iter()
            .filter(|r| !r.signal.is_aborted())
            .count()
    }

    /// Whether every listener has been aborted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
