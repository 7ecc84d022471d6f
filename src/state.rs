//! Storage for the picked resource locator
//!
//! The Dioxus binding keeps the locator in a `Signal`, everything else can use
//! [`PickedResource`], which notifies listeners on every change.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Slot holding the currently picked locator
pub trait UriStore {
    fn get(&self) -> Option<String>;
    fn set(&self, uri: Option<String>);
}

type Listener = Rc<dyn Fn(Option<&str>)>;

/// Observable in-memory slot
#[derive(Clone, Default)]
pub struct PickedResource {
    uri: Rc<RefCell<Option<String>>>,
    listeners: Rc<RefCell<Vec<Listener>>>,
}

impl PickedResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked with the new value after every change
    pub fn subscribe(&self, listener: impl Fn(Option<&str>) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }
}

impl UriStore for PickedResource {
    fn get(&self) -> Option<String> {
        self.uri.borrow().clone()
    }

    fn set(&self, uri: Option<String>) {
        if *self.uri.borrow() == uri {
            return;
        }
        *self.uri.borrow_mut() = uri;

        let current = self.uri.borrow().clone();
        // Listeners may subscribe or set while being notified
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(current.as_deref());
        }
    }
}

impl std::fmt::Debug for PickedResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PickedResource")
            .field("uri", &self.uri.borrow())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}

/// Tells completion handlers whether the owner of the state still exists
#[derive(Debug, Clone)]
pub struct Liveness {
    alive: Rc<Cell<bool>>,
}

impl Liveness {
    pub fn new() -> Self {
        Self {
            alive: Rc::new(Cell::new(true)),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.get()
    }

    /// Called by the owner when it goes away, e.g. on component unmount
    pub fn kill(&self) {
        self.alive.set(false);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}
