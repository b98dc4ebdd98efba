use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::warn;

use crate::error::StorageError;

use super::StorageChanges;

type Callback = dyn Fn(&StorageChanges, &str) + Send + Sync;

/// A registered change callback.
///
/// Identity is the underlying allocation: clones of one `Listener` are the
/// same listener, two listeners built from identical closures are not.
#[derive(Clone)]
pub struct Listener(Arc<Callback>);

impl Listener {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&StorageChanges, &str) + Send + Sync + 'static,
    {
        Listener(Arc::new(callback))
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0) as *const ()
    }

    pub fn call(&self, changes: &StorageChanges, area_name: &str) {
        (self.0)(changes, area_name)
    }
}

impl PartialEq for Listener {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl Eq for Listener {}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener").field(&self.addr()).finish()
    }
}

/// Change notification hub for one area, or for several (see [`OnChanged::aggregate`]).
///
/// Clone-friendly via Arc; clones share the listener registry.
#[derive(Clone, Default)]
pub struct OnChanged {
    listeners: Arc<RwLock<Vec<Listener>>>,
}

impl OnChanged {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. Adding one that is already registered does nothing.
    pub fn add_listener(&self, listener: &Listener) -> Result<(), StorageError> {
        let mut listeners = self
            .listeners
            .write()
            .map_err(|_| StorageError::LockPoisoned("addListener"))?;
        if !listeners.contains(listener) {
            listeners.push(listener.clone());
        }
        Ok(())
    }

    pub fn remove_listener(&self, listener: &Listener) -> Result<(), StorageError> {
        let mut listeners = self
            .listeners
            .write()
            .map_err(|_| StorageError::LockPoisoned("removeListener"))?;
        listeners.retain(|registered| registered != listener);
        Ok(())
    }

    pub fn has_listener(&self, listener: &Listener) -> Result<bool, StorageError> {
        let listeners = self
            .listeners
            .read()
            .map_err(|_| StorageError::LockPoisoned("hasListener"))?;
        Ok(listeners.contains(listener))
    }

    pub fn has_listeners(&self) -> Result<bool, StorageError> {
        let listeners = self
            .listeners
            .read()
            .map_err(|_| StorageError::LockPoisoned("hasListeners"))?;
        Ok(!listeners.is_empty())
    }

    /// Calls every listener registered at the time of the call, in
    /// registration order.
    ///
    /// The registry lock is released before any listener runs, so listeners
    /// may register, unregister or write to the area.
    pub fn dispatch(&self, changes: &StorageChanges, area_name: &str) -> Result<(), StorageError> {
        let listeners = self
            .listeners
            .read()
            .map_err(|_| StorageError::LockPoisoned("dispatch"))?
            .clone();

        for listener in &listeners {
            listener.call(changes, area_name);
        }
        Ok(())
    }

    /// One hub fed by several areas. Each change is re-published under the
    /// name it was registered with.
    pub fn aggregate<'a, I>(areas: I) -> Result<OnChanged, StorageError>
    where
        I: IntoIterator<Item = (&'a str, &'a OnChanged)>,
    {
        let hub = OnChanged::new();

        for (area_name, source) in areas {
            let target = hub.clone();
            let name = area_name.to_string();
            source.add_listener(&Listener::new(move |changes, _| {
                if let Err(err) = target.dispatch(changes, &name) {
                    warn!(area = %name, error = %err, "aggregated change dispatch failed");
                }
            }))?;
        }

        Ok(hub)
    }
}

impl fmt::Debug for OnChanged {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.listeners.read().map(|l| l.len()).unwrap_or(0);
        f.debug_struct("OnChanged").field("listeners", &count).finish()
    }
}
