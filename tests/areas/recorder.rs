//! Listener that records every dispatch it receives.

use std::sync::{Arc, Mutex};

use mock_storagearea::{Listener, StorageChanges};

#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<(StorageChanges, String)>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener(&self) -> Listener {
        let seen = Arc::clone(&self.seen);
        Listener::new(move |changes, area| {
            seen.lock().unwrap().push((changes.clone(), area.to_string()));
        })
    }

    pub fn calls(&self) -> Vec<(StorageChanges, String)> {
        self.seen.lock().unwrap().clone()
    }
}
