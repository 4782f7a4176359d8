//! Reference-counted session registry
//!
//! Maps caller handles to shared, open workbooks. Every handle returned by
//! [`SessionRegistry::open`] holds one reference on the session for its
//! resource; the workbook is released when the last handle closes.

use crate::error::{ExdError, ExdResult};
use crate::grid::{CalamineOpener, FileUrlResolver, PathResolver, SheetSource, SourceOpener};
use crate::types::{Handle, Identifier};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Open workbook shared by every handle resolving to the same resource.
pub struct Session {
    resource_key: String,
    source: Mutex<Option<Box<dyn SheetSource>>>,
}

impl Session {
    fn new(resource_key: String, source: Box<dyn SheetSource>) -> Self {
        Self {
            resource_key,
            source: Mutex::new(Some(source)),
        }
    }

    pub fn resource_key(&self) -> &str {
        &self.resource_key
    }

    /// Run `f` with exclusive access to the workbook.
    ///
    /// Reads on one session are serialized; other sessions are unaffected.
    pub fn with_source<T>(
        &self,
        f: impl FnOnce(&mut dyn SheetSource) -> ExdResult<T>,
    ) -> ExdResult<T> {
        let mut guard = self.source.lock();
        match guard.as_mut() {
            Some(source) => f(source.as_mut()),
            None => Err(ExdError::NotFound(format!(
                "Session for \"{}\" is closed.",
                self.resource_key
            ))),
        }
    }

    fn release(&self) {
        if let Some(source) = self.source.lock().take() {
            source.close();
        }
    }
}

struct HandleEntry {
    identifier: Identifier,
    resource_key: String,
}

struct SessionEntry {
    session: Arc<Session>,
    ref_count: usize,
}

#[derive(Default)]
struct RegistryState {
    handles: HashMap<String, HandleEntry>,
    sessions: HashMap<String, SessionEntry>,
}

/// Handle → session table guarded by a single lock.
pub struct SessionRegistry {
    resolver: Box<dyn PathResolver>,
    opener: Box<dyn SourceOpener>,
    state: Mutex<RegistryState>,
    next_id: AtomicU64,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(FileUrlResolver, CalamineOpener)
    }
}

impl SessionRegistry {
    pub fn new(
        resolver: impl PathResolver + 'static,
        opener: impl SourceOpener + 'static,
    ) -> Self {
        Self {
            resolver: Box::new(resolver),
            opener: Box::new(opener),
            state: Mutex::new(RegistryState::default()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Bind a fresh handle to the session for `identifier`, opening the
    /// workbook if no live session exists for its resource.
    pub fn open(&self, identifier: &Identifier) -> ExdResult<Handle> {
        let path = self.resolver.resolve_to_local_path(&identifier.url)?;
        let resource_key = std::fs::canonicalize(&path)
            .unwrap_or(path)
            .to_string_lossy()
            .into_owned();

        let mut guard = self.state.lock();
        let state = &mut *guard;
        match state.sessions.get_mut(&resource_key) {
            Some(entry) => entry.ref_count += 1,
            None => {
                // opened under the lock: one session per resource key
                let source = self
                    .opener
                    .open(std::path::Path::new(&resource_key))?;
                state.sessions.insert(
                    resource_key.clone(),
                    SessionEntry {
                        session: Arc::new(Session::new(resource_key.clone(), source)),
                        ref_count: 1,
                    },
                );
                info!(resource = %resource_key, "opened session");
            }
        }

        let id = (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string();
        state.handles.insert(
            id.clone(),
            HandleEntry {
                identifier: identifier.clone(),
                resource_key,
            },
        );
        debug!(handle = %id, url = %identifier.url, "allocated handle");
        Ok(Handle { id })
    }

    /// Look up the identifier and session behind a handle.
    pub fn resolve(&self, handle: &Handle) -> ExdResult<(Identifier, Arc<Session>)> {
        let state = self.state.lock();
        let entry = state
            .handles
            .get(&handle.id)
            .ok_or_else(|| unknown_handle(handle))?;
        let session = state
            .sessions
            .get(&entry.resource_key)
            .ok_or_else(|| unknown_handle(handle))?;
        Ok((entry.identifier.clone(), Arc::clone(&session.session)))
    }

    /// Drop one reference; the workbook closes with the last one.
    pub fn close(&self, handle: &Handle) -> ExdResult<()> {
        let released = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let entry = state
                .handles
                .remove(&handle.id)
                .ok_or_else(|| unknown_handle(handle))?;
            let session_entry = state
                .sessions
                .get_mut(&entry.resource_key)
                .ok_or_else(|| unknown_handle(handle))?;

            if session_entry.ref_count > 1 {
                session_entry.ref_count -= 1;
                None
            } else {
                state
                    .sessions
                    .remove(&entry.resource_key)
                    .map(|e| e.session)
            }
        };

        if let Some(session) = released {
            session.release();
            info!(resource = %session.resource_key(), "closed session");
        }
        Ok(())
    }

    /// Live reference count for a resource, if a session exists.
    pub fn ref_count(&self, resource_key: &str) -> Option<usize> {
        self.state
            .lock()
            .sessions
            .get(resource_key)
            .map(|entry| entry.ref_count)
    }

    pub fn session_count(&self) -> usize {
        self.state.lock().sessions.len()
    }

    pub fn handle_count(&self) -> usize {
        self.state.lock().handles.len()
    }
}

fn unknown_handle(handle: &Handle) -> ExdError {
    ExdError::NotFound(format!("Unknown handle \"{}\".", handle.id))
}
