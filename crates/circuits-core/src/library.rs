//! Circuit list coordination over a [`CircuitStore`].
//!
//! Subscribers are called with the full circuit list after every save or
//! delete made through the library.

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::circuit::Circuit;
use crate::editor::CircuitEditor;
use crate::error::{CoreError, Result};
use crate::storage::CircuitStore;

type Listener = Box<dyn FnMut(&[Circuit]) + Send>;

/// Identifies a registered list listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct CircuitLibrary {
    store: CircuitStore,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl CircuitLibrary {
    pub fn new(store: CircuitStore) -> Self {
        Self {
            store,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn store(&self) -> &CircuitStore {
        &self.store
    }

    /// Register a listener. It is called once immediately with the current
    /// list, then after every change.
    ///
    /// # Errors
    /// Returns an error if the initial list cannot be read.
    pub fn subscribe<F>(&mut self, mut listener: F) -> Result<SubscriptionId>
    where
        F: FnMut(&[Circuit]) + Send + 'static,
    {
        let circuits = self.store.list_circuits()?;
        listener(&circuits);
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        Ok(id)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn list_circuits(&self) -> Result<Vec<Circuit>> {
        self.store.list_circuits()
    }

    /// # Errors
    /// Returns [`CoreError::NotFound`] when no circuit has this id.
    pub fn get(&self, id: Uuid) -> Result<Circuit> {
        self.store.get_circuit(id)?.ok_or(CoreError::NotFound(id))
    }

    /// Open a circuit for editing, or a fresh draft when `id` is `None` or
    /// not stored.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn load_for_edit(&self, id: Option<Uuid>) -> Result<CircuitEditor> {
        let stored = match id {
            Some(id) => {
                let found = self.store.get_circuit(id)?;
                if found.is_none() {
                    debug!(%id, "circuit not stored, starting a fresh draft");
                }
                found
            }
            None => None,
        };
        Ok(CircuitEditor::open_or_create(stored))
    }

    /// Validate and persist a circuit, then notify listeners.
    ///
    /// # Errors
    /// Returns a validation error if the circuit may not be saved, or a
    /// database error if the write fails.
    pub fn save(&mut self, circuit: &Circuit) -> Result<Circuit> {
        circuit.validate()?;
        let mut stored = circuit.clone();
        stored.updated_at = Utc::now();
        self.store.save_circuit(&stored)?;
        self.notify()?;
        Ok(stored)
    }

    /// Save the draft held by `editor`.
    ///
    /// # Errors
    /// Same as [`CircuitLibrary::save`].
    pub fn save_editor(&mut self, editor: &CircuitEditor) -> Result<Circuit> {
        self.save(editor.circuit())
    }

    /// Delete a circuit. Listeners are only notified if something was removed.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn delete(&mut self, id: Uuid) -> Result<bool> {
        let removed = self.store.delete_circuit(id)?;
        if removed {
            self.notify()?;
        } else {
            info!(%id, "delete requested for unknown circuit");
        }
        Ok(removed)
    }

    fn notify(&mut self) -> Result<()> {
        if self.listeners.is_empty() {
            return Ok(());
        }
        let circuits = self.store.list_circuits()?;
        for (_, listener) in &mut self.listeners {
            listener(&circuits);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Duration, Exercise};
    use crate::editor::EditCommand;
    use crate::error::ValidationError;
    use std::sync::{Arc, Mutex};

    fn library() -> CircuitLibrary {
        CircuitLibrary::new(CircuitStore::open_memory().unwrap())
    }

    fn valid(name: &str) -> Circuit {
        Circuit::named(name).with_exercise(Exercise::new(
            "Jumping jack",
            Duration::from_secs(30),
            Duration::from_secs(10),
        ))
    }

    #[test]
    fn listeners_see_every_change() {
        let mut lib = library();
        let seen: Arc<Mutex<Vec<usize>>> = Arc::default();
        let sink = Arc::clone(&seen);
        lib.subscribe(move |list| sink.lock().unwrap().push(list.len()))
            .unwrap();

        let a = lib.save(&valid("A")).unwrap();
        lib.save(&valid("B")).unwrap();
        lib.delete(a.id).unwrap();
        lib.delete(a.id).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2, 1]);
    }

    #[test]
    fn unsubscribed_listener_is_silent() {
        let mut lib = library();
        let calls: Arc<Mutex<usize>> = Arc::default();
        let sink = Arc::clone(&calls);
        let id = lib.subscribe(move |_| *sink.lock().unwrap() += 1).unwrap();
        assert!(lib.unsubscribe(id));
        assert!(!lib.unsubscribe(id));
        lib.save(&valid("A")).unwrap();
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn invalid_circuit_is_not_saved() {
        let mut lib = library();
        let err = lib.save(&Circuit::named("Empty")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::NoExercises)
        ));
        assert!(lib.list_circuits().unwrap().is_empty());
    }

    #[test]
    fn load_for_edit_falls_back_to_fresh_draft() {
        let mut lib = library();
        let editor = lib.load_for_edit(Some(Uuid::new_v4())).unwrap();
        assert!(editor.is_new());
        assert_eq!(editor.circuit().exercises.len(), 1);

        let saved = lib.save(&valid("Stored")).unwrap();
        let mut editor = lib.load_for_edit(Some(saved.id)).unwrap();
        assert!(!editor.is_new());
        editor
            .apply(EditCommand::SetRounds { rounds: 3 })
            .unwrap();
        lib.save_editor(&editor).unwrap();
        assert_eq!(lib.get(saved.id).unwrap().rounds, 3);
    }

    #[test]
    fn get_unknown_is_not_found() {
        let lib = library();
        let id = Uuid::new_v4();
        assert!(matches!(lib.get(id), Err(CoreError::NotFound(missing)) if missing == id));
    }
}
