//! Reactive comparison session
//!
//! A [`Session`] owns the persisted inputs and recomputes the rendered
//! output synchronously after every change, writing each change through to
//! its [`StateStore`] before the next one is accepted.

use crate::diff::DiffEngine;
use crate::mode::Mode;
use crate::render::MarkupRenderer;
use crate::store::{
    PersistedState, StateStore, Storage, StoreError, INPUT1_KEY, INPUT2_KEY, MODE_KEY, OUTPUT_KEY,
};
use crate::tokenize::{ParseFailure, Side};

/// Something that can supply clipboard text on request
pub trait ClipboardSource {
    /// `None` when the clipboard is empty, denied or holds no text
    fn read_text(&mut self) -> Option<String>;
}

/// Markup for `state` using the default engine and renderer
pub fn derive_output(state: &PersistedState) -> String {
    derive_output_with(state, &DiffEngine::default(), &MarkupRenderer::default()).0
}

/// Markup for `state`, plus any structural parse failures
pub fn derive_output_with(
    state: &PersistedState,
    engine: &DiffEngine,
    renderer: &MarkupRenderer,
) -> (String, Vec<ParseFailure>) {
    if state.input1.is_empty() || state.input2.is_empty() {
        return (renderer.placeholder(), Vec::new());
    }
    let comparison = engine.diff(&state.input1, &state.input2, state.mode);
    (renderer.render(&comparison.result), comparison.failures)
}

pub struct Session<S> {
    store: StateStore<S>,
    state: PersistedState,
    engine: DiffEngine,
    renderer: MarkupRenderer,
    failures: Vec<ParseFailure>,
}

impl<S: Storage> Session<S> {
    /// Read the persisted state once; missing keys start empty
    pub fn open(store: StateStore<S>) -> Self {
        Self::with_parts(store, DiffEngine::default(), MarkupRenderer::default())
    }

    pub fn with_parts(store: StateStore<S>, engine: DiffEngine, renderer: MarkupRenderer) -> Self {
        let state = PersistedState::load(&store);
        let (_, failures) = derive_output_with(&state, &engine, &renderer);
        Self {
            store,
            state,
            engine,
            renderer,
            failures,
        }
    }

    pub fn state(&self) -> &PersistedState {
        &self.state
    }

    pub fn input(&self, side: Side) -> &str {
        match side {
            Side::Old => &self.state.input1,
            Side::New => &self.state.input2,
        }
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Last rendered markup
    pub fn output(&self) -> &str {
        &self.state.output
    }

    /// Parse failures from the last recompute
    pub fn failures(&self) -> &[ParseFailure] {
        &self.failures
    }

    pub fn store(&self) -> &StateStore<S> {
        &self.store
    }

    pub fn set_input(&mut self, side: Side, text: impl Into<String>) -> Result<(), StoreError> {
        let text = text.into();
        let key = match side {
            Side::Old => INPUT1_KEY,
            Side::New => INPUT2_KEY,
        };
        self.store.set(key, &text)?;
        match side {
            Side::Old => self.state.input1 = text,
            Side::New => self.state.input2 = text,
        }
        self.recompute()
    }

    pub fn clear_input(&mut self, side: Side) -> Result<(), StoreError> {
        self.set_input(side, String::new())
    }

    pub fn set_mode(&mut self, mode: Mode) -> Result<(), StoreError> {
        self.store.set(MODE_KEY, &mode)?;
        self.state.mode = mode;
        self.recompute()
    }

    /// Replace an input with clipboard text; returns whether anything was pasted
    pub fn paste(
        &mut self,
        side: Side,
        clipboard: &mut impl ClipboardSource,
    ) -> Result<bool, StoreError> {
        match clipboard.read_text() {
            Some(text) if !text.is_empty() => {
                self.set_input(side, text)?;
                Ok(true)
            }
            _ => {
                tracing::debug!(%side, "nothing to paste");
                Ok(false)
            }
        }
    }

    /// Forget every persisted value
    pub fn reset(&mut self) -> Result<(), StoreError> {
        for key in [INPUT1_KEY, INPUT2_KEY, MODE_KEY, OUTPUT_KEY] {
            self.store.clear(key)?;
        }
        self.state = PersistedState::default();
        self.failures.clear();
        Ok(())
    }

    /// Recompute the output for the current state and persist it
    pub fn recompute(&mut self) -> Result<(), StoreError> {
        let (output, failures) = derive_output_with(&self.state, &self.engine, &self.renderer);
        self.store.set(OUTPUT_KEY, &output)?;
        self.state.output = output;
        self.failures = failures;
        Ok(())
    }

    pub fn into_store(self) -> StateStore<S> {
        self.store
    }
}
