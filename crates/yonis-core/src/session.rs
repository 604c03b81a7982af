use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::taxonomy::Taxonomy;
use crate::{DiagnosticResult, Domain, State};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    Graph,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("input is empty")]
    EmptyInput,
    #[error("a diagnostic is already in progress")]
    Busy,
    #[error("no state with id {0}")]
    UnknownState(u32),
}

/// Interactive state of one user: what is selected, what was diagnosed,
/// which view is showing, and whether a classification is in flight.
#[derive(Debug, Clone)]
pub struct Session {
    taxonomy: Arc<Taxonomy>,
    view: ViewMode,
    selected: Option<u32>,
    diagnosis: Option<DiagnosticResult>,
    processing: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub view: ViewMode,
    pub selected_state: Option<State>,
    pub selected_domain: Option<u32>,
    pub diagnosis: Option<DiagnosticResult>,
    pub processing: bool,
}

impl Session {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self {
            taxonomy,
            view: ViewMode::Grid,
            selected: None,
            diagnosis: None,
            processing: false,
        }
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn set_view(&mut self, view: ViewMode) {
        self.view = view;
    }

    pub fn select_state(&mut self, state_id: u32) -> Result<&State, SessionError> {
        let state = self
            .taxonomy
            .state(state_id)
            .ok_or(SessionError::UnknownState(state_id))?;
        self.selected = Some(state_id);
        Ok(state)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_state(&self) -> Option<&State> {
        self.selected.and_then(|id| self.taxonomy.state(id))
    }

    pub fn selected_domain(&self) -> Option<&Domain> {
        self.selected
            .and_then(|id| self.taxonomy.domain_for_state(id))
    }

    pub fn diagnosis(&self) -> Option<&DiagnosticResult> {
        self.diagnosis.as_ref()
    }

    pub fn is_diagnosed(&self, state_id: u32) -> bool {
        self.diagnosis
            .as_ref()
            .is_some_and(|d| d.state_id == state_id)
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    /// Gate a submission. Blank text and a second submission while one is
    /// outstanding are both rejected.
    pub fn begin_diagnostic(&mut self, text: &str) -> Result<(), SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }
        if self.processing {
            return Err(SessionError::Busy);
        }
        self.processing = true;
        Ok(())
    }

    pub fn abort_diagnostic(&mut self) {
        self.processing = false;
    }

    /// Store a finished classification. A result that resolves to a known
    /// state becomes the selection and switches to the graph view; an
    /// unknown ID leaves selection and view untouched.
    pub fn apply_diagnosis(&mut self, result: DiagnosticResult) {
        self.processing = false;
        if self.taxonomy.resolve(result.state_id).is_some() {
            self.selected = Some(result.state_id);
            self.view = ViewMode::Graph;
        }
        self.diagnosis = Some(result);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            view: self.view,
            selected_state: self.selected_state().cloned(),
            selected_domain: self.selected_domain().map(|d| d.id),
            diagnosis: self.diagnosis.clone(),
            processing: self.processing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(Arc::new(Taxonomy::standard()))
    }

    fn result(state_id: u32) -> DiagnosticResult {
        DiagnosticResult {
            state_id,
            analysis: "a".into(),
            recommendation: "r".into(),
        }
    }

    #[test]
    fn starts_idle_on_grid() {
        let s = session();
        assert_eq!(s.view(), ViewMode::Grid);
        assert!(s.selected_state().is_none());
        assert!(s.diagnosis().is_none());
        assert!(!s.is_processing());
    }

    #[test]
    fn blank_input_is_rejected() {
        let mut s = session();
        assert_eq!(s.begin_diagnostic("   \n\t"), Err(SessionError::EmptyInput));
        assert!(!s.is_processing());
    }

    #[test]
    fn second_submission_while_processing_is_rejected() {
        let mut s = session();
        s.begin_diagnostic("I compare myself to everyone").unwrap();
        assert_eq!(s.begin_diagnostic("again"), Err(SessionError::Busy));
        s.abort_diagnostic();
        assert!(s.begin_diagnostic("again").is_ok());
    }

    #[test]
    fn known_result_selects_and_switches_to_graph() {
        let mut s = session();
        s.begin_diagnostic("text").unwrap();
        s.apply_diagnosis(result(52));
        assert!(!s.is_processing());
        assert_eq!(s.view(), ViewMode::Graph);
        assert_eq!(s.selected_state().unwrap().name, "Status Anxiety");
        assert_eq!(s.selected_domain().unwrap().id, 5);
        assert!(s.is_diagnosed(52));
    }

    #[test]
    fn unknown_result_keeps_selection() {
        let mut s = session();
        s.select_state(7).unwrap();
        s.begin_diagnostic("text").unwrap();
        s.apply_diagnosis(result(200));
        assert_eq!(s.selected_state().unwrap().id, 7);
        assert_eq!(s.view(), ViewMode::Grid);
        assert_eq!(s.diagnosis().unwrap().state_id, 200);
        assert!(!s.is_processing());
    }

    #[test]
    fn select_unknown_state_fails() {
        let mut s = session();
        assert_eq!(s.select_state(0).unwrap_err(), SessionError::UnknownState(0));
        assert!(s.selected_state().is_none());
    }

    #[test]
    fn view_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ViewMode::Graph).unwrap(), "\"graph\"");
        let v: ViewMode = serde_json::from_str("\"grid\"").unwrap();
        assert_eq!(v, ViewMode::Grid);
    }
}
