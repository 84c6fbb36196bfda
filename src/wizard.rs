//! Wizard step state: the single source of truth for a solicitação pass.

use crate::fiscal::types::XmlData;

/// Step index of the ingestion/upload stage (completed externally).
pub const STEP_UPLOAD: usize = 0;
/// Step index of the extracted-document review screen.
pub const STEP_DADOS_XML: usize = 1;
/// Step index of the order-data form screen.
pub const STEP_DADOS_PEDIDO: usize = 2;
/// Step index of the result/consulta screen.
pub const STEP_RESULTADO: usize = 3;

/// Approval status of a single wizard step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepStatus {
    Pendente,
    Aprovado,
    Recusado,
}

impl StepStatus {
    /// Display label used by the step bar.
    pub fn label(&self) -> &'static str {
        match self {
            StepStatus::Pendente => "Pendente",
            StepStatus::Aprovado => "Aprovado",
            StepStatus::Recusado => "Recusado",
        }
    }
}

/// One stage of the wizard and its current status.
#[derive(Clone, Debug, PartialEq)]
pub struct StepInfo {
    pub label: String,
    pub status: StepStatus,
    /// Rejection reason; only meaningful while status is `Recusado`.
    pub motivo: Option<String>,
}

impl StepInfo {
    fn pendente(label: &str) -> Self {
        Self {
            label: label.to_string(),
            status: StepStatus::Pendente,
            motivo: None,
        }
    }
}

/// Wizard progress shared by the form and result screens.
///
/// Owned by `App` and mutated only through the named operations below.
/// Out-of-range step indexes are programming errors and panic.
#[derive(Clone, Debug)]
pub struct WizardState {
    steps: Vec<StepInfo>,
    current_step: usize,
    solicitacao_id: Option<i64>,
    xml_data: Option<XmlData>,
}

impl WizardState {
    /// Fresh state: all steps pending, focus on the upload step.
    pub fn new() -> Self {
        Self {
            steps: vec![
                StepInfo::pendente("Upload do XML"),
                StepInfo::pendente("Dados do XML"),
                StepInfo::pendente("Dados do Pedido"),
                StepInfo::pendente("Resultado"),
            ],
            current_step: 0,
            solicitacao_id: None,
            xml_data: None,
        }
    }

    pub fn steps(&self) -> &[StepInfo] {
        &self.steps
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    /// Step info for the active step.
    pub fn current_step_info(&self) -> &StepInfo {
        &self.steps[self.current_step]
    }

    pub fn solicitacao_id(&self) -> Option<i64> {
        self.solicitacao_id
    }

    pub fn xml_data(&self) -> Option<&XmlData> {
        self.xml_data.as_ref()
    }

    /// Set a step's status and reason. Passing `None` clears a stale reason;
    /// a leftover `motivo` after moving away from `Recusado` is on the caller.
    pub fn update_step_status(&mut self, index: usize, status: StepStatus, motivo: Option<String>) {
        let step = &mut self.steps[index];
        step.status = status;
        step.motivo = motivo;
    }

    /// Move focus to a step. Revisiting earlier steps is allowed.
    pub fn set_current_step(&mut self, index: usize) {
        assert!(index < self.steps.len(), "step index {index} out of range");
        self.current_step = index;
    }

    /// Record the id returned by the backend. Overwrite is permitted; a new
    /// submission for the same pass supersedes the previous id.
    pub fn set_solicitacao_id(&mut self, id: i64) {
        self.solicitacao_id = Some(id);
    }

    /// Cache the extracted document data for the active pass.
    pub fn set_xml_data(&mut self, data: XmlData) {
        self.xml_data = Some(data);
    }

    /// Restore the initial state so a new pass starts clean.
    pub fn reset_all(&mut self) {
        for step in &mut self.steps {
            step.status = StepStatus::Pendente;
            step.motivo = None;
        }
        self.current_step = 0;
        self.solicitacao_id = None;
        self.xml_data = None;
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_all_pending_at_step_zero() {
        let w = WizardState::new();
        assert_eq!(w.steps().len(), 4);
        assert!(w.steps().iter().all(|s| s.status == StepStatus::Pendente));
        assert_eq!(w.current_step(), 0);
        assert!(w.solicitacao_id().is_none());
        assert!(w.xml_data().is_none());
    }

    #[test]
    fn update_step_status_sets_status_and_motivo() {
        let mut w = WizardState::new();
        w.update_step_status(
            STEP_DADOS_PEDIDO,
            StepStatus::Recusado,
            Some("CPF inválido".into()),
        );
        assert_eq!(w.steps()[STEP_DADOS_PEDIDO].status, StepStatus::Recusado);
        assert_eq!(
            w.steps()[STEP_DADOS_PEDIDO].motivo.as_deref(),
            Some("CPF inválido")
        );

        // Moving back to approved with no reason clears the old text.
        w.update_step_status(STEP_DADOS_PEDIDO, StepStatus::Aprovado, None);
        assert_eq!(w.steps()[STEP_DADOS_PEDIDO].status, StepStatus::Aprovado);
        assert!(w.steps()[STEP_DADOS_PEDIDO].motivo.is_none());
    }

    #[test]
    #[should_panic]
    fn update_step_status_out_of_range_panics() {
        let mut w = WizardState::new();
        w.update_step_status(99, StepStatus::Aprovado, None);
    }

    #[test]
    #[should_panic]
    fn set_current_step_out_of_range_panics() {
        let mut w = WizardState::new();
        w.set_current_step(4);
    }

    #[test]
    fn solicitacao_id_can_be_overwritten() {
        let mut w = WizardState::new();
        w.set_solicitacao_id(42);
        w.set_solicitacao_id(43);
        assert_eq!(w.solicitacao_id(), Some(43));
    }

    #[test]
    fn reset_all_is_idempotent() {
        let mut w = WizardState::new();
        w.set_xml_data(Default::default());
        w.set_solicitacao_id(42);
        w.set_current_step(STEP_RESULTADO);
        w.update_step_status(STEP_DADOS_XML, StepStatus::Aprovado, None);
        w.update_step_status(STEP_RESULTADO, StepStatus::Recusado, Some("x".into()));

        w.reset_all();
        let once = w.clone();
        w.reset_all();

        assert_eq!(w.steps(), once.steps());
        assert_eq!(w.current_step(), 0);
        assert!(w.solicitacao_id().is_none());
        assert!(w.xml_data().is_none());
        assert!(w.steps().iter().all(|s| s.motivo.is_none()));
    }
}
