//! Classification of detail-query responses on the result step.

use crate::fiscal::types::SolicitacaoDetailResponse;
use crate::wizard::{StepStatus, WizardState};

/// Message shown when the detail query itself could not be made.
pub const ERRO_CONSULTA: &str = "Não foi possível consultar a solicitação.";

/// Internal failure status reported by the backend even on HTTP success.
const STATUS_ERRO: &str = "Erro";

/// Settled interpretation of a detail-query response.
#[derive(Clone, Debug, PartialEq)]
pub enum ConsultaOutcome {
    Aprovada,
    ComErro { motivo: String },
}

/// Classify a parsed detail response.
///
/// The backend may answer with transport-level success but an internal
/// `"Erro"` status; both that and `success:false` are failures. Any other
/// status tag counts as approved; the contract enumerates only `"Erro"`.
pub fn classificar_consulta(resp: &SolicitacaoDetailResponse) -> ConsultaOutcome {
    let status_erro = resp
        .data
        .as_ref()
        .is_some_and(|d| d.status == STATUS_ERRO);
    if resp.success && !status_erro {
        return ConsultaOutcome::Aprovada;
    }
    // Prefer the free-text diagnostic over the envelope error list.
    let motivo = resp
        .data
        .as_ref()
        .filter(|d| !d.erros.is_empty())
        .map(|d| d.erros.clone())
        .unwrap_or_else(|| resp.errors.join(", "));
    ConsultaOutcome::ComErro { motivo }
}

/// Apply a settled outcome to the wizard state.
///
/// Transport failures never reach this point; a network blip must not be
/// recorded as a rejection while the request may still be pending.
pub fn aplicar_consulta(wizard: &mut WizardState, outcome: &ConsultaOutcome) {
    let idx = wizard.current_step();
    match outcome {
        ConsultaOutcome::Aprovada => {
            wizard.update_step_status(idx, StepStatus::Aprovado, None);
        }
        ConsultaOutcome::ComErro { motivo } => {
            wizard.update_step_status(idx, StepStatus::Recusado, Some(motivo.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiscal::types::SolicitacaoDetail;
    use crate::wizard::STEP_RESULTADO;

    fn detalhe(status: &str, erros: &str) -> SolicitacaoDetail {
        SolicitacaoDetail {
            id: 42,
            status: status.to_string(),
            erros: erros.to_string(),
            ..Default::default()
        }
    }

    fn resposta(
        success: bool,
        data: Option<SolicitacaoDetail>,
        errors: &[&str],
    ) -> SolicitacaoDetailResponse {
        SolicitacaoDetailResponse {
            success,
            data,
            message: String::new(),
            errors: errors.iter().map(|s| s.to_string()).collect(),
            timestamp: String::new(),
        }
    }

    #[test]
    fn success_with_non_erro_status_is_approved() {
        let resp = resposta(true, Some(detalhe("Aprovada", "")), &[]);
        assert_eq!(classificar_consulta(&resp), ConsultaOutcome::Aprovada);
        // The approved vocabulary is opaque; any non-"Erro" tag passes.
        let resp = resposta(true, Some(detalhe("EmProcessamento", "")), &[]);
        assert_eq!(classificar_consulta(&resp), ConsultaOutcome::Aprovada);
    }

    #[test]
    fn internal_erro_status_is_a_failure_despite_success_flag() {
        let resp = resposta(true, Some(detalhe("Erro", "Saldo insuficiente")), &[]);
        assert_eq!(
            classificar_consulta(&resp),
            ConsultaOutcome::ComErro {
                motivo: "Saldo insuficiente".into()
            }
        );
    }

    #[test]
    fn success_false_joins_envelope_errors() {
        let resp = resposta(false, None, &["não encontrada", "id inválido"]);
        assert_eq!(
            classificar_consulta(&resp),
            ConsultaOutcome::ComErro {
                motivo: "não encontrada, id inválido".into()
            }
        );
    }

    #[test]
    fn free_text_diagnostic_wins_over_error_list() {
        let resp = resposta(false, Some(detalhe("Erro", "Saldo insuficiente")), &["genérico"]);
        assert_eq!(
            classificar_consulta(&resp),
            ConsultaOutcome::ComErro {
                motivo: "Saldo insuficiente".into()
            }
        );
    }

    #[test]
    fn aplicar_updates_current_step_only() {
        let mut w = WizardState::new();
        w.set_current_step(STEP_RESULTADO);
        aplicar_consulta(&mut w, &ConsultaOutcome::Aprovada);
        assert_eq!(w.steps()[STEP_RESULTADO].status, StepStatus::Aprovado);

        aplicar_consulta(
            &mut w,
            &ConsultaOutcome::ComErro {
                motivo: "Saldo insuficiente".into(),
            },
        );
        assert_eq!(w.steps()[STEP_RESULTADO].status, StepStatus::Recusado);
        assert_eq!(
            w.steps()[STEP_RESULTADO].motivo.as_deref(),
            Some("Saldo insuficiente")
        );
        // Earlier steps untouched.
        assert_eq!(w.steps()[0].status, StepStatus::Pendente);
    }
}
