//! Submit sequence: divergence checks and the phase machine for one envio.

use crate::fiscal::types::{SolicitacaoResponse, XmlData};
use crate::form::SolicitacaoForm;

/// Message shown when the backend cannot be reached at all.
pub const ERRO_CONEXAO: &str = "Erro de conexão com o servidor";

/// Phase of the submit sequence on the "Dados do Pedido" step.
///
/// One tagged state instead of a pile of modal booleans; the render layer
/// derives which dialog to show from the active variant alone.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitPhase {
    /// Form being edited; nothing in flight.
    Idle,
    /// Divergences found; waiting for the user to correct or override.
    AguardandoDecisao { divergencias: Vec<String> },
    /// Request dispatched; awaiting a settled response.
    Enviando,
    /// Backend accepted and created the solicitação.
    Sucesso { id: i64 },
    /// Transport failure or backend rejection.
    Falha { erros: Vec<String> },
}

/// Compare the form against the extracted document.
///
/// Only the total value and the issuer CNPJ are compared; the backend
/// validates the rest. The value comparison is exact, with no tolerance.
pub fn check_divergencias(form: &SolicitacaoForm, xml: &XmlData) -> Vec<String> {
    let mut divs = Vec::new();
    if form.valor_total != xml.valor_total {
        divs.push(format!(
            "Valor Total divergente: Formulário R$ {} ≠ XML R$ {}",
            form.valor_total, xml.valor_total
        ));
    }
    if !form.cnpj_emissor.is_empty() && form.cnpj_emissor != xml.cnpj_cpf_emitente {
        divs.push(format!(
            "CNPJ Emissor divergente: {} ≠ {}",
            form.cnpj_emissor, xml.cnpj_cpf_emitente
        ));
    }
    divs
}

/// Resolve the Validar action: either go straight to sending or stop at the
/// divergence decision. The checks only run when a document is loaded.
pub fn validar(form: &SolicitacaoForm, xml: Option<&XmlData>) -> SubmitPhase {
    let divergencias = xml.map(|x| check_divergencias(form, x)).unwrap_or_default();
    if divergencias.is_empty() {
        SubmitPhase::Enviando
    } else {
        SubmitPhase::AguardandoDecisao { divergencias }
    }
}

/// Settled interpretation of a create-request response.
#[derive(Clone, Debug, PartialEq)]
pub enum EnvioOutcome {
    /// Created; the id must be recorded in the wizard state.
    Aprovado { id: i64 },
    /// Rejected; `motivo` is the joined diagnostic for the step reason,
    /// `erros` the list shown in the error dialog.
    Recusado { motivo: String, erros: Vec<String> },
}

/// Classify a parsed backend response into the step outcome.
///
/// The error list is preferred over the generic message; a success flag
/// without a created-resource record is still a rejection.
pub fn interpretar_envio(resp: &SolicitacaoResponse) -> EnvioOutcome {
    if resp.success
        && let Some(data) = &resp.data
    {
        return EnvioOutcome::Aprovado { id: data.id };
    }
    let (motivo, erros) = if resp.errors.is_empty() {
        (resp.message.clone(), vec![resp.message.clone()])
    } else {
        (resp.errors.join(", "), resp.errors.clone())
    };
    EnvioOutcome::Recusado { motivo, erros }
}

/// Apply a settled envio outcome to the wizard state and return the next
/// phase. Transport failures never reach this point; the step keeps its
/// status when the backend could not be asked at all.
pub fn aplicar_envio(wizard: &mut crate::wizard::WizardState, outcome: EnvioOutcome) -> SubmitPhase {
    use crate::wizard::StepStatus;
    let idx = wizard.current_step();
    match outcome {
        EnvioOutcome::Aprovado { id } => {
            wizard.set_solicitacao_id(id);
            wizard.update_step_status(idx, StepStatus::Aprovado, None);
            SubmitPhase::Sucesso { id }
        }
        EnvioOutcome::Recusado { motivo, erros } => {
            wizard.update_step_status(idx, StepStatus::Recusado, Some(motivo));
            SubmitPhase::Falha { erros }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiscal::types::SolicitacaoCriada;
    use crate::wizard::{STEP_DADOS_PEDIDO, StepStatus, WizardState};

    fn xml(valor: f64, cnpj: &str) -> XmlData {
        XmlData {
            valor_total: valor,
            cnpj_cpf_emitente: cnpj.to_string(),
            ..Default::default()
        }
    }

    fn form(valor: f64, cnpj: &str) -> SolicitacaoForm {
        SolicitacaoForm {
            valor_total: valor,
            cnpj_emissor: cnpj.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn matching_values_yield_no_divergence() {
        assert!(check_divergencias(&form(150.0, "X"), &xml(150.0, "X")).is_empty());
        // Empty form CNPJ skips the issuer check entirely.
        assert!(check_divergencias(&form(150.0, ""), &xml(150.0, "X")).is_empty());
    }

    #[test]
    fn valor_total_mismatch_cites_both_values() {
        let divs = check_divergencias(&form(100.0, ""), &xml(150.0, "X"));
        assert_eq!(
            divs,
            vec!["Valor Total divergente: Formulário R$ 100 ≠ XML R$ 150".to_string()]
        );
    }

    #[test]
    fn list_length_counts_violated_checks() {
        let divs = check_divergencias(&form(100.0, "A"), &xml(150.0, "B"));
        assert_eq!(divs.len(), 2);
        assert!(divs[0].starts_with("Valor Total divergente"));
        assert_eq!(divs[1], "CNPJ Emissor divergente: A ≠ B");
    }

    #[test]
    fn validar_stops_on_divergence_and_sends_otherwise() {
        // Divergent form: the phase stops for a decision, nothing is sent.
        match validar(&form(100.0, ""), Some(&xml(150.0, "X"))) {
            SubmitPhase::AguardandoDecisao { divergencias } => {
                assert_eq!(divergencias.len(), 1);
            }
            other => panic!("expected AguardandoDecisao, got {other:?}"),
        }
        // Clean form: straight to sending.
        assert_eq!(
            validar(&form(150.0, ""), Some(&xml(150.0, "X"))),
            SubmitPhase::Enviando
        );
        // No document loaded: checks cannot run, proceed to sending.
        assert_eq!(validar(&form(100.0, ""), None), SubmitPhase::Enviando);
    }

    fn resposta(success: bool, id: Option<i64>, errors: &[&str], message: &str) -> SolicitacaoResponse {
        SolicitacaoResponse {
            success,
            data: id.map(|id| SolicitacaoCriada {
                id,
                tipo_processo: String::new(),
                origem: String::new(),
                valor_total: 0.0,
                numero_pedido: 0,
            }),
            message: message.to_string(),
            errors: errors.iter().map(|s| s.to_string()).collect(),
            timestamp: String::new(),
        }
    }

    #[test]
    fn success_response_yields_created_id() {
        let out = interpretar_envio(&resposta(true, Some(42), &[], "ok"));
        assert_eq!(out, EnvioOutcome::Aprovado { id: 42 });
    }

    #[test]
    fn rejection_prefers_error_list_over_message() {
        let out = interpretar_envio(&resposta(false, None, &["CPF inválido"], "falhou"));
        assert_eq!(
            out,
            EnvioOutcome::Recusado {
                motivo: "CPF inválido".into(),
                erros: vec!["CPF inválido".into()],
            }
        );
    }

    #[test]
    fn rejection_falls_back_to_message() {
        let out = interpretar_envio(&resposta(false, None, &[], "indisponível"));
        assert_eq!(
            out,
            EnvioOutcome::Recusado {
                motivo: "indisponível".into(),
                erros: vec!["indisponível".into()],
            }
        );
    }

    #[test]
    fn success_without_created_record_is_a_rejection() {
        let out = interpretar_envio(&resposta(true, None, &[], "sem dados"));
        assert!(matches!(out, EnvioOutcome::Recusado { .. }));
    }

    #[test]
    fn aprovado_records_id_and_marks_current_step() {
        let mut w = WizardState::new();
        w.set_current_step(STEP_DADOS_PEDIDO);
        let phase = aplicar_envio(&mut w, EnvioOutcome::Aprovado { id: 42 });
        assert_eq!(phase, SubmitPhase::Sucesso { id: 42 });
        assert_eq!(w.solicitacao_id(), Some(42));
        assert_eq!(w.steps()[STEP_DADOS_PEDIDO].status, StepStatus::Aprovado);
    }

    #[test]
    fn recusado_marks_current_step_with_motivo() {
        let mut w = WizardState::new();
        w.set_current_step(STEP_DADOS_PEDIDO);
        let phase = aplicar_envio(
            &mut w,
            EnvioOutcome::Recusado {
                motivo: "CPF inválido".into(),
                erros: vec!["CPF inválido".into()],
            },
        );
        assert_eq!(
            phase,
            SubmitPhase::Falha {
                erros: vec!["CPF inválido".to_string()]
            }
        );
        assert_eq!(w.steps()[STEP_DADOS_PEDIDO].status, StepStatus::Recusado);
        assert_eq!(
            w.steps()[STEP_DADOS_PEDIDO].motivo.as_deref(),
            Some("CPF inválido")
        );
        assert!(w.solicitacao_id().is_none());
    }
}
