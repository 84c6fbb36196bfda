//! Key input handlers, one per screen.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
    events::Screen,
    form::{FORM_FIELDS, SolicitacaoForm},
    input::{InputBoxState, InputCallbackId},
    shortcuts,
    submit::{self, SubmitPhase},
    wizard::{STEP_DADOS_PEDIDO, STEP_DADOS_XML, STEP_RESULTADO, StepStatus},
    worker::WorkerCmd,
};

use super::{App, request_refresh};

/// Handle one key event; returns true when the app should exit.
pub async fn handle_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // The input overlay swallows everything while open.
    if app.input_box.is_some() {
        return handle_input_box_key(app, k).await;
    }

    match app.ui.screen {
        Screen::Documentos => handle_documentos_key(app, k).await,
        Screen::Settings => handle_settings_key(app, k).await,
        Screen::DadosXml => handle_dados_xml_key(app, k).await,
        Screen::DadosPedido => handle_dados_pedido_key(app, k).await,
        Screen::Resultado => handle_resultado_key(app, k).await,
    }
}

/// Ctrl+C always exits, regardless of screen or overlay.
pub fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c')
}

/// Document picker keys.
async fn handle_documentos_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    let sc = &app.shortcuts.documentos;

    if shortcuts::matches_shortcut(&k, &sc.quit) {
        return Ok(true);
    } else if shortcuts::matches_shortcut(&k, &sc.settings) {
        reload_settings_buffers(app);
        app.ui.screen = Screen::Settings;
        app.ui.status = "Configurações".into();
    } else if shortcuts::matches_shortcut(&k, &sc.refresh) {
        request_refresh(app).await?;
    } else if shortcuts::matches_shortcut(&k, &sc.down) {
        if app.ui.selected + 1 < app.docs.len() {
            app.ui.selected += 1;
        }
    } else if shortcuts::matches_shortcut(&k, &sc.up) {
        if app.ui.selected > 0 {
            app.ui.selected -= 1;
        }
    } else if shortcuts::matches_shortcut(&k, &sc.open)
        && let Some(doc) = app.docs.get(app.ui.selected)
    {
        app.worker_tx
            .send(WorkerCmd::LoadDoc {
                path: doc.path.clone(),
            })
            .await?;
        app.ui.status = format!("Carregando {}...", doc.filename);
    }

    Ok(false)
}

/// Settings editor keys.
async fn handle_settings_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    let sc = &app.shortcuts.settings;

    if shortcuts::matches_shortcut(&k, &sc.cancel) {
        reload_settings_buffers(app);
        app.ui.screen = Screen::Documentos;
    } else if shortcuts::matches_shortcut(&k, &sc.save) {
        app.cfg.backend.base_url = app.base_url_buf.clone();
        app.cfg.documentos.input_dir = app.input_dir_buf.clone();
        app.cfg.solicitacao.origem = app.origem_buf.clone();
        app.cfg.solicitacao.tipo_processo = app.tipo_processo_buf.clone();
        app.cfg.save(&app.cfg_path)?;

        app.worker_tx
            .send(WorkerCmd::SaveSettings(app.cfg.clone()))
            .await?;
        app.ui.screen = Screen::Documentos;
        app.ui.status = "Configurações salvas".into();
    } else if shortcuts::matches_shortcut(&k, &sc.base_url) {
        app.input_box = Some(InputBoxState::open(
            "URL do backend:",
            app.base_url_buf.clone(),
            InputCallbackId::SettingsBaseUrl,
        ));
    } else if shortcuts::matches_shortcut(&k, &sc.input_dir) {
        app.input_box = Some(InputBoxState::open(
            "Diretório de documentos:",
            app.input_dir_buf.clone(),
            InputCallbackId::SettingsInputDir,
        ));
    } else if shortcuts::matches_shortcut(&k, &sc.origem) {
        app.input_box = Some(InputBoxState::open(
            "Origem:",
            app.origem_buf.clone(),
            InputCallbackId::SettingsOrigem,
        ));
    } else if shortcuts::matches_shortcut(&k, &sc.tipo_processo) {
        app.input_box = Some(InputBoxState::open(
            "Tipo de processo:",
            app.tipo_processo_buf.clone(),
            InputCallbackId::SettingsTipoProcesso,
        ));
    }

    Ok(false)
}

/// Extracted-document review keys.
async fn handle_dados_xml_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    let sc = &app.shortcuts.dados_xml;

    if shortcuts::matches_shortcut(&k, &sc.proceed) {
        // Review accepted: the order form becomes the active step.
        app.wizard
            .update_step_status(STEP_DADOS_XML, StepStatus::Aprovado, None);
        app.wizard.set_current_step(STEP_DADOS_PEDIDO);
        app.ui.editing_field_idx = 0;
        app.ui.screen = Screen::DadosPedido;
    } else if shortcuts::matches_shortcut(&k, &sc.back) {
        // Abandon the pass and go back to the picker.
        app.wizard.reset_all();
        app.ui.screen = Screen::Documentos;
        app.ui.status = "Documento descartado".into();
    }

    Ok(false)
}

/// Order-data form keys. The submit phase gates which keys are live:
/// while a dialog is up only its own keys are handled, and while an envio
/// is in flight everything is inert.
async fn handle_dados_pedido_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    match app.submit.clone() {
        SubmitPhase::AguardandoDecisao { .. } => {
            if k.code == KeyCode::Enter {
                // "Solicitar Revisão": the user overrides the divergences
                // and lets the backend arbitrate.
                start_envio(app).await?;
            } else if k.code == KeyCode::Esc {
                // "Corrigir": back to editing.
                app.submit = SubmitPhase::Idle;
            }
            return Ok(false);
        }
        SubmitPhase::Enviando => {
            // Non-dismissable while awaiting a settled response.
            return Ok(false);
        }
        SubmitPhase::Sucesso { .. } => {
            if k.code == KeyCode::Enter {
                // "Conferir Resultado": the result step becomes active.
                app.wizard
                    .update_step_status(STEP_RESULTADO, StepStatus::Pendente, None);
                app.wizard.set_current_step(STEP_RESULTADO);
                app.submit = SubmitPhase::Idle;
                app.ui.screen = Screen::Resultado;
            }
            return Ok(false);
        }
        SubmitPhase::Falha { .. } => {
            if k.code == KeyCode::Enter || k.code == KeyCode::Esc {
                // "Voltar aos Dados XML" so the source data can be fixed.
                app.wizard.set_current_step(STEP_DADOS_XML);
                app.submit = SubmitPhase::Idle;
                app.ui.screen = Screen::DadosXml;
            }
            return Ok(false);
        }
        SubmitPhase::Idle => {}
    }

    let sc = &app.shortcuts.dados_pedido;

    if shortcuts::matches_shortcut(&k, &sc.cancel) {
        // "Cancelar" returns to the review step without submitting.
        app.wizard.set_current_step(STEP_DADOS_XML);
        app.ui.screen = Screen::DadosXml;
    } else if shortcuts::matches_shortcut(&k, &sc.next_field) {
        app.ui.editing_field_idx = (app.ui.editing_field_idx + 1) % FORM_FIELDS.len();
    } else if shortcuts::matches_shortcut(&k, &sc.prev_field) {
        app.ui.editing_field_idx =
            (app.ui.editing_field_idx + FORM_FIELDS.len() - 1) % FORM_FIELDS.len();
    } else if shortcuts::matches_shortcut(&k, &sc.edit_field) {
        let idx = app.ui.editing_field_idx;
        let (_, label) = FORM_FIELDS[idx];
        app.input_box = Some(InputBoxState::open(
            &format!("{label}:"),
            app.form.field_value(idx),
            InputCallbackId::FormField(idx),
        ));
    } else if shortcuts::matches_shortcut(&k, &sc.validar) {
        // Validar Pedido: check divergences, then send or ask the user.
        app.submit = submit::validar(&app.form, app.wizard.xml_data());
        if app.submit == SubmitPhase::Enviando {
            start_envio(app).await?;
        }
    }

    Ok(false)
}

/// Result screen keys.
async fn handle_resultado_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    let sc = &app.shortcuts.resultado;

    if shortcuts::matches_shortcut(&k, &sc.consultar) {
        // One consulta at a time; the loading flag gates re-entry.
        if app.consultando {
            return Ok(false);
        }
        let Some(id) = app.wizard.solicitacao_id() else {
            app.ui.status = "Nenhuma solicitação enviada".into();
            return Ok(false);
        };
        app.consultando = true;
        app.consulta_erro = None;
        app.worker_tx.send(WorkerCmd::Consultar { id }).await?;
        app.ui.status = "Consultando solicitação...".into();
    } else if shortcuts::matches_shortcut(&k, &sc.recomecar) {
        // Start a new pass from scratch.
        app.wizard.reset_all();
        app.form = SolicitacaoForm::default();
        app.submit = SubmitPhase::Idle;
        app.resultado = None;
        app.consulta_erro = None;
        app.ui.screen = Screen::Documentos;
        app.ui.status = "Nova solicitação".into();
        request_refresh(app).await?;
    }

    Ok(false)
}

/// Dispatch the composed payload and enter the sending phase.
///
/// The dialog stays up until the worker reports a settled response; the
/// phase is what disables the triggering keys meanwhile.
async fn start_envio(app: &mut App) -> Result<()> {
    let Some(xml) = app.wizard.xml_data() else {
        // No document loaded: nothing to reference, stay editable.
        app.submit = SubmitPhase::Idle;
        app.ui.status = "Nenhum documento carregado".into();
        return Ok(());
    };
    let body = app.form.to_body(xml);
    app.submit = SubmitPhase::Enviando;
    app.worker_tx
        .send(WorkerCmd::Enviar {
            body: Box::new(body),
        })
        .await?;
    Ok(())
}

/// Input overlay keys.
async fn handle_input_box_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    let Some(input_state) = &mut app.input_box else {
        return Ok(false);
    };

    let sc = &app.shortcuts.input_box;

    if shortcuts::matches_shortcut(&k, &sc.confirm) {
        let value = input_state.value.clone();
        let callback_id = input_state.callback_id.clone();
        app.input_box = None;
        apply_input_callback(app, callback_id, value);
    } else if shortcuts::matches_shortcut(&k, &sc.cancel) {
        app.input_box = None;
    } else if shortcuts::matches_shortcut(&k, &sc.backspace) {
        input_state.backspace();
    } else if shortcuts::matches_shortcut(&k, &sc.delete) {
        input_state.delete();
    } else if shortcuts::matches_shortcut(&k, &sc.left) {
        input_state.move_left();
    } else if shortcuts::matches_shortcut(&k, &sc.right) {
        input_state.move_right();
    } else if shortcuts::matches_shortcut(&k, &sc.home) {
        input_state.move_home();
    } else if shortcuts::matches_shortcut(&k, &sc.end) {
        input_state.move_end();
    } else if shortcuts::matches_shortcut(&k, &sc.clear_line) {
        input_state.clear_line();
    } else if let KeyCode::Char(c) = k.code
        && !k.modifiers.contains(KeyModifiers::CONTROL)
    {
        input_state.insert_char(c);
    }

    Ok(false)
}

/// Route a confirmed input value to its destination.
fn apply_input_callback(app: &mut App, callback_id: InputCallbackId, value: String) {
    match callback_id {
        InputCallbackId::SettingsBaseUrl => app.base_url_buf = value,
        InputCallbackId::SettingsInputDir => app.input_dir_buf = value,
        InputCallbackId::SettingsOrigem => app.origem_buf = value,
        InputCallbackId::SettingsTipoProcesso => app.tipo_processo_buf = value,
        InputCallbackId::FormField(idx) => app.form.set_field(idx, &value),
    }
}

/// Refresh the settings buffers from the persisted values.
fn reload_settings_buffers(app: &mut App) {
    app.base_url_buf = app.cfg.backend.base_url.clone();
    app.input_dir_buf = app.cfg.documentos.input_dir.clone();
    app.origem_buf = app.cfg.solicitacao.origem.clone();
    app.tipo_processo_buf = app.cfg.solicitacao.tipo_processo.clone();
}
