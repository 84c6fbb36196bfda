//! TUI event loop, input handling and application state.

mod handlers;
mod render;

use anyhow::Result;
use crossterm::event::{self, Event};
use std::{path::PathBuf, time::Duration};
use tokio::sync::mpsc;

use crate::{
    config::Config,
    consulta::{self, ERRO_CONSULTA},
    events::{Screen, UiState},
    fiscal::types::SolicitacaoDetailResponse,
    form::SolicitacaoForm,
    input::InputBoxState,
    shortcuts::Shortcuts,
    submit::{self, ERRO_CONEXAO, SubmitPhase},
    ui::Tui,
    wizard::{STEP_DADOS_XML, STEP_UPLOAD, StepStatus, WizardState},
    worker::{self, DocEntry, WorkerCmd, WorkerEvent},
};

use handlers::{handle_key, is_ctrl_c};
use render::draw;

/// Application state shared by input handling and drawing.
pub struct App {
    /// Path of the persisted config file.
    pub cfg_path: PathBuf,
    /// Current in-memory settings.
    pub cfg: Config,
    /// Screen/selection/log state.
    pub ui: UiState,
    /// Ingestion envelopes found in the input directory.
    pub docs: Vec<DocEntry>,
    /// Wizard progress for the active pass.
    pub wizard: WizardState,
    /// Order-data form being composed.
    pub form: SolicitacaoForm,
    /// Phase of the submit sequence on the form step.
    pub submit: SubmitPhase,
    /// Consulta in flight; gates re-entry on the result step.
    pub consultando: bool,
    /// Last settled consulta response, kept for rendering.
    pub resultado: Option<Box<SolicitacaoDetailResponse>>,
    /// Local message when the consulta could not be made at all.
    pub consulta_erro: Option<String>,
    /// Command channel to the worker.
    pub worker_tx: mpsc::Sender<WorkerCmd>,
    /// Event channel from the worker.
    pub worker_rx: mpsc::Receiver<WorkerEvent>,

    /// Settings edit buffers.
    pub base_url_buf: String,
    pub input_dir_buf: String,
    pub origem_buf: String,
    pub tipo_processo_buf: String,

    /// Input overlay state (Some while open).
    pub input_box: Option<InputBoxState>,

    /// Keybindings.
    pub shortcuts: Shortcuts,
}

/// Run the main TUI loop until the user quits.
pub async fn run_app(terminal: &mut Tui) -> Result<()> {
    let cfg_path = PathBuf::from("config.toml");
    let cfg = Config::load_or_default(&cfg_path)?;

    let shortcuts_path = PathBuf::from("shortcut.toml");
    let shortcuts = Shortcuts::load_or_default(&shortcuts_path)?;

    let (tx_cmd, rx_cmd) = mpsc::channel::<WorkerCmd>(64);
    let (tx_ev, rx_ev) = mpsc::channel::<WorkerEvent>(256);

    // The worker owns all I/O; it starts from a settings snapshot.
    tokio::spawn(worker::run(rx_cmd, tx_ev, cfg.clone()));

    let mut app = App {
        cfg_path,
        cfg: cfg.clone(),
        ui: UiState {
            screen: Screen::Documentos,
            selected: 0,
            log: vec![],
            status: "Pronto".into(),
            editing_field_idx: 0,
            error: None,
        },
        docs: vec![],
        wizard: WizardState::new(),
        form: SolicitacaoForm::default(),
        submit: SubmitPhase::Idle,
        consultando: false,
        resultado: None,
        consulta_erro: None,
        worker_tx: tx_cmd,
        worker_rx: rx_ev,
        base_url_buf: cfg.backend.base_url.clone(),
        input_dir_buf: cfg.documentos.input_dir.clone(),
        origem_buf: cfg.solicitacao.origem.clone(),
        tipo_processo_buf: cfg.solicitacao.tipo_processo.clone(),
        input_box: None,
        shortcuts,
    };

    request_refresh(&mut app).await?;

    loop {
        terminal.draw(|f| draw(f, &app))?;

        // Drain worker events before reading input.
        while let Ok(ev) = app.worker_rx.try_recv() {
            handle_worker_event(&mut app, ev)?;
        }

        // Short poll keeps the UI responsive while waiting on the worker.
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(k) = event::read()?
        {
            if is_ctrl_c(&k) {
                break;
            }
            if handle_key(&mut app, k).await? {
                break;
            }
        }
    }
    Ok(())
}

/// Apply one worker event to the application state.
fn handle_worker_event(app: &mut App, ev: WorkerEvent) -> Result<()> {
    match ev {
        WorkerEvent::DocsLoaded(docs) => {
            app.docs = docs;
            app.ui.selected = 0;
            app.ui.error = None;
            app.ui.status = format!("{} documento(s) encontrados", app.docs.len());
        }
        WorkerEvent::DocLoaded(xml) => {
            // A fresh pass: the upload step was completed by the ingestion
            // service, so it starts approved and focus moves to the review.
            app.wizard.reset_all();
            app.wizard.set_xml_data(*xml);
            app.wizard.update_step_status(STEP_UPLOAD, StepStatus::Aprovado, None);
            app.wizard.set_current_step(STEP_DADOS_XML);
            app.form = SolicitacaoForm::new_from_xml(
                app.wizard.xml_data(),
                &app.cfg.solicitacao.origem,
                &app.cfg.solicitacao.tipo_processo,
            );
            app.submit = SubmitPhase::Idle;
            app.resultado = None;
            app.consulta_erro = None;
            app.ui.editing_field_idx = 0;
            app.ui.error = None;
            app.ui.screen = Screen::DadosXml;
            app.ui.status = "Documento carregado".into();
        }
        WorkerEvent::EnvioConcluido(resp) => {
            // Ignore stale settlements; only one envio is in flight by design.
            if app.submit == SubmitPhase::Enviando {
                let outcome = submit::interpretar_envio(&resp);
                app.submit = submit::aplicar_envio(&mut app.wizard, outcome);
                app.ui.status = match &app.submit {
                    SubmitPhase::Sucesso { id } => format!("Solicitação {id} criada"),
                    _ => "Solicitação recusada".into(),
                };
            }
        }
        WorkerEvent::EnvioFalhou(detail) => {
            // Transport failure: the backend was never asked, so the step
            // status stays untouched; only the UI enters the failure state.
            if app.submit == SubmitPhase::Enviando {
                tracing::warn!("envio transport failure: {detail}");
                app.ui.log.push(detail);
                app.submit = SubmitPhase::Falha {
                    erros: vec![ERRO_CONEXAO.to_string()],
                };
                app.ui.status = ERRO_CONEXAO.into();
            }
        }
        WorkerEvent::ConsultaConcluida(resp) => {
            app.consultando = false;
            let outcome = consulta::classificar_consulta(&resp);
            consulta::aplicar_consulta(&mut app.wizard, &outcome);
            app.resultado = Some(resp);
            app.consulta_erro = None;
            app.ui.status = "Consulta concluída".into();
        }
        WorkerEvent::ConsultaFalhou(detail) => {
            // Network blip: the request may still be pending, so no step
            // mutation; only a local message on the result screen.
            app.consultando = false;
            tracing::warn!("consulta transport failure: {detail}");
            app.ui.log.push(detail);
            app.consulta_erro = Some(ERRO_CONSULTA.to_string());
            app.ui.status = ERRO_CONSULTA.into();
        }
        WorkerEvent::Log(s) => {
            app.ui.log.push(s);
        }
        WorkerEvent::Error(s) => {
            app.ui.error = Some(s);
        }
    }
    Ok(())
}

/// Ask the worker to rescan the input directory.
pub async fn request_refresh(app: &mut App) -> Result<()> {
    if app.cfg.documentos.input_dir.is_empty() {
        app.ui.status = "Configure o diretório de documentos (tecla t)".into();
        tracing::warn!("refresh skipped: input_dir missing");
    } else {
        tracing::info!("refresh requested");
        app.worker_tx.send(WorkerCmd::RefreshDocs).await?;
        app.ui.status = "Atualizando documentos...".into();
    }
    Ok(())
}
