//! Background worker owning all file and network I/O.

use crate::{
    config::Config,
    fiscal::{
        api::{HttpApi, SolicitacaoApi},
        types::{SolicitacaoBody, SolicitacaoDetailResponse, SolicitacaoResponse, XmlData, XmlProcessResponse},
    },
};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

/// Commands sent from the UI to the worker.
#[derive(Debug)]
pub enum WorkerCmd {
    /// Re-scan the input directory for ingestion envelopes.
    RefreshDocs,
    /// Load one envelope as the active wizard document.
    LoadDoc { path: PathBuf },
    /// Create a solicitação from the composed payload.
    Enviar { body: Box<SolicitacaoBody> },
    /// Query the state of a previously created solicitação.
    Consultar { id: i64 },
    /// Persist and apply updated settings.
    SaveSettings(Config),
}

/// Events emitted by the worker for UI updates.
#[derive(Clone, Debug)]
pub enum WorkerEvent {
    /// Envelope list loaded from the input directory.
    DocsLoaded(Vec<DocEntry>),
    /// Extracted document data for the selected envelope.
    DocLoaded(Box<XmlData>),
    /// Create-request call settled with a parsed response.
    EnvioConcluido(Box<SolicitacaoResponse>),
    /// Create-request call failed at the transport level.
    EnvioFalhou(String),
    /// Detail-query call settled with a parsed response.
    ConsultaConcluida(Box<SolicitacaoDetailResponse>),
    /// Detail-query call failed at the transport level.
    ConsultaFalhou(String),
    /// Informational log message.
    Log(String),
    /// User-visible error message.
    Error(String),
}

/// One ingestion envelope found in the input directory.
#[derive(Clone, Debug)]
pub struct DocEntry {
    pub path: PathBuf,
    pub filename: String,
    pub numero: i64,
    pub nome_emitente: String,
    pub valor_total: f64,
}

/// Main worker loop: build the HTTP client, then handle commands
/// sequentially. The UI gates re-entry, so one command at a time is enough.
pub async fn run(rx: mpsc::Receiver<WorkerCmd>, tx: mpsc::Sender<WorkerEvent>, cfg: Config) {
    tracing::info!("worker started");
    let api = match build_api(&cfg) {
        Ok(api) => Box::new(api) as Box<dyn SolicitacaoApi>,
        Err(e) => {
            tracing::error!("http client init failed: {e}");
            let _ = tx
                .send(WorkerEvent::Error(format!("http client init failed: {e}")))
                .await;
            return;
        }
    };
    run_with(rx, tx, cfg, api).await;
}

/// Build the production API client from the current settings.
fn build_api(cfg: &Config) -> Result<HttpApi> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.backend.timeout_secs))
        .build()?;
    Ok(HttpApi::new(http, &cfg.backend.base_url))
}

/// Command loop over an injected backend implementation.
async fn run_with(
    mut rx: mpsc::Receiver<WorkerCmd>,
    tx: mpsc::Sender<WorkerEvent>,
    mut cfg: Config,
    mut api: Box<dyn SolicitacaoApi>,
) {
    while let Some(cmd) = rx.recv().await {
        match cmd {
            WorkerCmd::SaveSettings(new_cfg) => {
                tracing::info!("settings updated");
                cfg = new_cfg;
                // Endpoint or timeout may have changed; rebuild the client.
                match build_api(&cfg) {
                    Ok(new_api) => api = Box::new(new_api),
                    Err(e) => {
                        tracing::error!("http client rebuild failed: {e}");
                        let _ = tx
                            .send(WorkerEvent::Error(format!("http client rebuild failed: {e}")))
                            .await;
                    }
                }
                let _ = tx.send(WorkerEvent::Log("settings updated".into())).await;
            }

            WorkerCmd::RefreshDocs => {
                tracing::info!("refresh docs");
                match scan_input_dir(&cfg.documentos.input_dir, &tx).await {
                    Ok(docs) => {
                        tracing::info!("scan success: {} envelopes", docs.len());
                        let _ = tx.send(WorkerEvent::DocsLoaded(docs)).await;
                    }
                    Err(e) => {
                        tracing::error!("scan failed: {e}");
                        let _ = tx.send(WorkerEvent::Error(format!("scan failed: {e}"))).await;
                    }
                }
            }

            WorkerCmd::LoadDoc { path } => {
                tracing::info!("load doc: {}", path.display());
                match load_envelope(&path).await {
                    Ok(env) if env.success => {
                        let _ = tx.send(WorkerEvent::DocLoaded(Box::new(env.data))).await;
                    }
                    Ok(env) => {
                        tracing::warn!("envelope rejected by ingestion: {}", env.message);
                        let _ = tx
                            .send(WorkerEvent::Error(format!(
                                "documento com falha na extração: {}",
                                env.message
                            )))
                            .await;
                    }
                    Err(e) => {
                        tracing::error!("load failed: {e}");
                        let _ = tx.send(WorkerEvent::Error(format!("load failed: {e}"))).await;
                    }
                }
            }

            WorkerCmd::Enviar { body } => {
                tracing::info!(
                    "enviar solicitação: valor={} pedido={}",
                    body.valor_total,
                    body.numero_pedido
                );
                match api.enviar_solicitacao(&body).await {
                    Ok(resp) => {
                        tracing::info!("envio settled: success={}", resp.success);
                        let _ = tx.send(WorkerEvent::EnvioConcluido(Box::new(resp))).await;
                    }
                    Err(e) => {
                        tracing::error!("envio transport failure: {e}");
                        let _ = tx.send(WorkerEvent::EnvioFalhou(e.to_string())).await;
                    }
                }
            }

            WorkerCmd::Consultar { id } => {
                tracing::info!("consultar solicitação {id}");
                match api.consultar_solicitacao(id).await {
                    Ok(resp) => {
                        tracing::info!("consulta settled: success={}", resp.success);
                        let _ = tx.send(WorkerEvent::ConsultaConcluida(Box::new(resp))).await;
                    }
                    Err(e) => {
                        tracing::error!("consulta transport failure: {e}");
                        let _ = tx.send(WorkerEvent::ConsultaFalhou(e.to_string())).await;
                    }
                }
            }
        }
    }
}

/// Read one ingestion envelope from disk.
async fn load_envelope(path: &Path) -> Result<XmlProcessResponse> {
    let raw = tokio::fs::read(path).await?;
    Ok(serde_json::from_slice(&raw)?)
}

/// List `*.json` envelopes in the input directory. Unreadable or
/// unparseable files are reported and skipped, not fatal.
async fn scan_input_dir(dir: &str, tx: &mpsc::Sender<WorkerEvent>) -> Result<Vec<DocEntry>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut docs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().to_string();
        match load_envelope(&path).await {
            Ok(env) => docs.push(DocEntry {
                path,
                filename,
                numero: env.data.numero,
                nome_emitente: env.data.nome_emitente.clone(),
                valor_total: env.data.valor_total,
            }),
            Err(e) => {
                tracing::warn!("skipping {}: {e}", path.display());
                let _ = tx
                    .send(WorkerEvent::Log(format!("ignorado {filename}: {e}")))
                    .await;
            }
        }
    }
    // Stable order for the picker table.
    docs.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiscal::types::{SolicitacaoCriada, SolicitacaoDetail};
    use anyhow::anyhow;
    use async_trait::async_trait;

    /// Canned backend used to drive the worker loop without a server.
    struct FakeApi {
        transport_down: bool,
        envio_success: bool,
    }

    #[async_trait]
    impl SolicitacaoApi for FakeApi {
        async fn enviar_solicitacao(&self, _body: &SolicitacaoBody) -> Result<SolicitacaoResponse> {
            if self.transport_down {
                return Err(anyhow!("connection refused"));
            }
            Ok(SolicitacaoResponse {
                success: self.envio_success,
                data: self.envio_success.then(|| SolicitacaoCriada {
                    id: 42,
                    tipo_processo: String::new(),
                    origem: String::new(),
                    valor_total: 0.0,
                    numero_pedido: 0,
                }),
                message: "falhou".into(),
                errors: if self.envio_success {
                    vec![]
                } else {
                    vec!["CPF inválido".into()]
                },
                timestamp: String::new(),
            })
        }

        async fn consultar_solicitacao(&self, id: i64) -> Result<SolicitacaoDetailResponse> {
            if self.transport_down {
                return Err(anyhow!("connection refused"));
            }
            Ok(SolicitacaoDetailResponse {
                success: true,
                data: Some(SolicitacaoDetail {
                    id,
                    status: "Aprovada".into(),
                    ..Default::default()
                }),
                message: String::new(),
                errors: vec![],
                timestamp: String::new(),
            })
        }
    }

    fn body() -> Box<SolicitacaoBody> {
        Box::new(
            crate::form::SolicitacaoForm::default().to_body(&XmlData::default()),
        )
    }

    async fn drive(api: FakeApi, cmds: Vec<WorkerCmd>) -> Vec<WorkerEvent> {
        let (tx_cmd, rx_cmd) = mpsc::channel(8);
        let (tx_ev, mut rx_ev) = mpsc::channel(8);
        for cmd in cmds {
            tx_cmd.send(cmd).await.unwrap();
        }
        // Closing the command side lets the loop drain and exit.
        drop(tx_cmd);
        run_with(rx_cmd, tx_ev, Config::default(), Box::new(api)).await;
        let mut events = Vec::new();
        while let Ok(ev) = rx_ev.try_recv() {
            events.push(ev);
        }
        events
    }

    #[tokio::test]
    async fn enviar_emits_parsed_response() {
        let events = drive(
            FakeApi {
                transport_down: false,
                envio_success: true,
            },
            vec![WorkerCmd::Enviar { body: body() }],
        )
        .await;
        assert!(matches!(
            &events[..],
            [WorkerEvent::EnvioConcluido(resp)] if resp.success
        ));
    }

    #[tokio::test]
    async fn enviar_transport_failure_is_a_distinct_event() {
        let events = drive(
            FakeApi {
                transport_down: true,
                envio_success: true,
            },
            vec![WorkerCmd::Enviar { body: body() }],
        )
        .await;
        assert!(matches!(
            &events[..],
            [WorkerEvent::EnvioFalhou(msg)] if msg.contains("connection refused")
        ));
    }

    #[tokio::test]
    async fn consultar_round_trip() {
        let events = drive(
            FakeApi {
                transport_down: false,
                envio_success: true,
            },
            vec![WorkerCmd::Consultar { id: 42 }],
        )
        .await;
        match &events[..] {
            [WorkerEvent::ConsultaConcluida(resp)] => {
                assert_eq!(resp.data.as_ref().unwrap().id, 42);
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[tokio::test]
    async fn consultar_transport_failure_is_a_distinct_event() {
        let events = drive(
            FakeApi {
                transport_down: true,
                envio_success: true,
            },
            vec![WorkerCmd::Consultar { id: 42 }],
        )
        .await;
        assert!(matches!(
            &events[..],
            [WorkerEvent::ConsultaFalhou(msg)] if msg.contains("connection refused")
        ));
    }

    #[tokio::test]
    async fn scan_skips_unparseable_envelopes() {
        let dir = std::env::temp_dir().join("solicitacao_tui_scan_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("a.json"),
            r#"{"success":true,"data":{"numero":12,"nomeEmitente":"ACME","valorTotal":150.0}}"#,
        )
        .unwrap();
        std::fs::write(dir.join("b.json"), "not json").unwrap();
        std::fs::write(dir.join("c.txt"), "ignored").unwrap();

        let (tx_ev, mut rx_ev) = mpsc::channel(8);
        let docs = scan_input_dir(dir.to_str().unwrap(), &tx_ev).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].numero, 12);
        assert_eq!(docs[0].nome_emitente, "ACME");
        // The broken envelope shows up as a log line, not a failure.
        assert!(matches!(rx_ev.try_recv(), Ok(WorkerEvent::Log(_))));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
