//! Config model and persistence helpers.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Top-level configuration stored in `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Solicitação backend endpoint settings.
    pub backend: BackendCfg,
    /// Where the ingestion service drops extracted-document envelopes.
    pub documentos: DocumentosCfg,
    /// Process tags stamped on every solicitação.
    pub solicitacao: SolicitacaoCfg,
}

/// Backend endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendCfg {
    /// Base URL of the solicitação service.
    pub base_url: String,
    /// Per-request timeout; an unreachable backend must settle the
    /// submit/consulta phases instead of pinning them forever.
    pub timeout_secs: u64,
}

/// Input location for ingestion envelopes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentosCfg {
    /// Directory scanned for `*.json` envelopes.
    pub input_dir: String,
}

/// Default process tags for new solicitações.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolicitacaoCfg {
    pub origem: String,
    pub tipo_processo: String,
}

impl Config {
    /// Load from disk or create defaults when missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let s = fs::read_to_string(path)?;
            Ok(toml::from_str(&s)?)
        } else {
            let cfg = Self::default();
            cfg.save(path)?;
            Ok(cfg)
        }
    }

    /// Persist the config as pretty TOML.
    pub fn save(&self, path: &Path) -> Result<()> {
        let s = toml::to_string_pretty(self)?;
        fs::write(path, s)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendCfg {
                base_url: "http://localhost:8080".into(),
                timeout_secs: 30,
            },
            documentos: DocumentosCfg {
                input_dir: "documentos".into(),
            },
            solicitacao: SolicitacaoCfg {
                origem: "Pedidos".into(),
                tipo_processo: "PagamentoNotaFiscal".into(),
            },
        }
    }
}
