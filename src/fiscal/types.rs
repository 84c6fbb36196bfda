//! Wire types shared with the ingestion service and the solicitação backend.
//!
//! Field names on the wire are the backend's Portuguese camelCase names;
//! acronym fields (CNAE, ICMS, ...) need explicit renames because serde's
//! `camelCase` rule would lowercase them.

use serde::{Deserialize, Serialize};

/// Envelope written by the ingestion service after parsing a fiscal XML.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XmlProcessResponse {
    pub success: bool,
    pub data: XmlData,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub timestamp: String,
}

/// Flat record extracted from the source fiscal document (NF-e / NFS-e).
///
/// Read-only for this app; produced by the ingestion step. Fields missing
/// from older envelopes default to zero / empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct XmlData {
    pub id: String,
    pub nome_arquivo: String,
    pub hash: String,
    pub tipo_nota: String,
    pub chave_acesso: String,
    pub numero: i64,
    pub serie: i64,
    pub modelo: String,
    pub data_emissao: String,
    pub cnpj_cpf_emitente: String,
    pub nome_emitente: String,
    pub nome_fantasia_emitente: String,
    pub inscricao_estadual_emitente: String,
    pub uf_emitente: String,
    pub municipio_emitente: String,
    pub cnpj_cpf_destinatario: String,
    pub nome_destinatario: String,
    pub inscricao_estadual_destinatario: String,
    pub uf_destinatario: String,
    pub municipio_destinatario: String,
    pub valor_total: f64,
    pub valor_produtos: f64,
    pub valor_servicos: f64,
    #[serde(rename = "baseCalculoICMS")]
    pub base_calculo_icms: f64,
    #[serde(rename = "valorICMS")]
    pub valor_icms: f64,
    #[serde(rename = "baseCalculoICMSST")]
    pub base_calculo_icms_st: f64,
    #[serde(rename = "valorICMSST")]
    pub valor_icms_st: f64,
    #[serde(rename = "valorIPI")]
    pub valor_ipi: f64,
    #[serde(rename = "valorPIS")]
    pub valor_pis: f64,
    #[serde(rename = "valorCOFINS")]
    pub valor_cofins: f64,
    #[serde(rename = "valorII")]
    pub valor_ii: f64,
    #[serde(rename = "valorISS")]
    pub valor_iss: f64,
    pub status: String,
    pub status_descricao: String,
    pub tipo_emissao: String,
    pub quantidade_itens: i64,
    pub informacoes_fisco: String,
    pub finalidade_emissao: String,
    pub tipo_operacao: String,
    pub natureza_operacao: String,
    pub data_competencia: String,
    pub item_lista_servicos: String,
    #[serde(rename = "codigoCNAE")]
    pub codigo_cnae: String,
    pub discriminacao_servico: String,
    pub codigo_servico_municipio: String,
    pub municipio_incidencia: String,
    pub valor_deducoes: f64,
    #[serde(rename = "aliquotaISS")]
    pub aliquota_iss: f64,
    pub valor_liquido: f64,
    pub retencao_federal: bool,
}

/// Create-request body sent to the solicitação backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolicitacaoBody {
    pub origem: String,
    pub tipo_processo: String,
    pub valor_total: f64,
    pub codigo_pessoa: String,
    pub id_conta_bancaria: String,
    pub cpf_beneficiario: String,
    pub codigo_emissor: String,
    pub cnpj_emissor: String,
    pub codigo_cnae_emissor: String,
    pub codigo_projeto: String,
    pub sub_projeto: i64,
    pub rubrica: String,
    pub conta_razao: String,
    pub centro_de_custo: String,
    pub numero_pedido: i64,
    pub justificativa: String,
    pub documentos_fiscais: Vec<DocumentoFiscal>,
}

/// Reference to the backing fiscal document inside a create request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentoFiscal {
    pub tipo_documento: String,
    pub id_documento_fiscal_externo: String,
    pub chave_acesso_nf: String,
    pub data_emissao: String,
}

/// Response of the create-request call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolicitacaoResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<SolicitacaoCriada>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub timestamp: String,
}

/// Summary of the created solicitação.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolicitacaoCriada {
    pub id: i64,
    #[serde(default)]
    pub tipo_processo: String,
    #[serde(default)]
    pub origem: String,
    #[serde(default)]
    pub valor_total: f64,
    #[serde(default)]
    pub numero_pedido: i64,
}

/// Response of the detail-query call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolicitacaoDetailResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<SolicitacaoDetail>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub timestamp: String,
}

/// Full state of a solicitação as echoed back by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SolicitacaoDetail {
    pub id: i64,
    pub origem: String,
    pub tipo_processo: String,
    pub status: String,
    pub data_criacao: String,
    pub valor_total: f64,
    pub numero_pedido: i64,
    pub justificativa: String,
    /// Free-text diagnostic filled by the backend when processing failed.
    pub erros: String,
    pub beneficiario: Beneficiario,
    pub emissor: Emissor,
    pub dados_contabeis: DadosContabeis,
    pub documentos_fiscais: Vec<DocumentoFiscalDetalhe>,
}

/// Beneficiary sub-record of the detail response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Beneficiario {
    pub codigo_pessoa: String,
    pub id_conta_bancaria: String,
    pub cpf_beneficiario: String,
}

/// Issuer sub-record of the detail response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Emissor {
    pub codigo_emissor: String,
    pub cnpj_emissor: String,
    pub codigo_cnae_emissor: String,
}

/// Accounting sub-record of the detail response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DadosContabeis {
    pub codigo_projeto: String,
    pub sub_projeto: i64,
    pub rubrica: String,
    pub conta_razao: String,
    pub centro_de_custo: String,
}

/// Fiscal-document reference as echoed back by the detail call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentoFiscalDetalhe {
    pub id: i64,
    pub tipo_documento: String,
    pub id_documento_fiscal_externo: String,
    pub chave_acesso_nf: String,
    pub data_emissao: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_data_parses_acronym_keys() {
        let raw = r#"{
            "success": true,
            "data": {
                "id": "DOC-1",
                "chaveAcesso": "3524",
                "dataEmissao": "2025-03-01",
                "cnpjCpfEmitente": "11222333000144",
                "codigoCNAE": "6201-5",
                "valorTotal": 150.0,
                "valorICMSST": 3.5,
                "baseCalculoICMS": 100.0,
                "aliquotaISS": 2.0,
                "retencaoFederal": true
            },
            "message": "ok",
            "errors": [],
            "timestamp": "2025-03-01T10:00:00Z"
        }"#;
        let env: XmlProcessResponse = serde_json::from_str(raw).unwrap();
        assert!(env.success);
        assert_eq!(env.data.codigo_cnae, "6201-5");
        assert_eq!(env.data.valor_icms_st, 3.5);
        assert_eq!(env.data.base_calculo_icms, 100.0);
        assert_eq!(env.data.aliquota_iss, 2.0);
        assert!(env.data.retencao_federal);
        // Fields absent from the envelope fall back to defaults.
        assert_eq!(env.data.numero, 0);
        assert_eq!(env.data.nome_emitente, "");
    }

    #[test]
    fn body_serializes_with_backend_field_names() {
        let body = SolicitacaoBody {
            origem: "Pedidos".into(),
            tipo_processo: "PagamentoNotaFiscal".into(),
            valor_total: 99.9,
            codigo_pessoa: "P1".into(),
            id_conta_bancaria: "C1".into(),
            cpf_beneficiario: "00011122233".into(),
            codigo_emissor: "E1".into(),
            cnpj_emissor: "11222333000144".into(),
            codigo_cnae_emissor: "6201-5".into(),
            codigo_projeto: "PRJ".into(),
            sub_projeto: 2,
            rubrica: "R".into(),
            conta_razao: "CR".into(),
            centro_de_custo: "CC".into(),
            numero_pedido: 7,
            justificativa: "teste".into(),
            documentos_fiscais: vec![DocumentoFiscal {
                tipo_documento: "NotaFiscal".into(),
                id_documento_fiscal_externo: "DOC-1".into(),
                chave_acesso_nf: "3524".into(),
                data_emissao: "2025-03-01".into(),
            }],
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["tipoProcesso"], "PagamentoNotaFiscal");
        assert_eq!(v["numeroPedido"], 7);
        assert_eq!(v["documentosFiscais"][0]["chaveAcessoNf"], "3524");
        assert_eq!(v["documentosFiscais"][0]["idDocumentoFiscalExterno"], "DOC-1");
    }

    #[test]
    fn detail_response_tolerates_missing_data() {
        let raw = r#"{"success": false, "message": "nao encontrada", "errors": ["id desconhecido"], "timestamp": "t"}"#;
        let resp: SolicitacaoDetailResponse = serde_json::from_str(raw).unwrap();
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(resp.errors, vec!["id desconhecido".to_string()]);
    }
}
