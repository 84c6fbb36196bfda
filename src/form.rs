//! Order-data form model and payload composition.

use crate::fiscal::types::{DocumentoFiscal, SolicitacaoBody, XmlData};

/// Form filled in on the "Dados do Pedido" step.
///
/// `origem` and `tipo_processo` are process tags taken from config defaults;
/// the remaining fields are edited by the user. Monetary and numeric fields
/// seed from the extracted document when one is loaded.
#[derive(Clone, Debug, Default)]
pub struct SolicitacaoForm {
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
}

/// Editable fields in screen order, grouped as rendered.
pub const FORM_FIELDS: &[(&str, &str)] = &[
    ("Beneficiário", "Código Pessoa"),
    ("Beneficiário", "ID Conta Bancária"),
    ("Beneficiário", "CPF Beneficiário"),
    ("Emissor", "Código Emissor"),
    ("Emissor", "CNPJ Emissor"),
    ("Emissor", "Código CNAE"),
    ("Dados Contábeis", "Código Projeto"),
    ("Dados Contábeis", "Sub Projeto"),
    ("Dados Contábeis", "Rubrica"),
    ("Dados Contábeis", "Conta Razão"),
    ("Dados Contábeis", "Centro de Custo"),
    ("Pedido", "Valor Total"),
    ("Pedido", "Número Pedido"),
    ("Pedido", "Justificativa"),
];

impl SolicitacaoForm {
    /// Build a form seeded from the extracted document when present.
    pub fn new_from_xml(xml: Option<&XmlData>, origem: &str, tipo_processo: &str) -> Self {
        Self {
            origem: origem.to_string(),
            tipo_processo: tipo_processo.to_string(),
            valor_total: xml.map(|x| x.valor_total).unwrap_or(0.0),
            cnpj_emissor: xml.map(|x| x.cnpj_cpf_emitente.clone()).unwrap_or_default(),
            codigo_cnae_emissor: xml.map(|x| x.codigo_cnae.clone()).unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Current display value of an editable field.
    pub fn field_value(&self, idx: usize) -> String {
        match idx {
            0 => self.codigo_pessoa.clone(),
            1 => self.id_conta_bancaria.clone(),
            2 => self.cpf_beneficiario.clone(),
            3 => self.codigo_emissor.clone(),
            4 => self.cnpj_emissor.clone(),
            5 => self.codigo_cnae_emissor.clone(),
            6 => self.codigo_projeto.clone(),
            7 => self.sub_projeto.to_string(),
            8 => self.rubrica.clone(),
            9 => self.conta_razao.clone(),
            10 => self.centro_de_custo.clone(),
            11 => self.valor_total.to_string(),
            12 => self.numero_pedido.to_string(),
            13 => self.justificativa.clone(),
            _ => String::new(),
        }
    }

    /// Apply an edited value. Numeric fields that fail to parse keep 0,
    /// matching the behavior of the original web form.
    pub fn set_field(&mut self, idx: usize, value: &str) {
        match idx {
            0 => self.codigo_pessoa = value.to_string(),
            1 => self.id_conta_bancaria = value.to_string(),
            2 => self.cpf_beneficiario = value.to_string(),
            3 => self.codigo_emissor = value.to_string(),
            4 => self.cnpj_emissor = value.to_string(),
            5 => self.codigo_cnae_emissor = value.to_string(),
            6 => self.codigo_projeto = value.to_string(),
            7 => self.sub_projeto = value.trim().parse().unwrap_or(0),
            8 => self.rubrica = value.to_string(),
            9 => self.conta_razao = value.to_string(),
            10 => self.centro_de_custo = value.to_string(),
            11 => self.valor_total = value.trim().parse().unwrap_or(0.0),
            12 => self.numero_pedido = value.trim().parse().unwrap_or(0),
            13 => self.justificativa = value.to_string(),
            _ => {}
        }
    }

    /// Compose the create-request payload: the form plus exactly one
    /// reference to the backing fiscal document.
    pub fn to_body(&self, xml: &XmlData) -> SolicitacaoBody {
        SolicitacaoBody {
            origem: self.origem.clone(),
            tipo_processo: self.tipo_processo.clone(),
            valor_total: self.valor_total,
            codigo_pessoa: self.codigo_pessoa.clone(),
            id_conta_bancaria: self.id_conta_bancaria.clone(),
            cpf_beneficiario: self.cpf_beneficiario.clone(),
            codigo_emissor: self.codigo_emissor.clone(),
            cnpj_emissor: self.cnpj_emissor.clone(),
            codigo_cnae_emissor: self.codigo_cnae_emissor.clone(),
            codigo_projeto: self.codigo_projeto.clone(),
            sub_projeto: self.sub_projeto,
            rubrica: self.rubrica.clone(),
            conta_razao: self.conta_razao.clone(),
            centro_de_custo: self.centro_de_custo.clone(),
            numero_pedido: self.numero_pedido,
            justificativa: self.justificativa.clone(),
            documentos_fiscais: vec![DocumentoFiscal {
                tipo_documento: "NotaFiscal".to_string(),
                id_documento_fiscal_externo: xml.id.clone(),
                chave_acesso_nf: xml.chave_acesso.clone(),
                data_emissao: xml.data_emissao.clone(),
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn xml() -> XmlData {
        XmlData {
            id: "DOC-1".into(),
            chave_acesso: "35240811222333000144".into(),
            data_emissao: "2025-03-01".into(),
            cnpj_cpf_emitente: "11222333000144".into(),
            codigo_cnae: "6201-5".into(),
            valor_total: 150.0,
            ..Default::default()
        }
    }

    #[test]
    fn seeds_from_xml_when_present() {
        let f = SolicitacaoForm::new_from_xml(Some(&xml()), "Pedidos", "PagamentoNotaFiscal");
        assert_eq!(f.valor_total, 150.0);
        assert_eq!(f.cnpj_emissor, "11222333000144");
        assert_eq!(f.codigo_cnae_emissor, "6201-5");
        assert_eq!(f.origem, "Pedidos");
        assert_eq!(f.codigo_pessoa, "");
    }

    #[test]
    fn defaults_when_xml_absent() {
        let f = SolicitacaoForm::new_from_xml(None, "Pedidos", "PagamentoNotaFiscal");
        assert_eq!(f.valor_total, 0.0);
        assert_eq!(f.cnpj_emissor, "");
        assert_eq!(f.codigo_cnae_emissor, "");
    }

    #[test]
    fn numeric_fields_fall_back_to_zero_on_bad_input() {
        let mut f = SolicitacaoForm::default();
        f.set_field(11, "150.50");
        assert_eq!(f.valor_total, 150.50);
        f.set_field(11, "abc");
        assert_eq!(f.valor_total, 0.0);
        f.set_field(12, "12");
        assert_eq!(f.numero_pedido, 12);
        f.set_field(7, "");
        assert_eq!(f.sub_projeto, 0);
    }

    #[test]
    fn body_references_exactly_one_documento_fiscal() {
        let f = SolicitacaoForm::new_from_xml(Some(&xml()), "Pedidos", "PagamentoNotaFiscal");
        let body = f.to_body(&xml());
        assert_eq!(body.documentos_fiscais.len(), 1);
        let doc = &body.documentos_fiscais[0];
        assert_eq!(doc.tipo_documento, "NotaFiscal");
        assert_eq!(doc.id_documento_fiscal_externo, "DOC-1");
        assert_eq!(doc.chave_acesso_nf, "35240811222333000144");
        assert_eq!(doc.data_emissao, "2025-03-01");
    }

    #[test]
    fn field_catalog_matches_accessors() {
        let f = SolicitacaoForm::default();
        for idx in 0..FORM_FIELDS.len() {
            // Every cataloged field must be readable and writable.
            let _ = f.field_value(idx);
        }
        assert_eq!(FORM_FIELDS.len(), 14);
    }
}
