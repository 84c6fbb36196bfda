//! Drawing functions for every screen and dialog.

use ratatui::{
    Frame,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Row, Table, Wrap},
};

use crate::{
    events::Screen,
    fiscal::types::XmlData,
    form::FORM_FIELDS,
    input::{self, centered_popup},
    layout,
    shortcuts::Shortcuts,
    submit::SubmitPhase,
    wizard::StepStatus,
};

use super::App;

/// Draw the whole frame for the current state.
pub fn draw(f: &mut Frame, app: &App) {
    match app.ui.screen {
        Screen::Documentos => draw_documentos(f, app),
        Screen::Settings => draw_settings(f, app),
        Screen::DadosXml => draw_dados_xml(f, app),
        Screen::DadosPedido => draw_dados_pedido(f, app),
        Screen::Resultado => draw_resultado(f, app),
    }

    // Submit dialogs sit above the form screen.
    if app.ui.screen == Screen::DadosPedido {
        draw_submit_dialog(f, app);
    }

    // The input overlay is always on top.
    if let Some(input_state) = &app.input_box {
        input::render_input_box(f, input_state);
    }
}

/// Document picker: table of ingestion envelopes plus the info panel.
fn draw_documentos(f: &mut Frame, app: &App) {
    let main_layout = layout::create_main_layout(f.area());
    let body_layout = layout::create_body_layout(main_layout.body);

    let rows = app.docs.iter().enumerate().map(|(i, d)| {
        Row::new(vec![
            format!("{}", i + 1),
            d.filename.clone(),
            d.numero.to_string(),
            d.nome_emitente.clone(),
            format_brl(d.valor_total),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(16),
            Constraint::Length(10),
            Constraint::Min(12),
            Constraint::Length(14),
        ],
    )
    .block(Block::default().borders(Borders::ALL).title("DOCUMENTOS"))
    .header(Row::new(vec!["#", "arquivo", "número", "emitente", "valor"]).bold())
    .row_highlight_style(
        Style::default()
            .bg(Color::Rgb(255, 140, 0))
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    );

    let mut table_state = ratatui::widgets::TableState::default();
    if !app.docs.is_empty() {
        table_state.select(Some(app.ui.selected));
    }
    f.render_stateful_widget(table, body_layout.table, &mut table_state);

    let sel = app
        .docs
        .get(app.ui.selected)
        .map(|d| d.filename.clone())
        .unwrap_or_else(|| "-".into());
    let info_text = format!(
        "Selecionado: {}\n\nBackend: {}\nDiretório: {}\nOrigem: {}\nProcesso: {}\n\nLog:\n{}",
        sel,
        app.cfg.backend.base_url,
        app.cfg.documentos.input_dir,
        app.cfg.solicitacao.origem,
        app.cfg.solicitacao.tipo_processo,
        log_tail(app),
    );
    let info_panel = Paragraph::new(info_text)
        .block(Block::default().borders(Borders::ALL).title("INFO"))
        .wrap(Wrap { trim: true });
    f.render_widget(info_panel, body_layout.info_panel);

    draw_help_and_status(f, app, main_layout.help_bar, main_layout.status_bar);
}

/// Settings editor: current buffer values with their shortcut keys.
fn draw_settings(f: &mut Frame, app: &App) {
    let main_layout = layout::create_main_layout(f.area());

    let text = format!(
        "Configurações\n\n[b] URL do backend: {}\n[i] Diretório de documentos: {}\n[o] Origem: {}\n[p] Tipo de processo: {}\n\nEnter salva, Esc descarta.",
        app.base_url_buf, app.input_dir_buf, app.origem_buf, app.tipo_processo_buf,
    );
    let body = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("CONFIGURAÇÕES"))
        .wrap(Wrap { trim: true });
    f.render_widget(body, main_layout.body);

    draw_help_and_status(f, app, main_layout.help_bar, main_layout.status_bar);
}

/// Review of the extracted document.
fn draw_dados_xml(f: &mut Frame, app: &App) {
    let wl = layout::create_wizard_layout(f.area());
    draw_step_bar(f, app, wl.step_bar);

    let text = match app.wizard.xml_data() {
        Some(xml) => xml_review_text(xml),
        None => "Nenhum documento carregado.".to_string(),
    };
    let body = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("DADOS DO XML"))
        .wrap(Wrap { trim: true });
    f.render_widget(body, wl.body);

    draw_help_and_status(f, app, wl.help_bar, wl.status_bar);
}

/// Multi-section summary of the source document.
fn xml_review_text(xml: &XmlData) -> String {
    format!(
        "Identificação\n  Tipo: {}  Número: {}  Série: {}  Modelo: {}\n  Chave de acesso: {}\n  Emissão: {}\n\nEmitente\n  {} ({})\n  CNPJ/CPF: {}  IE: {}\n  {} - {}\n\nDestinatário\n  {}\n  CNPJ/CPF: {}\n  {} - {}\n\nValores\n  Total: {}  Produtos: {}  Serviços: {}\n  Deduções: {}  Líquido: {}\n\nImpostos\n  ICMS: {} (base {})  ICMS ST: {} (base {})\n  IPI: {}  PIS: {}  COFINS: {}  II: {}  ISS: {} (alíquota {}%)\n\nOperação\n  Natureza: {}  Tipo: {}\n  Finalidade: {}  CNAE: {}\n  Status: {} ({})",
        xml.tipo_nota,
        xml.numero,
        xml.serie,
        xml.modelo,
        xml.chave_acesso,
        format_data(&xml.data_emissao),
        xml.nome_emitente,
        xml.nome_fantasia_emitente,
        xml.cnpj_cpf_emitente,
        xml.inscricao_estadual_emitente,
        xml.municipio_emitente,
        xml.uf_emitente,
        xml.nome_destinatario,
        xml.cnpj_cpf_destinatario,
        xml.municipio_destinatario,
        xml.uf_destinatario,
        format_brl(xml.valor_total),
        format_brl(xml.valor_produtos),
        format_brl(xml.valor_servicos),
        format_brl(xml.valor_deducoes),
        format_brl(xml.valor_liquido),
        format_brl(xml.valor_icms),
        format_brl(xml.base_calculo_icms),
        format_brl(xml.valor_icms_st),
        format_brl(xml.base_calculo_icms_st),
        format_brl(xml.valor_ipi),
        format_brl(xml.valor_pis),
        format_brl(xml.valor_cofins),
        format_brl(xml.valor_ii),
        format_brl(xml.valor_iss),
        xml.aliquota_iss,
        xml.natureza_operacao,
        xml.tipo_operacao,
        xml.finalidade_emissao,
        xml.codigo_cnae,
        xml.status,
        xml.status_descricao,
    )
}

/// Order-data form: grouped fields with the edit marker, plus a summary
/// panel of the process tags and the backing document.
fn draw_dados_pedido(f: &mut Frame, app: &App) {
    let wl = layout::create_wizard_layout(f.area());
    draw_step_bar(f, app, wl.step_bar);

    let body_layout = layout::create_body_layout(wl.body);

    let mut lines: Vec<String> = Vec::new();
    let mut last_group = "";
    for (i, (group, label)) in FORM_FIELDS.iter().enumerate() {
        if *group != last_group {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push((*group).to_string());
            last_group = *group;
        }
        let marker = if i == app.ui.editing_field_idx { "→" } else { " " };
        lines.push(format!("{} {}: {}", marker, label, app.form.field_value(i)));
    }
    let form_panel = Paragraph::new(lines.join("\n"))
        .block(Block::default().borders(Borders::ALL).title("DADOS DO PEDIDO"))
        .wrap(Wrap { trim: true });
    f.render_widget(form_panel, body_layout.table);

    let doc = match app.wizard.xml_data() {
        Some(xml) => format!(
            "Documento\n  {} nº {}\n  Valor Total: {}\n  CNPJ Emitente: {}",
            xml.tipo_nota,
            xml.numero,
            format_brl(xml.valor_total),
            xml.cnpj_cpf_emitente,
        ),
        None => "Sem documento".into(),
    };
    let info_text = format!(
        "Origem: {}\nProcesso: {}\n\n{}\n\nLog:\n{}",
        app.form.origem, app.form.tipo_processo, doc, log_tail(app),
    );
    let info_panel = Paragraph::new(info_text)
        .block(Block::default().borders(Borders::ALL).title("INFO"))
        .wrap(Wrap { trim: true });
    f.render_widget(info_panel, body_layout.info_panel);

    draw_help_and_status(f, app, wl.help_bar, wl.status_bar);
}

/// Result screen: created id before the consulta, then either the approved
/// card or the error card.
fn draw_resultado(f: &mut Frame, app: &App) {
    let wl = layout::create_wizard_layout(f.area());
    draw_step_bar(f, app, wl.step_bar);

    let id_text = app
        .wizard
        .solicitacao_id()
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".into());

    let (title, text) = match &app.resultado {
        None => {
            let mut text = format!(
                "Pedido enviado com sucesso\n\nID da solicitação: {id_text}\n\nPressione Enter para conferir o resultado."
            );
            if app.consultando {
                text.push_str("\n\nConsultando...");
            }
            if let Some(err) = &app.consulta_erro {
                text.push_str(&format!("\n\n{err}"));
            }
            ("RESULTADO", text)
        }
        Some(resp) => {
            let is_error = !resp.success
                || resp
                    .data
                    .as_ref()
                    .is_some_and(|d| d.status == "Erro");
            if is_error {
                let status = resp
                    .data
                    .as_ref()
                    .map(|d| d.status.clone())
                    .unwrap_or_default();
                let mut text = format!("Erros na Solicitação\n\nStatus: {status}");
                if let Some(d) = &resp.data
                    && !d.erros.is_empty()
                {
                    text.push_str(&format!("\n\n{}", d.erros));
                }
                for e in &resp.errors {
                    text.push_str(&format!("\n- {e}"));
                }
                text.push_str("\n\nPressione n para recomeçar.");
                ("ERROS NA SOLICITAÇÃO", text)
            } else {
                let d = resp.data.as_ref();
                let text = format!(
                    "Solicitação Aprovada\n\nStatus: {}\nPedido #{}\nValor: {}\nCriado em: {}\n\nPressione n para nova solicitação.",
                    d.map(|d| d.status.clone()).unwrap_or_default(),
                    d.map(|d| d.numero_pedido).unwrap_or_default(),
                    format_brl(d.map(|d| d.valor_total).unwrap_or_default()),
                    d.map(|d| format_data(&d.data_criacao)).unwrap_or_default(),
                );
                ("SOLICITAÇÃO APROVADA", text)
            }
        }
    };

    let body = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(title))
        .wrap(Wrap { trim: true });
    f.render_widget(body, wl.body);

    draw_help_and_status(f, app, wl.help_bar, wl.status_bar);
}

/// Step bar shown on wizard screens: "Etapa N: label [status]".
fn draw_step_bar(f: &mut Frame, app: &App, area: Rect) {
    let step = app.wizard.current_step_info();
    let mut text = format!(
        "Etapa {}: {}  [{}]",
        app.wizard.current_step() + 1,
        step.label,
        step.status.label(),
    );
    if let Some(motivo) = &step.motivo {
        text.push_str(&format!("  {motivo}"));
    }
    let style = match step.status {
        StepStatus::Pendente => Style::default().fg(Color::Yellow),
        StepStatus::Aprovado => Style::default().fg(Color::Green),
        StepStatus::Recusado => Style::default().fg(Color::Red),
    };
    let bar = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title("ETAPA"));
    f.render_widget(bar, area);
}

/// Submit dialogs derived from the phase variant; only one can be active.
fn draw_submit_dialog(f: &mut Frame, app: &App) {
    match &app.submit {
        SubmitPhase::Idle => {}
        SubmitPhase::AguardandoDecisao { divergencias } => {
            let mut text = String::from(
                "Foram encontradas divergências entre os dados preenchidos e o XML.\n",
            );
            for d in divergencias {
                text.push_str(&format!("\n- {d}"));
            }
            text.push_str("\n\nEnter=Solicitar Revisão | Esc=Corrigir");
            draw_dialog(
                f,
                "Divergências Encontradas",
                &text,
                Color::Yellow,
                7 + divergencias.len() as u16,
            );
        }
        SubmitPhase::Enviando => {
            draw_dialog(
                f,
                "Solicitação enviada",
                "Aguardando processamento...",
                Color::Cyan,
                5,
            );
        }
        SubmitPhase::Sucesso { .. } => {
            draw_dialog(
                f,
                "Validação Concluída",
                "Pedido enviado com sucesso!\n\nEnter=Conferir Resultado da Solicitação",
                Color::Green,
                7,
            );
        }
        SubmitPhase::Falha { erros } => {
            let mut text = String::new();
            for e in erros {
                text.push_str(&format!("- {e}\n"));
            }
            text.push_str("\nEsc=Voltar aos Dados XML");
            draw_dialog(
                f,
                "Erro na Validação",
                &text,
                Color::Red,
                6 + erros.len() as u16,
            );
        }
    }
}

/// Centered dialog with a colored border.
fn draw_dialog(f: &mut Frame, title: &str, text: &str, color: Color, height: u16) {
    let area = centered_popup(f.area(), 60, height);
    f.render_widget(Clear, area);
    let dialog = Paragraph::new(text.to_string())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(Style::default().fg(color)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(dialog, area);
}

/// HELP and STATUS bars shared by every screen.
fn draw_help_and_status(f: &mut Frame, app: &App, help_area: Rect, status_area: Rect) {
    let help_text = get_help_text(&app.ui.screen, &app.shortcuts);
    let help_bar = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("HELP"))
        .wrap(Wrap { trim: true });
    f.render_widget(help_bar, help_area);

    let screen_name = match app.ui.screen {
        Screen::Documentos => "Documentos",
        Screen::Settings => "Configurações",
        Screen::DadosXml => "Dados XML",
        Screen::DadosPedido => "Dados Pedido",
        Screen::Resultado => "Resultado",
    };
    let aprovadas = app
        .wizard
        .steps()
        .iter()
        .filter(|s| s.status == StepStatus::Aprovado)
        .count();
    let progress = format!("Etapas: {}/{} aprovadas", aprovadas, app.wizard.steps().len());

    let status_text = if let Some(err) = &app.ui.error {
        format!("[{}] {} | ERRO: {}", screen_name, progress, err)
    } else {
        format!("[{}] {} | {}", screen_name, progress, app.ui.status)
    };

    let mut status_bar = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("STATUS"))
        .wrap(Wrap { trim: true });
    if app.ui.error.is_some() {
        status_bar = status_bar.style(Style::default().fg(Color::Red));
    }
    f.render_widget(status_bar, status_area);
}

/// Help line for the current screen.
fn get_help_text(screen: &Screen, shortcuts: &Shortcuts) -> String {
    match screen {
        Screen::Documentos => format!(
            "{}: sair | {}: atualizar | {}: configurações | {}: abrir | {}/{}: navegar",
            format_keys(&shortcuts.documentos.quit),
            format_keys(&shortcuts.documentos.refresh),
            format_keys(&shortcuts.documentos.settings),
            format_keys(&shortcuts.documentos.open),
            format_keys(&shortcuts.documentos.up),
            format_keys(&shortcuts.documentos.down),
        ),
        Screen::Settings => format!(
            "{}: backend | {}: diretório | {}: origem | {}: processo | {}: salvar | {}: cancelar",
            format_keys(&shortcuts.settings.base_url),
            format_keys(&shortcuts.settings.input_dir),
            format_keys(&shortcuts.settings.origem),
            format_keys(&shortcuts.settings.tipo_processo),
            format_keys(&shortcuts.settings.save),
            format_keys(&shortcuts.settings.cancel),
        ),
        Screen::DadosXml => format!(
            "{}: prosseguir | {}: descartar",
            format_keys(&shortcuts.dados_xml.proceed),
            format_keys(&shortcuts.dados_xml.back),
        ),
        Screen::DadosPedido => format!(
            "{}: editar campo | {}/{}: campo | {}: validar pedido | {}: cancelar",
            format_keys(&shortcuts.dados_pedido.edit_field),
            format_keys(&shortcuts.dados_pedido.next_field),
            format_keys(&shortcuts.dados_pedido.prev_field),
            format_keys(&shortcuts.dados_pedido.validar),
            format_keys(&shortcuts.dados_pedido.cancel),
        ),
        Screen::Resultado => format!(
            "{}: conferir resultado | {}: recomeçar",
            format_keys(&shortcuts.resultado.consultar),
            format_keys(&shortcuts.resultado.recomecar),
        ),
    }
}

/// Join alternative bindings for display.
fn format_keys(keys: &[String]) -> String {
    keys.join("/")
}

/// Last log lines for the info panels.
fn log_tail(app: &App) -> String {
    app.ui
        .log
        .iter()
        .rev()
        .take(8)
        .rev()
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a value as Brazilian currency ("R$ 1.234,56").
pub fn format_brl(v: f64) -> String {
    let negative = v < 0.0;
    let cents = (v.abs() * 100.0).round() as u64;
    let int = (cents / 100).to_string();
    let frac = cents % 100;

    let mut grouped = String::new();
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{frac:02}")
}

/// Format a backend date (ISO date or datetime) as dd/mm/yyyy.
pub fn format_data(s: &str) -> String {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return dt.format("%d/%m/%Y").to_string();
    }
    if let Ok(d) = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d.format("%d/%m/%Y").to_string();
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brl_groups_thousands_and_pads_cents() {
        assert_eq!(format_brl(0.0), "R$ 0,00");
        assert_eq!(format_brl(150.0), "R$ 150,00");
        assert_eq!(format_brl(1234.5), "R$ 1.234,50");
        assert_eq!(format_brl(1_234_567.89), "R$ 1.234.567,89");
        assert_eq!(format_brl(-42.1), "-R$ 42,10");
    }

    #[test]
    fn data_formats_both_date_shapes() {
        assert_eq!(format_data("2025-03-01"), "01/03/2025");
        assert_eq!(format_data("2025-03-01T10:30:00-03:00"), "01/03/2025");
        // Unknown shapes pass through untouched.
        assert_eq!(format_data("01/03/2025"), "01/03/2025");
    }
}
