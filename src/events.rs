//! Screen set and the UI state shared with the render layer.

/// Screen currently shown by the TUI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    /// Document picker: ingestion envelopes found in the input directory.
    Documentos,
    /// Settings editor.
    Settings,
    /// Wizard step 1: review of the extracted document.
    DadosXml,
    /// Wizard step 2: order-data form and submit sequence.
    DadosPedido,
    /// Wizard step 3: consulta of the created solicitação.
    Resultado,
}

/// State shared between input handling and drawing.
#[derive(Clone, Debug)]
pub struct UiState {
    /// Current screen.
    pub screen: Screen,
    /// Selected row in the document list.
    pub selected: usize,
    /// Recent log lines for the info panel.
    pub log: Vec<String>,
    /// Status line at the bottom of the screen.
    pub status: String,
    /// Field position on the order-data form.
    pub editing_field_idx: usize,
    /// Error message highlighted in the status bar.
    pub error: Option<String>,
}
