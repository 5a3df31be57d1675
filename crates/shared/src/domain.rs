use serde::{Deserialize, Serialize};

/// Output of one recognition engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub latex: String,
    pub elapsed_ms: u64,
    /// Engine-defined extras (scores, timings). Never interpreted by the session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Recognition {
    pub fn new(latex: impl Into<String>) -> Self {
        Self {
            latex: latex.into(),
            elapsed_ms: 0,
            metadata: None,
        }
    }
}

/// Image payload read from the system clipboard as unmultiplied RGBA8 rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardImage {
    pub width: usize,
    pub height: usize,
    pub rgba: Vec<u8>,
}

impl ClipboardImage {
    pub fn is_well_formed(&self) -> bool {
        self.width > 0 && self.height > 0 && self.rgba.len() == self.width * self.height * 4
    }
}
