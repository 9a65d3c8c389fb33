use arboard::Clipboard;
use huediff_core::ClipboardSource;

/// The system clipboard, if one could be opened
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        let clipboard = Clipboard::new()
            .map_err(|err| tracing::warn!(error = %err, "clipboard unavailable"))
            .ok();
        Self { clipboard }
    }

    pub fn is_available(&self) -> bool {
        self.clipboard.is_some()
    }
}

impl ClipboardSource for SystemClipboard {
    fn read_text(&mut self) -> Option<String> {
        let clipboard = self.clipboard.as_mut()?;
        match clipboard.get_text() {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::debug!(error = %err, "no text on clipboard");
                None
            }
        }
    }
}
