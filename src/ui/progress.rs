use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct ProgressManager {
    mp: MultiProgress,
    bars: Arc<Mutex<HashMap<String, ProgressBar>>>,
}

impl ProgressManager {
    pub fn new() -> Self {
        Self {
            mp: MultiProgress::new(),
            bars: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// A manager that draws nothing, for `--json` and non-interactive runs.
    pub fn hidden() -> Self {
        Self {
            mp: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            bars: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Creates a new bar
    /// - `id`: unique key
    /// - `total`: length in ticks
    /// - `template`: one of [`templates`]
    /// - `message`: initial message
    pub fn create_bar(
        &self,
        id: &str,
        total: u64,
        template: &str,
        message: &str,
    ) -> Result<(), String> {
        let mut bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;

        if bars.contains_key(id) {
            return Err(format!("Progress bar '{}' already exists", id));
        }

        let style = ProgressStyle::default_bar()
            .template(template)
            .map_err(|e| format!("Bad template: {}", e))?
            .progress_chars("█▉▊▋▌▍▎▏ ");
        let pb = self
            .mp
            .add(ProgressBar::new(total));
        pb.set_style(style);
        pb.set_message(message.to_string());

        bars.insert(id.to_string(), pb);
        Ok(())
    }

    pub fn set_position(&self, id: &str, pos: u64) -> Result<(), String> {
        self.with_bar(id, |pb| pb.set_position(pos))
    }

    /// Finishes the bar, leaving it on screen
    pub fn finish(&self, id: &str, message: &str) -> Result<(), String> {
        self.with_bar(id, |pb| pb.finish_with_message(message.to_string()))
    }

    pub fn exists(&self, id: &str) -> bool {
        if let Ok(bars) = self.bars.lock() {
            bars.contains_key(id)
        } else {
            false
        }
    }

    pub fn finish_all(&self) {
        if let Ok(mut bars) = self.bars.lock() {
            for (_, pb) in bars.drain() {
                pb.finish();
            }
        }
    }

    fn with_bar(
        &self,
        id: &str,
        f: impl FnOnce(&ProgressBar),
    ) -> Result<(), String> {
        let bars = self
            .bars
            .lock()
            .map_err(|e| format!("Lock error: {}", e))?;
        if let Some(pb) = bars.get(id) {
            f(pb);
            Ok(())
        } else {
            Err(format!("Progress bar '{}' not found", id))
        }
    }
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

pub mod templates {
    pub const SIMULATION: &str =
        "\u{f048a} SIM  [{bar:30.cyan}] {percent}% ({pos}/{len} ms) {msg}";
}
