use crate::action::Action;
use crate::data::history::HistoryStore;
use crate::data::metrics;
use crate::data::persist::{export_history, ExportOutcome};
use crate::data::snapshot::{Channel, Readings};
use crate::data::PollEvent;
use crate::utils::default_export_name;
use chrono::{DateTime, Local};
use std::path::Path;

/// Free-text prompt currently open at the bottom of the screen
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Endpoint(String),
    ExportPath(String),
}

impl Prompt {
    pub fn buffer(&self) -> &str {
        match self {
            Prompt::Endpoint(text) | Prompt::ExportPath(text) => text,
        }
    }

    fn buffer_mut(&mut self) -> &mut String {
        match self {
            Prompt::Endpoint(text) | Prompt::ExportPath(text) => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

/// Outcome of the most recent poll cycle, as seen by the display
#[derive(Debug, Clone, PartialEq)]
pub enum LinkStatus {
    Waiting,
    Live(DateTime<Local>),
    Failing(String),
}

/// Things the dashboard cannot do by itself and hands back to the app.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    EndpointChanged(String),
    SwitchTheme,
    SaveConfig,
}

/// Everything the panels render, and the consumer side of the poll channel.
pub struct Dashboard {
    pub history: HistoryStore,
    pub current: Option<Readings>,
    pub selected: Channel,
    pub paused: bool,
    pub endpoint: String,
    pub prompt: Option<Prompt>,
    pub notice: Option<Notice>,
    pub link: LinkStatus,
    pub samples_received: u64,
}

impl Dashboard {
    pub fn new(endpoint: String, history_capacity: usize) -> Self {
        Self {
            history: HistoryStore::with_capacity(history_capacity),
            current: None,
            selected: Channel::PTotal,
            paused: false,
            endpoint,
            prompt: None,
            notice: None,
            link: LinkStatus::Waiting,
            samples_received: 0,
        }
    }

    /// Consume one poller event. Returns true when the displayed values moved.
    pub fn apply(&mut self, event: PollEvent) -> bool {
        match event {
            PollEvent::Snapshot(snapshot) => {
                self.link = LinkStatus::Live(snapshot.received_at());
                if self.paused {
                    return false;
                }
                let readings = metrics::readings(&snapshot);
                self.history.record(&readings);
                self.current = Some(readings);
                self.samples_received += 1;
                true
            }
            PollEvent::Failed(reason) => {
                self.link = LinkStatus::Failing(reason);
                false
            }
        }
    }

    pub fn selected_value(&self) -> Option<f64> {
        self.current.as_ref().map(|r| r.get(self.selected))
    }

    pub fn selected_series(&self) -> Vec<f64> {
        self.history
            .series(self.selected)
            .map(|series| series.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn handle(&mut self, action: Action) -> Effect {
        match action {
            Action::Quit => return Effect::Quit,
            Action::TogglePause => {
                self.paused = !self.paused;
                let text = if self.paused {
                    "Display paused; polling continues"
                } else {
                    "Display resumed"
                };
                self.notice = Some(Notice::new(Severity::Info, text));
            }
            Action::ClearHistory => {
                self.history.clear();
                self.notice = Some(Notice::new(Severity::Info, "History cleared"));
            }
            Action::NextSeries => self.selected = self.selected.next(),
            Action::PreviousSeries => self.selected = self.selected.previous(),
            Action::StartEditEndpoint => {
                self.prompt = Some(Prompt::Endpoint(self.endpoint.clone()));
            }
            Action::StartExport => {
                if self.history.is_empty() {
                    self.notice = Some(Notice::new(Severity::Warning, "No graph data to export"));
                } else {
                    self.prompt = Some(Prompt::ExportPath(default_export_name(Local::now())));
                }
            }
            Action::InputChar(c) => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.buffer_mut().push(c);
                }
            }
            Action::InputBackspace => {
                if let Some(prompt) = self.prompt.as_mut() {
                    prompt.buffer_mut().pop();
                }
            }
            Action::ConfirmInput => return self.confirm_prompt(),
            Action::CancelInput => self.prompt = None,
            Action::SwitchTheme => return Effect::SwitchTheme,
            Action::SaveConfig => return Effect::SaveConfig,
        }
        Effect::None
    }

    fn confirm_prompt(&mut self) -> Effect {
        match self.prompt.take() {
            Some(Prompt::Endpoint(text)) => {
                let url = text.trim().to_string();
                if url.is_empty() {
                    self.notice = Some(Notice::new(Severity::Warning, "Endpoint left unchanged"));
                    return Effect::None;
                }
                self.endpoint = url.clone();
                self.notice = Some(Notice::new(Severity::Info, "Endpoint applies from the next poll"));
                Effect::EndpointChanged(url)
            }
            Some(Prompt::ExportPath(text)) => {
                let path = text.trim();
                if !path.is_empty() {
                    self.export(Path::new(path));
                }
                Effect::None
            }
            None => Effect::None,
        }
    }

    pub fn export(&mut self, path: &Path) {
        let notice = match export_history(&self.history, path) {
            Ok(ExportOutcome::NothingToExport) => {
                Notice::new(Severity::Warning, "No graph data to export")
            }
            Ok(ExportOutcome::Written { rows }) => {
                tracing::info!("exported {} rows to {}", rows, path.display());
                Notice::new(
                    Severity::Info,
                    format!("Exported {} rows to {}", rows, path.display()),
                )
            }
            Err(err) => {
                tracing::error!("export failed: {}", err);
                Notice::new(Severity::Error, format!("Export failed: {}", err))
            }
        };
        self.notice = Some(notice);
    }
}
