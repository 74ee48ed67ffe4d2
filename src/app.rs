use crate::{
    action::Action,
    components::{
        chart::ChartComponent, prompt::PromptComponent, readings::ReadingsComponent, Component,
    },
    config::AppConfig,
    dashboard::{Dashboard, Effect, LinkStatus, Notice, Severity},
    data::{
        collector::TelemetryClient,
        persist::Persister,
        PollEvent, Poller,
    },
    theme::Theme,
    tui::Tui,
    utils::truncate_left,
};
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;
use tokio::sync::{mpsc, watch};

pub struct App {
    pub should_quit: bool,
    pub tui: Tui,
    pub config: AppConfig,
    pub theme: Theme,
    pub dashboard: Dashboard,
    readings_component: ReadingsComponent,
    chart_component: ChartComponent,
    prompt_component: PromptComponent,
    tick_rate: Duration,
}

impl App {
    pub async fn new(
        tick_rate: Duration,
        config: AppConfig,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let tui = Tui::new()?;
        let theme = Theme::new(config.color_scheme);
        let dashboard = Dashboard::new(config.resolver_url.clone(), config.history_capacity);

        Ok(Self {
            should_quit: false,
            tui,
            config,
            theme,
            dashboard,
            readings_component: ReadingsComponent,
            chart_component: ChartComponent,
            prompt_component: PromptComponent,
            tick_rate,
        })
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let client = TelemetryClient::new(self.config.request_timeout())?;

        // UI -> poller: resolver URL edits. Poller -> UI: one event per cycle.
        let (endpoint_tx, endpoint_rx) = watch::channel(self.dashboard.endpoint.clone());
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<PollEvent>();

        let poller = Poller::new(client, endpoint_rx, self.config.poll_interval()).spawn(event_tx);
        let persister = Persister::new(
            self.config.log_path.clone(),
            self.config.save_interval(),
            poller.latest(),
        )
        .spawn();

        let result = self.event_loop(&mut event_rx, &endpoint_tx).await;

        persister.stop().await;
        poller.stop().await;
        self.tui.exit()?;
        result
    }

    async fn event_loop(
        &mut self,
        event_rx: &mut mpsc::UnboundedReceiver<PollEvent>,
        endpoint_tx: &watch::Sender<String>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            while let Ok(event) = event_rx.try_recv() {
                self.dashboard.apply(event);
            }

            self.draw_frame()?;

            if crossterm::event::poll(self.tick_rate)? {
                match crossterm::event::read()? {
                    CrosstermEvent::Key(key) => {
                        // Ignore key release events to avoid double-handling keys like Esc.
                        if matches!(key.kind, KeyEventKind::Press | KeyEventKind::Repeat) {
                            let prompt_open = self.dashboard.prompt.is_some();
                            if let Some(action) = Self::action_for_key(key, prompt_open) {
                                self.handle_action(action, endpoint_tx);
                            }
                        }
                    }
                    CrosstermEvent::Resize(width, height) => {
                        self.tui.resize(width, height)?;
                    }
                    _ => {}
                }
            } else {
                tokio::task::yield_now().await;
            }

            if self.should_quit {
                break;
            }
        }
        Ok(())
    }

    fn action_for_key(key: KeyEvent, prompt_open: bool) -> Option<Action> {
        let modified = key.modifiers.contains(KeyModifiers::CONTROL)
            || key.modifiers.contains(KeyModifiers::ALT);

        if modified && key.code == KeyCode::Char('c') {
            return Some(Action::Quit);
        }

        if prompt_open {
            return match key.code {
                KeyCode::Esc => Some(Action::CancelInput),
                KeyCode::Enter => Some(Action::ConfirmInput),
                KeyCode::Backspace => Some(Action::InputBackspace),
                KeyCode::Char(c) if !modified => Some(Action::InputChar(c)),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('p') | KeyCode::Char(' ') => Some(Action::TogglePause),
            KeyCode::Char('c') => Some(Action::ClearHistory),
            KeyCode::Right | KeyCode::Down | KeyCode::Char('n') => Some(Action::NextSeries),
            KeyCode::Left | KeyCode::Up | KeyCode::Char('N') => Some(Action::PreviousSeries),
            KeyCode::Char('e') => Some(Action::StartEditEndpoint),
            KeyCode::Char('x') => Some(Action::StartExport),
            KeyCode::Char('t') => Some(Action::SwitchTheme),
            KeyCode::Char('w') => Some(Action::SaveConfig),
            _ => None,
        }
    }

    fn handle_action(&mut self, action: Action, endpoint_tx: &watch::Sender<String>) {
        match self.dashboard.handle(action) {
            Effect::None => {}
            Effect::Quit => self.should_quit = true,
            Effect::EndpointChanged(url) => {
                tracing::info!("resolver URL changed to {}", url);
                self.config.resolver_url = url.clone();
                endpoint_tx.send_replace(url);
            }
            Effect::SwitchTheme => {
                self.theme = self.theme.next();
                self.config.color_scheme = self.theme.color_scheme;
                self.save_config(false);
            }
            Effect::SaveConfig => self.save_config(true),
        }
    }

    fn save_config(&mut self, announce: bool) {
        match self.config.save() {
            Ok(()) if announce => {
                self.dashboard.notice = Some(Notice {
                    severity: Severity::Info,
                    text: "Configuration saved".to_string(),
                });
            }
            Ok(()) => {}
            Err(err) => {
                tracing::warn!("could not save config: {}", err);
                self.dashboard.notice = Some(Notice {
                    severity: Severity::Error,
                    text: format!("Could not save config: {}", err),
                });
            }
        }
    }

    fn render_top_status_line(
        f: &mut ratatui::Frame,
        area: ratatui::layout::Rect,
        dashboard: &Dashboard,
        theme: &Theme,
    ) {
        use ratatui::{
            style::{Modifier, Style},
            text::{Line, Span},
            widgets::Paragraph,
        };

        let palette = theme.palette;
        let bar = Style::default().bg(palette.surface);
        let current_time = chrono::Local::now().format("%H:%M:%S").to_string();

        let link = match &dashboard.link {
            LinkStatus::Waiting => Span::styled(" waiting ", bar.fg(palette.muted)),
            LinkStatus::Live(at) => Span::styled(
                format!(" live {} ", at.format("%H:%M:%S")),
                bar.fg(palette.ok),
            ),
            LinkStatus::Failing(reason) => Span::styled(
                format!(" error: {} ", truncate_left(reason, 40)),
                bar.fg(palette.error),
            ),
        };

        let mut spans = vec![
            Span::styled(
                " POWER MONITOR ",
                Style::default()
                    .fg(palette.surface)
                    .bg(palette.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} ", truncate_left(&dashboard.endpoint, 48)),
                bar.fg(palette.text),
            ),
            link,
            Span::styled(
                format!(" samples:{} ", dashboard.samples_received),
                bar.fg(palette.muted),
            ),
        ];
        if dashboard.paused {
            spans.push(Span::styled(
                " PAUSED ",
                bar.fg(palette.warn).add_modifier(Modifier::BOLD),
            ));
        }
        spans.push(Span::styled(
            format!(" time:{} ", current_time),
            bar.fg(palette.text),
        ));
        spans.push(Span::styled(
            format!(" theme:{} ", theme.name()),
            bar.fg(palette.temperature).add_modifier(Modifier::BOLD),
        ));

        f.render_widget(Paragraph::new(Line::from(spans)).style(bar), area);
    }

    fn render_bottom_keybinds(f: &mut ratatui::Frame, area: ratatui::layout::Rect, theme: &Theme) {
        use ratatui::{
            style::Style,
            text::{Line, Span},
            widgets::Paragraph,
        };

        let palette = theme.palette;
        let keybinds_line = Line::from(vec![
            Span::styled(" [q] quit ", Style::default().fg(palette.error)),
            Span::styled(" [p] pause ", Style::default().fg(palette.warn)),
            Span::styled(" [←/→] series ", Style::default().fg(palette.ok)),
            Span::styled(" [c] clear ", Style::default().fg(palette.current)),
            Span::styled(" [x] export ", Style::default().fg(palette.accent)),
            Span::styled(" [e] endpoint ", Style::default().fg(palette.voltage)),
            Span::styled(" [t] theme ", Style::default().fg(palette.temperature)),
            Span::styled(" [w] save ", Style::default().fg(palette.power)),
        ]);

        let block = Paragraph::new(keybinds_line).style(
            Style::default()
                .fg(palette.text)
                .bg(palette.surface),
        );
        f.render_widget(block, area);
    }

    fn draw_frame(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        use ratatui::layout::{Constraint, Direction, Layout};

        let dashboard = &self.dashboard;
        let theme = &self.theme;
        let readings = &self.readings_component;
        let chart = &self.chart_component;
        let prompt = &self.prompt_component;

        self.tui.draw(|f| {
            let size = f.area();

            let main_chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(1), // Top status line
                    Constraint::Min(0),    // Readings + chart
                    Constraint::Length(1), // Prompt / notice
                    Constraint::Length(1), // Bottom keybinds line
                ])
                .split(size);

            Self::render_top_status_line(f, main_chunks[0], dashboard, theme);

            let middle_chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(36), Constraint::Min(0)])
                .split(main_chunks[1]);

            readings.render_in_area(f, middle_chunks[0], dashboard, theme);
            chart.render_in_area(f, middle_chunks[1], dashboard, theme);
            prompt.render_in_area(f, main_chunks[2], dashboard, theme);

            Self::render_bottom_keybinds(f, main_chunks[3], theme);
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_keys_map_to_commands() {
        assert_eq!(
            App::action_for_key(press(KeyCode::Char('p')), false),
            Some(Action::TogglePause)
        );
        assert_eq!(
            App::action_for_key(press(KeyCode::Right), false),
            Some(Action::NextSeries)
        );
        assert_eq!(
            App::action_for_key(press(KeyCode::Char('x')), false),
            Some(Action::StartExport)
        );
        assert_eq!(App::action_for_key(press(KeyCode::Char('z')), false), None);
    }

    #[test]
    fn test_prompt_captures_text_keys() {
        assert_eq!(
            App::action_for_key(press(KeyCode::Char('q')), true),
            Some(Action::InputChar('q'))
        );
        assert_eq!(
            App::action_for_key(press(KeyCode::Esc), true),
            Some(Action::CancelInput)
        );
        assert_eq!(
            App::action_for_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), true),
            Some(Action::Quit)
        );
    }
}
