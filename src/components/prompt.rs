use crate::{
    components::Component,
    dashboard::{Dashboard, Prompt, Severity},
    theme::Theme,
};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// One line that is either the open prompt or the latest notice.
pub struct PromptComponent;

impl Component for PromptComponent {
    fn render_in_area(&self, f: &mut Frame, area: Rect, dashboard: &Dashboard, theme: &Theme) {
        let line = match (&dashboard.prompt, &dashboard.notice) {
            (Some(prompt), _) => {
                let label = match prompt {
                    Prompt::Endpoint(_) => " Resolver URL: ",
                    Prompt::ExportPath(_) => " Export to: ",
                };
                Line::from(vec![
                    Span::styled(
                        label,
                        Style::default()
                            .fg(theme.palette.accent)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(prompt.buffer().to_string(), theme.text_style()),
                    Span::styled("▏", Style::default().fg(theme.palette.accent)),
                    Span::styled(
                        "  [enter] apply  [esc] cancel",
                        Style::default().fg(theme.palette.muted),
                    ),
                ])
            }
            (None, Some(notice)) => {
                let color = match notice.severity {
                    Severity::Info => theme.palette.ok,
                    Severity::Warning => theme.palette.warn,
                    Severity::Error => theme.palette.error,
                };
                Line::from(Span::styled(
                    format!(" {} ", notice.text),
                    Style::default().fg(color),
                ))
            }
            (None, None) => Line::from(""),
        };

        f.render_widget(Paragraph::new(line), area);
    }
}
