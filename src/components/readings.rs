use crate::{
    components::Component,
    dashboard::Dashboard,
    data::snapshot::{Channel, Unit},
    theme::Theme,
    utils::format_reading,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

const HEADLINE: [Channel; 3] = [Channel::VMain, Channel::ITotal, Channel::PTotal];

pub struct ReadingsComponent;

impl ReadingsComponent {
    fn headline_lines(dashboard: &Dashboard, theme: &Theme) -> Vec<Line<'static>> {
        HEADLINE
            .iter()
            .map(|channel| match &dashboard.current {
                Some(readings) => Line::from(Span::styled(
                    format_reading(*channel, readings.get(*channel), 2),
                    Style::default()
                        .fg(theme.unit_color(channel.unit()))
                        .add_modifier(Modifier::BOLD),
                )),
                None => Line::from(Span::styled(
                    format!("{}: --- {}", channel.name(), channel.unit().symbol()),
                    Style::default().fg(theme.palette.muted),
                )),
            })
            .collect()
    }

    fn group_lines(dashboard: &Dashboard, theme: &Theme, unit: Unit) -> Vec<Line<'static>> {
        Channel::ALL
            .iter()
            .filter(|channel| channel.unit() == unit && !HEADLINE.contains(*channel))
            .map(|channel| {
                let marker = if *channel == dashboard.selected { "▶ " } else { "  " };
                let value = dashboard
                    .current
                    .as_ref()
                    .map(|r| format!("{:>10.3}", r.get(*channel)))
                    .unwrap_or_else(|| format!("{:>10}", "---"));
                Line::from(vec![
                    Span::styled(marker, Style::default().fg(theme.palette.accent)),
                    Span::styled(format!("{:<9}", channel.name()), theme.text_style()),
                    Span::styled(value, Style::default().fg(theme.unit_color(unit))),
                    Span::styled(
                        format!(" {}", unit.symbol()),
                        Style::default().fg(theme.palette.muted),
                    ),
                ])
            })
            .collect()
    }
}

impl Component for ReadingsComponent {
    fn render_in_area(&self, f: &mut Frame, area: Rect, dashboard: &Dashboard, theme: &Theme) {
        let block = Block::default()
            .title(Span::styled(" Readings ", theme.title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.border_style())
            .padding(ratatui::widgets::Padding::horizontal(1));
        f.render_widget(&block, area);
        let inner_area = block.inner(area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADLINE.len() as u16 + 1),
                Constraint::Min(0),
            ])
            .split(inner_area);

        f.render_widget(
            Paragraph::new(Self::headline_lines(dashboard, theme)),
            chunks[0],
        );

        let mut lines = Vec::new();
        for unit in [Unit::Volt, Unit::Ampere, Unit::Watt, Unit::Celsius] {
            lines.extend(Self::group_lines(dashboard, theme, unit));
        }
        f.render_widget(Paragraph::new(lines), chunks[1]);
    }
}
