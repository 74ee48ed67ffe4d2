use crate::{
    components::Component, dashboard::Dashboard, theme::Theme, utils::format_reading,
    widgets::braille_graph::BrailleGraph,
};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

pub struct ChartComponent;

impl Component for ChartComponent {
    fn render_in_area(&self, f: &mut Frame, area: Rect, dashboard: &Dashboard, theme: &Theme) {
        let channel = dashboard.selected;
        let color = theme.unit_color(channel.unit());
        let series = dashboard.selected_series();

        let title = format!(
            " {} · {}/{} samples ",
            channel.name(),
            series.len(),
            dashboard.history.capacity()
        );
        let block = Block::default()
            .title(Span::styled(title, theme.title_style()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.border_style());
        f.render_widget(&block, area);
        let inner_area = block.inner(area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(inner_area);

        let selected = match dashboard.selected_value() {
            Some(value) => format_reading(channel, value, 3),
            None => "Selected: ---".to_string(),
        };
        let mut header = vec![Span::styled(
            selected,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )];
        if !series.is_empty() {
            let (lo, hi) = series
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                    (lo.min(*v), hi.max(*v))
                });
            header.push(Span::styled(
                format!("   min {:.3}  max {:.3}", lo, hi),
                Style::default().fg(theme.palette.muted),
            ));
        }
        f.render_widget(Paragraph::new(Line::from(header)), chunks[0]);

        if series.is_empty() {
            f.render_widget(
                Paragraph::new(Span::styled("No history", theme.text_style())),
                chunks[1],
            );
            return;
        }

        let graph = BrailleGraph::new(&series)
            .style(Style::default().fg(color))
            .show_baseline(true);
        f.render_widget(graph, chunks[1]);
    }
}
