use crate::{dashboard::Dashboard, theme::Theme};
use ratatui::{layout::Rect, Frame};

pub mod chart;
pub mod prompt;
pub mod readings;

/// A panel that draws part of the dashboard into the area it is given
pub trait Component {
    fn render_in_area(&self, f: &mut Frame, area: Rect, dashboard: &Dashboard, theme: &Theme);
}
