use ratatui::widgets::canvas::{Canvas, Context, Points};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Line graph drawn with Braille dots, scaled to the samples it is given.
pub struct BrailleGraph<'a> {
    data: &'a [f64],
    style: Style,
    /// Draw a subtle baseline under the trace
    show_baseline: bool,
}

impl<'a> BrailleGraph<'a> {
    pub fn new(data: &'a [f64]) -> Self {
        Self {
            data,
            style: Style::default(),
            show_baseline: true,
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn show_baseline(mut self, show_baseline: bool) -> Self {
        self.show_baseline = show_baseline;
        self
    }

    /// The y range that will be used when rendering.
    pub fn bounds(&self) -> (f64, f64) {
        auto_range(self.data)
    }
}

/// Min/max of the finite samples, padded so a flat line sits mid-height.
pub fn auto_range(data: &[f64]) -> (f64, f64) {
    let mut finite = data.iter().copied().filter(|v| v.is_finite());
    let first = match finite.next() {
        Some(v) => v,
        None => return (0.0, 1.0),
    };
    let (min, max) = finite.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if (max - min).abs() < f64::EPSILON {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.1 };
        (min - pad, max + pad)
    } else {
        let pad = (max - min) * 0.05;
        (min - pad, max + pad)
    }
}

impl<'a> Widget for BrailleGraph<'a> {
    fn render(self, inner_area: Rect, buf: &mut Buffer) {

        if inner_area.width < 2 || inner_area.height < 2 {
            return;
        }

        let (min_val, max_val) = self.bounds();
        let range = max_val - min_val;

        let canvas = Canvas::default()
            .marker(ratatui::symbols::Marker::Braille)
            .background_color(self.style.bg.unwrap_or_default())
            .x_bounds([0.0, (inner_area.width - 1) as f64])
            .y_bounds([0.0, (inner_area.height - 1) as f64])
            .paint(|ctx| {
                let top_y = inner_area.height.saturating_sub(1) as f64;
                let color = self.style.fg.unwrap_or(Color::White);

                if self.show_baseline {
                    let baseline_color = dim_color(color, 0.28);
                    for x in 0..inner_area.width {
                        draw_point(ctx, x as f64, 0.0, baseline_color);
                    }
                }

                if self.data.is_empty() || range <= 0.0 {
                    return;
                }

                let point_count = self.data.len();
                let span = inner_area.width.saturating_sub(1) as f64;
                let mut prev: Option<(f64, f64)> = None;
                for (i, value) in self.data.iter().enumerate() {
                    if !value.is_finite() {
                        prev = None;
                        continue;
                    }
                    let x = if point_count == 1 {
                        0.0
                    } else {
                        i as f64 * span / (point_count - 1) as f64
                    };
                    // canvas y grows upward
                    let y = top_y * ((*value - min_val) / range).clamp(0.0, 1.0);

                    match prev {
                        Some((prev_x, prev_y)) => draw_line(ctx, prev_x, prev_y, x, y, color),
                        None => draw_point(ctx, x, y, color),
                    }
                    prev = Some((x, y));
                }
            });

        canvas.render(inner_area, buf);
    }
}

fn draw_point(ctx: &mut Context<'_>, x: f64, y: f64, color: Color) {
    ctx.draw(&Points {
        coords: &[(x, y)],
        color,
    });
}

fn draw_line(ctx: &mut Context<'_>, x0: f64, y0: f64, x1: f64, y1: f64, color: Color) {
    let dx = x1 - x0;
    let dy = y1 - y0;
    let steps = ((dx.abs().max(dy.abs()) * 2.0).ceil() as usize).max(1);
    for step in 0..=steps {
        let t = step as f64 / steps as f64;
        draw_point(ctx, x0 + dx * t, y0 + dy * t, color);
    }
}

fn dim_color(color: Color, factor: f32) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(
            ((r as f32) * factor).clamp(0.0, 255.0) as u8,
            ((g as f32) * factor).clamp(0.0, 255.0) as u8,
            ((b as f32) * factor).clamp(0.0, 255.0) as u8,
        ),
        Color::White => Color::Gray,
        _ => Color::DarkGray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_range_pads_data() {
        let (lo, hi) = auto_range(&[10.0, 20.0, 15.0]);
        assert!(lo < 10.0 && lo > 9.0);
        assert!(hi > 20.0 && hi < 21.0);
    }

    #[test]
    fn test_auto_range_flat_and_empty() {
        assert_eq!(auto_range(&[]), (0.0, 1.0));
        assert_eq!(auto_range(&[0.0, 0.0]), (-1.0, 1.0));
        let (lo, hi) = auto_range(&[12.0, 12.0]);
        assert!(lo < 12.0 && hi > 12.0);
        assert_eq!(auto_range(&[f64::NAN, 3.0, 5.0]).0, 3.0 - 0.1);
    }

    #[test]
    fn test_renders_without_panicking_in_tiny_area() {
        let data = vec![1.0, 5.0, 3.0];
        let area = Rect::new(0, 0, 1, 1);
        let mut buf = Buffer::empty(area);
        BrailleGraph::new(&data).render(area, &mut buf);

        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);
        BrailleGraph::new(&data).render(area, &mut buf);
        let drawn = buf.content().iter().filter(|cell| cell.symbol() != " ").count();
        assert!(drawn > 0);
    }
}
