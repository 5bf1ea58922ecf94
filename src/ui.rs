pub mod dial;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
};

use crate::{
    app::{App, AppState},
    assets::{AssetStore, SLOTS_PER_CATEGORY},
    rng::UniformSource,
    wheel::Category,
};

const HORIZONTAL_MARGIN: u16 = 1;
const WHEEL_SHARE: u16 = 60;

impl<R: UniformSource, S: AssetStore> Widget for &App<R, S> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(1), // title
                Constraint::Min(3),    // wheel + envelope
                Constraint::Length(1), // status
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Span::styled(
            "RULETA",
            bold_style.fg(Color::Yellow),
        ))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(WHEEL_SHARE),
                Constraint::Percentage(100 - WHEEL_SHARE),
            ])
            .split(chunks[1]);

        let wheel_area = panels[0];
        // braille cells are twice as tall as wide
        let aspect = if wheel_area.height > 2 {
            (wheel_area.width.saturating_sub(2)) as f64
                / ((wheel_area.height - 2) as f64 * 2.0)
        } else {
            1.0
        };
        dial::dial(
            self.animator.displayed_angle(),
            aspect,
            self.engine.is_spinning(),
        )
        .render(wheel_area, buf);

        render_envelope(self, panels[1], buf);

        let level = self
            .engine
            .category()
            .map(|c| c.to_string())
            .unwrap_or_else(|| "-".to_string());
        let last = self
            .last_result
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        let duration = if self.state == AppState::EditingDuration {
            Span::styled(
                format!("[{}▏]", self.duration_draft),
                bold_style.fg(Color::Cyan),
            )
        } else {
            Span::raw(format!(
                "{}s",
                format_secs(self.effective_duration().as_secs_f64())
            ))
        };
        let status = Paragraph::new(Line::from(vec![
            Span::raw("level: "),
            Span::styled(level, bold_style),
            Span::raw("   last result: "),
            Span::styled(last, bold_style),
            Span::raw("   duration: "),
            duration,
        ]))
        .alignment(Alignment::Center);
        status.render(chunks[2], buf);

        let legend = match self.state {
            AppState::LevelMenu => "↑/↓ move · enter or 1-8 select · (esc) close",
            AppState::EditingDuration => "type seconds · (enter) save · (esc) cancel",
            _ => "(g)ira / (l)evel / (d)uration / (q)uit",
        };
        Paragraph::new(Span::styled(legend, italic_style.patch(dim_style)))
            .alignment(Alignment::Center)
            .render(chunks[3], buf);

        match self.state {
            AppState::LevelMenu => render_level_menu(self, area, buf),
            AppState::Prompt => render_prompt(self.prompt.as_deref().unwrap_or_default(), area, buf),
            _ => {}
        }
    }
}

fn render_envelope<R: UniformSource, S: AssetStore>(app: &App<R, S>, area: Rect, buf: &mut Buffer) {
    let view = app.presenter.view();
    let block = Block::default().borders(Borders::ALL).title(" envelope ");
    let inner = block.inner(area);
    block.render(area, buf);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3), // number
            Constraint::Min(1),    // image
            Constraint::Length(2), // hint
        ])
        .split(inner);

    let number = view
        .number
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-".to_string());
    let number_style = if app.engine.is_spinning() {
        Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    };
    Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(format!("[ {number} ]"), number_style)),
    ])
    .alignment(Alignment::Center)
    .render(rows[1], buf);

    let image_line = match (&view.asset, &view.resolved) {
        (Some(_), Some(resolved)) => Line::from(vec![
            Span::styled("🖼  ", Style::default()),
            Span::raw(resolved.path.display().to_string()),
            Span::styled(format!("  ({} bytes)", resolved.bytes), Style::default().fg(Color::DarkGray)),
        ]),
        (Some(reference), None) => Line::from(Span::styled(
            format!("loading {}", reference.locator().display()),
            Style::default().fg(Color::DarkGray),
        )),
        (None, _) => Line::from(""),
    };
    Paragraph::new(image_line)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(rows[2], buf);

    if view.hint_visible {
        let hint = match app.engine.category() {
            Some(level) => format!(
                "no image: add {level}/0-{}.{} to the assets folder",
                SLOTS_PER_CATEGORY - 1,
                app.image_extension
            ),
            None => "pick a level with (l)".to_string(),
        };
        Paragraph::new(Span::styled(
            hint,
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(rows[3], buf);
    }
}

fn render_level_menu<R: UniformSource, S: AssetStore>(app: &App<R, S>, area: Rect, buf: &mut Buffer) {
    let height = Category::ALL.len() as u16 + 2;
    let popup = centered(area, 24, height);
    Clear.render(popup, buf);

    let active = app.engine.category();
    let lines: Vec<Line> = Category::ALL
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let mut style = Style::default();
            if Some(*c) == active {
                style = style.fg(Color::Green);
            }
            if i == app.menu_cursor {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            Line::from(Span::styled(format!(" {} {}", i + 1, c), style))
        })
        .collect();

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" level "))
        .render(popup, buf);
}

fn render_prompt(message: &str, area: Rect, buf: &mut Buffer) {
    let popup = centered(area, 40, 5);
    Clear.render(popup, buf);
    Paragraph::new(vec![
        Line::from(Span::styled(
            message.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "press any key",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow)),
    )
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .render(popup, buf);
}

/// Rect of at most `width` x `height` centered in `area`
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

/// `4` for whole seconds, `2.5` otherwise
pub fn format_secs(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
            .trim_end_matches('0')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Settings;
    use crate::assets::MemoryAssetStore;
    use crate::rng::ScriptedSource;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::time::Duration;

    fn create_test_app(level: Option<Category>) -> App<ScriptedSource, MemoryAssetStore> {
        App::new(
            ScriptedSource::new(vec![3, 5]),
            ScriptedSource::new(vec![0]),
            MemoryAssetStore::new(),
            Settings {
                level,
                ..Settings::default()
            },
        )
    }

    fn rendered(app: &App<ScriptedSource, MemoryAssetStore>, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_idle_screen_shows_placeholder_and_prompt_to_pick_level() {
        let app = create_test_app(None);
        let text = rendered(&app, 100, 30);
        assert!(text.contains("RULETA"));
        assert!(text.contains("[ - ]"));
        assert!(text.contains("pick a level"));
    }

    #[test]
    fn test_status_shows_level_and_duration() {
        let app = create_test_app(Some(Category::Sexto));
        let text = rendered(&app, 100, 30);
        assert!(text.contains("SEXTO"));
        assert!(text.contains("4s"));
    }

    #[test]
    fn test_level_menu_lists_all_levels() {
        let mut app = create_test_app(None);
        app.state = AppState::LevelMenu;
        let text = rendered(&app, 100, 30);
        for c in Category::ALL {
            assert!(text.contains(&c.to_string()), "missing {c}");
        }
    }

    #[test]
    fn test_prompt_overlay_after_refused_spin() {
        let mut app = create_test_app(None);
        app.on_key(
            KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE),
            Duration::ZERO,
        );
        let text = rendered(&app, 100, 30);
        assert!(text.contains("press any key"));
    }

    #[test]
    fn test_missing_image_hint_after_landing() {
        let mut app = create_test_app(Some(Category::Segundo));
        app.spin(Duration::ZERO).unwrap();
        let mut t = 0;
        while app.engine.is_spinning() && t < 10_000 {
            t += 33;
            app.on_frame(Duration::from_millis(t));
        }
        let text = rendered(&app, 120, 30);
        assert!(text.contains("[ 3 ]"));
        assert!(text.contains("no image"));
    }

    #[test]
    fn test_small_area_does_not_panic() {
        let app = create_test_app(Some(Category::Segundo));
        let area = Rect::new(0, 0, 20, 5);
        let mut buffer = Buffer::empty(area);
        (&app).render(area, &mut buffer);
        assert!(*buffer.area() == area);
    }

    #[test]
    fn test_format_secs() {
        assert_eq!(format_secs(4.0), "4");
        assert_eq!(format_secs(2.5), "2.5");
        assert_eq!(format_secs(0.75), "0.75");
    }

    #[test]
    fn test_centered_is_clamped_to_area() {
        let area = Rect::new(0, 0, 10, 4);
        let r = centered(area, 40, 10);
        assert_eq!(r, area);
    }
}
