use ratatui::{
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Points},
        Block, Borders,
    },
};

use crate::wheel::{RESULT_SET, SEGMENT_ANGLE, SEGMENT_COUNT};

/// Segment fill colors, in segment order
pub const PALETTE: [Color; SEGMENT_COUNT] = [
    Color::Rgb(0xef, 0x4d, 0x4d),
    Color::Rgb(0xf7, 0xb8, 0x25),
    Color::Rgb(0x56, 0xf5, 0x8d),
    Color::Rgb(0x48, 0xc1, 0xf9),
    Color::Rgb(0xa3, 0x68, 0xf5),
    Color::Rgb(0xe6, 0x52, 0xb7),
    Color::Rgb(0x75, 0xf2, 0x80),
    Color::Rgb(0xdb, 0x4c, 0x4c),
    Color::Rgb(0x8f, 0xb0, 0xff),
    Color::Rgb(0xea, 0xe3, 0x1c),
];

const RIM: f64 = 1.0;
const HUB: f64 = 0.3;
const LABEL_RADIUS: f64 = 0.72;
const BOUNDS: f64 = 1.25;

/// Canvas point for wheel-local angle `local` (degrees clockwise from the
/// pointer at rest) at `radius`, with the wheel turned by `rotation`.
pub fn polar(local: f64, rotation: f64, radius: f64) -> (f64, f64) {
    let theta = (local + rotation).to_radians();
    (radius * theta.sin(), radius * theta.cos())
}

fn segment_fill(index: usize, rotation: f64) -> Vec<(f64, f64)> {
    let start = index as f64 * SEGMENT_ANGLE;
    let mut coords = Vec::new();
    let mut r = HUB + 0.05;
    while r < RIM {
        let steps = (SEGMENT_ANGLE * r * 1.5).ceil() as usize;
        for s in 1..steps {
            let local = start + SEGMENT_ANGLE * s as f64 / steps as f64;
            coords.push(polar(local, rotation, r));
        }
        r += 0.06;
    }
    coords
}

/// Braille rendering of the wheel turned by `rotation` degrees, with a fixed
/// pointer at the top. `aspect` is the area's width/height ratio in canvas
/// units so the wheel stays round.
pub fn dial<'a>(rotation: f64, aspect: f64, spinning: bool) -> Canvas<'a, impl Fn(&mut Context)> {
    let x_half = BOUNDS * aspect.max(0.1);
    let title = if spinning { " spinning… " } else { " wheel " };

    Canvas::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .marker(Marker::Braille)
        .x_bounds([-x_half, x_half])
        .y_bounds([-BOUNDS, BOUNDS])
        .paint(move |ctx| {
            for (i, color) in PALETTE.iter().enumerate() {
                let coords = segment_fill(i, rotation);
                ctx.draw(&Points {
                    coords: &coords,
                    color: *color,
                });
            }
            ctx.layer();

            for i in 0..SEGMENT_COUNT {
                let local = i as f64 * SEGMENT_ANGLE;
                let (x1, y1) = polar(local, rotation, HUB);
                let (x2, y2) = polar(local, rotation, RIM);
                ctx.draw(&CanvasLine::new(x1, y1, x2, y2, Color::White));
            }
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: RIM,
                color: Color::White,
            });
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: HUB,
                color: Color::Gray,
            });

            // pointer
            ctx.draw(&CanvasLine::new(0.0, RIM - 0.05, -0.08, RIM + 0.18, Color::White));
            ctx.draw(&CanvasLine::new(0.0, RIM - 0.05, 0.08, RIM + 0.18, Color::White));
            ctx.draw(&CanvasLine::new(-0.08, RIM + 0.18, 0.08, RIM + 0.18, Color::White));

            for (i, value) in RESULT_SET.iter().enumerate() {
                let center = i as f64 * SEGMENT_ANGLE + SEGMENT_ANGLE / 2.0;
                let (x, y) = polar(center, rotation, LABEL_RADIUS);
                ctx.print(
                    x,
                    y,
                    Span::styled(
                        value.to_string(),
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    ),
                );
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polar_at_rest_points_up() {
        let (x, y) = polar(0.0, 0.0, 1.0);
        assert!(x.abs() < 1e-9);
        assert!((y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn landing_rotation_brings_segment_center_to_pointer() {
        let rotation = -(5.0 * 360.0 + 3.0 * 36.0 + 18.0);
        let (x, y) = polar(3.0 * 36.0 + 18.0, rotation, 1.0);
        assert!(x.abs() < 1e-9);
        assert!((y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn segment_fill_stays_inside_the_rim() {
        for i in 0..SEGMENT_COUNT {
            let coords = segment_fill(i, -123.0);
            assert!(!coords.is_empty());
            for (x, y) in coords {
                let r = (x * x + y * y).sqrt();
                assert!(r > HUB && r < RIM);
            }
        }
    }
}
