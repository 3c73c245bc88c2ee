use iced::widget::canvas::{self, Frame, Geometry, LineDash, Path, Stroke};
use iced::{mouse, Color, Pixels, Point, Radians, Rectangle, Renderer, Theme};
use std::f32::consts::PI;
use sweepcore::math::geometry::{GeometryHelper, PixelOffset};
use sweepcore::processing::FadedPoint;
use sweepcore::{RadarFrame, RenderSurface};

const RANGE_RINGS: usize = 4;
const ANGLE_MARKERS: [f64; 7] = [0.0, 30.0, 60.0, 90.0, 120.0, 150.0, 180.0];
const LABEL_MARGIN: f32 = 28.0;

const PRIMARY: Color = Color::from_rgb(0.2, 1.0, 0.45);
const RADAR_FILL: Color = Color::from_rgb(0.02, 0.08, 0.04);
const GRID_LINE: Color = Color::from_rgba(0.2, 1.0, 0.45, 0.35);
const BACKGROUND: Color = Color::from_rgb(0.02, 0.02, 0.04);

/// Canvas program painting one engine frame.
pub struct RadarScope {
    frame: RadarFrame,
}

impl RadarScope {
    pub fn new(frame: &RadarFrame) -> Self {
        Self {
            frame: frame.clone(),
        }
    }
}

impl<Message> canvas::Program<Message> for RadarScope {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), BACKGROUND);

        let radius = (bounds.width / 2.0).min(bounds.height) - LABEL_MARGIN;
        if radius > 10.0 {
            let center = Point::new(bounds.width / 2.0, bounds.height - LABEL_MARGIN / 2.0);
            let mut surface = CanvasSurface {
                frame: &mut frame,
                center,
            };
            self.frame.paint(f64::from(radius), &mut surface);
        }

        vec![frame.into_geometry()]
    }
}

/// Maps core pixel offsets onto an iced frame, `y` flipped.
struct CanvasSurface<'a> {
    frame: &'a mut Frame,
    center: Point,
}

impl CanvasSurface<'_> {
    fn point(&self, offset: PixelOffset) -> Point {
        Point::new(
            self.center.x + offset.x as f32,
            self.center.y - offset.y as f32,
        )
    }

    fn half_disc(&self, radius: f32) -> Path {
        let center = self.center;
        Path::new(|builder| {
            builder.arc(canvas::path::Arc {
                center,
                radius,
                start_angle: Radians(PI),
                end_angle: Radians(2.0 * PI),
            });
            builder.close();
        })
    }

    fn label(&mut self, content: String, position: Point, color: Color, size: f32) {
        self.frame.fill_text(canvas::Text {
            content,
            position,
            color,
            size: Pixels(size),
            ..canvas::Text::default()
        });
    }
}

impl RenderSurface for CanvasSurface<'_> {
    fn draw_grid(&mut self, radius: f64, max_distance: f64) {
        let radius_px = radius as f32;
        let outline = self.half_disc(radius_px);
        self.frame.fill(&outline, RADAR_FILL);
        self.frame
            .stroke(&outline, Stroke::default().with_width(2.0).with_color(PRIMARY));

        let dashed = Stroke {
            line_dash: LineDash {
                segments: &[5.0, 5.0],
                offset: 0,
            },
            ..Stroke::default().with_width(1.0).with_color(GRID_LINE)
        };
        for ring in 1..=RANGE_RINGS {
            let ring_radius = radius_px * ring as f32 / RANGE_RINGS as f32;
            let arc = self.half_disc(ring_radius);
            self.frame.stroke(&arc, dashed.clone());

            let label = format!("{:.0} cm", max_distance / RANGE_RINGS as f64 * ring as f64);
            let at = Point::new(self.center.x + 4.0, self.center.y - ring_radius + 4.0);
            self.label(label, at, GRID_LINE, 12.0);
        }

        let geometry = GeometryHelper::new(max_distance);
        for angle in ANGLE_MARKERS {
            let rim = self.point(geometry.rim(angle, radius));
            let spoke = Path::line(self.center, rim);
            self.frame.stroke(&spoke, dashed.clone());

            let outside = geometry.rim(angle, radius + 10.0);
            let at = Point::new(
                self.center.x + outside.x as f32 - 10.0,
                self.center.y - outside.y as f32 - 14.0,
            );
            self.label(format!("{:.0}°", angle), at, PRIMARY, 14.0);
        }
    }

    fn draw_sweep(&mut self, tip: PixelOffset, _angle_deg: f64) {
        let line = Path::line(self.center, self.point(tip));
        self.frame.stroke(
            &line,
            Stroke::default()
                .with_width(2.5)
                .with_color(Color { a: 0.9, ..PRIMARY }),
        );
    }

    fn draw_blip(&mut self, position: PixelOffset, blip: &FadedPoint) {
        let alpha = blip.alpha();
        if alpha <= 0.0 {
            return;
        }
        let [r, g, b] = blip.palette.rgb;
        let at = self.point(position);

        let glow = Path::circle(at, blip.glow());
        self.frame.fill(&glow, Color::from_rgba(r, g, b, alpha * 0.3));

        let core = Path::circle(at, 3.0 * blip.intensity as f32);
        self.frame.fill(&core, Color::from_rgba(r, g, b, alpha));
    }
}
