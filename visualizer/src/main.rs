use iced::time::Instant;
use iced::{
    widget::{canvas::Canvas, column, row, scrollable, text, Column, Container},
    window, Alignment, Color, Element, Length, Subscription, Task, Theme,
};
use log::debug;
use radar_view::RadarScope;
use sweepcore::processing::SweepMode;
use sweepcore::wire::RadarRecord;
use sweepcore::{RadarEngine, RadarFrame};
use transport::TransportEvent;

mod radar_view;
mod transport;

fn main() -> iced::Result {
    env_logger::init();
    iced::application(Visualizer::boot, Visualizer::update, Visualizer::view)
        .title(application_title)
        .subscription(application_subscription)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Visualizer) -> String {
    "Radar Scan".into()
}

fn application_subscription(_: &Visualizer) -> Subscription<Message> {
    Subscription::batch([
        window::frames().map(Message::Frame),
        transport::radar_topic().map(Message::Transport),
    ])
}

fn application_theme(_: &Visualizer) -> Theme {
    Theme::Dark
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LinkStatus {
    Connecting,
    Connected,
    Disconnected,
}

impl LinkStatus {
    fn label(self) -> &'static str {
        match self {
            LinkStatus::Connecting => "Connecting...",
            LinkStatus::Connected => "Connected",
            LinkStatus::Disconnected => "Disconnected",
        }
    }

    fn color(self) -> Color {
        match self {
            LinkStatus::Connecting => Color::from_rgb(0.98, 0.8, 0.2),
            LinkStatus::Connected => Color::from_rgb(0.3, 0.85, 0.4),
            LinkStatus::Disconnected => Color::from_rgb(0.95, 0.3, 0.3),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Readout {
    angle: f64,
    distance: f64,
    received_at: Option<Instant>,
}

struct Visualizer {
    engine: RadarEngine,
    epoch: Instant,
    frame: RadarFrame,
    link: LinkStatus,
    readout: Option<Readout>,
    raw_message: String,
}

#[derive(Debug, Clone)]
enum Message {
    Frame(Instant),
    Transport(TransportEvent),
    LatestFetched(Result<RadarRecord, String>),
}

impl Visualizer {
    fn boot() -> (Self, Task<Message>) {
        let mut engine = RadarEngine::default();
        let frame = engine.tick(0.0);
        (
            Visualizer {
                engine,
                epoch: Instant::now(),
                frame,
                link: LinkStatus::Connecting,
                readout: None,
                raw_message: String::new(),
            },
            Task::perform(transport::fetch_latest(), Message::LatestFetched),
        )
    }

    fn millis(&self, at: Instant) -> f64 {
        at.saturating_duration_since(self.epoch).as_secs_f64() * 1000.0
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Frame(at) => {
                let now = state.millis(at);
                state.frame = state.engine.tick(now);
            }
            Message::Transport(TransportEvent::Connecting) => {
                state.link = LinkStatus::Connecting;
            }
            Message::Transport(TransportEvent::Connected) => {
                state.link = LinkStatus::Connected;
            }
            Message::Transport(TransportEvent::Disconnected(_)) => {
                state.link = LinkStatus::Disconnected;
            }
            Message::Transport(TransportEvent::Message(body)) => {
                state.raw_message = pretty_body(&body);
                let received = Instant::now();
                let now = state.millis(received);
                match state.engine.ingest_message(&body, now) {
                    Ok(sample) => {
                        state.readout = Some(Readout {
                            angle: sample.angle,
                            distance: sample.distance,
                            received_at: Some(received),
                        });
                    }
                    Err(err) => debug!("radar message not applied: {}", err),
                }
            }
            Message::LatestFetched(Ok(record)) => {
                if state.readout.is_none() {
                    if let (Some(angle), Some(distance)) = (record.angle, record.distance) {
                        state.readout = Some(Readout {
                            angle,
                            distance,
                            received_at: None,
                        });
                    }
                }
            }
            Message::LatestFetched(Err(err)) => {
                debug!("no previous radar record: {}", err);
            }
        }
        Task::none()
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let scope = Canvas::new(RadarScope::new(&state.frame))
            .width(Length::Fill)
            .height(Length::Fill);

        let (angle, distance, updated) = match state.readout {
            Some(readout) => (
                format!("{:.1}°", readout.angle),
                format!("{:.2} cm", readout.distance),
                readout
                    .received_at
                    .map(|at| format_age(at.elapsed().as_secs_f64()))
                    .unwrap_or_else(|| "before start".into()),
            ),
            None => ("--".into(), "--".into(), "never".into()),
        };

        let raw = if state.raw_message.is_empty() {
            Column::new().push(text("No messages yet").size(12))
        } else {
            Column::new().push(text(state.raw_message.clone()).size(12))
        };

        let panel = column![
            text("Radar Scan").size(26),
            text(state.link.label()).size(16).color(state.link.color()),
            text(format!("Angle: {}", angle)).size(18),
            text(format!("Distance: {}", distance)).size(18),
            text(format!("Last update: {}", updated)).size(14),
            text(format!(
                "Sweep: {:.1}° ({})",
                state.frame.sweep_angle,
                mode_label(state.frame.mode)
            ))
            .size(14),
            text(format!(
                "Blips: {} visible / {} pending",
                state.frame.blips.len(),
                state.frame.pending
            ))
            .size(14),
            text("Last message").size(16),
            Container::new(scrollable(raw).height(Length::Fixed(180.0))).padding(6),
        ]
        .spacing(10)
        .padding(16)
        .width(Length::Fixed(300.0));

        let layout = row![panel, scope]
            .spacing(20)
            .align_y(Alignment::Start)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }
}

fn mode_label(mode: SweepMode) -> &'static str {
    match mode {
        SweepMode::Synchronized => "synchronized",
        SweepMode::Paused => "paused",
        SweepMode::Autonomous => "autonomous",
    }
}

fn format_age(seconds: f64) -> String {
    if seconds < 1.0 {
        "just now".into()
    } else if seconds < 60.0 {
        format!("{:.0} s ago", seconds)
    } else {
        format!("{:.0} min ago", seconds / 60.0)
    }
}

fn pretty_body(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| body.to_string())
}
