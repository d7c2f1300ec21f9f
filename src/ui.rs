pub mod format;

use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget, Wrap},
    Terminal,
};
use unicode_width::UnicodeWidthChar;

use crate::render::{ClockReading, Phase, Renderer, Snapshot, Verdict};
use format::{accuracy_color, format_clock, text_lines};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;

const LEGEND: &str = "(tab/esc) restart / (F1-F3) difficulty / (F4) mode / (ctrl+c) quit";

/// Draws every snapshot straight to the terminal
pub struct TerminalRenderer<B: Backend> {
    terminal: Terminal<B>,
}

impl<B: Backend> TerminalRenderer<B> {
    pub fn new(terminal: Terminal<B>) -> Self {
        Self { terminal }
    }
}

impl<B: Backend> Renderer for TerminalRenderer<B> {
    fn render(&mut self, snapshot: &Snapshot) {
        if let Err(err) = self
            .terminal
            .draw(|f| f.render_widget(snapshot, f.area()))
        {
            tracing::warn!(%err, "failed to draw frame");
        }
    }
}

impl Widget for &Snapshot {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Min(1),    // body
                Constraint::Length(1), // legend
            ])
            .split(area);

        render_header(self, chunks[0], buf);

        match self.phase {
            Phase::Idle | Phase::Active => render_typing(self, chunks[1], buf),
            Phase::Finished => render_results(self, chunks[1], buf),
            Phase::Unavailable => render_unavailable(self, chunks[1], buf),
        }

        Paragraph::new(Span::styled(
            LEGEND,
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
    }
}

fn render_header(snapshot: &Snapshot, area: Rect, buf: &mut Buffer) {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let header = Line::from(vec![
        Span::styled(
            "tapt",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   {} / {}", snapshot.difficulty, snapshot.mode),
            dim,
        ),
        Span::styled(format!("   best {} wpm", snapshot.personal_best), dim),
    ]);
    Paragraph::new(header)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_typing(snapshot: &Snapshot, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let green_bold_style = bold_style.fg(Color::Green);
    let red_bold_style = bold_style.fg(Color::Red);
    let dim_bold_style = bold_style.add_modifier(Modifier::DIM);
    let underlined_dim_bold_style = dim_bold_style.add_modifier(Modifier::UNDERLINED);

    let text_width: usize = snapshot
        .text
        .iter()
        .map(|c| c.width().unwrap_or(0))
        .sum();
    let prompt_lines = text_lines(text_width, area.width);
    let padding = area.height.saturating_sub(prompt_lines + 4) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(padding),
            Constraint::Length(1), // live stats
            Constraint::Length(1),
            Constraint::Length(prompt_lines),
            Constraint::Length(1),
            Constraint::Length(1), // hint / focus banner
            Constraint::Min(0),
        ])
        .split(area);

    let clock = match snapshot.clock {
        ClockReading::Remaining(s) => format!("{} left", format_clock(s)),
        ClockReading::Elapsed(s) => format_clock(s),
    };
    let stats = Line::from(vec![
        Span::styled(format!("{} wpm", snapshot.metrics.wpm), bold_style),
        Span::raw("   "),
        Span::styled(
            format!("{}% acc", snapshot.metrics.accuracy),
            bold_style.fg(accuracy_color(snapshot.metrics.accuracy)),
        ),
        Span::raw("   "),
        Span::styled(clock, dim_bold_style),
    ]);
    Paragraph::new(stats)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let spans = snapshot
        .text
        .iter()
        .zip(snapshot.verdicts.iter())
        .enumerate()
        .map(|(idx, (&expected, verdict))| match verdict {
            Verdict::Correct => Span::styled(expected.to_string(), green_bold_style),
            Verdict::Incorrect => Span::styled(
                match expected {
                    ' ' => "·".to_owned(),
                    c => c.to_string(),
                },
                red_bold_style,
            ),
            Verdict::Unset if idx == snapshot.cursor && snapshot.phase == Phase::Active => {
                Span::styled(expected.to_string(), underlined_dim_bold_style)
            }
            Verdict::Unset => Span::styled(expected.to_string(), dim_bold_style),
        })
        .collect::<Vec<Span>>();

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_lines == 1 {
            // when the prompt is small enough to fit on one line
            // centering the text gives a nice zen feeling
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    let banner = if snapshot.focus_lost {
        Some(Span::styled(
            "focus lost - the timer is still running",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::ITALIC),
        ))
    } else if snapshot.phase == Phase::Idle {
        Some(Span::styled(
            "start typing to begin",
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        ))
    } else {
        None
    };
    if let Some(banner) = banner {
        Paragraph::new(banner)
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }
}

fn render_results(snapshot: &Snapshot, area: Rect, buf: &mut Buffer) {
    let Some(report) = snapshot.report else {
        return;
    };
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{} wpm", report.wpm), bold_style),
            Span::raw("   "),
            Span::styled(
                format!("{}% acc", report.accuracy),
                bold_style.fg(accuracy_color(report.accuracy)),
            ),
        ]),
        Line::from(format!(
            "{} typed   {} errors",
            report.typed_count, report.error_count
        )),
    ];
    if report.is_new_record {
        lines.push(Line::from(Span::styled(
            "new personal best!",
            bold_style.fg(Color::Magenta),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            format!("personal best {} wpm", report.personal_best),
            Style::default().add_modifier(Modifier::DIM),
        )));
    }
    lines.push(Line::from(Span::styled(
        "(tab/esc) try again",
        Style::default().add_modifier(Modifier::ITALIC),
    )));

    let height = lines.len() as u16 + 2;
    let box_area = centered(area, 44, height);
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::bordered().title(" results "))
        .render(box_area, buf);
}

fn render_unavailable(snapshot: &Snapshot, area: Rect, buf: &mut Buffer) {
    let message = snapshot
        .error
        .as_ref()
        .map_or_else(|| "no text available".to_string(), ToString::to_string);
    let lines = vec![
        Line::from(Span::styled(
            message,
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "pick another difficulty or pass a passage file with --passages",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(centered(area, area.width, 2), buf);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
