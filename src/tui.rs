// src/tui.rs
//
// Terminal dashboard shell. Owns the app state (stores + views), drains
// poll results between frames, and draws the active view. All store and
// widget mutation happens on this loop, so a poll cycle's store update
// and target fan-out can never interleave with another cycle's.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset, GraphType, Paragraph,
    Sparkline, Wrap,
};
use ratatui::Terminal;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::api_client::ApiClient;
use crate::poller::{PollUpdate, PollerSet, Sequencers};
use crate::render::{
    AlertBanner, AmbulancePanel, CongestionBadges, ConfusionMatrixChart, LaneCounters,
    LaneDistributionChart, ModelPerformanceChart, RenderTarget, SignalBoard, StatsPanel,
    VehicleCountChart,
};
use crate::render::VehicleTypeChart;
use crate::router::{View, ViewKind, ViewRouter};
use crate::store::SnapshotStore;
use crate::types::{
    AnalyticsSnapshot, Config, LaneId, LaneSignalState, LightColor, PerLane, PollingConfig,
};

/// Dashboard series palette, shared with the category and lane charts.
const CHART_COLORS: [Color; 5] = [
    Color::Rgb(0, 136, 254),
    Color::Rgb(0, 196, 159),
    Color::Rgb(255, 187, 40),
    Color::Rgb(255, 128, 66),
    Color::Rgb(136, 132, 216),
];

/// How long the update indicator stays lit after a successful apply.
const UPDATE_FLASH: Duration = Duration::from_millis(500);

/// The live signal view and its render targets.
pub struct LiveView {
    client: Arc<ApiClient>,
    polling: PollingConfig,
    seqs: Sequencers,
    tx: mpsc::UnboundedSender<PollUpdate>,
    pub signal_board: SignalBoard,
    pub counters: LaneCounters,
    pub ambulance: AmbulancePanel,
    pollers: Option<PollerSet>,
}

impl LiveView {
    fn new(
        client: Arc<ApiClient>,
        polling: PollingConfig,
        seqs: Sequencers,
        tx: mpsc::UnboundedSender<PollUpdate>,
    ) -> Self {
        Self {
            client,
            polling,
            seqs,
            tx,
            signal_board: SignalBoard::new(),
            counters: LaneCounters::new(),
            ambulance: AmbulancePanel::new(),
            pollers: None,
        }
    }
}

impl View for LiveView {
    fn kind(&self) -> ViewKind {
        ViewKind::Live
    }

    fn mount(&mut self) -> Result<()> {
        self.pollers = Some(PollerSet::spawn_live(
            self.client.clone(),
            &self.polling,
            &self.seqs,
            self.tx.clone(),
        ));
        Ok(())
    }

    fn unmount(&mut self) {
        if let Some(mut pollers) = self.pollers.take() {
            pollers.cancel();
        }
    }
}

/// The analytics view and its render targets.
pub struct AnalyticsView {
    client: Arc<ApiClient>,
    polling: PollingConfig,
    seqs: Sequencers,
    tx: mpsc::UnboundedSender<PollUpdate>,
    pub vehicle_count: VehicleCountChart,
    pub performance: ModelPerformanceChart,
    pub lane_distribution: LaneDistributionChart,
    pub vehicle_types: VehicleTypeChart,
    pub confusion: ConfusionMatrixChart,
    pub badges: CongestionBadges,
    pub alert: AlertBanner,
    pub stats: StatsPanel,
    pollers: Option<PollerSet>,
}

impl AnalyticsView {
    fn new(
        client: Arc<ApiClient>,
        polling: PollingConfig,
        seqs: Sequencers,
        tx: mpsc::UnboundedSender<PollUpdate>,
    ) -> Self {
        Self {
            client,
            polling,
            seqs,
            tx,
            vehicle_count: VehicleCountChart::new(),
            performance: ModelPerformanceChart::new(),
            lane_distribution: LaneDistributionChart::new(),
            vehicle_types: VehicleTypeChart::default(),
            confusion: ConfusionMatrixChart::default(),
            badges: CongestionBadges::new(),
            alert: AlertBanner::new(),
            stats: StatsPanel::new(),
            pollers: None,
        }
    }

    /// Fan one accepted snapshot out to every chart. An empty sample
    /// window means the backend has nothing yet; widgets keep their last
    /// good values.
    fn apply_snapshot(&mut self, snapshot: &AnalyticsSnapshot) {
        if snapshot.traffic_data.is_empty() {
            debug!("analytics snapshot carries no samples; leaving charts as-is");
            return;
        }
        self.vehicle_count.apply(snapshot);
        self.performance.apply(snapshot);
        self.lane_distribution.apply(snapshot);
        self.vehicle_types.apply(snapshot);
        self.confusion.apply(snapshot);
        self.badges.apply(snapshot);
        self.alert.apply(snapshot);
        self.stats.apply(snapshot);
    }
}

impl View for AnalyticsView {
    fn kind(&self) -> ViewKind {
        ViewKind::Analytics
    }

    fn mount(&mut self) -> Result<()> {
        self.pollers = Some(PollerSet::spawn_analytics(
            self.client.clone(),
            &self.polling,
            &self.seqs,
            self.tx.clone(),
        ));
        Ok(())
    }

    fn unmount(&mut self) {
        if let Some(mut pollers) = self.pollers.take() {
            pollers.cancel();
        }
    }
}

pub enum AppView {
    Live(LiveView),
    Analytics(AnalyticsView),
}

impl View for AppView {
    fn kind(&self) -> ViewKind {
        match self {
            AppView::Live(v) => v.kind(),
            AppView::Analytics(v) => v.kind(),
        }
    }

    fn mount(&mut self) -> Result<()> {
        match self {
            AppView::Live(v) => v.mount(),
            AppView::Analytics(v) => v.mount(),
        }
    }

    fn unmount(&mut self) {
        match self {
            AppView::Live(v) => v.unmount(),
            AppView::Analytics(v) => v.unmount(),
        }
    }
}

pub struct App {
    client: Arc<ApiClient>,
    seqs: Sequencers,
    router: ViewRouter<AppView>,
    analytics_store: SnapshotStore<AnalyticsSnapshot>,
    states_store: SnapshotStore<PerLane<LaneSignalState>>,
    counts_store: SnapshotStore<PerLane<u32>>,
    ambulance_store: SnapshotStore<PerLane<bool>>,
    rx: mpsc::UnboundedReceiver<PollUpdate>,
    last_update: Option<Instant>,
    last_error: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let client = Arc::new(ApiClient::new(&config.server));
        let seqs = Sequencers::default();
        let (tx, rx) = mpsc::unbounded_channel();

        let router = ViewRouter::new(vec![
            AppView::Live(LiveView::new(
                client.clone(),
                config.polling.clone(),
                seqs.clone(),
                tx.clone(),
            )),
            AppView::Analytics(AnalyticsView::new(
                client.clone(),
                config.polling.clone(),
                seqs.clone(),
                tx,
            )),
        ]);

        Self {
            client,
            seqs,
            router,
            analytics_store: SnapshotStore::new(),
            states_store: SnapshotStore::new(),
            counts_store: SnapshotStore::new(),
            ambulance_store: SnapshotStore::new(),
            rx,
            last_update: None,
            last_error: None,
            should_quit: false,
        }
    }

    /// Activate a view: prime its primary source with one immediate fetch
    /// (the page fetches once on load before its timers start), then swap
    /// lifecycles. A priming or mount failure leaves the current view
    /// untouched.
    pub async fn switch_view(&mut self, kind: ViewKind) -> Result<()> {
        if self.router.active_kind() == Some(kind) {
            return Ok(());
        }
        match kind {
            ViewKind::Analytics => {
                let seq = self.seqs.analytics.next();
                let snapshot = self
                    .client
                    .fetch_analytics()
                    .await
                    .context("analytics priming fetch failed")?;
                self.router.activate(kind)?;
                self.apply_analytics(seq, snapshot);
            }
            ViewKind::Live => {
                let seq = self.seqs.traffic_states.next();
                let states = self
                    .client
                    .fetch_traffic_states()
                    .await
                    .context("live priming fetch failed")?;
                self.router.activate(kind)?;
                self.apply_traffic_states(seq, states);
            }
        }
        self.last_error = None;
        Ok(())
    }

    async fn request_view(&mut self, kind: ViewKind) {
        if let Err(e) = self.switch_view(kind).await {
            error!("failed to activate {} view: {:#}", kind.title(), e);
            self.last_error = Some(format!("{:#}", e));
        }
    }

    fn handle_update(&mut self, update: PollUpdate) {
        match update {
            PollUpdate::Analytics { seq, snapshot } => self.apply_analytics(seq, snapshot),
            PollUpdate::TrafficStates { seq, states } => self.apply_traffic_states(seq, states),
            PollUpdate::VehicleCounts { seq, counts } => self.apply_vehicle_counts(seq, counts),
            PollUpdate::Ambulance { seq, flags } => self.apply_ambulance(seq, flags),
        }
    }

    // Each apply follows the same shape: drop results whose owning view is
    // no longer active, update the store (which rejects stale sequence
    // numbers), and only then let the widgets see the new snapshot.

    fn apply_analytics(&mut self, seq: u64, snapshot: AnalyticsSnapshot) {
        if self.router.active_kind() != Some(ViewKind::Analytics) {
            debug!("discarding analytics result for inactive view");
            return;
        }
        if !self.analytics_store.apply(seq, snapshot) {
            return;
        }
        let mut applied = false;
        if let Some(AppView::Analytics(view)) = self.router.active_view_mut() {
            view.apply_snapshot(self.analytics_store.current());
            applied = true;
        }
        if applied {
            self.last_update = Some(Instant::now());
        }
    }

    fn apply_traffic_states(&mut self, seq: u64, states: PerLane<LaneSignalState>) {
        if self.router.active_kind() != Some(ViewKind::Live) {
            debug!("discarding traffic-state result for inactive view");
            return;
        }
        if !self.states_store.apply(seq, states) {
            return;
        }
        let mut applied = false;
        if let Some(AppView::Live(view)) = self.router.active_view_mut() {
            view.signal_board.apply(self.states_store.current());
            applied = true;
        }
        if applied {
            self.last_update = Some(Instant::now());
        }
    }

    fn apply_vehicle_counts(&mut self, seq: u64, counts: PerLane<u32>) {
        if self.router.active_kind() != Some(ViewKind::Live) {
            debug!("discarding vehicle-count result for inactive view");
            return;
        }
        if !self.counts_store.apply(seq, counts) {
            return;
        }
        let mut applied = false;
        if let Some(AppView::Live(view)) = self.router.active_view_mut() {
            view.counters.apply(self.counts_store.current());
            applied = true;
        }
        if applied {
            self.last_update = Some(Instant::now());
        }
    }

    fn apply_ambulance(&mut self, seq: u64, flags: PerLane<bool>) {
        if self.router.active_kind() != Some(ViewKind::Live) {
            debug!("discarding ambulance result for inactive view");
            return;
        }
        if !self.ambulance_store.apply(seq, flags) {
            return;
        }
        let mut applied = false;
        if let Some(AppView::Live(view)) = self.router.active_view_mut() {
            view.ambulance.apply(self.ambulance_store.current());
            applied = true;
        }
        if applied {
            self.last_update = Some(Instant::now());
        }
    }

    fn flash_active(&self) -> bool {
        self.last_update
            .map(|t| t.elapsed() < UPDATE_FLASH)
            .unwrap_or(false)
    }
}

pub async fn run(config: Config) -> Result<()> {
    let mut app = App::new(&config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));

    if let Err(e) = app.switch_view(ViewKind::Live).await {
        error!("failed to activate live view: {:#}", e);
        app.last_error = Some(format!("{:#}", e));
    }

    let result = run_loop(&mut terminal, &mut app).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Some(view) = app.router.active_view_mut() {
        view.unmount();
    }

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| draw(f, app))?;

        // Apply everything the pollers delivered since the last frame.
        while let Ok(update) = app.rx.try_recv() {
            app.handle_update(update);
        }

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
                        KeyCode::Char('1') | KeyCode::Char('l') => {
                            app.request_view(ViewKind::Live).await;
                        }
                        KeyCode::Char('2') | KeyCode::Char('a') => {
                            app.request_view(ViewKind::Analytics).await;
                        }
                        KeyCode::Tab => {
                            if let Some(next) = app.router.next_kind() {
                                app.request_view(next).await;
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

// ── Drawing ──────────────────────────────────────────────────────────────

fn draw(f: &mut ratatui::Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // header: nav + clock
            Constraint::Min(10),   // active view
            Constraint::Length(1), // footer
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);

    match app.router.active_view() {
        Some(AppView::Live(view)) => draw_live(f, view, chunks[1]),
        Some(AppView::Analytics(view)) => draw_analytics(f, view, chunks[1]),
        None => draw_placeholder(f, app, chunks[1]),
    }

    draw_footer(f, chunks[2]);
}

fn draw_header(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 🚦 Traffic Monitoring ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(12)])
        .split(inner);

    let mut nav: Vec<Span> = Vec::new();
    for kind in app.router.kinds() {
        let active = app.router.active_kind() == Some(kind);
        let style = if active {
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        nav.push(Span::styled(format!(" {} ", kind.title()), style));
        nav.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(nav)), cols[0]);

    let flash = if app.flash_active() {
        Span::styled("● ", Style::default().fg(Color::Green))
    } else {
        Span::styled("● ", Style::default().fg(Color::DarkGray))
    };
    let clock = Span::styled(
        chrono::Local::now().format("%H:%M:%S").to_string(),
        Style::default().fg(Color::White),
    );
    f.render_widget(
        Paragraph::new(Line::from(vec![flash, clock])).alignment(Alignment::Right),
        cols[1],
    );
}

fn draw_footer(f: &mut ratatui::Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("1", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(" live  "),
        Span::styled("2", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(" analytics  "),
        Span::styled("Tab", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(" switch  "),
        Span::styled("q", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
        Span::raw(" quit"),
    ]))
    .style(Style::default().fg(Color::DarkGray));
    f.render_widget(footer, area);
}

fn draw_placeholder(f: &mut ratatui::Frame, app: &App, area: Rect) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No view is active.",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )),
    ];
    if let Some(err) = &app.last_error {
        lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(Span::styled(
        "Press 1 or 2 to retry.",
        Style::default().fg(Color::DarkGray),
    )));
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

// ── Live view ────────────────────────────────────────────────────────────

fn draw_live(f: &mut ratatui::Frame, view: &LiveView, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(rows[0]);

    for (i, lane) in LaneId::ALL.iter().enumerate() {
        draw_lane_card(f, view, *lane, cards[i]);
    }

    draw_live_summary(f, view, rows[1]);
}

fn light_span(board: &SignalBoard, lane: LaneId, color: LightColor, lit: Color) -> Span<'static> {
    let style = if board.is_lit(lane, color) {
        Style::default().fg(lit).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Span::styled("●", style)
}

fn draw_lane_card(f: &mut ratatui::Frame, view: &LiveView, lane: LaneId, area: Rect) {
    let board = &view.signal_board;
    let green = board.is_lit(lane, LightColor::Green);

    let timer_style = if green {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(vec![
            light_span(board, lane, LightColor::Red, Color::Red),
            Span::raw("  "),
            light_span(board, lane, LightColor::Yellow, Color::Yellow),
            Span::raw("  "),
            light_span(board, lane, LightColor::Green, Color::Green),
        ]),
        Line::from(Span::styled(board.timer_text(lane), timer_style)),
        Line::from(vec![
            Span::styled("Vehicles: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                view.counters.count(lane).to_string(),
                Style::default().fg(Color::Yellow),
            ),
        ]),
    ];

    if view.ambulance.is_emergency(lane) {
        lines.push(Line::from(Span::styled(
            "⚠ EMERGENCY",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
        )));
    }

    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(format!(" {} ", lane.label())));
    f.render_widget(card, area);
}

fn draw_live_summary(f: &mut ratatui::Frame, view: &LiveView, area: Rect) {
    let emergency = view.ambulance.emergency_count();
    let text = Line::from(vec![
        Span::styled("Total Vehicles: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            view.counters.total().to_string(),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled("Emergency Lanes: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            emergency.to_string(),
            Style::default()
                .fg(if emergency > 0 { Color::Red } else { Color::Green })
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::styled("Avg Wait: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}s", view.signal_board.max_remaining_red()),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
    ]);
    let summary = Paragraph::new(text)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(" Intersection "));
    f.render_widget(summary, area);
}

// ── Analytics view ───────────────────────────────────────────────────────

fn draw_analytics(f: &mut ratatui::Frame, view: &AnalyticsView, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),      // stat strip
            Constraint::Length(4),      // alert + congestion badges
            Constraint::Percentage(45), // count + lane distribution
            Constraint::Min(8),         // performance + categories
        ])
        .split(area);

    draw_stat_strip(f, view, rows[0]);
    draw_alert_row(f, view, rows[1]);

    let mid = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[2]);
    draw_vehicle_count_chart(f, view, mid[0]);
    draw_lane_distribution(f, view, mid[1]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(rows[3]);
    draw_performance_chart(f, view, bottom[0]);
    draw_vehicle_types(f, view, bottom[1]);
    draw_confusion_matrix(f, view, bottom[2]);
}

fn stat_cell<'a>(label: &'a str, value: String, color: Color) -> Paragraph<'a> {
    Paragraph::new(Line::from(vec![
        Span::styled(label, Style::default().fg(Color::DarkGray)),
        Span::styled(value, Style::default().fg(color).add_modifier(Modifier::BOLD)),
    ]))
    .alignment(Alignment::Center)
}

fn draw_stat_strip(f: &mut ratatui::Frame, view: &AnalyticsView, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Current ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(inner);

    let stats = &view.stats;
    f.render_widget(stat_cell("Count: ", stats.current_count_text(), Color::Yellow), cells[0]);
    f.render_widget(
        stat_cell("Processing: ", stats.processing_time_text().to_string(), Color::Cyan),
        cells[1],
    );
    f.render_widget(stat_cell("Precision: ", stats.precision_text(), Color::Rgb(136, 132, 216)), cells[2]);
    f.render_widget(stat_cell("Recall: ", stats.recall_text(), Color::Rgb(130, 202, 157)), cells[3]);
    f.render_widget(stat_cell("F1: ", stats.f1_text(), Color::Rgb(255, 198, 88)), cells[4]);
}

fn draw_alert_row(f: &mut ratatui::Frame, view: &AnalyticsView, area: Rect) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    // Banner + detection timeline
    let banner_style = if view.alert.has_emergency() {
        Style::default().fg(Color::White).bg(Color::Red).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White).bg(Color::Rgb(0, 128, 64))
    };
    let block = Block::default().borders(Borders::ALL).title(" Emergency Vehicles ");
    let inner = block.inner(cols[0]);
    f.render_widget(block, cols[0]);

    let halves = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);
    f.render_widget(
        Paragraph::new(Span::styled(format!(" {} ", view.alert.message()), banner_style)),
        halves[0],
    );
    f.render_widget(
        Sparkline::default()
            .data(view.alert.timeline())
            .max(1)
            .style(Style::default().fg(Color::Red)),
        halves[1],
    );

    // Congestion badges
    let block = Block::default().borders(Borders::ALL).title(" Congestion ");
    let inner = block.inner(cols[1]);
    f.render_widget(block, cols[1]);

    if view.badges.badges().is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("waiting for data…", Style::default().fg(Color::DarkGray))),
            inner,
        );
        return;
    }
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(inner);
    for (i, badge) in view.badges.badges().iter().enumerate() {
        let text = vec![
            Line::from(Span::styled(
                format!("{}: {}", badge.lane.label(), badge.count),
                Style::default().fg(badge.level.color()).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                badge.level.label(),
                Style::default().fg(badge.level.color()),
            )),
        ];
        f.render_widget(Paragraph::new(text).alignment(Alignment::Center), cells[i]);
    }
}

fn axis_labels(labels: &[String]) -> Vec<Line<'static>> {
    match (labels.first(), labels.last()) {
        (Some(first), Some(last)) if labels.len() > 1 => {
            vec![Line::from(first.clone()), Line::from(last.clone())]
        }
        (Some(first), _) => vec![Line::from(first.clone())],
        _ => Vec::new(),
    }
}

fn draw_vehicle_count_chart(f: &mut ratatui::Frame, view: &AnalyticsView, area: Rect) {
    let chart_state = &view.vehicle_count;
    let points: Vec<(f64, f64)> = chart_state
        .counts()
        .iter()
        .enumerate()
        .map(|(i, c)| (i as f64, *c as f64))
        .collect();
    let (y_lo, y_hi) = chart_state.y_bounds();
    let x_hi = (points.len().saturating_sub(1)).max(1) as f64;

    let datasets = vec![Dataset::default()
        .name("Vehicle Count")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(CHART_COLORS[4]))
        .data(&points)];

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(" Vehicle Count "))
        .x_axis(
            Axis::default()
                .bounds([0.0, x_hi])
                .labels(axis_labels(chart_state.labels()))
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([y_lo, y_hi])
                .labels(vec![
                    Line::from(format!("{:.0}", y_lo)),
                    Line::from(format!("{:.0}", y_hi)),
                ])
                .style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(chart, area);
}

fn draw_lane_distribution(f: &mut ratatui::Frame, view: &AnalyticsView, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Lane Distribution (last 12) ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if view.lane_distribution.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("waiting for data…", Style::default().fg(Color::DarkGray))),
            inner,
        );
        return;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(inner);

    for (i, lane) in LaneId::ALL.iter().enumerate() {
        let series = view.lane_distribution.series(*lane);
        let latest = series.last().copied().unwrap_or(0);
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(12), Constraint::Min(4)])
            .split(rows[i]);
        f.render_widget(
            Paragraph::new(Span::styled(
                format!("{} {:>3}", lane.label(), latest),
                Style::default().fg(CHART_COLORS[i]),
            )),
            cols[0],
        );
        f.render_widget(
            Sparkline::default()
                .data(series)
                .max(100)
                .style(Style::default().fg(CHART_COLORS[i])),
            cols[1],
        );
    }
}

fn waiting_placeholder(f: &mut ratatui::Frame, title: &str, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(title.to_string());
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(Span::styled("waiting for data…", Style::default().fg(Color::DarkGray))),
        inner,
    );
}

fn draw_performance_chart(f: &mut ratatui::Frame, view: &AnalyticsView, area: Rect) {
    let perf = &view.performance;
    if perf.is_empty() {
        waiting_placeholder(f, " Model Performance ", area);
        return;
    }
    let to_points = |values: &[f64]| -> Vec<(f64, f64)> {
        values.iter().enumerate().map(|(i, v)| (i as f64, *v)).collect()
    };
    let precision = to_points(perf.precision());
    let recall = to_points(perf.recall());
    let f1 = to_points(perf.f1());
    let x_hi = (perf.precision().len().saturating_sub(1)).max(1) as f64;
    let (y_lo, y_hi) = ModelPerformanceChart::Y_BOUNDS;

    let datasets = vec![
        Dataset::default()
            .name("Precision")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Rgb(136, 132, 216)))
            .data(&precision),
        Dataset::default()
            .name("Recall")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Rgb(130, 202, 157)))
            .data(&recall),
        Dataset::default()
            .name("F1")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Rgb(255, 198, 88)))
            .data(&f1),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default().borders(Borders::ALL).title(" Model Performance "))
        .x_axis(
            Axis::default()
                .bounds([0.0, x_hi])
                .labels(axis_labels(perf.labels()))
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([y_lo, y_hi])
                .labels(vec![Line::from("80"), Line::from("100")])
                .style(Style::default().fg(Color::DarkGray)),
        );
    f.render_widget(chart, area);
}

fn draw_vehicle_types(f: &mut ratatui::Frame, view: &AnalyticsView, area: Rect) {
    let chart = &view.vehicle_types.0;
    if chart.is_empty() {
        waiting_placeholder(f, " Vehicle Types ", area);
        return;
    }
    let block = Block::default().borders(Borders::ALL).title(" Vehicle Types ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let total = chart.total().max(1);
    let lines: Vec<Line> = chart
        .labels()
        .iter()
        .zip(chart.values())
        .enumerate()
        .map(|(i, (label, value))| {
            let color = CHART_COLORS[i % CHART_COLORS.len()];
            Line::from(vec![
                Span::styled("● ", Style::default().fg(color)),
                Span::styled(format!("{:<12}", label), Style::default().fg(Color::White)),
                Span::styled(
                    format!("{:>4}  {:>3}%", value, value * 100 / total),
                    Style::default().fg(color),
                ),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_confusion_matrix(f: &mut ratatui::Frame, view: &AnalyticsView, area: Rect) {
    let chart = &view.confusion.0;
    if chart.is_empty() {
        waiting_placeholder(f, " Confusion Matrix ", area);
        return;
    }
    let bars: Vec<Bar> = chart
        .labels()
        .iter()
        .zip(chart.values())
        .enumerate()
        .map(|(i, (label, value))| {
            Bar::default()
                .label(Line::from(short_matrix_label(label)))
                .value(*value)
                .style(Style::default().fg(CHART_COLORS[i % CHART_COLORS.len()]))
        })
        .collect();

    let widget = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Confusion Matrix "))
        .direction(Direction::Horizontal)
        .bar_gap(0)
        .bar_width(1)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(widget, area);
}

/// "True Positive" -> "TP" for narrow bar labels.
fn short_matrix_label(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|w| w.chars().next())
        .collect();
    if initials.len() >= 2 {
        initials.to_uppercase()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::default()
    }

    #[tokio::test]
    async fn test_updates_for_inactive_views_are_discarded() {
        // No view has been activated; nothing may touch the stores.
        let mut app = App::new(&test_config());
        app.handle_update(PollUpdate::Analytics {
            seq: 1,
            snapshot: AnalyticsSnapshot::default(),
        });
        app.handle_update(PollUpdate::VehicleCounts {
            seq: 1,
            counts: PerLane::default(),
        });
        assert_eq!(app.analytics_store.last_seq(), None);
        assert_eq!(app.counts_store.last_seq(), None);
        assert!(app.last_update.is_none());
    }

    #[tokio::test]
    async fn test_live_view_mount_and_unmount_toggle_pollers() {
        let config = test_config();
        let client = Arc::new(ApiClient::new(&config.server));
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut view = LiveView::new(client, config.polling.clone(), Sequencers::default(), tx);

        assert!(view.pollers.is_none());
        view.mount().unwrap();
        assert!(view.pollers.is_some());
        view.unmount();
        assert!(view.pollers.is_none());
        // Remount after unmount must work (views are re-mountable).
        view.mount().unwrap();
        assert!(view.pollers.is_some());
        view.unmount();
    }

    #[test]
    fn test_short_matrix_label() {
        assert_eq!(short_matrix_label("True Positive"), "TP");
        assert_eq!(short_matrix_label("False Negative"), "FN");
        assert_eq!(short_matrix_label("TP"), "TP");
    }
}
