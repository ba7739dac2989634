use crate::ingest::DataSource;
use crate::load::Dashboard;
use crate::model::UnitBucket;
use crate::scoring::{
    category_leaders, category_rankings, filter_by_min_appointments, matrix_rows,
    next_min_appointments, summary, BucketEntry, MatrixRow, RankedRep, ScoringConfig, Summary,
};
use crate::tui::theme::ThemeColors;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Rankings,
    Leaders,
    Matrix,
}

impl View {
    pub const ALL: [View; 3] = [View::Rankings, View::Leaders, View::Matrix];

    pub fn title(&self) -> &'static str {
        match self {
            View::Rankings => "Overall Rankings",
            View::Leaders => "Category Leaders",
            View::Matrix => "Detailed Analysis",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            View::Rankings => 0,
            View::Leaders => 1,
            View::Matrix => 2,
        }
    }

    fn next(&self) -> View {
        View::ALL[(self.index() + 1) % View::ALL.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    Help,
    ScoreBreakdown,
}

pub struct App {
    pub dashboard: Option<Dashboard>,
    /// Ranked reps passing the minimum-appointments filter
    pub filtered: Vec<RankedRep>,
    pub leaders: Vec<(UnitBucket, Option<BucketEntry>)>,
    pub bucket_tables: Vec<(UnitBucket, Vec<BucketEntry>)>,
    pub matrix: Vec<MatrixRow>,
    pub summary: Option<Summary>,
    pub table_state: ratatui::widgets::TableState,
    pub current_view: View,
    pub selected_bucket: usize,
    pub min_appointments: u32,
    pub input_mode: InputMode,
    pub flash_message: Option<(String, Instant)>,
    pub last_interaction: Instant,
    pub needs_reload: bool,
    pub force_reload: bool,
    pub should_quit: bool,
    pub is_loading: bool,
    pub spinner_frame: usize,
    /// Last load failure, shown while there is no data to display
    pub load_error: Option<String>,
    pub scoring: ScoringConfig,
    pub source: DataSource,
    pub auto_reload: Option<Duration>,
    pub theme: ThemeColors,
}

impl App {
    /// Create an App with no data yet, in loading state.
    /// Used for launching the TUI before the first load finishes.
    pub fn new_loading(
        source: DataSource,
        scoring: ScoringConfig,
        min_appointments: u32,
        auto_reload: Option<Duration>,
        theme: ThemeColors,
    ) -> Self {
        Self {
            dashboard: None,
            filtered: Vec::new(),
            leaders: Vec::new(),
            bucket_tables: Vec::new(),
            matrix: Vec::new(),
            summary: None,
            table_state: ratatui::widgets::TableState::default(),
            current_view: View::Rankings,
            selected_bucket: 0,
            min_appointments,
            input_mode: InputMode::Normal,
            flash_message: None,
            last_interaction: Instant::now(),
            needs_reload: false,
            force_reload: false,
            should_quit: false,
            is_loading: true,
            spinner_frame: 0,
            load_error: None,
            scoring,
            source,
            auto_reload,
            theme,
        }
    }

    /// Install a freshly loaded dashboard and rebuild every view from it
    pub fn update_dashboard(&mut self, dashboard: Dashboard) {
        let rep_count = dashboard.reps.len();
        let rejected = dashboard.rejections.len();
        self.dashboard = Some(dashboard);
        self.load_error = None;
        self.recompute();

        if rejected > 0 {
            self.show_flash(format!(
                "Loaded {} reps ({} rows rejected)",
                rep_count, rejected
            ));
        } else {
            self.show_flash(format!("Loaded {} reps", rep_count));
        }
    }

    /// Record a failed load. Existing data stays on screen.
    pub fn set_load_error(&mut self, msg: String) {
        if self.dashboard.is_none() {
            self.load_error = Some(msg.clone());
        }
        self.show_flash(msg);
    }

    /// Rebuild the derived views after new data or a filter change
    fn recompute(&mut self) {
        let Some(dashboard) = &self.dashboard else {
            return;
        };
        self.filtered = filter_by_min_appointments(&dashboard.ranked, self.min_appointments);
        self.leaders = category_leaders(&dashboard.reps, &self.scoring);
        self.bucket_tables = UnitBucket::ALL
            .into_iter()
            .map(|b| (b, category_rankings(&dashboard.reps, b, &self.scoring)))
            .collect();
        self.matrix = matrix_rows(&dashboard.ranked, &self.scoring);
        self.summary = Some(summary(&dashboard.reps, &dashboard.ranked, &self.scoring));
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.current_len();
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            _ => {}
        }
    }

    /// Number of rows in the table of the current view
    pub fn current_len(&self) -> usize {
        match self.current_view {
            View::Rankings => self.filtered.len(),
            View::Leaders => self.selected_bucket_entries().len(),
            View::Matrix => self.matrix.len(),
        }
    }

    pub fn current_bucket(&self) -> UnitBucket {
        UnitBucket::ALL[self.selected_bucket % UnitBucket::ALL.len()]
    }

    pub fn selected_bucket_entries(&self) -> &[BucketEntry] {
        self.bucket_tables
            .get(self.selected_bucket)
            .map(|(_, entries)| entries.as_slice())
            .unwrap_or(&[])
    }

    pub fn next_row(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i >= len - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.current_len();
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) => {
                if i == 0 {
                    len - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn next_view(&mut self) {
        self.select_view(self.current_view.next());
    }

    pub fn select_view(&mut self, view: View) {
        if self.current_view == view {
            return;
        }
        self.current_view = view;
        self.table_state.select(None);
        self.clamp_selection();
    }

    pub fn next_bucket(&mut self) {
        self.selected_bucket = (self.selected_bucket + 1) % UnitBucket::ALL.len();
        self.table_state.select(None);
        self.clamp_selection();
    }

    pub fn previous_bucket(&mut self) {
        self.selected_bucket = if self.selected_bucket == 0 {
            UnitBucket::ALL.len() - 1
        } else {
            self.selected_bucket - 1
        };
        self.table_state.select(None);
        self.clamp_selection();
    }

    /// Step the minimum-appointments filter to the next preset
    pub fn cycle_min_appointments(&mut self) {
        self.min_appointments = next_min_appointments(self.min_appointments);
        self.recompute();
        self.show_flash(format!(
            "Filter: {}",
            crate::output::min_appts_label(self.min_appointments)
        ));
    }

    /// The ranked rep under the cursor, on views that list overall scores
    pub fn selected_ranked(&self) -> Option<&RankedRep> {
        let idx = self.table_state.selected()?;
        match self.current_view {
            View::Rankings => self.filtered.get(idx),
            View::Matrix => self.dashboard.as_ref()?.ranked.get(idx),
            View::Leaders => None,
        }
    }

    pub fn update_flash(&mut self) {
        if let Some((_, timestamp)) = self.flash_message {
            if timestamp.elapsed().as_secs() >= 3 {
                self.flash_message = None;
            }
        }
    }

    pub fn show_flash(&mut self, msg: String) {
        self.flash_message = Some((msg, Instant::now()));
    }

    /// Request a reload that skips the auto-reload idle checks
    pub fn request_reload(&mut self) {
        self.needs_reload = true;
        self.force_reload = true;
        self.show_flash(format!("Reloading {}...", self.source.label()));
    }

    /// Open the Google Sheet behind the dashboard in the browser
    pub fn open_sheet(&self) -> anyhow::Result<()> {
        match self.source.sheet_url() {
            Some(url) => crate::browser::open_url(url),
            None => anyhow::bail!("Data does not come from a Google Sheet"),
        }
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    pub fn dismiss_help(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn show_score_breakdown(&mut self) {
        if self.selected_ranked().is_some() {
            self.input_mode = InputMode::ScoreBreakdown;
        } else if self.current_view == View::Leaders {
            self.show_flash("Score breakdown is available on rankings and matrix".to_string());
        }
    }

    pub fn dismiss_score_breakdown(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Advance the loading spinner animation frame
    pub fn advance_spinner(&mut self) {
        self.spinner_frame = self.spinner_frame.wrapping_add(1);
    }
}
