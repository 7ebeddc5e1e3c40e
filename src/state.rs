use std::collections::VecDeque;

use crate::charts::{TrendOption, TrendScope};
use crate::context::DashboardContext;
use crate::filter::{FilterSelection, PlayerFilter};
use crate::match_history::{GameMode, MatchId};
use crate::schema::{self, Metric};

/// Initial value and upper bound of the recency control before any clamping.
pub const DEFAULT_RECENCY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Matches,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub selection: FilterSelection,
    pub game_modes: Vec<GameMode>,
    pub player_cursor: usize,
    /// Current maximum of the recency control.
    pub recency_limit: usize,
    /// Scatter variable picker entries.
    pub variables: Vec<(Metric, &'static str)>,
    pub x_metric: Metric,
    pub y_metric: Metric,
    pub box_metrics: [Metric; 2],
    pub trend: TrendOption,
    pub trend_scope: TrendScope,
    pub detail_match: Option<MatchId>,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl AppState {
    pub fn new(ctx: &DashboardContext) -> Self {
        let game_modes = ctx.game_modes();
        let game_mode = game_modes.first().copied().unwrap_or(GameMode::STANDARD);
        let mut selection = FilterSelection::new(game_mode, DEFAULT_RECENCY);
        for id in ctx.roster().ids() {
            selection.players.insert(id.clone(), PlayerFilter::Any);
        }
        let mut state = Self {
            screen: Screen::Dashboard,
            selection,
            game_modes,
            player_cursor: 0,
            recency_limit: DEFAULT_RECENCY,
            variables: schema::numeric_variables(),
            x_metric: Metric::Score,
            y_metric: Metric::Goals,
            box_metrics: [Metric::AvgDistanceToBall, Metric::Score],
            trend: TrendOption::Ols,
            trend_scope: TrendScope::Overall,
            detail_match: None,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        };
        state.sync_recency(ctx);
        state
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }

    /// Re-runs the pipeline and clamps the recency control to the matches the
    /// mode and player filters leave over. Call after every selection change.
    pub fn sync_recency(&mut self, ctx: &DashboardContext) {
        let outcome = ctx.filter(&self.selection);
        self.recency_limit = outcome.recency_max;
        let ceiling = self.recency_limit.max(1);
        if self.selection.recency_count > ceiling {
            self.selection.recency_count = ceiling;
        }
        if self.selection.recency_count == 0 {
            self.selection.recency_count = 1;
        }

        let ids = outcome.match_ids();
        let still_visible = self
            .detail_match
            .as_ref()
            .is_some_and(|id| ids.contains(&id));
        if !still_visible {
            self.detail_match = ids.first().map(|id| (*id).clone());
        }
    }

    pub fn cycle_mode(&mut self, ctx: &DashboardContext) {
        if self.game_modes.is_empty() {
            return;
        }
        let idx = self
            .game_modes
            .iter()
            .position(|m| *m == self.selection.game_mode)
            .map(|i| (i + 1) % self.game_modes.len())
            .unwrap_or(0);
        self.selection.game_mode = self.game_modes[idx];
        self.sync_recency(ctx);
        self.push_log(format!("[INFO] Game mode {}", self.selection.game_mode));
    }

    pub fn player_next(&mut self, ctx: &DashboardContext) {
        let total = ctx.roster().len();
        if total == 0 {
            return;
        }
        self.player_cursor = (self.player_cursor + 1) % total;
    }

    pub fn player_prev(&mut self, ctx: &DashboardContext) {
        let total = ctx.roster().len();
        if total == 0 {
            return;
        }
        self.player_cursor = if self.player_cursor == 0 {
            total - 1
        } else {
            self.player_cursor - 1
        };
    }

    pub fn cycle_player_filter(&mut self, ctx: &DashboardContext) {
        let Some((id, name)) = ctx.roster().players().get(self.player_cursor) else {
            return;
        };
        let next = self.selection.filter_for(id).next();
        self.selection.players.insert(id.clone(), next);
        let msg = format!("[INFO] {name}: {}", next.label());
        self.sync_recency(ctx);
        self.push_log(msg);
    }

    pub fn recency_up(&mut self, step: usize) {
        let ceiling = self.recency_limit.max(1);
        self.selection.recency_count = (self.selection.recency_count + step).min(ceiling);
    }

    pub fn recency_down(&mut self, step: usize) {
        self.selection.recency_count = self.selection.recency_count.saturating_sub(step).max(1);
    }

    pub fn cycle_x(&mut self, forward: bool) {
        self.x_metric = self.step_variable(self.x_metric, forward);
    }

    pub fn cycle_y(&mut self, forward: bool) {
        self.y_metric = self.step_variable(self.y_metric, forward);
    }

    fn step_variable(&self, current: Metric, forward: bool) -> Metric {
        let total = self.variables.len();
        if total == 0 {
            return current;
        }
        let idx = self
            .variables
            .iter()
            .position(|(m, _)| *m == current)
            .unwrap_or(0);
        let next = if forward { (idx + 1) % total } else { (idx + total - 1) % total };
        self.variables[next].0
    }

    pub fn cycle_box_metric(&mut self, slot: usize) {
        if let Some(metric) = self.box_metrics.get_mut(slot) {
            *metric = metric.next();
        }
    }

    pub fn toggle_trend(&mut self) {
        self.trend = match self.trend {
            TrendOption::Ols => TrendOption::None,
            TrendOption::None => TrendOption::Ols,
        };
    }

    pub fn toggle_trend_scope(&mut self) {
        if self.trend == TrendOption::None {
            return;
        }
        self.trend_scope = match self.trend_scope {
            TrendScope::Overall => TrendScope::PerPlayer,
            TrendScope::PerPlayer => TrendScope::Overall,
        };
    }

    /// Moves the scoreboard panel to an older (`forward`) or newer match among
    /// the currently filtered ones.
    pub fn step_detail_match(&mut self, ctx: &DashboardContext, forward: bool) {
        let outcome = ctx.filter(&self.selection);
        let ids = outcome.match_ids();
        if ids.is_empty() {
            self.detail_match = None;
            return;
        }
        let current = self
            .detail_match
            .as_ref()
            .and_then(|cur| ids.iter().position(|id| *id == cur));
        let idx = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1).min(ids.len() - 1),
            (Some(i), false) => i.saturating_sub(1),
        };
        self.detail_match = Some(ids[idx].clone());
    }
}

pub fn trend_label(trend: TrendOption, scope: TrendScope) -> &'static str {
    match (trend, scope) {
        (TrendOption::None, _) => "off",
        (TrendOption::Ols, TrendScope::Overall) => "OLS overall",
        (TrendOption::Ols, TrendScope::PerPlayer) => "OLS per player",
    }
}
