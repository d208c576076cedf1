use crossterm::event::KeyEvent;

use crate::action::{Action, Direction};
use crate::config::Config;
use crate::event::Event;
use crate::system::collector::Collector;
use crate::system::error::SampleError;
use crate::system::process::ProcessRecord;
use crate::system::snapshot::Frame;
use crate::ui::theme::Theme;

/// Where the refresh loop is between events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Sampling,
    Rendering,
    ShuttingDown,
}

/// The visible page of the process list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardState {
    pub offset: usize,
    pub page_size: usize,
}

impl DashboardState {
    pub fn new(page_size: usize) -> Self {
        Self {
            offset: 0,
            page_size: page_size.max(1),
        }
    }

    /// Moves one page forward if anything lies beyond the current page.
    pub fn page_down(&mut self, len: usize) {
        if self.offset + self.page_size < len {
            self.offset += self.page_size;
        }
    }

    pub fn page_up(&mut self) {
        self.offset = self.offset.saturating_sub(self.page_size);
    }

    /// Pulls the offset back onto the last page after the list shrank.
    pub fn clamp(&mut self, len: usize) {
        if self.offset >= len {
            self.offset = len.saturating_sub(1) / self.page_size * self.page_size;
        }
    }

    /// Index range of the visible rows.
    pub fn visible(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.offset.min(len);
        let end = (self.offset + self.page_size).min(len);
        start..end
    }
}

pub struct App {
    pub state: LoopState,
    pub collector: Collector,
    pub frame: Frame,
    pub view: DashboardState,
    pub theme: Theme,
    pub show_per_core: bool,
}

impl App {
    /// Builds the dashboard and takes the first CPU baseline. Fails only if
    /// the counter source cannot be read at all.
    pub fn new(config: &Config, mut collector: Collector) -> Result<Self, SampleError> {
        collector.prime()?;
        let frame = collector.refresh();

        Ok(App {
            state: LoopState::Idle,
            collector,
            frame,
            view: DashboardState::new(config.general.page_size),
            theme: Theme::from_config(&config.colors.theme),
            show_per_core: config.general.show_per_core,
        })
    }

    pub fn running(&self) -> bool {
        self.state != LoopState::ShuttingDown
    }

    pub fn processes(&self) -> &[ProcessRecord] {
        self.frame.processes.as_deref().unwrap_or_default()
    }

    pub fn visible_processes(&self) -> &[ProcessRecord] {
        let processes = self.processes();
        &processes[self.view.visible(processes.len())]
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        Action::from_key(key)
    }

    /// Advances the state machine by one event and returns the state the
    /// loop should act on: `Rendering` means draw a frame.
    pub fn handle_event(&mut self, event: Event) -> LoopState {
        if !self.running() {
            return self.state;
        }
        self.state = match event {
            Event::Tick => {
                self.refresh_data();
                LoopState::Rendering
            }
            Event::Resize => LoopState::Rendering,
            Event::Key(key) => self.dispatch(self.map_key(key)),
        };
        self.state
    }

    pub fn dispatch(&mut self, action: Action) -> LoopState {
        match action {
            Action::Quit => LoopState::ShuttingDown,
            Action::Scroll(direction) => {
                match direction {
                    Direction::Down => self.view.page_down(self.processes().len()),
                    Direction::Up => self.view.page_up(),
                }
                self.refresh_data();
                LoopState::Rendering
            }
            Action::None => LoopState::Idle,
        }
    }

    pub fn refresh_data(&mut self) {
        self.state = LoopState::Sampling;
        self.frame = self.collector.refresh();
        self.view.clamp(self.processes().len());
    }

    /// Called after a frame has been drawn.
    pub fn rendered(&mut self) {
        if self.state == LoopState::Rendering {
            self.state = LoopState::Idle;
        }
    }
}
