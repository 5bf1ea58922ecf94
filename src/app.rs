use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::animator::{AnimationStatus, WheelAnimator};
use crate::assets::AssetStore;
use crate::duration::SpinDuration;
use crate::engine::{SpinEngine, SpinObserver, SpinRequest};
use crate::envelope::EnvelopePresenter;
use crate::error::WheelError;
use crate::rng::UniformSource;
use crate::wheel::Category;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Wheel,
    LevelMenu,
    EditingDuration,
    /// Blocking message; any key dismisses it
    Prompt,
}

/// Sounds the host may play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Click,
    Spin,
    Win,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Startup settings, merged from CLI and config file
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub duration_input: String,
    pub level: Option<Category>,
    pub image_extension: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            duration_input: "4".to_string(),
            level: None,
            image_extension: crate::assets::DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Routes spin notifications into the envelope panel
struct EnvelopeBinding<'a, R: UniformSource, S: AssetStore> {
    presenter: &'a mut EnvelopePresenter<R, S>,
    category: Option<Category>,
    last_result: &'a mut Option<u8>,
    cues: &'a mut Vec<Cue>,
}

impl<R: UniformSource, S: AssetStore> SpinObserver for EnvelopeBinding<'_, R, S> {
    fn on_intermediate_number(&mut self, value: u8) {
        self.presenter.show_number(Some(value));
        self.presenter.present(self.category, false);
    }

    fn on_landed(&mut self, value: u8) {
        *self.last_result = Some(value);
        self.presenter.show_number(Some(value));
        self.presenter.present(self.category, true);
        self.cues.push(Cue::Win);
    }
}

/// The whole application: wheel, envelope, level menu and duration input
pub struct App<R: UniformSource, S: AssetStore> {
    pub engine: SpinEngine<R>,
    pub presenter: EnvelopePresenter<R, S>,
    pub animator: WheelAnimator,
    pub state: AppState,
    pub duration_input: String,
    pub duration_draft: String,
    pub menu_cursor: usize,
    pub last_result: Option<u8>,
    pub prompt: Option<String>,
    pub image_extension: String,
    cues: Vec<Cue>,
}

impl<R: UniformSource, S: AssetStore> App<R, S> {
    pub fn new(engine_rng: R, presenter_rng: R, store: S, settings: Settings) -> Self {
        let mut engine = SpinEngine::new(engine_rng);
        if let Some(level) = settings.level {
            engine.on_category_selected(level);
        }
        let mut presenter = EnvelopePresenter::with_extension(
            presenter_rng,
            store,
            settings.image_extension.as_str(),
        );
        presenter.show_number(None);
        presenter.present(None, false);

        Self {
            menu_cursor: settings.level.map(Category::position).unwrap_or(0),
            engine,
            presenter,
            animator: WheelAnimator::new(),
            state: AppState::Wheel,
            duration_draft: settings.duration_input.clone(),
            duration_input: settings.duration_input,
            last_result: None,
            prompt: None,
            image_extension: settings.image_extension,
            cues: Vec::new(),
        }
    }

    pub fn effective_duration(&self) -> SpinDuration {
        SpinDuration::parse(&self.duration_input)
    }

    /// Sounds queued since the last call
    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    pub fn select_level(&mut self, category: Category) {
        self.engine.on_category_selected(category);
        self.menu_cursor = category.position();
        self.cues.push(Cue::Click);
        if self.state == AppState::LevelMenu {
            self.state = AppState::Wheel;
        }
    }

    pub fn spin(&mut self, now: Duration) -> Result<SpinRequest, WheelError> {
        let duration = self.effective_duration();
        let outcome = self
            .engine
            .request_spin(now, duration, &mut self.animator, None);
        match &outcome {
            Ok(SpinRequest::Accepted(_)) => self.cues.push(Cue::Spin),
            Ok(SpinRequest::Ignored) => {}
            Err(e @ WheelError::NoCategorySelected) => {
                self.prompt = Some(e.to_string());
                self.state = AppState::Prompt;
            }
            Err(e) => warn!(error = %e, "spin refused"),
        }
        outcome
    }

    /// Advance everything that animates to `now`
    pub fn on_frame(&mut self, now: Duration) {
        let status = self.animator.advance(now);
        let mut binding = EnvelopeBinding {
            presenter: &mut self.presenter,
            category: self.engine.category(),
            last_result: &mut self.last_result,
            cues: &mut self.cues,
        };

        self.engine.on_frame(now, &mut binding);
        if status == AnimationStatus::Completed {
            self.engine.on_animation_complete(&mut binding);
        }
        self.presenter.poll();
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Duration) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match self.state {
            AppState::Prompt => {
                self.prompt = None;
                self.state = AppState::Wheel;
            }
            AppState::Wheel => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return Flow::Quit,
                KeyCode::Char('g') | KeyCode::Char('G') | KeyCode::Char(' ') | KeyCode::Enter => {
                    self.cues.push(Cue::Click);
                    // refusals are surfaced through the prompt
                    let _ = self.spin(now);
                }
                KeyCode::Char('l') => {
                    self.cues.push(Cue::Click);
                    self.state = AppState::LevelMenu;
                }
                KeyCode::Char('d') => {
                    self.duration_draft = self.duration_input.clone();
                    self.state = AppState::EditingDuration;
                }
                _ => {}
            },
            AppState::LevelMenu => match key.code {
                KeyCode::Esc | KeyCode::Char('l') => {
                    self.cues.push(Cue::Click);
                    self.state = AppState::Wheel;
                }
                KeyCode::Up => {
                    self.menu_cursor = self.menu_cursor.saturating_sub(1);
                }
                KeyCode::Down => {
                    self.menu_cursor = (self.menu_cursor + 1).min(Category::ALL.len() - 1);
                }
                KeyCode::Enter => {
                    self.select_level(Category::ALL[self.menu_cursor]);
                }
                KeyCode::Char(c @ '1'..='8') => {
                    let idx = c as usize - '1' as usize;
                    self.select_level(Category::ALL[idx]);
                }
                _ => {}
            },
            AppState::EditingDuration => match key.code {
                KeyCode::Esc => {
                    self.state = AppState::Wheel;
                }
                KeyCode::Enter => {
                    self.duration_input = std::mem::take(&mut self.duration_draft);
                    debug!(
                        input = %self.duration_input,
                        effective = self.effective_duration().as_secs_f64(),
                        "duration updated"
                    );
                    self.state = AppState::Wheel;
                }
                KeyCode::Backspace => {
                    self.duration_draft.pop();
                }
                KeyCode::Char(c) if self.duration_draft.len() < 16 => {
                    self.duration_draft.push(c);
                }
                _ => {}
            },
        }
        Flow::Continue
    }
}
