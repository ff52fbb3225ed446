/// Resolution cycle: present a resolved event, read a choice, apply it.

use std::collections::VecDeque;
use tracing::{debug, info, warn};

use crate::schema::effect::Effect;
use crate::schema::event::{PoolName, ResolvedEvent};
use crate::schema::player::{OnceKey, PlayerState};

/// What the presentation layer is shown for one decision point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventView<'a> {
    pub title: String,
    pub description: &'a str,
    /// `(key, label)` pairs in sorted key order.
    pub options: Vec<(&'a str, &'a str)>,
}

impl<'a> EventView<'a> {
    pub fn new(event: &'a ResolvedEvent) -> Self {
        Self {
            title: event.title(),
            description: &event.description,
            options: event
                .options
                .iter()
                .map(|(key, option)| (key.as_str(), option.text.as_str()))
                .collect(),
        }
    }
}

/// Out-of-band messages for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The choice did not name an option; nothing happened.
    Hesitated,
    OutcomeApplied(Effect),
    /// Authored event has no options. The description is still shown.
    MissingOptions { event_id: String, description: String },
    NoEventsAvailable(PoolName),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Self::Hesitated => "You hesitate, and time slips by...".to_string(),
            Self::OutcomeApplied(_) => "Outcome applied.".to_string(),
            Self::MissingOptions { event_id, .. } => {
                format!("[DEV] Event '{}' has no options; skipping.", event_id)
            }
            Self::NoEventsAvailable(pool) => {
                format!("(No events available for {})", pool.label())
            }
        }
    }
}

/// The presentation collaborator: shows events and returns the player's pick.
///
/// `choose` returns the raw selection, or `None` for empty/aborted input.
/// The engine treats anything that is not an option key as hesitation.
pub trait Presenter {
    fn choose(&mut self, view: &EventView<'_>) -> Option<String>;
    fn notice(&mut self, notice: &Notice);
}

/// How a resolution ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Applied { key: String, effect: Effect },
    Hesitated,
    MissingOptions,
}

/// Present `event`, apply the chosen option's effect to `state`, and record
/// `once_key` if given.
///
/// An event without options is reported and left without effect; its
/// once-flag is not recorded, so fixed content can still fire later.
pub fn resolve<P: Presenter + ?Sized>(
    event: &ResolvedEvent,
    state: &mut PlayerState,
    once_key: Option<OnceKey>,
    presenter: &mut P,
) -> Resolution {
    if event.options.is_empty() {
        warn!(event = %event.id, "event has no options");
        presenter.notice(&Notice::MissingOptions {
            event_id: event.id.clone(),
            description: event.description.clone(),
        });
        return Resolution::MissingOptions;
    }

    let view = EventView::new(event);
    let choice = presenter.choose(&view).unwrap_or_default();
    let choice = choice.trim();

    let resolution = match event.options.get(choice) {
        Some(option) => {
            state.apply_effect(&option.effect);
            debug!(event = %event.id, choice, effect = ?option.effect, "option applied");
            presenter.notice(&Notice::OutcomeApplied(option.effect));
            Resolution::Applied {
                key: choice.to_string(),
                effect: option.effect,
            }
        }
        None => {
            debug!(event = %event.id, choice, "unrecognized choice");
            presenter.notice(&Notice::Hesitated);
            Resolution::Hesitated
        }
    };

    if let Some(key) = once_key {
        info!(%key, "once-flag recorded");
        state.record_once_flag(key);
    }

    resolution
}

/// An owned copy of an [`EventView`], as captured by [`ScriptedPresenter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedView {
    pub title: String,
    pub description: String,
    pub options: Vec<(String, String)>,
}

impl From<&EventView<'_>> for RecordedView {
    fn from(view: &EventView<'_>) -> Self {
        Self {
            title: view.title.clone(),
            description: view.description.to_string(),
            options: view
                .options
                .iter()
                .map(|(key, label)| (key.to_string(), label.to_string()))
                .collect(),
        }
    }
}

/// Headless presenter that answers from a queue and records everything it
/// was shown. Once the queue runs dry every answer is `None`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPresenter {
    answers: VecDeque<String>,
    pub views: Vec<RecordedView>,
    pub notices: Vec<Notice>,
}

impl ScriptedPresenter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            views: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn push_answer(&mut self, answer: impl Into<String>) {
        self.answers.push_back(answer.into());
    }
}

impl Presenter for ScriptedPresenter {
    fn choose(&mut self, view: &EventView<'_>) -> Option<String> {
        self.views.push(RecordedView::from(view));
        self.answers.pop_front()
    }

    fn notice(&mut self, notice: &Notice) {
        self.notices.push(notice.clone());
    }
}
