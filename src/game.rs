//! Session controller
//!
//! [`Game`] owns every piece of session state: the current phase, the picked
//! and voted characters, the shared reading timer, the mounted screen and the
//! open dialog. The host drives it with user actions, the alarms it asked to
//! be scheduled and the results of the fetches it requested, and renders the
//! frames it publishes through a [`Tunnel`].
//!
//! Entering a phase always tears the previous screen down first: its dialog
//! is dropped, its fetches are forgotten and its countdown is discarded, so
//! nothing from an old screen can act on the new one.

use enum_map::EnumMap;
use garde::Validate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use web_time::Duration;

use crate::{
    AlarmMessage, SyncMessage,
    constants::{bounds, labels, share, timing},
    debriefing::{DebriefingBoard, share_url},
    discussion::{Discussion, DiscussionScreen},
    modal::{Modal, ModalId, Resolution, Response},
    phase::{Gate, Phase, ReadingTimerEdge},
    reading::ReadingTimer,
    scenario::{
        self, Character, Scenario,
        config::Goal,
        content::{self, ContentTicket, ContentView, Contents, FetchError},
        media::ResourcePath,
    },
    screen::{CharacterCard, Frame, InfoHeading, Screen, SessionFault, TabView},
    session::Tunnel,
    splash::{Splash, SplashOutcome},
    timer::{self, Clock, TickOutcome, TimerView, format_time},
    voting::Ballot,
};

/// Validation result type for option validation
type ValidationResult = garde::Result;

/// Validates that a duration falls within specified bounds, in seconds
fn validate_duration<const MIN_SECONDS: u64, const MAX_SECONDS: u64>(
    val: &Duration,
    _ctx: &(),
) -> ValidationResult {
    if (MIN_SECONDS..=MAX_SECONDS).contains(&val.as_secs()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!(
            "outside of bounds [{MIN_SECONDS},{MAX_SECONDS}]",
        )))
    }
}

fn validate_discussion_time(val: &EnumMap<Discussion, Duration>) -> ValidationResult {
    val.values().try_for_each(|duration| {
        validate_duration::<{ bounds::MIN_PHASE_TIME }, { bounds::MAX_PHASE_TIME }>(duration, &())
    })
}

/// (De)serializes discussion durations as whole seconds per round
mod seconds_per_round {
    use enum_map::EnumMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use web_time::Duration;

    use crate::discussion::Discussion;

    pub fn serialize<S: Serializer>(
        map: &EnumMap<Discussion, Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        EnumMap::<Discussion, u64>::from_fn(|round| map[round].as_secs()).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<EnumMap<Discussion, Duration>, D::Error> {
        let seconds = EnumMap::<Discussion, u64>::deserialize(deserializer)?;
        Ok(EnumMap::from_fn(|round| Duration::from_secs(seconds[round])))
    }
}

/// Session timings and share settings
///
/// Every field may be omitted when deserializing; missing fields take their
/// default.
#[serde_with::serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Options {
    /// Reading time started on the common information screen
    #[garde(custom(|v, _| validate_duration::<{ bounds::MIN_PHASE_TIME }, { bounds::MAX_PHASE_TIME }>(v, &())))]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    reading_time: Duration,
    /// Extra reading time granted once
    #[garde(custom(|v, _| validate_duration::<{ bounds::MIN_EXTENSION }, { bounds::MAX_EXTENSION }>(v, &())))]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    reading_extension: Duration,
    /// Length of each discussion round
    #[garde(custom(|v, _| validate_discussion_time(v)))]
    #[serde(with = "seconds_per_round")]
    discussion_time: EnumMap<Discussion, Duration>,
    /// Delay before the splash fades out
    #[garde(custom(|v, _| validate_duration::<0, { bounds::MAX_SPLASH }>(v, &())))]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    splash_fade_out: Duration,
    /// Delay before the splash moves on to the title screen
    #[garde(custom(|v, _| validate_duration::<0, { bounds::MAX_SPLASH }>(v, &())))]
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    splash_advance: Duration,
    /// Hashtags added to the share text, without the leading `#`
    #[garde(
        length(max = share::MAX_HASHTAG_COUNT),
        inner(length(chars, min = 1, max = share::MAX_HASHTAG_LENGTH))
    )]
    share_hashtags: Vec<String>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            reading_time: Duration::from_secs(timing::READING_TIME),
            reading_extension: Duration::from_secs(timing::READING_EXTENSION),
            discussion_time: enum_map::enum_map! {
                Discussion::First => Duration::from_secs(timing::FIRST_DISCUSSION),
                Discussion::Second => Duration::from_secs(timing::SECOND_DISCUSSION),
            },
            splash_fade_out: Duration::from_secs(timing::SPLASH_FADE_OUT),
            splash_advance: Duration::from_secs(timing::SPLASH_ADVANCE),
            share_hashtags: share::HASHTAGS.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Errors returned when delivering the scenario document
#[derive(Error, Debug)]
pub enum LoadError {
    /// The host could not fetch the document
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The document could not be parsed or validated
    #[error(transparent)]
    Scenario(#[from] scenario::Error),
    /// A scenario has already been loaded for this session
    #[error("a scenario has already been loaded")]
    AlreadyLoaded,
}

/// User actions sent by the host
///
/// Navigation carries the phase it was issued from, so a repeated click that
/// arrives after the transition is recognised as stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomingMessage {
    /// NEXT pressed on the given phase
    Next(Phase),
    /// BACK pressed on the given phase
    Back(Phase),
    /// A character card was clicked
    PickCharacter(String),
    /// A dialog button or its backdrop was clicked
    Modal {
        /// The dialog being answered
        id: ModalId,
        /// What was clicked
        response: Response,
    },
    /// Start the discussion timer
    StartDiscussion,
    /// Pause or resume the discussion timer
    TogglePause,
    /// End the discussion now
    ForceEnd,
    /// Activate a handout tab
    SelectTab(usize),
    /// Select a suspect on the ballot
    ChooseSuspect(String),
    /// OK pressed on the ballot
    SubmitVote,
    /// Show a piece of debriefing material
    ShowDebriefing(String),
    /// Share the finished session
    Share,
}

/// Session updates sent to the host
#[derive(Debug, Clone, Serialize)]
pub enum UpdateMessage {
    /// A validation notice to show next to the control that caused it
    Notice(String),
    /// Open a link in a new browsing context
    OpenUrl(String),
}

#[derive(Debug, Clone)]
struct CharacterSheet {
    name: String,
    goals: Vec<Goal>,
    map_image: Option<String>,
}

impl From<&Character> for CharacterSheet {
    fn from(character: &Character) -> Self {
        Self {
            name: character.name.clone(),
            goals: character.goals.clone(),
            map_image: character
                .map_image_file
                .as_ref()
                .map(|path| path.as_str().to_owned()),
        }
    }
}

/// The screen currently mounted
#[derive(Debug, Clone)]
enum Mount {
    Splash(Splash),
    Loading,
    Fault(SessionFault),
    Title(String),
    Handout {
        heading: InfoHeading,
        ticket: ContentTicket,
    },
    CharacterSelect(Vec<CharacterCard>),
    Story {
        sheet: CharacterSheet,
        ticket: Option<ContentTicket>,
    },
    Discussion {
        screen: DiscussionScreen,
        sheet: CharacterSheet,
    },
    Voting(Ballot),
    Ending {
        title: String,
        ticket: ContentTicket,
    },
    Debriefing(DebriefingBoard),
}

impl Mount {
    /// Whether the screen takes user input
    fn is_live(&self) -> bool {
        !matches!(self, Mount::Splash(_) | Mount::Loading | Mount::Fault(_))
    }
}

/// Why a phase could not be mounted
#[derive(Debug, Clone, Copy)]
enum Blocked {
    Loading,
    Fault(SessionFault),
}

/// What the open dialog decides
#[derive(Debug, Clone)]
enum Purpose {
    PickCharacter(String),
    ReadingTimeUp,
    DiscussionTimeUp,
    CastVote,
}

#[derive(Debug, Clone)]
struct ActiveModal {
    id: ModalId,
    purpose: Purpose,
    modal: Modal,
}

/// Source of alarm and dialog serials, never reused within a session
#[derive(Debug, Default)]
struct Serials(u64);

impl Serials {
    fn next(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }
}

fn schedule_tick<S: FnMut(AlarmMessage, Duration)>(
    clock: Clock,
    serial: u64,
    schedule_message: &mut S,
) {
    schedule_message(
        timer::AlarmMessage::Tick { clock, serial }.into(),
        Duration::from_secs(timing::TICK),
    );
}

fn send_tick<T: Tunnel>(clock: Clock, timer: TimerView, tunnel: &T) {
    tunnel.send_message(&timer::UpdateMessage::Tick { clock, timer }.into());
}

/// A single facilitation session
#[derive(Debug)]
pub struct Game {
    options: Options,
    scenario: Option<Scenario>,
    phase: Phase,
    selected_character: Option<String>,
    voted_character: Option<String>,
    reading: ReadingTimer,
    edges: EnumMap<Phase, ReadingTimerEdge>,
    mount: Mount,
    modal: Option<ActiveModal>,
    contents: Contents,
    serials: Serials,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Options::default())
    }
}

impl Game {
    /// Creates a session that has not started yet
    pub fn new(options: Options) -> Self {
        Self {
            reading: ReadingTimer::new(
                options.reading_time.as_secs(),
                options.reading_extension.as_secs(),
            ),
            options,
            scenario: None,
            phase: Phase::default(),
            selected_character: None,
            voted_character: None,
            edges: Phase::reading_timer_table(),
            mount: Mount::Loading,
            modal: None,
            contents: Contents::default(),
            serials: Serials::default(),
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The loaded scenario
    pub fn scenario(&self) -> Option<&Scenario> {
        self.scenario.as_ref()
    }

    /// Identifier of the picked character
    pub fn selected_character(&self) -> Option<&str> {
        self.selected_character.as_deref()
    }

    /// Identifier of the character the table voted for
    pub fn voted_character(&self) -> Option<&str> {
        self.voted_character.as_deref()
    }

    /// The shared reading timer
    pub fn reading_timer(&self) -> &ReadingTimer {
        &self.reading
    }

    /// Starts the session on the attention splash
    ///
    /// # Arguments
    ///
    /// * `schedule_message` - Function to schedule delayed messages
    /// * `tunnel` - Channel to the host
    pub fn start<S: FnMut(AlarmMessage, Duration), T: Tunnel>(
        &mut self,
        mut schedule_message: S,
        tunnel: &T,
    ) {
        self.enter(Phase::Attention, &mut schedule_message, tunnel);
    }

    /// Delivers the result of the scenario fetch
    ///
    /// A screen waiting on the scenario is mounted as soon as it arrives.
    ///
    /// # Errors
    ///
    /// * `LoadError::Fetch` - the host could not fetch the document
    /// * `LoadError::Scenario` - the document is malformed or invalid
    /// * `LoadError::AlreadyLoaded` - a scenario is already in use
    pub fn load_scenario<S: FnMut(AlarmMessage, Duration), T: Tunnel>(
        &mut self,
        result: Result<String, FetchError>,
        mut schedule_message: S,
        tunnel: &T,
    ) -> Result<(), LoadError> {
        if self.scenario.is_some() {
            log::warn!("ignoring a second scenario document");
            return Err(LoadError::AlreadyLoaded);
        }
        let scenario = result
            .map_err(LoadError::from)
            .and_then(|text| Ok(Scenario::from_json(&text)?))
            .inspect_err(|e| log::error!("failed to load the scenario: {e}"))?;

        log::info!("loaded scenario `{}`", scenario.title());
        self.scenario = Some(scenario);
        if matches!(self.mount, Mount::Loading) && self.phase.requires_scenario() {
            self.enter(self.phase, &mut schedule_message, tunnel);
        }
        Ok(())
    }

    /// Delivers the result of a text fetch requested by a mounted screen
    ///
    /// Results for screens that have been torn down are dropped.
    pub fn receive_content<T: Tunnel>(
        &mut self,
        ticket: ContentTicket,
        result: Result<String, FetchError>,
        tunnel: &T,
    ) {
        match self.contents.complete(ticket, result) {
            Some(content) => {
                tunnel.send_message(&content::UpdateMessage::Loaded { ticket, content }.into());
            }
            None => log::debug!("dropping content for stale fetch {ticket}"),
        }
    }

    /// Processes a user action
    ///
    /// While a dialog is open only answers to that dialog are accepted.
    ///
    /// # Arguments
    ///
    /// * `message` - The action to process
    /// * `schedule_message` - Function to schedule delayed messages
    /// * `tunnel` - Channel to the host
    pub fn receive_message<S: FnMut(AlarmMessage, Duration), T: Tunnel>(
        &mut self,
        message: IncomingMessage,
        mut schedule_message: S,
        tunnel: &T,
    ) {
        if let IncomingMessage::Modal { id, response } = message {
            self.answer_modal(id, response, &mut schedule_message, tunnel);
            return;
        }
        if let Some(active) = &self.modal {
            log::warn!("ignoring {message:?} while dialog {} is open", active.id);
            return;
        }
        if !self.mount.is_live() {
            log::warn!("ignoring {message:?} on {}", self.phase);
            return;
        }

        match message {
            IncomingMessage::Next(from) => self.advance(from, &mut schedule_message, tunnel),
            IncomingMessage::Back(from) => self.go_back(from, &mut schedule_message, tunnel),
            IncomingMessage::PickCharacter(id) => self.pick_character(&id, tunnel),
            IncomingMessage::StartDiscussion => {
                let serial = self.serials.next();
                let Mount::Discussion { screen, .. } = &mut self.mount else {
                    log::warn!("no discussion to start on {}", self.phase);
                    return;
                };
                if screen.timer.start(serial) {
                    schedule_tick(Clock::Discussion, serial, &mut schedule_message);
                    self.announce(tunnel);
                }
            }
            IncomingMessage::TogglePause => {
                let serial = self.serials.next();
                let Mount::Discussion { screen, .. } = &mut self.mount else {
                    log::warn!("no discussion to pause on {}", self.phase);
                    return;
                };
                if screen.timer.toggle_pause(serial) {
                    schedule_tick(Clock::Discussion, serial, &mut schedule_message);
                }
                self.announce(tunnel);
            }
            IncomingMessage::ForceEnd => {
                let Mount::Discussion { screen, .. } = &mut self.mount else {
                    log::warn!("no discussion to end on {}", self.phase);
                    return;
                };
                if screen.timer.force_end() {
                    log::info!("{} ended early", screen.round.title());
                    self.open_discussion_notice();
                    self.announce(tunnel);
                }
            }
            IncomingMessage::SelectTab(index) => {
                let Mount::Discussion { screen, .. } = &mut self.mount else {
                    log::warn!("no tabs on {}", self.phase);
                    return;
                };
                if screen.tabs.select(index) {
                    self.announce(tunnel);
                }
            }
            IncomingMessage::ChooseSuspect(id) => {
                let Mount::Voting(ballot) = &mut self.mount else {
                    log::warn!("no ballot on {}", self.phase);
                    return;
                };
                match ballot.choose(&id) {
                    Ok(()) => self.announce(tunnel),
                    Err(e) => log::warn!("{e}"),
                }
            }
            IncomingMessage::SubmitVote => self.submit_vote(tunnel),
            IncomingMessage::ShowDebriefing(key) => {
                let Mount::Debriefing(board) = &mut self.mount else {
                    log::warn!("no debriefing on {}", self.phase);
                    return;
                };
                if board.select(&key, &mut self.contents) {
                    self.request_contents(tunnel);
                    self.announce(tunnel);
                }
            }
            IncomingMessage::Share => self.share(tunnel),
            IncomingMessage::Modal { .. } => {}
        }
    }

    /// Processes an alarm previously handed to `schedule_message`
    ///
    /// Alarms belonging to a screen or countdown chain that no longer exists
    /// are ignored.
    pub fn receive_alarm<S: FnMut(AlarmMessage, Duration), T: Tunnel>(
        &mut self,
        alarm: AlarmMessage,
        mut schedule_message: S,
        tunnel: &T,
    ) {
        match alarm {
            AlarmMessage::Splash(alarm) => {
                let Mount::Splash(splash) = &mut self.mount else {
                    log::debug!("splash is gone, ignoring {alarm:?}");
                    return;
                };
                match splash.receive(alarm) {
                    SplashOutcome::Stale => log::debug!("ignoring stale {alarm:?}"),
                    SplashOutcome::FadedOut => self.announce(tunnel),
                    SplashOutcome::Advance => {
                        self.enter(Phase::Start, &mut schedule_message, tunnel);
                    }
                }
            }
            AlarmMessage::Timer(timer::AlarmMessage::Tick {
                clock: Clock::Reading,
                serial,
            }) => self.tick_reading(serial, &mut schedule_message, tunnel),
            AlarmMessage::Timer(timer::AlarmMessage::Tick {
                clock: Clock::Discussion,
                serial,
            }) => self.tick_discussion(serial, &mut schedule_message, tunnel),
        }
    }

    /// Full view of the session
    pub fn frame(&self) -> Frame {
        let screen = match &self.mount {
            Mount::Splash(splash) => Screen::Attention {
                fading_out: splash.is_fading_out(),
            },
            Mount::Loading => Screen::Loading,
            Mount::Fault(fault) => (*fault).into(),
            Mount::Title(title) => Screen::Start {
                title: title.clone(),
            },
            Mount::Handout { heading, ticket } => Screen::Info {
                heading: *heading,
                content: self.contents.view(Some(*ticket)),
                can_go_back: self.phase.back().is_some(),
            },
            Mount::CharacterSelect(cards) => Screen::CharacterSelect {
                characters: cards.clone(),
            },
            Mount::Story { sheet, ticket } => Screen::IndividualStory {
                name: sheet.name.clone(),
                story: ticket.map_or_else(
                    || ContentView::Failed(SessionFault::NoStory.to_string()),
                    |ticket| self.contents.view(Some(ticket)),
                ),
                goals: sheet.goals.clone(),
                map_image: sheet.map_image.clone(),
            },
            Mount::Discussion { screen, sheet } => Screen::Discussion {
                round: screen.round,
                title: screen.round.title().to_owned(),
                goals: sheet.goals.clone(),
                map_image: sheet.map_image.clone(),
                tabs: screen
                    .tabs
                    .items()
                    .iter()
                    .map(|tab| TabView {
                        label: tab.label,
                        ticket: tab.ticket,
                        content: self.contents.view(tab.ticket),
                    })
                    .collect_vec(),
                active_tab: screen.tabs.active(),
                timer: screen.timer.view(),
                controls: screen.timer.controls(),
            },
            Mount::Voting(ballot) => Screen::Voting {
                candidates: ballot.candidates().to_vec(),
                selected: ballot.selected().map(|c| c.id.clone()),
            },
            Mount::Ending { title, ticket } => Screen::Ending {
                title: title.clone(),
                content: self.contents.view(Some(*ticket)),
            },
            Mount::Debriefing(board) => Screen::Debriefing {
                entries: board.entries(),
                active: board.active_key().map(ToOwned::to_owned),
                content: board
                    .active_ticket()
                    .map(|ticket| self.contents.view(Some(ticket))),
            },
        };

        Frame {
            phase: self.phase,
            screen,
            reading_timer: (self.phase.shows_reading_timer() && self.mount.is_live())
                .then(|| self.reading.view()),
            modal: self.modal.as_ref().map(|active| active.modal.view(active.id)),
        }
    }

    fn announce<T: Tunnel>(&self, tunnel: &T) {
        tunnel.send_state(&SyncMessage::Frame(self.frame()));
    }

    fn request_contents<T: Tunnel>(&mut self, tunnel: &T) {
        for request in self.contents.take_requests() {
            tunnel.send_message(&request.into());
        }
    }

    fn enter<S: FnMut(AlarmMessage, Duration), T: Tunnel>(
        &mut self,
        phase: Phase,
        schedule_message: &mut S,
        tunnel: &T,
    ) {
        log::info!("entering {phase}");
        self.phase = phase;
        self.modal = None;
        self.contents.clear();

        self.mount = match self.mount_phase(phase, schedule_message) {
            Ok(mount) => mount,
            Err(Blocked::Loading) => Mount::Loading,
            Err(Blocked::Fault(fault)) => {
                log::error!("cannot show {phase}: {fault}");
                Mount::Fault(fault)
            }
        };

        if self.mount.is_live() {
            let serial = self.serials.next();
            if self.reading.apply(self.edges[phase], serial) {
                schedule_tick(Clock::Reading, serial, schedule_message);
            }
        }

        self.request_contents(tunnel);
        self.announce(tunnel);
    }

    fn mount_phase<S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        phase: Phase,
        schedule_message: &mut S,
    ) -> Result<Mount, Blocked> {
        let scenario = self.scenario.as_ref().ok_or(Blocked::Loading);
        let character = self
            .selected_character
            .as_deref()
            .ok_or(Blocked::Fault(SessionFault::NoCharacterSelected))
            .and_then(|id| {
                scenario?
                    .character(id)
                    .ok_or(Blocked::Fault(SessionFault::CharacterNotFound))
            });

        if phase.requires_scenario() {
            scenario?;
        }
        if phase.requires_character() && self.selected_character.is_none() {
            return Err(Blocked::Fault(SessionFault::NoCharacterSelected));
        }

        let contents = &mut self.contents;
        let handout = |heading, path: &ResourcePath, contents: &mut Contents| Mount::Handout {
            heading,
            ticket: contents.request(path),
        };

        Ok(match phase {
            Phase::Attention => Mount::Splash(Splash::mount(
                self.serials.next(),
                self.options.splash_fade_out,
                self.options.splash_advance,
                &mut *schedule_message,
            )),
            Phase::Start => Mount::Title(scenario?.title().to_owned()),
            Phase::Schedule => handout(InfoHeading::Schedule, scenario?.schedule_file(), contents),
            Phase::Synopsis => handout(InfoHeading::Synopsis, scenario?.synopsis_file(), contents),
            Phase::CommonInfo => handout(InfoHeading::CommonInfo, scenario?.common_info(), contents),
            Phase::Interlude => handout(
                InfoHeading::Interlude,
                scenario?.intermediate_info(),
                contents,
            ),
            Phase::CharacterSelect => Mount::CharacterSelect(
                scenario?
                    .player_characters()
                    .map(|c| CharacterCard {
                        id: c.id.clone(),
                        name: c.name.clone(),
                        profile: c.profile.clone(),
                    })
                    .collect_vec(),
            ),
            Phase::IndividualStory => {
                let character = character?;
                if character.story_file.is_none() {
                    log::warn!("{} has no story", character.id);
                }
                Mount::Story {
                    sheet: character.into(),
                    ticket: character
                        .story_file
                        .as_ref()
                        .map(|story| contents.request(story)),
                }
            }
            Phase::FirstDiscussion | Phase::SecondDiscussion => {
                let character = character?;
                let round = if phase == Phase::FirstDiscussion {
                    Discussion::First
                } else {
                    Discussion::Second
                };
                Mount::Discussion {
                    screen: DiscussionScreen::mount(
                        round,
                        self.options.discussion_time[round].as_secs(),
                        scenario?,
                        character,
                        contents,
                    ),
                    sheet: character.into(),
                }
            }
            Phase::Voting => Mount::Voting(Ballot::new(scenario?)),
            Phase::Ending => {
                let voted = self
                    .voted_character
                    .as_deref()
                    .ok_or(Blocked::Fault(SessionFault::NoVote))?;
                let ending = scenario?.resolve_ending(voted).map_err(|e| {
                    log::error!("{e}");
                    Blocked::Fault(SessionFault::NoMatchingEnding)
                })?;
                Mount::Ending {
                    title: ending.title.clone(),
                    ticket: contents.request(&ending.ending_file),
                }
            }
            Phase::Debriefing => Mount::Debriefing(DebriefingBoard::new(scenario?)),
        })
    }

    fn advance<S: FnMut(AlarmMessage, Duration), T: Tunnel>(
        &mut self,
        from: Phase,
        schedule_message: &mut S,
        tunnel: &T,
    ) {
        if from != self.phase {
            log::debug!("ignoring NEXT from {from}, already on {}", self.phase);
            return;
        }
        if self.phase.gate() != Gate::Button {
            log::warn!("{} cannot be left with NEXT", self.phase);
            return;
        }
        if let Some(next) = self.phase.next() {
            self.enter(next, schedule_message, tunnel);
        }
    }

    fn go_back<S: FnMut(AlarmMessage, Duration), T: Tunnel>(
        &mut self,
        from: Phase,
        schedule_message: &mut S,
        tunnel: &T,
    ) {
        if from != self.phase {
            log::debug!("ignoring BACK from {from}, already on {}", self.phase);
            return;
        }
        match self.phase.back() {
            Some(previous) => self.enter(previous, schedule_message, tunnel),
            None => log::warn!("{} has no way back", self.phase),
        }
    }

    fn open_modal(&mut self, purpose: Purpose, modal: Modal) {
        let id = ModalId(self.serials.next());
        self.modal = Some(ActiveModal { id, purpose, modal });
    }

    fn pick_character<T: Tunnel>(&mut self, id: &str, tunnel: &T) {
        if !matches!(self.mount, Mount::CharacterSelect(_)) {
            log::warn!("characters cannot be picked on {}", self.phase);
            return;
        }
        if let Some(selected) = &self.selected_character {
            log::warn!("`{selected}` has already been picked");
            return;
        }
        let Some(character) = self
            .scenario
            .as_ref()
            .and_then(|scenario| scenario.character(id))
            .filter(|c| c.is_player())
        else {
            log::warn!("`{id}` is not a selectable character");
            return;
        };

        let modal = Modal::confirmation(format!("Play as {}?", character.name));
        let id = character.id.clone();
        self.open_modal(Purpose::PickCharacter(id), modal);
        self.announce(tunnel);
    }

    fn submit_vote<T: Tunnel>(&mut self, tunnel: &T) {
        let Mount::Voting(ballot) = &self.mount else {
            log::warn!("no ballot on {}", self.phase);
            return;
        };
        match ballot
            .submit()
            .map(|c| format!("Vote for {} as the culprit?", c.name))
        {
            Ok(message) => {
                self.open_modal(Purpose::CastVote, Modal::confirmation(message));
                self.announce(tunnel);
            }
            Err(e) => {
                log::warn!("vote rejected: {e}");
                tunnel.send_message(&UpdateMessage::Notice(e.to_string()).into());
            }
        }
    }

    fn share<T: Tunnel>(&self, tunnel: &T) {
        let (Mount::Debriefing(_), Some(scenario)) = (&self.mount, &self.scenario) else {
            log::warn!("nothing to share on {}", self.phase);
            return;
        };
        match share_url(scenario.title(), &self.options.share_hashtags) {
            Ok(url) => tunnel.send_message(&UpdateMessage::OpenUrl(url.into()).into()),
            Err(e) => log::error!("failed to build the share link: {e}"),
        }
    }

    fn open_reading_notice(&mut self) {
        let modal = if self.reading.can_extend() {
            Modal::confirmation(
                "Reading time is over. Move on to the first discussion, or extend the reading time?",
            )
            .confirm_label(labels::ACKNOWLEDGE)
            .cancel_label(format!(
                "Extend ({})",
                format_time(self.reading.extension_seconds())
            ))
        } else {
            Modal::notification("Reading time is over. Move on to the first discussion.")
                .confirm_label(labels::ACKNOWLEDGE)
        };
        self.open_modal(Purpose::ReadingTimeUp, modal);
    }

    fn open_discussion_notice(&mut self) {
        self.open_modal(
            Purpose::DiscussionTimeUp,
            Modal::notification("Time is up.").confirm_label(labels::ACKNOWLEDGE),
        );
    }

    fn answer_modal<S: FnMut(AlarmMessage, Duration), T: Tunnel>(
        &mut self,
        id: ModalId,
        response: Response,
        schedule_message: &mut S,
        tunnel: &T,
    ) {
        let resolution = match &self.modal {
            Some(active) if active.id == id => active.modal.resolve(response),
            _ => {
                log::debug!("dialog {id} is no longer open");
                return;
            }
        };
        if resolution == Resolution::Ignored {
            return;
        }
        let Some(active) = self.modal.take() else {
            return;
        };

        match (active.purpose, resolution) {
            (Purpose::PickCharacter(character), Resolution::Confirmed) => {
                log::info!("playing as `{character}`");
                self.selected_character = Some(character);
                self.enter(Phase::CommonInfo, schedule_message, tunnel);
            }
            (Purpose::ReadingTimeUp, Resolution::Confirmed) => {
                self.enter(Phase::FirstDiscussion, schedule_message, tunnel);
            }
            (Purpose::ReadingTimeUp, Resolution::Cancelled) => {
                let serial = self.serials.next();
                if self.reading.extend(serial) {
                    log::info!("reading time extended");
                    schedule_tick(Clock::Reading, serial, schedule_message);
                    send_tick(Clock::Reading, self.reading.view(), tunnel);
                }
                self.announce(tunnel);
            }
            (Purpose::DiscussionTimeUp, Resolution::Confirmed) => {
                if let Some(next) = self.phase.next() {
                    self.enter(next, schedule_message, tunnel);
                }
            }
            (Purpose::CastVote, Resolution::Confirmed) => {
                let Mount::Voting(ballot) = &mut self.mount else {
                    return;
                };
                match ballot.finalize() {
                    Ok(voted) => {
                        log::info!("the table voted for `{voted}`");
                        self.voted_character = Some(voted);
                        self.enter(Phase::Ending, schedule_message, tunnel);
                    }
                    Err(e) => log::warn!("vote rejected: {e}"),
                }
            }
            _ => self.announce(tunnel),
        }
    }

    fn tick_reading<S: FnMut(AlarmMessage, Duration), T: Tunnel>(
        &mut self,
        serial: u64,
        schedule_message: &mut S,
        tunnel: &T,
    ) {
        if !self.mount.is_live() {
            log::debug!("{} is not shown, dropping reading tick {serial}", self.phase);
            return;
        }
        match self.reading.tick(serial) {
            TickOutcome::Stale => log::debug!("ignoring stale reading tick {serial}"),
            TickOutcome::Counting => {
                let next = self.serials.next();
                if self.reading.rearm(next) {
                    schedule_tick(Clock::Reading, next, schedule_message);
                }
                send_tick(Clock::Reading, self.reading.view(), tunnel);
            }
            TickOutcome::Expired => {
                log::info!("reading time is over");
                send_tick(Clock::Reading, self.reading.view(), tunnel);
                self.open_reading_notice();
                self.announce(tunnel);
            }
        }
    }

    fn tick_discussion<S: FnMut(AlarmMessage, Duration), T: Tunnel>(
        &mut self,
        serial: u64,
        schedule_message: &mut S,
        tunnel: &T,
    ) {
        let next = self.serials.next();
        let Mount::Discussion { screen, .. } = &mut self.mount else {
            log::debug!("discussion is gone, ignoring tick {serial}");
            return;
        };
        match screen.timer.tick(serial) {
            TickOutcome::Stale => log::debug!("ignoring stale discussion tick {serial}"),
            TickOutcome::Counting => {
                if screen.timer.rearm(next) {
                    schedule_tick(Clock::Discussion, next, schedule_message);
                }
                send_tick(Clock::Discussion, screen.timer.view(), tunnel);
            }
            TickOutcome::Expired => {
                log::info!("{} is over", screen.round.title());
                send_tick(Clock::Discussion, screen.timer.view(), tunnel);
                self.open_discussion_notice();
                self.announce(tunnel);
            }
        }
    }
}
