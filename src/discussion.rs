//! Discussion screens
//!
//! Each discussion screen owns a fresh countdown. The countdown sits idle
//! until the table presses start, can then be paused, resumed or forcibly
//! ended, and opens the time-up notice exactly once when it stops for good.
//! Next to the timer the screen shows the handouts as tabs.

use enum_map::Enum;
use serde::{Deserialize, Serialize};

use crate::{
    phase::Phase,
    scenario::{
        Character, Scenario,
        content::{ContentTicket, Contents},
    },
    timer::{Countdown, TickOutcome, TimerView},
};

/// The two discussion rounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
pub enum Discussion {
    /// Held after reading the handouts
    First,
    /// Held after the intermediate information
    Second,
}

impl Discussion {
    /// Heading of the discussion screen
    pub fn title(self) -> &'static str {
        match self {
            Discussion::First => "First Discussion",
            Discussion::Second => "Second Discussion",
        }
    }

    /// Phase the discussion belongs to
    pub fn phase(self) -> Phase {
        match self {
            Discussion::First => Phase::FirstDiscussion,
            Discussion::Second => Phase::SecondDiscussion,
        }
    }
}

/// Which controls the discussion screen offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Controls {
    /// Only the start button
    Idle,
    /// Pause or resume, and force end
    Running,
    /// The discussion is over, the time-up notice is shown
    Ended,
}

/// Handouts available as discussion tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
pub enum TabLabel {
    /// The common information
    #[display("Common Info")]
    CommonInfo,
    /// The picked character's own story
    #[display("Your Story")]
    Story,
    /// The intermediate information
    #[display("Intermediate Info")]
    IntermediateInfo,
}

/// One tab of handout text
#[derive(Debug, Clone)]
pub struct Tab {
    /// What the tab holds
    pub label: TabLabel,
    /// Fetch of the tab's text, `None` for a tab without text
    pub ticket: Option<ContentTicket>,
}

/// Tab bar with exactly one active tab
#[derive(Debug, Clone)]
pub struct Tabs {
    items: Vec<Tab>,
    active: usize,
}

impl Tabs {
    /// Creates a tab bar with the first tab active
    pub fn new(items: Vec<Tab>) -> Self {
        Self { items, active: 0 }
    }

    /// Activates a tab, out of range indices are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.items.len() || index == self.active {
            return false;
        }
        self.active = index;
        true
    }

    /// Index of the active tab
    pub fn active(&self) -> usize {
        self.active
    }

    /// All tabs
    pub fn items(&self) -> &[Tab] {
        &self.items
    }
}

/// Countdown of a discussion screen
#[derive(Debug, Clone)]
pub struct DiscussionTimer {
    countdown: Countdown,
    controls: Controls,
}

impl DiscussionTimer {
    /// Creates an idle timer
    pub fn new(seconds: u64) -> Self {
        Self {
            countdown: Countdown::new(seconds),
            controls: Controls::Idle,
        }
    }

    /// Starts the discussion
    ///
    /// # Returns
    ///
    /// `true` when a tick armed with `serial` must be scheduled.
    pub fn start(&mut self, serial: u64) -> bool {
        if self.controls != Controls::Idle {
            return false;
        }
        self.controls = Controls::Running;
        self.countdown.resume(serial)
    }

    /// Pauses a running countdown or resumes a paused one
    ///
    /// # Returns
    ///
    /// `true` when the countdown resumed and a tick armed with `serial` must
    /// be scheduled.
    pub fn toggle_pause(&mut self, serial: u64) -> bool {
        if self.controls != Controls::Running {
            return false;
        }
        if self.countdown.is_ticking() {
            self.countdown.pause();
            false
        } else {
            self.countdown.resume(serial)
        }
    }

    /// Ends the discussion whatever time is left
    ///
    /// # Returns
    ///
    /// `true` when the discussion ended now and the time-up notice must open.
    pub fn force_end(&mut self) -> bool {
        if self.controls != Controls::Running {
            return false;
        }
        self.countdown.pause();
        self.controls = Controls::Ended;
        true
    }

    /// Delivers a tick alarm
    ///
    /// Expiry is reported only while the discussion is running, so the notice
    /// can open once.
    pub fn tick(&mut self, serial: u64) -> TickOutcome {
        match self.countdown.tick(serial) {
            TickOutcome::Expired if self.controls == Controls::Running => {
                self.controls = Controls::Ended;
                TickOutcome::Expired
            }
            TickOutcome::Expired => TickOutcome::Stale,
            outcome => outcome,
        }
    }

    /// Arms the next tick
    pub fn rearm(&mut self, serial: u64) -> bool {
        self.countdown.rearm(serial)
    }

    /// Controls currently offered
    pub fn controls(&self) -> Controls {
        self.controls
    }

    /// Display state
    pub fn view(&self) -> TimerView {
        self.countdown.view()
    }
}

/// State of a mounted discussion screen
#[derive(Debug, Clone)]
pub struct DiscussionScreen {
    /// Which round this is
    pub round: Discussion,
    /// Countdown of the round
    pub timer: DiscussionTimer,
    /// Handout tabs
    pub tabs: Tabs,
}

impl DiscussionScreen {
    /// Mounts a discussion screen and requests its handouts
    ///
    /// The first round shows the common information and the character's story,
    /// the second round adds the intermediate information. A character without
    /// a story gets an empty story tab.
    pub fn mount(
        round: Discussion,
        seconds: u64,
        scenario: &Scenario,
        character: &Character,
        contents: &mut Contents,
    ) -> Self {
        let mut items = vec![
            Tab {
                label: TabLabel::CommonInfo,
                ticket: Some(contents.request(scenario.common_info())),
            },
            Tab {
                label: TabLabel::Story,
                ticket: character
                    .story_file
                    .as_ref()
                    .map(|path| contents.request(path)),
            },
        ];
        if round == Discussion::Second {
            items.push(Tab {
                label: TabLabel::IntermediateInfo,
                ticket: Some(contents.request(scenario.intermediate_info())),
            });
        }

        Self {
            round,
            timer: DiscussionTimer::new(seconds),
            tabs: Tabs::new(items),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::scenario::config::tests::sample_scenario;

    #[test]
    fn test_timer_is_idle_until_started() {
        let mut timer = DiscussionTimer::new(600);
        assert_eq!(timer.controls(), Controls::Idle);
        assert!(!timer.toggle_pause(1));
        assert!(!timer.force_end());
        assert_eq!(timer.tick(1), TickOutcome::Stale);

        assert!(timer.start(1));
        assert_eq!(timer.controls(), Controls::Running);
        assert!(!timer.start(2));
    }

    #[test]
    fn test_pause_and_resume() {
        let mut timer = DiscussionTimer::new(600);
        timer.start(1);
        assert!(!timer.toggle_pause(2));
        assert!(!timer.view().ticking);
        assert_eq!(timer.tick(1), TickOutcome::Stale);
        assert_eq!(timer.view().remaining, 600);

        assert!(timer.toggle_pause(3));
        assert_eq!(timer.tick(3), TickOutcome::Counting);
        assert_eq!(timer.view().remaining, 599);
    }

    #[test]
    fn test_force_end_with_time_left() {
        let mut timer = DiscussionTimer::new(600);
        timer.start(0);
        let mut serial = 0;
        for _ in 0..163 {
            assert_eq!(timer.tick(serial), TickOutcome::Counting);
            serial += 1;
            timer.rearm(serial);
        }
        assert_eq!(timer.view().remaining, 437);

        assert!(timer.force_end());
        assert_eq!(timer.controls(), Controls::Ended);
        assert!(!timer.view().ticking);
        assert_eq!(timer.tick(serial), TickOutcome::Stale);
        assert!(!timer.force_end());
        assert!(!timer.toggle_pause(serial + 1));
    }

    #[test]
    fn test_natural_expiry_reports_once() {
        let mut timer = DiscussionTimer::new(2);
        timer.start(1);
        assert_eq!(timer.tick(1), TickOutcome::Counting);
        timer.rearm(2);
        assert_eq!(timer.tick(2), TickOutcome::Expired);
        assert_eq!(timer.controls(), Controls::Ended);
        assert_eq!(timer.tick(2), TickOutcome::Stale);
        assert!(!timer.force_end());
    }

    #[test]
    fn test_tabs_select() {
        let mut tabs = Tabs::new(vec![
            Tab {
                label: TabLabel::CommonInfo,
                ticket: None,
            },
            Tab {
                label: TabLabel::Story,
                ticket: None,
            },
        ]);
        assert_eq!(tabs.active(), 0);
        assert!(tabs.select(1));
        assert!(!tabs.select(1));
        assert!(!tabs.select(2));
        assert_eq!(tabs.active(), 1);
    }

    #[test]
    fn test_first_round_tabs() {
        let scenario = sample_scenario();
        let mut contents = Contents::default();
        let alice = scenario.character("charA").unwrap();
        let screen = DiscussionScreen::mount(Discussion::First, 600, &scenario, alice, &mut contents);

        let labels = screen.tabs.items().iter().map(|t| t.label).collect::<Vec<_>>();
        assert_eq!(labels, [TabLabel::CommonInfo, TabLabel::Story]);
        assert_eq!(contents.len(), 2);
        assert_eq!(screen.timer.controls(), Controls::Idle);
    }

    #[test]
    fn test_second_round_tabs_without_story() {
        let scenario = sample_scenario();
        let mut contents = Contents::default();
        let carol = scenario.character("charC").unwrap();
        let screen =
            DiscussionScreen::mount(Discussion::Second, 600, &scenario, carol, &mut contents);

        let labels = screen.tabs.items().iter().map(|t| t.label).collect::<Vec<_>>();
        assert_eq!(
            labels,
            [TabLabel::CommonInfo, TabLabel::Story, TabLabel::IntermediateInfo]
        );
        assert!(screen.tabs.items()[1].ticket.is_none());
        assert_eq!(contents.len(), 2);
    }

    #[test]
    fn test_round_names() {
        assert_eq!(Discussion::First.phase(), Phase::FirstDiscussion);
        assert_eq!(Discussion::Second.phase(), Phase::SecondDiscussion);
        assert_eq!(TabLabel::Story.to_string(), "Your Story");
    }
}
