//! Input commands and the cross-view event system.
//!
//! All user interaction enters the engine as an [`InputEvent`] dispatched
//! through a single exhaustive-match handler, replacing ad-hoc per-widget
//! callback wiring. Hosts can additionally subscribe to [`LinkEvent`]s via
//! [`EventController`]: each event carries a set of [`EventKind`] flags
//! (bitflags-style) and is delivered when `(event.kinds & filter) != 0`.

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

// ─────────────────────────────────────────────────────────────────────────────
// InputEvent – the command type
// ─────────────────────────────────────────────────────────────────────────────

/// A user interaction, normalized into a single dispatchable command.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A country was clicked on the map.
    RegionClicked { code: String },
    /// The pointer moved over the chart (screen pixel coordinates).
    PointerMoved { x: f32, y: f32 },
    /// The clear-selection action was triggered.
    ClearRequested,
}

// ─────────────────────────────────────────────────────────────────────────────
// EventKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the categories a [`LinkEvent`] belongs to.
///
/// A single event may have several bits set: a map click that toggles the
/// selection is both `REGION_CLICKED` and `SELECTION_CHANGED`, and also
/// `MODE_CHANGED` when it flips the selection between empty and non-empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u32);

impl EventKind {
    /// A country on the map was clicked.
    pub const REGION_CLICKED: Self = Self(1 << 0);
    /// The selection set changed (toggle or clear).
    pub const SELECTION_CHANGED: Self = Self(1 << 1);
    /// The selection was explicitly cleared.
    pub const SELECTION_CLEARED: Self = Self(1 << 2);
    /// The views switched between default and filtered mode.
    pub const MODE_CHANGED: Self = Self(1 << 3);
    /// The pointer moved over the chart.
    pub const HOVER_MOVED: Self = Self(1 << 4);
    /// A pointer position resolved to a snapped date (inside plot bounds).
    pub const HOVER_RESOLVED: Self = Self(1 << 5);
    /// A view finished re-deriving its state after a notification.
    pub const VIEW_REFRESHED: Self = Self(1 << 6);

    /// Wildcard: matches every event kind.
    pub const ALL: Self = Self(u32::MAX);

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for EventKind {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EventKind {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for EventKind {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "EMPTY");
        }
        if *self == EventKind::ALL {
            return write!(f, "ALL");
        }
        let pairs: &[(EventKind, &str)] = &[
            (EventKind::REGION_CLICKED, "REGION_CLICKED"),
            (EventKind::SELECTION_CHANGED, "SELECTION_CHANGED"),
            (EventKind::SELECTION_CLEARED, "SELECTION_CLEARED"),
            (EventKind::MODE_CHANGED, "MODE_CHANGED"),
            (EventKind::HOVER_MOVED, "HOVER_MOVED"),
            (EventKind::HOVER_RESOLVED, "HOVER_RESOLVED"),
            (EventKind::VIEW_REFRESHED, "VIEW_REFRESHED"),
        ];
        let mut names = Vec::new();
        let mut known: u32 = 0;
        for (kind, name) in pairs {
            known |= kind.0;
            if self.contains(*kind) {
                names.push(*name);
            }
        }
        let extra = self.0 & !known;
        if names.is_empty() {
            write!(f, "0x{:x}", self.0)
        } else if extra != 0 {
            write!(f, "{}|0x{:x}", names.join("|"), extra)
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Metadata – per-event-type payloads
// ─────────────────────────────────────────────────────────────────────────────

/// Metadata attached to map click events.
#[derive(Debug, Clone)]
pub struct ClickMeta {
    /// Location code of the clicked country.
    pub code: String,
    /// Whether the code is selected after the toggle.
    pub now_selected: bool,
}

/// Metadata attached to hover events.
#[derive(Debug, Clone)]
pub struct HoverMeta {
    /// Pointer position in screen pixels.
    pub x: f32,
    pub y: f32,
    /// Snapped calendar day, when the pointer was inside plot bounds.
    pub date: Option<NaiveDate>,
    /// Number of rows matched at the snapped day.
    pub row_count: usize,
}

/// Metadata attached to selection events.
#[derive(Debug, Clone)]
pub struct SelectionMeta {
    /// Selected codes after the mutation, in insertion order.
    pub codes: Vec<String>,
    /// `true` when the views are now in filtered mode.
    pub filtered: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// LinkEvent
// ─────────────────────────────────────────────────────────────────────────────

/// An event emitted by the cross-view coordination engine.
#[derive(Debug, Clone)]
pub struct LinkEvent {
    /// Bitflag set of categories this event belongs to.
    pub kinds: EventKind,
    /// Seconds since the controller was created.
    pub timestamp: f64,
    pub click: Option<ClickMeta>,
    pub hover: Option<HoverMeta>,
    pub selection: Option<SelectionMeta>,
}

impl LinkEvent {
    pub fn new(kinds: EventKind) -> Self {
        Self {
            kinds,
            timestamp: 0.0, // set by the controller on emit
            click: None,
            hover: None,
            selection: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventFilter / EventController
// ─────────────────────────────────────────────────────────────────────────────

/// OR-mask selecting which event categories a subscriber receives.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter {
    pub mask: EventKind,
}

impl EventFilter {
    pub const fn all() -> Self {
        Self {
            mask: EventKind::ALL,
        }
    }

    pub const fn only(mask: EventKind) -> Self {
        Self { mask }
    }

    #[inline]
    pub fn matches(&self, event: &LinkEvent) -> bool {
        event.kinds.intersects(self.mask)
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

struct Subscriber {
    filter: EventFilter,
    sender: Sender<LinkEvent>,
}

struct EventCtrlInner {
    subscribers: Vec<Subscriber>,
    start_instant: std::time::Instant,
}

/// Collects and distributes engine events to subscribers over `mpsc` channels.
///
/// Attach one to the app config before launching, then call
/// [`subscribe`](Self::subscribe) with an optional filter. Emission is
/// synchronous from the dispatch handler; subscribers with a dropped receiver
/// are pruned on the next matching emit.
#[derive(Clone)]
pub struct EventController {
    inner: Arc<Mutex<EventCtrlInner>>,
}

impl EventController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventCtrlInner {
                subscribers: Vec::new(),
                start_instant: std::time::Instant::now(),
            })),
        }
    }

    /// Subscribe to events matching the given filter.
    pub fn subscribe(&self, filter: EventFilter) -> Receiver<LinkEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.push(Subscriber { filter, sender: tx });
        rx
    }

    /// Subscribe to all events, unfiltered.
    pub fn subscribe_all(&self) -> Receiver<LinkEvent> {
        self.subscribe(EventFilter::all())
    }

    /// Emit an event to all matching subscribers. Called by the dispatch
    /// handler; public so hosts can inject synthetic events.
    pub fn emit(&self, mut event: LinkEvent) {
        let mut inner = self.inner.lock().unwrap();
        event.timestamp = inner.start_instant.elapsed().as_secs_f64();
        inner.subscribers.retain(|sub| {
            if sub.filter.matches(&event) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                true
            }
        });
    }
}

impl Default for EventController {
    fn default() -> Self {
        Self::new()
    }
}
