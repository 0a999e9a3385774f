use serde::Serialize;

/// Lifecycle notifications, dispatched synchronously to registered
/// listeners in submission order.
///
/// Firing points: `Load` at session construction and after `set_contents`;
/// `Change` after each real history push (never on a no-op push);
/// `ShowController`/`HideController` around controller transitions; the
/// mode events after their toggles; `Preview`/`Print` from the command
/// dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Load { reload: bool },
    Change { contents: String },
    Focus,
    Blur,
    ShowController { name: String },
    HideController,
    CodeView { enabled: bool },
    FullScreen { enabled: bool },
    ShowBlocks { enabled: bool },
    Preview { contents: String },
    Print { contents: String },
}

pub(crate) type Listener = Box<dyn FnMut(&Event)>;
