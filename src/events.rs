use super::*;

/// What a listener does when invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ListenerAction {
    /// Run the bind pass of an installed binder.
    BindInteractions(BinderId),
    /// Full-page navigation, `location.href = path`.
    Navigate { destination: String },
    /// Flip the reply form paired with the anchor the listener sits on.
    ToggleReplyForm(BinderId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Listener {
    pub(crate) action: ListenerAction,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct ListenerStore {
    pub(crate) map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerStore {
    /// Registers `listener`; returns `false` when an identical listener is
    /// already registered for the node and event.
    pub(crate) fn add(&mut self, node_id: NodeId, event: &str, listener: Listener) -> bool {
        let listeners = self
            .map
            .entry(node_id)
            .or_default()
            .entry(event.to_string())
            .or_default();

        if listeners.contains(&listener) {
            return false;
        }
        listeners.push(listener);
        true
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn count(&self, node_id: NodeId, event: &str) -> usize {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map_or(0, Vec::len)
    }

    pub(crate) fn total(&self, event: &str) -> usize {
        self.map
            .values()
            .filter_map(|events| events.get(event))
            .map(Vec::len)
            .sum()
    }

    pub(crate) fn clear(&mut self) {
        self.map.clear();
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
    pub(crate) default_prevented: bool,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            default_prevented: false,
        }
    }
}

/// A failure reported by a listener. Dispatch records it and moves on to the
/// next listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub event_type: String,
    /// `tag#id.class` label of the element whose listener failed.
    pub element: String,
    pub error: ToggleError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} listener on {}: {}", self.event_type, self.element, self.error)
    }
}
