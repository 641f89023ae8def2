//! Collaborator seams: everything the wiring core needs from its host but
//! does not own.
//!
//! The controller and renderer only ever talk to these traits, so a test can
//! swap in a recording double and the GUI can plug in its own stores.

use crate::model::{Port, PortId};

/// Decides whether two ports may be wired together.
///
/// Exactly one of the pair is treated as the input regardless of argument
/// order; implementations must not assume `a` is the output.
pub trait CompatibilityOracle {
    fn can_connect(&self, a: &Port, b: &Port) -> bool;
}

impl<F> CompatibilityOracle for F
where
    F: Fn(&Port, &Port) -> bool,
{
    fn can_connect(&self, a: &Port, b: &Port) -> bool {
        self(a, b)
    }
}

/// Externally owned store of committed connections.
pub trait ConnectionIndex {
    /// Ports currently wired to `port`, in insertion order.
    fn connections_of(&self, port: PortId) -> Vec<PortId>;

    /// Commit a connection between `a` and `b`.
    fn connect(&mut self, a: &Port, b: &Port) -> anyhow::Result<()>;

    /// Remove the connection between `a` and `b` if present.
    fn disconnect(&mut self, a: PortId, b: PortId) -> anyhow::Result<()>;

    /// Remove every connection touching `port`.
    fn clear_connections(&mut self, port: PortId) -> anyhow::Result<()>;

    /// Number of connections touching `port`.
    fn connection_count(&self, port: PortId) -> usize {
        self.connections_of(port).len()
    }
}

/// Application-shell services: undo checkpoints, error reporting and the
/// system clipboard.
pub trait EditorHost {
    /// Record a labelled checkpoint in the host's undo log.
    fn add_undo_buffer_entry(&mut self, label: &str);

    /// Surface a collaborator failure to the user.
    fn report_error(&mut self, err: &anyhow::Error);

    /// Place `text` on the system clipboard.
    fn set_clipboard_text(&mut self, text: String);
}

/// Mutable collaborators handed to the controller for operations that commit.
pub struct Collaborators<'a> {
    pub oracle: &'a dyn CompatibilityOracle,
    pub connections: &'a mut dyn ConnectionIndex,
    pub host: &'a mut dyn EditorHost,
}

/// An [`EditorHost`] that simply remembers what it was asked to do.
///
/// Used by the CLI (which has no clipboard or dialogs) and by tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub undo_labels: Vec<String>,
    pub errors: Vec<String>,
    pub clipboard: Option<String>,
}

impl EditorHost for RecordingHost {
    fn add_undo_buffer_entry(&mut self, label: &str) {
        self.undo_labels.push(label.to_string());
    }

    fn report_error(&mut self, err: &anyhow::Error) {
        self.errors.push(format!("{err:#}"));
    }

    fn set_clipboard_text(&mut self, text: String) {
        self.clipboard = Some(text);
    }
}
