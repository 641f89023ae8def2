use anyhow::Context;
use camino::Utf8Path;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::host::{CompatibilityOracle, ConnectionIndex};

// ────────────────────────────────────────────────────────────────────────────
// Ports
// ────────────────────────────────────────────────────────────────────────────

/// Stable identity of a port within one editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortId(pub u32);

/// Signal direction of a port: inputs accept, outputs emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
    Input,
    Output,
}

impl PortDirection {
    pub fn is_output(self) -> bool {
        matches!(self, PortDirection::Output)
    }
}

/// A connectable endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub id: PortId,
    pub name: String,
    pub direction: PortDirection,
    /// Path of the hierarchy node owning this port (e.g. `"Amp/Channel 1"`).
    pub node: String,
    /// Opaque tag only interpreted by a [`CompatibilityOracle`].
    pub type_tag: String,
    /// Optional textual identifier exposed by "Copy UID".
    pub uid: Option<String>,
}

impl Port {
    /// Key used to reference this port in a persisted document: the UID when
    /// present, otherwise `node/name`.
    pub fn key(&self) -> String {
        match &self.uid {
            Some(uid) => uid.clone(),
            None if self.node.is_empty() => self.name.clone(),
            None => format!("{}/{}", self.node, self.name),
        }
    }
}

/// One of the two parallel lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::A => f.write_str("A"),
            Side::B => f.write_str("B"),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Connections
// ────────────────────────────────────────────────────────────────────────────

/// An unordered port pair, normalised so that `output` holds the emitting
/// port. Identity is the pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    pub output: PortId,
    pub input: PortId,
}

impl Connection {
    /// Build a connection from two ports in any order.
    pub fn between(a: &Port, b: &Port) -> Self {
        if a.direction.is_output() {
            Self { output: a.id, input: b.id }
        } else {
            Self { output: b.id, input: a.id }
        }
    }

    pub fn touches(&self, port: PortId) -> bool {
        self.output == port || self.input == port
    }

    pub fn other(&self, port: PortId) -> Option<PortId> {
        if self.output == port {
            Some(self.input)
        } else if self.input == port {
            Some(self.output)
        } else {
            None
        }
    }
}

/// In-memory [`ConnectionIndex`] preserving insertion order.
#[derive(Debug, Clone, Default)]
pub struct ConnectionSet {
    connections: IndexSet<Connection>,
}

impl ConnectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn contains(&self, a: PortId, b: PortId) -> bool {
        self.connections
            .iter()
            .any(|c| c.touches(a) && c.other(a) == Some(b))
    }

    /// Insert without going through the oracle (used when loading documents).
    pub fn insert(&mut self, connection: Connection) -> bool {
        self.connections.insert(connection)
    }
}

impl ConnectionIndex for ConnectionSet {
    fn connections_of(&self, port: PortId) -> Vec<PortId> {
        self.connections.iter().filter_map(|c| c.other(port)).collect()
    }

    fn connect(&mut self, a: &Port, b: &Port) -> anyhow::Result<()> {
        if a.direction == b.direction {
            anyhow::bail!(
                "cannot connect '{}' to '{}': both are {:?} ports",
                a.key(),
                b.key(),
                a.direction
            );
        }
        self.connections.insert(Connection::between(a, b));
        Ok(())
    }

    fn disconnect(&mut self, a: PortId, b: PortId) -> anyhow::Result<()> {
        self.connections
            .retain(|c| !(c.touches(a) && c.other(a) == Some(b)));
        Ok(())
    }

    fn clear_connections(&mut self, port: PortId) -> anyhow::Result<()> {
        self.connections.retain(|c| !c.touches(port));
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Default compatibility rule
// ────────────────────────────────────────────────────────────────────────────

/// Type tag that matches every other tag.
pub const WILDCARD_TYPE: &str = "*";

/// Ports are compatible when their directions differ and their type tags are
/// equal (or either one is [`WILDCARD_TYPE`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeTagOracle;

impl CompatibilityOracle for TypeTagOracle {
    fn can_connect(&self, a: &Port, b: &Port) -> bool {
        a.direction != b.direction
            && (a.type_tag == b.type_tag || a.type_tag == WILDCARD_TYPE || b.type_tag == WILDCARD_TYPE)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// WiringDocument – JSON persistence for the demo front-ends
// ────────────────────────────────────────────────────────────────────────────

/// A port as written in a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PortSpec {
    pub name: String,
    pub direction: PortDirection,
    #[serde(rename = "type", default = "default_type_tag")]
    pub type_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

fn default_type_tag() -> String {
    WILDCARD_TYPE.to_string()
}

/// A hierarchy node: a named group holding ports and nested groups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NodeSpec {
    pub name: String,
    #[serde(default)]
    pub ports: Vec<PortSpec>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
    /// Whether the node starts expanded in the list.
    #[serde(default = "default_expanded")]
    pub expanded: bool,
}

fn default_expanded() -> bool {
    true
}

/// Two port hierarchies plus the connections between them, keyed by
/// [`Port::key`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct WiringDocument {
    pub side_a: NodeSpec,
    pub side_b: NodeSpec,
    #[serde(default)]
    pub connections: Vec<(String, String)>,
}

impl WiringDocument {
    /// Load a document from a JSON file.
    pub fn load(path: &Utf8Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("Open {}", path))?;
        let doc: WiringDocument =
            serde_json::from_str(&text).with_context(|| format!("Failed to parse {}", path))?;
        Ok(doc)
    }

    /// Write the document as pretty-printed JSON.
    pub fn save(&self, path: &Utf8Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).with_context(|| format!("Write {}", path))?;
        Ok(())
    }
}
