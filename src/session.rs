//! An editing session: two outline lists, the connection set between them and
//! the document they came from.

use std::time::Instant;

use anyhow::Context;

use crate::config::EditorConfig;
use crate::controller::{InteractionController, ReleaseOutcome};
use crate::geometry::Rect;
use crate::host::{Collaborators, EditorHost};
use crate::list_view::{EntryId, ListPair, PortListView};
use crate::model::{Connection, ConnectionSet, Port, PortId, Side, TypeTagOracle, WiringDocument};
use crate::outline::OutlineList;

pub struct WiringSession {
    pub side_a: OutlineList,
    pub side_b: OutlineList,
    pub connections: ConnectionSet,
    pub oracle: TypeTagOracle,
    document: WiringDocument,
}

impl WiringSession {
    /// Build the lists and resolve the document's connections by port key.
    ///
    /// Each pair names a side A port first and a side B port second, so equal
    /// keys on both sides stay distinct. Persisted connections are taken
    /// as-is; they are not re-checked against the compatibility rule.
    pub fn from_document(document: WiringDocument, config: &EditorConfig) -> anyhow::Result<Self> {
        let mut next_id = 0;
        let side_a = OutlineList::from_spec(Side::A, &document.side_a, &mut next_id, config);
        let side_b = OutlineList::from_spec(Side::B, &document.side_b, &mut next_id, config);

        let mut session = Self {
            side_a,
            side_b,
            connections: ConnectionSet::new(),
            oracle: TypeTagOracle,
            document,
        };
        for (from, to) in session.document.connections.clone() {
            let a = session
                .side_a
                .port_by_key(&from)
                .with_context(|| format!("Unknown side A port '{}' in connection list", from))?;
            let b = session
                .side_b
                .port_by_key(&to)
                .with_context(|| format!("Unknown side B port '{}' in connection list", to))?;
            if a.direction == b.direction {
                anyhow::bail!("Connection '{}' -> '{}' joins two {:?} ports", from, to, a.direction);
            }
            let connection = Connection::between(a, b);
            session.connections.insert(connection);
        }
        Ok(session)
    }

    pub fn list(&self, side: Side) -> &OutlineList {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    pub fn list_mut(&mut self, side: Side) -> &mut OutlineList {
        match side {
            Side::A => &mut self.side_a,
            Side::B => &mut self.side_b,
        }
    }

    pub fn lists(&mut self) -> ListPair<'_> {
        ListPair::new(&mut self.side_a, &mut self.side_b)
    }

    /// Port with `key` on either side, side A first. Keys are only unique
    /// per side; use [`OutlineList::port_by_key`] when the side is known.
    pub fn port_by_key(&self, key: &str) -> Option<&Port> {
        self.side_a
            .port_by_key(key)
            .or_else(|| self.side_b.port_by_key(key))
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.side_a
            .ports()
            .chain(self.side_b.ports())
            .find(|p| p.id == id)
    }

    /// Entry on `side` addressed by a port key or a row path.
    pub fn resolve_entry(&self, side: Side, name: &str) -> Option<EntryId> {
        let list = self.list(side);
        list.port_by_key(name)
            .and_then(|p| list.entry_of(p.id))
            .or_else(|| list.find_entry(name))
    }

    /// Place side A on the left of `area` and side B on the right, leaving
    /// `gutter` pixels between them for the connection lines.
    pub fn layout(&mut self, area: Rect, gutter: f32) {
        let width = ((area.width() - gutter) * 0.5).max(0.0);
        self.side_a
            .set_bounds(Rect::from_xywh(area.left(), area.top(), width, area.height()));
        self.side_b.set_bounds(Rect::from_xywh(
            area.right() - width,
            area.top(),
            width,
            area.height(),
        ));
    }

    /// Play a complete press/release gesture without a UI: select `sources`
    /// on `side`, press on the first, release over `anchor` on the other side.
    pub fn connect_headless(
        &mut self,
        side: Side,
        sources: &[EntryId],
        anchor: EntryId,
        controller: &mut InteractionController,
        host: &mut dyn EditorHost,
    ) -> anyhow::Result<ReleaseOutcome> {
        let Some(&first) = sources.first() else {
            anyhow::bail!("No source ports given");
        };
        self.list_mut(side).set_selected_objects(sources, true);
        self.list_mut(side.opposite()).reveal(anchor);

        let press_at = self
            .list(side)
            .object_bounds(first, false)
            .context("Source row is not laid out")?
            .center();
        let release_at = self
            .list(side.opposite())
            .object_bounds(anchor, false)
            .context("Anchor row is not laid out")?
            .center();

        let Self {
            side_a,
            side_b,
            connections,
            oracle,
            ..
        } = self;
        let oracle: &TypeTagOracle = oracle;
        let mut lists = ListPair::new(side_a, side_b);
        let now = Instant::now();
        if !controller.press(side, press_at, now, &mut lists, oracle) {
            anyhow::bail!("Press did not start a gesture");
        }
        let mut collab = Collaborators {
            oracle,
            connections,
            host,
        };
        Ok(controller.release(release_at, &mut lists, &mut collab))
    }

    /// Snapshot the session back into a document. Every pair is written side
    /// A port first.
    pub fn to_document(&self) -> WiringDocument {
        let mut doc = self.document.clone();
        doc.connections = self
            .connections
            .iter()
            .filter_map(|c| {
                let (a, b) = if self.side_a.entry_of(c.output).is_some() {
                    (c.output, c.input)
                } else {
                    (c.input, c.output)
                };
                let a = self.side_a.port_of(self.side_a.entry_of(a)?)?;
                let b = self.side_b.port_of(self.side_b.entry_of(b)?)?;
                Some((a.key(), b.key()))
            })
            .collect();
        doc
    }
}
