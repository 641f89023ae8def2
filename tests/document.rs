use anyhow::Result;
use camino::Utf8Path;
use portlink::config::EditorConfig;
use portlink::controller::{InteractionController, ReleaseOutcome};
use portlink::geometry::Rect;
use portlink::host::RecordingHost;
use portlink::list_view::PortListView;
use portlink::model::{NodeSpec, PortDirection, PortSpec, Side, WiringDocument};
use portlink::session::WiringSession;
use tempfile::NamedTempFile;

const DOC: &str = r#"{
  "side_a": {
    "name": "Mixer",
    "ports": [
      { "name": "left", "direction": "output", "type": "audio", "uid": "mix.l" },
      { "name": "right", "direction": "output", "type": "audio" }
    ],
    "children": [
      { "name": "Aux", "expanded": false,
        "ports": [ { "name": "send", "direction": "output" } ] }
    ]
  },
  "side_b": {
    "name": "Speakers",
    "ports": [
      { "name": "in_l", "direction": "input", "type": "audio" },
      { "name": "in_r", "direction": "input", "type": "audio" }
    ]
  },
  "connections": [ ["mix.l", "Speakers/in_l"] ]
}"#;

fn utf8(file: &NamedTempFile) -> &Utf8Path {
    Utf8Path::from_path(file.path()).expect("temp path is UTF-8")
}

#[test]
fn document_loads_and_resolves_connections() -> Result<()> {
    let file = NamedTempFile::new()?;
    std::fs::write(file.path(), DOC)?;
    let doc = WiringDocument::load(utf8(&file))?;

    assert_eq!(doc.side_a.ports.len(), 2);
    assert!(!doc.side_a.children[0].expanded);
    // Missing type tags default to the wildcard.
    assert_eq!(doc.side_a.children[0].ports[0].type_tag, "*");
    assert_eq!(doc.side_b.ports[1].direction, PortDirection::Input);

    let session = WiringSession::from_document(doc, &EditorConfig::default())?;
    assert_eq!(session.connections.len(), 1);
    assert_eq!(session.side_a.ports().count(), 3);
    Ok(())
}

#[test]
fn document_save_keeps_connections() -> Result<()> {
    let doc: WiringDocument = serde_json::from_str(DOC)?;
    let session = WiringSession::from_document(doc.clone(), &EditorConfig::default())?;
    let file = NamedTempFile::new()?;
    session.to_document().save(utf8(&file))?;

    let reloaded = WiringDocument::load(utf8(&file))?;
    assert_eq!(reloaded, doc);
    Ok(())
}

fn bus(direction: PortDirection) -> NodeSpec {
    NodeSpec {
        name: "Bus".into(),
        ports: vec![PortSpec {
            name: "x".into(),
            direction,
            type_tag: "*".into(),
            uid: None,
        }],
        children: vec![],
        expanded: true,
    }
}

#[test]
fn same_key_on_both_sides_survives_save_and_reload() -> Result<()> {
    let doc = WiringDocument {
        side_a: bus(PortDirection::Output),
        side_b: bus(PortDirection::Input),
        connections: vec![],
    };
    let cfg = EditorConfig::default();
    let mut session = WiringSession::from_document(doc, &cfg)?;
    session.layout(Rect::from_xywh(0.0, 0.0, 800.0, 400.0), 200.0);

    let source = session.resolve_entry(Side::A, "Bus/x").expect("side A port");
    let anchor = session.resolve_entry(Side::B, "Bus/x").expect("side B port");
    let mut controller = InteractionController::new(&cfg);
    let mut host = RecordingHost::default();
    let outcome = session.connect_headless(Side::A, &[source], anchor, &mut controller, &mut host)?;
    assert_eq!(outcome, ReleaseOutcome::Committed { connected: 1 });

    let file = NamedTempFile::new()?;
    session.to_document().save(utf8(&file))?;
    let reloaded = WiringSession::from_document(WiringDocument::load(utf8(&file))?, &cfg)?;

    assert_eq!(reloaded.connections.len(), 1);
    let a = reloaded.side_a.port_of(source).expect("port row").id;
    let b = reloaded.side_b.port_of(anchor).expect("port row").id;
    assert!(reloaded.connections.contains(a, b));
    assert_eq!(reloaded.to_document().connections, vec![("Bus/x".to_string(), "Bus/x".to_string())]);
    Ok(())
}

#[test]
fn malformed_document_reports_path() -> Result<()> {
    let file = NamedTempFile::new()?;
    std::fs::write(file.path(), "{ not json")?;
    let err = WiringDocument::load(utf8(&file)).unwrap_err();
    assert!(format!("{err:#}").contains("Failed to parse"));
    Ok(())
}

#[test]
fn config_file_overrides_defaults() -> Result<()> {
    let file = NamedTempFile::new()?;
    std::fs::write(
        file.path(),
        r#"{ "highlight_delay_ms": 150, "transparency_threshold": 5, "theme": { "line": [1, 2, 3, 255] } }"#,
    )?;
    let cfg = EditorConfig::load(utf8(&file))?;
    assert_eq!(cfg.highlight_delay_ms, 150);
    assert_eq!(cfg.transparency_threshold, 5);
    assert_eq!(cfg.theme.line, portlink::config::Rgba(1, 2, 3, 255));
    assert_eq!(cfg.expand_depth, 20);
    Ok(())
}

#[test]
fn config_rejects_bad_row_height() -> Result<()> {
    let file = NamedTempFile::new()?;
    std::fs::write(file.path(), r#"{ "row_height": 0.0 }"#)?;
    assert!(EditorConfig::load(utf8(&file)).is_err());
    assert_eq!(EditorConfig::load_or_default(None)?, EditorConfig::default());
    Ok(())
}
