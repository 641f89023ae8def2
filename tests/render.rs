use std::time::{Duration, Instant};

use portlink::config::EditorConfig;
use portlink::controller::InteractionController;
use portlink::geometry::Rect;
use portlink::host::ConnectionIndex;
use portlink::list_view::{ListPair, PortListView};
use portlink::model::{NodeSpec, PortDirection, PortSpec, Side, WiringDocument};
use portlink::render::{DrawPlan, Renderer};
use portlink::session::WiringSession;

fn ports(prefix: &str, n: usize, direction: PortDirection) -> Vec<PortSpec> {
    (0..n)
        .map(|i| PortSpec {
            name: format!("{prefix}{i}"),
            direction,
            type_tag: "f64".into(),
            uid: None,
        })
        .collect()
}

/// Side A: Out{o0..o9}; side B: In{i0..i9, Sub(collapsed){s0}}.
fn session(area: Rect) -> WiringSession {
    let doc = WiringDocument {
        side_a: NodeSpec {
            name: "Out".into(),
            ports: ports("o", 10, PortDirection::Output),
            children: vec![],
            expanded: true,
        },
        side_b: NodeSpec {
            name: "In".into(),
            ports: ports("i", 10, PortDirection::Input),
            children: vec![NodeSpec {
                name: "Sub".into(),
                ports: ports("s", 1, PortDirection::Input),
                children: vec![],
                expanded: false,
            }],
            expanded: true,
        },
        connections: vec![],
    };
    let mut s = WiringSession::from_document(doc, &EditorConfig::default()).unwrap();
    s.layout(area, 200.0);
    s
}

fn tall() -> Rect {
    Rect::from_xywh(0.0, 0.0, 800.0, 400.0)
}

fn wire(s: &mut WiringSession, a: &str, b: &str) {
    let pa = s.port_by_key(a).unwrap().clone();
    let pb = s.port_by_key(b).unwrap().clone();
    s.connections.connect(&pa, &pb).unwrap();
}

fn plan(s: &mut WiringSession, r: &mut Renderer, c: &InteractionController, clip: Rect) -> DrawPlan {
    let WiringSession {
        side_a,
        side_b,
        connections,
        ..
    } = s;
    let lists = ListPair::new(side_a, side_b);
    r.plan(c, &lists, &*connections, clip)
}

#[test]
fn three_endpoints_keep_transparency_four_disable_it() {
    let cfg = EditorConfig::default();
    let mut s = session(tall());
    let mut r = Renderer::new(&cfg);
    let c = InteractionController::new(&cfg);

    wire(&mut s, "Out/o0", "In/i0");
    wire(&mut s, "Out/o1", "In/i1");
    wire(&mut s, "Out/o2", "In/i2");
    let p = plan(&mut s, &mut r, &c, tall());
    assert!(!p.opaque);
    assert_eq!(p.committed().count(), 3);
    assert!(p.committed().all(|l| l.style.color.3 == cfg.translucent_alpha));

    wire(&mut s, "Out/o3", "In/i3");
    let p = plan(&mut s, &mut r, &c, tall());
    assert!(p.opaque);
    assert!(p.committed().all(|l| l.style.color.3 == 255));
}

#[test]
fn endpoints_under_collapsed_groups_do_not_count() {
    let cfg = EditorConfig::default();
    let mut s = session(tall());
    let r = Renderer::new(&cfg);
    wire(&mut s, "Out/o0", "In/i0");
    wire(&mut s, "Out/o1", "In/i1");
    wire(&mut s, "Out/o2", "In/i2");
    wire(&mut s, "Out/o3", "In/Sub/s0");
    assert!(r.use_transparency(&s.side_b, &s.connections));
}

#[test]
fn connection_into_collapsed_subtree_is_culled() {
    let cfg = EditorConfig::default();
    let mut s = session(tall());
    let mut r = Renderer::new(&cfg);
    let c = InteractionController::new(&cfg);
    wire(&mut s, "Out/o0", "In/Sub/s0");

    // The segment would cross the clip rectangle, but the far end is hidden.
    let p = plan(&mut s, &mut r, &c, tall());
    assert_eq!(p.committed().count(), 0);

    let sub = s.resolve_entry(Side::B, "In/Sub").unwrap();
    s.side_b.set_expanded(sub, true);
    let p = plan(&mut s, &mut r, &c, tall());
    assert_eq!(p.committed().count(), 1);
}

#[test]
fn scrolled_out_lines_are_drawn_only_when_crossing_the_clip() {
    let cfg = EditorConfig::default();
    // Five rows tall: most rows live outside the viewport.
    let area = Rect::from_xywh(0.0, 0.0, 800.0, 5.0 * cfg.row_height);
    let mut s = session(area);
    let mut r = Renderer::new(&cfg);
    let c = InteractionController::new(&cfg);

    // o1 is scrolled above the viewport, i9 sits below it: the line crosses.
    wire(&mut s, "Out/o1", "In/i9");
    s.side_a.scroll_to(100.0);
    let o1 = s.resolve_entry(Side::A, "Out/o1").unwrap();
    s.side_a.set_selected_objects(&[o1], false);

    let p = plan(&mut s, &mut r, &c, area);
    assert_eq!(p.committed().count(), 1);
    let line = p.committed().next().unwrap();
    assert!(!area.contains(line.from) && !area.contains(line.to));
    assert!(!line.emphasized);
    assert_eq!(line.style.width, cfg.line_width);

    // Both ends above the viewport: nothing intersects, nothing is drawn.
    let o1_port = s.port_by_key("Out/o1").unwrap().id;
    s.connections.clear_connections(o1_port).unwrap();
    wire(&mut s, "Out/o0", "In/i0");
    s.side_b.scroll_to(1000.0);
    let p = plan(&mut s, &mut r, &c, area);
    assert_eq!(p.committed().count(), 0);
}

#[test]
fn selected_endpoint_in_view_is_emphasised() {
    let cfg = EditorConfig::default();
    let mut s = session(tall());
    let mut r = Renderer::new(&cfg);
    let c = InteractionController::new(&cfg);
    wire(&mut s, "Out/o0", "In/i0");
    wire(&mut s, "Out/o1", "In/i1");
    let i0 = s.resolve_entry(Side::B, "In/i0").unwrap();
    s.side_b.set_selected_objects(&[i0], false);

    let p = plan(&mut s, &mut r, &c, tall());
    let emphasized: Vec<_> = p.committed().filter(|l| l.emphasized).collect();
    assert_eq!(emphasized.len(), 1);
    assert_eq!(emphasized[0].style.width, cfg.emphasis_width);
}

#[test]
fn provisional_lines_follow_cursor_or_match() {
    let cfg = EditorConfig::default();
    let mut s = session(tall());
    let mut r = Renderer::new(&cfg);
    let mut c = InteractionController::new(&cfg);
    let o0 = s.resolve_entry(Side::A, "Out/o0").unwrap();
    let o1 = s.resolve_entry(Side::A, "Out/o1").unwrap();
    s.side_a.set_selected_objects(&[o0, o1], false);
    let press_at = s.side_a.object_bounds(o0, false).unwrap().center();
    {
        let WiringSession { side_a, side_b, oracle, .. } = &mut s;
        let mut lists = ListPair::new(side_a, side_b);
        assert!(c.press(Side::A, press_at, Instant::now(), &mut lists, &*oracle));
    }

    let cursor = portlink::geometry::Point::new(400.0, 300.0);
    {
        let WiringSession { side_a, side_b, oracle, .. } = &mut s;
        let lists = ListPair::new(side_a, side_b);
        c.drag(cursor, &lists, &*oracle);
    }
    let p = plan(&mut s, &mut r, &c, tall());
    let provisional: Vec<_> = p.provisional().collect();
    assert_eq!(provisional.len(), 2);
    assert!(provisional.iter().all(|l| l.to == cursor && !l.emphasized));

    let i4 = s.resolve_entry(Side::B, "In/i4").unwrap();
    let over = s.side_b.object_bounds(i4, false).unwrap().center();
    {
        let WiringSession { side_a, side_b, oracle, .. } = &mut s;
        let lists = ListPair::new(side_a, side_b);
        c.drag(over, &lists, &*oracle);
    }
    let p = plan(&mut s, &mut r, &c, tall());
    let provisional: Vec<_> = p.provisional().collect();
    assert!(provisional.iter().all(|l| l.emphasized));
    assert_eq!(provisional[0].style.width, cfg.emphasis_width);
    assert_ne!(provisional[0].to, provisional[1].to);
}

#[test]
fn candidate_highlight_waits_for_reveal() {
    let cfg = EditorConfig::default();
    let mut s = session(tall());
    let mut r = Renderer::new(&cfg);
    let mut c = InteractionController::new(&cfg);
    let o0 = s.resolve_entry(Side::A, "Out/o0").unwrap();
    let press_at = s.side_a.object_bounds(o0, false).unwrap().center();
    let now = Instant::now();
    {
        let WiringSession { side_a, side_b, oracle, .. } = &mut s;
        let mut lists = ListPair::new(side_a, side_b);
        c.press(Side::A, press_at, now, &mut lists, &*oracle);
    }
    assert!(plan(&mut s, &mut r, &c, tall()).highlights.is_empty());

    c.poll(now + Duration::from_millis(400));
    let p = plan(&mut s, &mut r, &c, tall());
    // All ten visible inputs are candidates; s0 is hidden.
    assert_eq!(p.highlights.len(), 10);
    assert!(p.highlights.iter().all(|h| h.side == Side::B));
}

#[test]
fn one_marker_per_visible_port() {
    let cfg = EditorConfig::default();
    let mut s = session(tall());
    let mut r = Renderer::new(&cfg);
    let c = InteractionController::new(&cfg);
    wire(&mut s, "Out/o0", "In/i0");
    let p = plan(&mut s, &mut r, &c, tall());
    assert_eq!(p.markers.len(), 20);
    // (output|input) x (connected|not) seen, nothing selected.
    assert_eq!(r.cached_styles(), 4);
}
