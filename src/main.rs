use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand, ValueEnum};
use portlink::config::EditorConfig;
use portlink::controller::{InteractionController, ReleaseOutcome};
use portlink::geometry::Rect;
use portlink::host::{ConnectionIndex, RecordingHost};
use portlink::list_view::PortListView;
use portlink::model::{Side, WiringDocument};
use portlink::outline::OutlineList;
use portlink::session::WiringSession;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and wire port documents", long_about = None)]
struct Cli {
    /// Editor configuration (JSON)
    #[arg(short, long, global = true, value_name = "CONFIG")]
    config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print both port hierarchies and their connections
    Show {
        #[arg(value_name = "DOCUMENT")]
        document: Utf8PathBuf,
    },
    /// Drag the given source ports onto an anchor port on the other side
    Connect {
        #[arg(value_name = "DOCUMENT")]
        document: Utf8PathBuf,
        /// Source ports (UID or row path), comma separated, in selection order
        #[arg(long, value_delimiter = ',', required = true)]
        from: Vec<String>,
        /// Port on the opposite side to release over
        #[arg(long)]
        to: String,
        /// List holding the source ports
        #[arg(long, value_enum, default_value_t = SideArg::A)]
        side: SideArg,
        /// Write the updated document back
        #[arg(long)]
        write: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum SideArg {
    A,
    B,
}

impl From<SideArg> for Side {
    fn from(s: SideArg) -> Self {
        match s {
            SideArg::A => Side::A,
            SideArg::B => Side::B,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = EditorConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Show { document } => {
            let doc = WiringDocument::load(&document)?;
            let session = WiringSession::from_document(doc, &config)?;
            print_list(&session, &session.side_a);
            println!();
            print_list(&session, &session.side_b);
        }
        Command::Connect {
            document,
            from,
            to,
            side,
            write,
        } => {
            let side = Side::from(side);
            let doc = WiringDocument::load(&document)?;
            let mut session = WiringSession::from_document(doc, &config)?;

            // Tall enough that every row is laid out without scrolling.
            let rows = session.side_a.len().max(session.side_b.len()) as f32;
            session.layout(Rect::from_xywh(0.0, 0.0, 1200.0, rows * config.row_height), 200.0);

            let sources = from
                .iter()
                .map(|name| {
                    session
                        .resolve_entry(side, name)
                        .with_context(|| format!("No port '{}' on side {}", name, side))
                })
                .collect::<Result<Vec<_>>>()?;
            let anchor = session
                .resolve_entry(side.opposite(), &to)
                .with_context(|| format!("No port '{}' on side {}", to, side.opposite()))?;

            let mut controller = InteractionController::new(&config);
            let mut host = RecordingHost::default();
            let before = session.connections.len();
            let outcome = session.connect_headless(side, &sources, anchor, &mut controller, &mut host)?;
            for err in &host.errors {
                eprintln!("error: {}", err);
            }
            match outcome {
                ReleaseOutcome::Committed { connected } | ReleaseOutcome::Failed { connected } => {
                    println!(
                        "{} of {} source port(s) connected ({} new)",
                        connected,
                        sources.len(),
                        session.connections.len() - before
                    );
                }
                ReleaseOutcome::Abandoned | ReleaseOutcome::NoGesture => {
                    println!("Nothing connectable under '{}'; gesture abandoned", to);
                }
            }
            if write {
                session.to_document().save(&document)?;
            }
        }
    }
    Ok(())
}

fn print_list(session: &WiringSession, list: &OutlineList) {
    println!("Side {}", list.side());
    for entry in list.all_objects() {
        let indent = "  ".repeat(list.depth(entry));
        let label = list.label(entry).unwrap_or_default();
        match list.port_of(entry) {
            Some(port) => {
                let partners: Vec<String> = session
                    .connections
                    .connections_of(port.id)
                    .into_iter()
                    .filter_map(|id| session.port(id).map(|p| p.key()))
                    .collect();
                if partners.is_empty() {
                    println!("{}{} [{:?}, {}]", indent, label, port.direction, port.type_tag);
                } else {
                    println!(
                        "{}{} [{:?}, {}] -> {}",
                        indent,
                        label,
                        port.direction,
                        port.type_tag,
                        partners.join(", ")
                    );
                }
            }
            None => println!("{}{}/", indent, label),
        }
    }
}
