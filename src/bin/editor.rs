//! Wire ports interactively using egui (requires `--features egui`).
//!
//! Usage:
//!   cargo run --features egui --bin portlink-editor -- <document.json> [-c config.json]

use anyhow::Result;
use camino::Utf8PathBuf;
use clap::Parser;
use eframe::egui;
use portlink::config::EditorConfig;
use portlink::egui_app::WiringApp;
use portlink::model::WiringDocument;
use portlink::session::WiringSession;

#[derive(Parser, Debug)]
#[command(author, version, about = "Wire ports between two lists using egui", long_about = None)]
struct Args {
    /// Wiring document (JSON)
    #[arg(value_name = "DOCUMENT")]
    document: Utf8PathBuf,

    /// Editor configuration (JSON)
    #[arg(short, long)]
    config: Option<Utf8PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = EditorConfig::load_or_default(args.config.as_deref())?;
    let doc = WiringDocument::load(&args.document)?;
    let session = WiringSession::from_document(doc, &config)?;

    println!("Drag from a selected port onto the other list to connect.");
    println!("Right-click a list for selection, expansion and removal commands.");

    let app = WiringApp::new(session, &config, Some(args.document));
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1000.0, 700.0]),
        ..Default::default()
    };
    eframe::run_native(
        "portlink wiring editor",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))?;
    Ok(())
}
