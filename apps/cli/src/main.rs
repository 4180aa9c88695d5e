//! # notaventa
//!
//! Command-line surface for the sale-note workflow.
//!
//! ## Startup Sequence
//! 1. initialize tracing (RUST_LOG override, default `info,notaventa=debug`)
//! 2. load the session (TOML file + env overrides)
//! 3. wire the HTTP services and the workflow
//! 4. dispatch the requested subcommand

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use notaventa_client::{Api, CatalogService, ClientService, DocumentService, Session};
use notaventa_flow::SaleWorkflow;

use commands::{document, registry, sale};

#[derive(Parser)]
#[command(
    name = "notaventa",
    version,
    about = "Gestión de notas de venta, emisión de documentos y registro de clientes"
)]
struct Cli {
    /// Directorio con las fuentes TTF usadas en los documentos PDF
    #[arg(long, global = true, default_value = "./fonts")]
    fonts_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Operaciones sobre notas de venta
    Venta {
        #[command(subcommand)]
        action: sale::VentaCommand,
    },

    /// Registro de clientes
    Clientes {
        #[command(subcommand)]
        action: registry::ClientesCommand,
    },

    /// Bodegas de la empresa de la sesión
    Bodegas,

    /// Disponibilidad de productos en una bodega
    Productos {
        #[arg(long)]
        bodega: i64,
    },

    /// Historial de documentos emitidos
    Documentos,

    /// Descarga y utilidades sobre documentos
    Documento {
        #[command(subcommand)]
        action: document::DocumentoCommand,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let session = Session::load()?;
    let api = Api::new(session)?;

    match cli.command {
        Command::Venta { action } => {
            let workflow = SaleWorkflow::new(api.clone(), &cli.fonts_dir);
            let catalog = CatalogService::new(api);
            sale::run(action, &workflow, &catalog).await
        }
        Command::Clientes { action } => {
            let clients = ClientService::new(api);
            registry::run_clientes(action, &clients).await
        }
        Command::Bodegas => {
            let catalog = CatalogService::new(api);
            registry::run_bodegas(&catalog).await
        }
        Command::Productos { bodega } => {
            let catalog = CatalogService::new(api);
            registry::run_productos(&catalog, bodega).await
        }
        Command::Documentos => {
            let documents = DocumentService::new(api);
            document::run_listado(&documents).await
        }
        Command::Documento { action } => {
            let documents = DocumentService::new(api);
            document::run(action, &documents).await
        }
    }
}

/// Default: INFO globally, DEBUG for the workspace crates. `RUST_LOG`
/// overrides everything.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,notaventa=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
