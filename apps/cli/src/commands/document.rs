//! # Document Commands
//!
//! Download of stored sale documents and the emitted-documents listing.

use std::path::PathBuf;

use clap::Subcommand;

use notaventa_client::DocumentService;

#[derive(Subcommand)]
pub enum DocumentoCommand {
    /// Descarga el PDF de una venta emitida
    Descargar {
        #[arg(long)]
        folio: i64,

        /// Ruta de salida (por defecto venta-<folio>.pdf)
        #[arg(long)]
        salida: Option<PathBuf>,
    },

    /// Muestra la URL de descarga sin hacer la petición
    Url {
        #[arg(long)]
        folio: i64,
    },
}

pub async fn run(action: DocumentoCommand, documents: &DocumentService) -> anyhow::Result<()> {
    match action {
        DocumentoCommand::Descargar { folio, salida } => {
            let bytes = documents.download(folio).await?;
            let path = salida.unwrap_or_else(|| PathBuf::from(format!("venta-{folio}.pdf")));

            std::fs::write(&path, &bytes)?;
            println!("documento guardado en {} ({} bytes)", path.display(), bytes.len());
            Ok(())
        }

        DocumentoCommand::Url { folio } => {
            println!("{}", documents.download_url(folio));
            Ok(())
        }
    }
}

pub async fn run_listado(documents: &DocumentService) -> anyhow::Result<()> {
    let issued = documents.list_issued().await?;
    if issued.is_empty() {
        println!("sin documentos emitidos");
        return Ok(());
    }
    for doc in &issued {
        println!(
            "folio {:>8}  {}  {}",
            doc.folio,
            doc.created_at.format("%d/%m/%Y %H:%M"),
            doc.file_name.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
