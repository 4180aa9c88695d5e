//! # Registry Commands
//!
//! Client registry plus the read-only warehouse and product lookups.

use clap::{Subcommand, ValueEnum};

use notaventa_client::{CatalogService, ClientPayload, ClientService};
use notaventa_core::{validation, ClientKind};

#[derive(Subcommand)]
pub enum ClientesCommand {
    /// Lista los clientes de la empresa
    Listar,

    /// Registra un cliente nuevo
    Crear {
        #[arg(long, value_enum)]
        tipo: TipoCliente,

        /// RUT con dígito verificador, p. ej. 12345678-5
        #[arg(long)]
        rut: String,

        /// Nombre o razón social según el tipo
        #[arg(long)]
        nombre: String,
    },

    /// Elimina un cliente
    Eliminar {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TipoCliente {
    Empresa,
    Persona,
}

impl From<TipoCliente> for ClientKind {
    fn from(tipo: TipoCliente) -> Self {
        match tipo {
            TipoCliente::Empresa => ClientKind::Company,
            TipoCliente::Persona => ClientKind::Natural,
        }
    }
}

pub async fn run_clientes(action: ClientesCommand, clients: &ClientService) -> anyhow::Result<()> {
    match action {
        ClientesCommand::Listar => {
            let rows = clients.list().await?;
            if rows.is_empty() {
                println!("sin clientes registrados");
                return Ok(());
            }
            for client in &rows {
                println!(
                    "{:>6}  {:<14}  {:<40}  {}",
                    client.id,
                    client.rut,
                    client.name,
                    match client.kind {
                        ClientKind::Company => "empresa",
                        ClientKind::Natural => "persona",
                    }
                );
            }
            Ok(())
        }

        ClientesCommand::Crear { tipo, rut, nombre } => {
            validation::validate_rut(&rut)?;

            let payload = ClientPayload::new(ClientKind::from(tipo), &rut, &nombre);
            let client = clients.create(&payload).await?;
            println!("cliente {} registrado con id {}", client.name, client.id);
            Ok(())
        }

        ClientesCommand::Eliminar { id } => {
            clients.delete(id).await?;
            println!("cliente {id} eliminado");
            Ok(())
        }
    }
}

pub async fn run_bodegas(catalog: &CatalogService) -> anyhow::Result<()> {
    let warehouses = catalog.warehouses().await?;
    if warehouses.is_empty() {
        println!("la empresa no tiene bodegas");
        return Ok(());
    }
    for warehouse in &warehouses {
        println!(
            "{:>6}  {:<30}  {}",
            warehouse.id,
            warehouse.name,
            warehouse.location.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub async fn run_productos(catalog: &CatalogService, bodega: i64) -> anyhow::Result<()> {
    let products = catalog.products_in_warehouse(bodega).await?;
    if products.is_empty() {
        println!("sin productos disponibles en la bodega {bodega}");
        return Ok(());
    }
    for product in &products {
        println!(
            "{:>8}  {:<50}  stock {:>5}  {}",
            product.id,
            product.title,
            product.available_quantity,
            product
                .price
                .map(|p| p.to_string())
                .unwrap_or_else(|| "sin precio".to_string())
        );
    }
    Ok(())
}
