//! # Client Registry Service
//!
//! CRUD over buyer records. The sale workflow only reads from here; the
//! registry exists so a sale can attach a buyer and a factura can carry a
//! proper razon social.

use serde::{Deserialize, Serialize};
use tracing::info;

use notaventa_core::{Client, ClientKind};

use crate::error::{ClientError, ClientResult};
use crate::http::{data_as, Api};

// =============================================================================
// Wire Types
// =============================================================================

/// A buyer row as the backend returns it. Natural persons carry `nombre`,
/// companies `razon_social`; the domain type folds both into one name.
#[derive(Debug, Deserialize)]
struct ClientWire {
    id: i64,
    tipo_cliente_id: i64,
    rut: String,
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default)]
    razon_social: Option<String>,
    #[serde(default)]
    direccion: Option<String>,
    #[serde(default)]
    ciudad: Option<String>,
    #[serde(default)]
    extranjero: bool,
}

impl TryFrom<ClientWire> for Client {
    type Error = ClientError;

    fn try_from(wire: ClientWire) -> ClientResult<Client> {
        let kind =
            ClientKind::from_id(wire.tipo_cliente_id).ok_or(ClientError::UnexpectedEnvelope)?;
        let name = match kind {
            ClientKind::Company => wire.razon_social.or(wire.nombre),
            ClientKind::Natural => wire.nombre.or(wire.razon_social),
        }
        .unwrap_or_default();

        Ok(Client {
            id: wire.id,
            kind,
            rut: wire.rut,
            name,
            address: wire.direccion,
            city: wire.ciudad,
            foreign: wire.extranjero,
        })
    }
}

/// Outbound payload for create/update.
#[derive(Debug, Clone, Serialize)]
pub struct ClientPayload {
    pub tipo_cliente_id: i64,
    pub rut: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub razon_social: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ciudad: Option<String>,
    pub extranjero: bool,
}

impl ClientPayload {
    /// Builds the payload for a new buyer, putting the name in the field
    /// the backend expects for that client kind.
    pub fn new(kind: ClientKind, rut: &str, name: &str) -> Self {
        let (nombre, razon_social) = match kind {
            ClientKind::Natural => (Some(name.to_string()), None),
            ClientKind::Company => (None, Some(name.to_string())),
        };

        ClientPayload {
            tipo_cliente_id: kind.as_id(),
            rut: rut.to_string(),
            nombre,
            razon_social,
            direccion: None,
            ciudad: None,
            extranjero: false,
        }
    }
}

// =============================================================================
// Service
// =============================================================================

/// Buyer registry operations.
#[derive(Debug, Clone)]
pub struct ClientService {
    api: Api,
}

impl ClientService {
    pub fn new(api: Api) -> Self {
        ClientService { api }
    }

    /// Lists every buyer of the session's company.
    pub async fn list(&self) -> ClientResult<Vec<Client>> {
        let path = format!("clients/{}", self.api.session().company_id);
        let body = self
            .api
            .get(&path, &[], "la lista de clientes no fue encontrada")
            .await?;

        let wires: Vec<ClientWire> = data_as(body)?;
        wires.into_iter().map(Client::try_from).collect()
    }

    /// Fetches one buyer.
    pub async fn get(&self, client_id: i64) -> ClientResult<Client> {
        let path = format!("client/{}/{}", self.api.session().company_id, client_id);
        let not_found = format!("el cliente {client_id} no fue encontrado");

        let body = self.api.get(&path, &[], &not_found).await?;
        Client::try_from(data_as::<ClientWire>(body)?)
    }

    /// Registers a new buyer and returns it with its backend id.
    pub async fn create(&self, payload: &ClientPayload) -> ClientResult<Client> {
        let body = serde_json::to_value(payload).map_err(|_| ClientError::UnexpectedEnvelope)?;
        let response = self
            .api
            .post("client", &body, "el registro de clientes no fue encontrado")
            .await?;

        let client = Client::try_from(data_as::<ClientWire>(response)?)?;
        info!(client_id = client.id, "cliente registrado");
        Ok(client)
    }

    /// Replaces a buyer's record.
    pub async fn update(&self, client_id: i64, payload: &ClientPayload) -> ClientResult<()> {
        let body = serde_json::to_value(payload).map_err(|_| ClientError::UnexpectedEnvelope)?;
        let path = format!("client/{client_id}");
        let not_found = format!("el cliente {client_id} no fue encontrado");

        self.api.put(&path, &body, &not_found).await?;
        info!(client_id, "cliente actualizado");
        Ok(())
    }

    /// Removes a buyer.
    pub async fn delete(&self, client_id: i64) -> ClientResult<()> {
        let path = format!("client/{}/{}", self.api.session().company_id, client_id);
        let not_found = format!("el cliente {client_id} no fue encontrado");

        self.api.delete(&path, &not_found).await?;
        info!(client_id, "cliente eliminado");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_company_wire_uses_razon_social() {
        let wire: ClientWire = serde_json::from_value(json!({
            "id": 5,
            "tipo_cliente_id": 1,
            "rut": "76123456-0",
            "razon_social": "Comercial Andes SpA",
            "direccion": "Av. Las Torres 100",
            "ciudad": "Santiago"
        }))
        .unwrap();

        let client = Client::try_from(wire).unwrap();
        assert_eq!(client.kind, ClientKind::Company);
        assert_eq!(client.name, "Comercial Andes SpA");
        assert!(!client.foreign);
    }

    #[test]
    fn test_natural_wire_uses_nombre() {
        let wire: ClientWire = serde_json::from_value(json!({
            "id": 6,
            "tipo_cliente_id": 2,
            "rut": "12345678-5",
            "nombre": "Ana Rojas",
            "extranjero": false
        }))
        .unwrap();

        let client = Client::try_from(wire).unwrap();
        assert_eq!(client.kind, ClientKind::Natural);
        assert_eq!(client.name, "Ana Rojas");
    }

    #[test]
    fn test_unknown_client_kind_is_rejected() {
        let wire: ClientWire = serde_json::from_value(json!({
            "id": 6,
            "tipo_cliente_id": 9,
            "rut": "12345678-5"
        }))
        .unwrap();

        assert!(matches!(
            Client::try_from(wire),
            Err(ClientError::UnexpectedEnvelope)
        ));
    }

    #[test]
    fn test_payload_places_name_by_kind() {
        let natural = serde_json::to_value(ClientPayload::new(
            ClientKind::Natural,
            "12345678-5",
            "Ana Rojas",
        ))
        .unwrap();
        assert_eq!(natural["tipo_cliente_id"], json!(2));
        assert_eq!(natural["nombre"], json!("Ana Rojas"));
        assert!(natural.get("razon_social").is_none());

        let company = serde_json::to_value(ClientPayload::new(
            ClientKind::Company,
            "76123456-0",
            "Comercial Andes SpA",
        ))
        .unwrap();
        assert_eq!(company["tipo_cliente_id"], json!(1));
        assert_eq!(company["razon_social"], json!("Comercial Andes SpA"));
        assert!(company.get("nombre").is_none());
    }
}
