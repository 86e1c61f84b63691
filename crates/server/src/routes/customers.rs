use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use store::CustomerRecord;

/// Request to create a customer
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
}

/// Customer response shape
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl From<CustomerRecord> for CustomerResponse {
    fn from(record: CustomerRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// Create a customer
pub async fn create_customer(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<CreateCustomerRequest>,
) -> ServerResult<impl IntoResponse> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(ServerError::BadRequest("name must not be empty".into()));
    }

    let record = CustomerRecord::new(name);
    state.store.insert_customer(&record)?;

    Ok(Json(CustomerResponse::from(record)))
}

/// List customers
pub async fn list_customers(
    State(state): State<Arc<ServerState>>,
) -> ServerResult<impl IntoResponse> {
    let customers: Vec<CustomerResponse> = state
        .store
        .list_customers()?
        .into_iter()
        .map(CustomerResponse::from)
        .collect();

    Ok(Json(customers))
}
