use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for a payment
pub type PaymentId = Uuid;

/// unique identifier for a cash-box entry
pub type CashEntryId = Uuid;

/// unique identifier for a client
pub type ClientId = Uuid;

/// unique identifier for a user (admin or collector)
pub type UserId = Uuid;

/// loan status, derived from cumulative payments vs. total payable
///
/// Never set directly by callers; recomputed on every payment mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// still collecting
    #[serde(rename = "ACTIVO")]
    Active,
    /// cumulative payments reached the total payable
    #[serde(rename = "INACTIVO")]
    Inactive,
}

/// how a payment was handed in; used only for report segmentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    #[serde(rename = "EFECTIVO")]
    Cash,
    #[serde(rename = "CON-SUPERVISOR")]
    WithSupervisor,
    #[serde(rename = "CON-JEFE")]
    WithBoss,
}

impl PaymentType {
    /// supervisor and boss payments are bank deposits (consignaciones)
    pub fn is_consignacion(&self) -> bool {
        matches!(self, PaymentType::WithSupervisor | PaymentType::WithBoss)
    }
}

/// manual cash-box movement category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CashCategory {
    #[serde(rename = "ENTRADA")]
    Entrada,
    #[serde(rename = "SALIDA")]
    Salida,
    #[serde(rename = "GASTO")]
    Gasto,
    #[serde(rename = "ENTRADA_RUTA")]
    EntradaRuta,
    #[serde(rename = "SALIDA_RUTA")]
    SalidaRuta,
}

impl CashCategory {
    /// true when the category adds money to the cash box
    pub fn is_inflow(&self) -> bool {
        matches!(self, CashCategory::Entrada | CashCategory::EntradaRuta)
    }
}

/// user role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "COBRADOR")]
    Cobrador,
}

/// who is performing a mutation
///
/// Passed explicitly into every mutating operation instead of being read
/// from ambient session state, so role checks are testable in isolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    pub fn cobrador(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Cobrador,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
