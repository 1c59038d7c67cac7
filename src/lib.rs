// Gestión de cobranzas: clientes con cuota fija mensual, pagos, compromisos,
// plantillas de aviso y generación automática de facturación.

pub mod billing;
pub mod config;
pub mod errors;
pub mod lookup;
pub mod models;
pub mod notify;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
