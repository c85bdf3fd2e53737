//! Domain models for the callflow processor
//!
//! Upstream entities (Call, Connection, CallEvent, Operator) as fetched from
//! the paginated sources, and the two sink-specific CDR projections.

pub mod call;
pub mod call_event;
pub mod cdr;
pub mod connection;
pub mod external_cdr;
pub mod operator;

pub use call::Call;
pub use call_event::CallEvent;
pub use cdr::Cdr;
pub use connection::Connection;
pub use external_cdr::ExternalCdrRecord;
pub use operator::Operator;
