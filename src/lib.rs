//! Salesforce tables: expose Salesforce objects as filterable tables.
//!
//! Column schemas are derived from describe metadata, relational qualifiers become
//! SOQL WHERE clauses, and reads survive one session expiry per request.

pub mod case;
pub mod catalog;
pub mod config;
pub mod connector;
pub mod error;
pub mod executor;
pub mod organization;
pub mod record;
pub mod schema;
pub mod session;
pub mod soql;
pub mod transport;

pub use catalog::build_catalog;
pub use config::{load_from_dotenv, load_from_env, load_from_path, resolve_auth_method, ConnectionConfig, NamingConvention};
pub use connector::{Connector, ConnectorBuilder};
pub use error::{ConfigError, ConnectorError, RemoteError};
pub use executor::{Executor, ExpiryPredicate};
pub use organization::OrgIdCache;
pub use record::Row;
pub use schema::{Column, ColumnType, Table, TableDefinition};
pub use session::{HttpAuthClient, Session, SessionManager, SessionStore};
pub use soql::{Operator, Qual, QualMap, QualValue};
pub use transport::{RestTransport, Transport};
