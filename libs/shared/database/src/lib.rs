pub mod crud;
pub mod error;
pub mod inflight;
pub mod supabase;

pub use crud::{CrudAction, CrudRequest, DataClient, SelectScope};
pub use error::ClientError;
pub use inflight::{InFlightCounter, InFlightGuard};
pub use supabase::SupabaseClient;
