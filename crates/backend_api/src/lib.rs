pub mod error;
pub mod handlers;
pub mod repository;
pub mod router;
pub mod server;
pub mod session;

pub use error::{ApiError, Result};
pub use handlers::{AppState, SharedState};
pub use repository::{validate_user_id, ExpenseRepository, FileExpenseRepository};
pub use router::create_router;
pub use server::{init_tracing, run_server};
pub use session::{AnalysisSession, FetchTicket};
