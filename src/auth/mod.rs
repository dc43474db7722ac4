pub mod backend;
pub mod controller;
pub mod state;
pub mod store;

pub use backend::IdentityBackend;
pub use controller::AuthSessionController;
pub use state::AuthState;
pub use store::{JsonFileTokenStore, MemoryTokenStore, TokenStore, ACCESS_TOKEN_KEY};
