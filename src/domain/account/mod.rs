//! Account aggregate
//!
//! Contains the Account entity, command DTOs, and the store interfaces.

pub mod model;
pub mod repository;

mod dto_change_password;
mod dto_create;
mod dto_update;

pub use model::{Account, AccountView};

pub use dto_change_password::ChangePasswordDto;
pub use dto_create::CreateAccountDto;
pub use dto_update::UpdateAccountDto;

pub use repository::{AccountProfile, AccountRepository, CredentialStore, NewAccount};
