//! User account management.
//!
//! This module contains everything related to user accounts:
//! - The `User` model, `UserID` newtype, and `Role` enum
//! - Database functions for storing and querying accounts
//! - Route handlers for registration, listing, and role management

mod core;
mod delete_user_endpoint;
mod get_user_endpoint;
mod list_users_endpoint;
mod register_endpoint;
mod set_role_endpoint;

pub use core::{
    NewUser, Role, User, UserID, count_users, create_user, create_user_table, delete_user,
    get_user_by_email, get_user_by_id, list_users, set_user_role,
};
pub use delete_user_endpoint::delete_user_endpoint;
pub use get_user_endpoint::get_user_endpoint;
pub use list_users_endpoint::list_users_endpoint;
pub use register_endpoint::register_user_endpoint;
pub use set_role_endpoint::set_role_endpoint;
