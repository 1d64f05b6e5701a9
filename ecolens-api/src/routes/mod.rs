/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and profile endpoints
/// - `emissions`: Recording, listing and deleting emissions
/// - `dashboard`: Period-scoped dashboard stats
/// - `impact`: Carbon impact equivalents

pub mod auth;
pub mod dashboard;
pub mod emissions;
pub mod health;
pub mod impact;
