//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use serde::{Deserialize, Serialize};

use super::state::{StoredTimeslot, UserRecord};

// ============================================
// AUTH DTOs
// ============================================

/// `POST /auth` request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth` response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseBody {
    pub access_token: String,
    pub user: UserSummary,
}

// ============================================
// USER DTOs
// ============================================

/// `POST /user` request, in the registration form's field names
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserRequest {
    pub user_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    pub email: String,
    pub password: String,
    pub age: u32,
    #[serde(rename = "direccion", default)]
    pub address: String,
    #[serde(rename = "rol")]
    pub role: String,
}

/// Public view of a user; never includes the password
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub user_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(rename = "rol")]
    pub role: String,
}

impl From<UserRecord> for UserSummary {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name,
            last_name: user.last_name,
            email: user.email,
            role: user.role,
        }
    }
}

// ============================================
// TIMESLOT DTOs
// ============================================

/// `GET /timeslots` response
#[derive(Debug, Serialize)]
pub struct TimeslotListResponse {
    pub timeslots: Vec<StoredTimeslot>,
    pub count: usize,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy"
    pub status: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Open chat connections
    pub chat_connections: usize,
    /// Server version
    pub version: String,
}
