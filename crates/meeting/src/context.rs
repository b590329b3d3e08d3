//! Who is calling.

use serde_json::Value;

use crate::records::UserId;

/// The two caller roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Owns a timetable and receives bookings.
    Professional,
    /// Books meetings with professionals.
    Client,
}

impl Role {
    /// A user is a professional when their profile data carries a
    /// `professional` key, whatever its value.
    pub fn from_user_data(data: &serde_json::Map<String, Value>) -> Self {
        if data.contains_key("professional") {
            Role::Professional
        } else {
            Role::Client
        }
    }
}

/// The caller of one request and the options document of the deployment.
#[derive(Debug, Clone)]
pub struct RequestContext {
    user: UserId,
    role: Role,
    options: Value,
}

impl RequestContext {
    pub fn new(user: impl Into<UserId>, role: Role) -> Self {
        Self {
            user: user.into(),
            role,
            options: Value::Null,
        }
    }

    /// Attach the options document used to resolve collection names.
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_professional(&self) -> bool {
        self.role == Role::Professional
    }

    pub fn options(&self) -> &Value {
        &self.options
    }
}
