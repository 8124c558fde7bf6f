use crate::model::UserId;
use serde::{Deserialize, Serialize};

/// The authenticated user operating the dashboard.
///
/// Passed explicitly to the workflow when it is built; nothing reads the user from
/// ambient state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
}

impl CurrentUser {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
