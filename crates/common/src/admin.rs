//! Admin capability policy
//!
//! Explicit capability table keyed on (entity, action), checked before any
//! administrative operation. Contact requests are an intentional asymmetry:
//! they can be viewed and deleted but never added or edited, so the store
//! only ever holds what the public intake path wrote.

use crate::errors::{AppError, Result};

/// Entities exposed on the administrative surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminEntity {
    Articles,
    ContactRequests,
}

impl AdminEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminEntity::Articles => "articles",
            AdminEntity::ContactRequests => "contact requests",
        }
    }
}

/// Actions an administrator can attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminAction {
    View,
    Add,
    Edit,
    Delete,
}

impl AdminAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminAction::View => "view",
            AdminAction::Add => "add",
            AdminAction::Edit => "edit",
            AdminAction::Delete => "delete",
        }
    }
}

/// The capability table
pub fn allows(entity: AdminEntity, action: AdminAction) -> bool {
    match (entity, action) {
        (AdminEntity::Articles, _) => true,
        (AdminEntity::ContactRequests, AdminAction::Add) => false,
        (AdminEntity::ContactRequests, AdminAction::Edit) => false,
        (AdminEntity::ContactRequests, AdminAction::View) => true,
        (AdminEntity::ContactRequests, AdminAction::Delete) => true,
    }
}

/// Check the capability table, failing with a permission error
pub fn require(entity: AdminEntity, action: AdminAction) -> Result<()> {
    if allows(entity, action) {
        Ok(())
    } else {
        Err(AppError::Forbidden {
            message: format!("{} is not permitted on {}", action.as_str(), entity.as_str()),
        })
    }
}
