//! Project access policy.
//!
//! Every mutating operation asks [`authorize`] whether the caller's
//! relationship to a project permits the action. Handlers never inspect
//! roles directly.

use serde::Serialize;
use thiserror::Error;

use crate::models::project::ProjectRole;

/// How a user relates to a project. A user with no relationship is
/// represented by `None` at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relationship {
    Owner,
    Member(ProjectRole),
}

impl Relationship {
    /// Name reported to clients: `owner` or the member role.
    pub fn as_str(self) -> &'static str {
        match self {
            Relationship::Owner => "owner",
            Relationship::Member(role) => role.as_str(),
        }
    }
}

impl Serialize for Relationship {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Something a caller wants to do inside a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Read the project, its tabs, test cases, comments, members; export.
    View,
    /// Rename the project or change its description.
    UpdateProject,
    DeleteProject,
    /// Add or rename tabs.
    EditTabs,
    /// Delete a tab together with its test cases.
    DeleteTab,
    /// Create, edit, delete or change the status of test cases; comment.
    WriteTestCases,
    /// Send, list and revoke invites; add members directly.
    ManageInvites,
    /// Change a member's role.
    ChangeMemberRole {
        target_is_self: bool,
        new_role: ProjectRole,
    },
    /// Remove a member from the project.
    RemoveMember { target_is_self: bool },
}

/// Reasons an action is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Project not found")]
    NotMember,

    #[error("Only the project owner can {0}")]
    OwnerOnly(&'static str),

    #[error("Your role ({role}) cannot {action}")]
    InsufficientRole {
        role: ProjectRole,
        action: &'static str,
    },

    #[error("You cannot elevate your own role")]
    SelfElevation,
}

/// Decide whether `relationship` may perform `action`.
pub fn authorize(relationship: Option<Relationship>, action: Action) -> Result<(), AccessError> {
    let role = match relationship {
        None => return Err(AccessError::NotMember),
        Some(Relationship::Owner) => return Ok(()),
        Some(Relationship::Member(role)) => role,
    };

    let deny = |action: &'static str| -> Result<(), AccessError> {
        Err(AccessError::InsufficientRole { role, action })
    };

    match action {
        Action::View => Ok(()),
        Action::UpdateProject => Err(AccessError::OwnerOnly("update this project")),
        Action::DeleteProject => Err(AccessError::OwnerOnly("delete this project")),
        Action::EditTabs | Action::WriteTestCases => {
            if role >= ProjectRole::Editor {
                Ok(())
            } else if action == Action::EditTabs {
                deny("edit tabs")
            } else {
                deny("modify test cases")
            }
        }
        Action::DeleteTab => {
            if role == ProjectRole::Admin {
                Ok(())
            } else {
                deny("delete tabs")
            }
        }
        Action::ManageInvites => {
            if role == ProjectRole::Admin {
                Ok(())
            } else {
                deny("manage members")
            }
        }
        Action::ChangeMemberRole {
            target_is_self,
            new_role,
        } => {
            if target_is_self && new_role > role {
                Err(AccessError::SelfElevation)
            } else if role == ProjectRole::Admin {
                Ok(())
            } else {
                deny("change member roles")
            }
        }
        Action::RemoveMember { target_is_self } => {
            // Leaving a project is always allowed.
            if target_is_self || role == ProjectRole::Admin {
                Ok(())
            } else {
                deny("remove members")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: Option<Relationship> = Some(Relationship::Member(ProjectRole::Admin));
    const EDITOR: Option<Relationship> = Some(Relationship::Member(ProjectRole::Editor));
    const VIEWER: Option<Relationship> = Some(Relationship::Member(ProjectRole::Viewer));
    const OWNER: Option<Relationship> = Some(Relationship::Owner);

    fn all_actions() -> Vec<Action> {
        vec![
            Action::View,
            Action::UpdateProject,
            Action::DeleteProject,
            Action::EditTabs,
            Action::DeleteTab,
            Action::WriteTestCases,
            Action::ManageInvites,
            Action::ChangeMemberRole {
                target_is_self: false,
                new_role: ProjectRole::Admin,
            },
            Action::RemoveMember {
                target_is_self: false,
            },
        ]
    }

    #[test]
    fn owner_may_do_everything() {
        for action in all_actions() {
            assert_eq!(authorize(OWNER, action), Ok(()), "{action:?}");
        }
    }

    #[test]
    fn strangers_may_do_nothing() {
        for action in all_actions() {
            assert_eq!(authorize(None, action), Err(AccessError::NotMember));
        }
    }

    #[test]
    fn viewer_is_read_only() {
        assert_eq!(authorize(VIEWER, Action::View), Ok(()));
        assert!(matches!(
            authorize(VIEWER, Action::WriteTestCases),
            Err(AccessError::InsufficientRole { .. })
        ));
        assert!(authorize(VIEWER, Action::EditTabs).is_err());
        assert!(authorize(VIEWER, Action::ManageInvites).is_err());
    }

    #[test]
    fn editor_writes_test_cases_but_not_membership() {
        assert_eq!(authorize(EDITOR, Action::WriteTestCases), Ok(()));
        assert_eq!(authorize(EDITOR, Action::EditTabs), Ok(()));
        assert!(authorize(EDITOR, Action::DeleteTab).is_err());
        assert!(authorize(EDITOR, Action::ManageInvites).is_err());
        assert!(
            authorize(
                EDITOR,
                Action::RemoveMember {
                    target_is_self: false
                }
            )
            .is_err()
        );
    }

    #[test]
    fn admin_manages_members_but_not_the_project() {
        assert_eq!(authorize(ADMIN, Action::ManageInvites), Ok(()));
        assert_eq!(authorize(ADMIN, Action::DeleteTab), Ok(()));
        assert_eq!(
            authorize(
                ADMIN,
                Action::ChangeMemberRole {
                    target_is_self: false,
                    new_role: ProjectRole::Viewer
                }
            ),
            Ok(())
        );
        assert!(matches!(
            authorize(ADMIN, Action::UpdateProject),
            Err(AccessError::OwnerOnly(_))
        ));
        assert!(matches!(
            authorize(ADMIN, Action::DeleteProject),
            Err(AccessError::OwnerOnly(_))
        ));
    }

    #[test]
    fn members_cannot_elevate_themselves() {
        assert_eq!(
            authorize(
                EDITOR,
                Action::ChangeMemberRole {
                    target_is_self: true,
                    new_role: ProjectRole::Admin
                }
            ),
            Err(AccessError::SelfElevation)
        );
        assert_eq!(
            authorize(
                VIEWER,
                Action::ChangeMemberRole {
                    target_is_self: true,
                    new_role: ProjectRole::Editor
                }
            ),
            Err(AccessError::SelfElevation)
        );
        // Stepping down is fine for an admin.
        assert_eq!(
            authorize(
                ADMIN,
                Action::ChangeMemberRole {
                    target_is_self: true,
                    new_role: ProjectRole::Viewer
                }
            ),
            Ok(())
        );
    }

    #[test]
    fn only_admins_change_roles_even_downwards() {
        for rel in [EDITOR, VIEWER] {
            assert!(matches!(
                authorize(
                    rel,
                    Action::ChangeMemberRole {
                        target_is_self: true,
                        new_role: ProjectRole::Viewer
                    }
                ),
                Err(AccessError::InsufficientRole { .. })
            ));
        }
    }

    #[test]
    fn any_member_may_leave() {
        for rel in [ADMIN, EDITOR, VIEWER] {
            assert_eq!(
                authorize(
                    rel,
                    Action::RemoveMember {
                        target_is_self: true
                    }
                ),
                Ok(())
            );
        }
    }

    #[test]
    fn relationship_names() {
        assert_eq!(Relationship::Owner.as_str(), "owner");
        assert_eq!(Relationship::Member(ProjectRole::Editor).as_str(), "editor");
    }
}
