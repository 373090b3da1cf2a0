//! Who may see or change a survey.
//!
//! Callers turn a `false` into [`CoreError::NotFound`](crate::error::CoreError)
//! so a denied caller cannot distinguish "not yours" from "does not exist".

use crate::roles::is_admin;
use crate::status::SurveyVisibility;
use crate::types::DbId;

/// The identity making a request, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer<'a> {
    pub user_id: DbId,
    pub role: &'a str,
}

/// Whether `viewer` may read aggregated statistics.
///
/// Owners and admins always may. Anyone else needs an identity and a recorded
/// response, and only on anonymous-visibility surveys; participants of public
/// surveys are denied.
pub fn can_view_statistics(
    viewer: Option<Viewer<'_>>,
    owner_id: DbId,
    visibility: SurveyVisibility,
    has_responded: bool,
) -> bool {
    let Some(viewer) = viewer else {
        return false;
    };
    if viewer.user_id == owner_id || is_admin(viewer.role) {
        return true;
    }
    visibility == SurveyVisibility::Anonymous && has_responded
}

/// Whether `viewer` may update, close, delete, export, or manage the
/// notification rules of a survey.
pub fn can_manage_survey(viewer: Viewer<'_>, owner_id: DbId) -> bool {
    viewer.user_id == owner_id || is_admin(viewer.role)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::{ROLE_ADMIN, ROLE_USER};

    const OWNER: DbId = 1;

    fn user(id: DbId) -> Option<Viewer<'static>> {
        Some(Viewer {
            user_id: id,
            role: ROLE_USER,
        })
    }

    #[test]
    fn owner_and_admin_always_see_statistics() {
        assert!(can_view_statistics(
            user(OWNER),
            OWNER,
            SurveyVisibility::Public,
            false
        ));
        let admin = Some(Viewer {
            user_id: 99,
            role: ROLE_ADMIN,
        });
        assert!(can_view_statistics(
            admin,
            OWNER,
            SurveyVisibility::Public,
            false
        ));
    }

    #[test]
    fn anonymous_caller_is_denied() {
        assert!(!can_view_statistics(
            None,
            OWNER,
            SurveyVisibility::Anonymous,
            true
        ));
    }

    #[test]
    fn participant_sees_anonymous_survey_statistics() {
        assert!(can_view_statistics(
            user(2),
            OWNER,
            SurveyVisibility::Anonymous,
            true
        ));
        assert!(!can_view_statistics(
            user(2),
            OWNER,
            SurveyVisibility::Anonymous,
            false
        ));
    }

    #[test]
    fn participant_of_public_survey_is_denied() {
        assert!(!can_view_statistics(
            user(2),
            OWNER,
            SurveyVisibility::Public,
            true
        ));
    }

    #[test]
    fn only_owner_or_admin_manage() {
        let stranger = Viewer {
            user_id: 2,
            role: ROLE_USER,
        };
        let admin = Viewer {
            user_id: 3,
            role: ROLE_ADMIN,
        };
        assert!(!can_manage_survey(stranger, OWNER));
        assert!(can_manage_survey(admin, OWNER));
        assert!(can_manage_survey(
            Viewer {
                user_id: OWNER,
                role: ROLE_USER
            },
            OWNER
        ));
    }
}
