//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod dashboard_repo;
pub mod notification_rule_repo;
pub mod question_repo;
pub mod response_repo;
pub mod survey_repo;
pub mod template_repo;

pub use dashboard_repo::DashboardRepo;
pub use notification_rule_repo::NotificationRuleRepo;
pub use question_repo::QuestionRepo;
pub use response_repo::ResponseRepo;
pub use survey_repo::{SurveyRepo, SurveyUpdate};
pub use template_repo::TemplateRepo;
