pub use super::attachments::Entity as Attachments;
pub use super::patients::Entity as Patients;
