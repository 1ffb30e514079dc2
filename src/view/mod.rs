//! Headless view-model of the client
//!
//! Nothing here draws anything. The types hold what a screen shows and the
//! transitions user actions trigger; [`render`] turns them into plain text.

pub mod dashboard;
pub mod debounce;
pub mod guard;
pub mod leads;
pub mod login;
pub mod render;
pub mod user_form;

pub use dashboard::{Dashboard, DashboardState, LeadsRequest};
pub use leads::{truncate_message, LeadDetail, LeadList, LeadRow};
pub use login::LoginForm;
pub use user_form::{CompanyField, DeleteConfirmation, UserForm, UserModal};
