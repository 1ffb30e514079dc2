//! User create/edit modal and delete confirmation

use std::collections::BTreeSet;

use crate::access::{capabilities, Role};
use crate::error::Error;
use crate::models::{Id, User};
use crate::users::UserPayload;

/// How the company field of the form behaves
#[derive(Debug, Clone, PartialEq)]
pub enum CompanyField {
    /// Free choice among all companies (or none)
    Selectable(Option<Id>),
    /// Preset to the actor's own company and not editable
    Fixed(Option<Id>),
}

impl CompanyField {
    pub fn value(&self) -> Option<&Id> {
        match self {
            CompanyField::Selectable(id) | CompanyField::Fixed(id) => id.as_ref(),
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, CompanyField::Selectable(_))
    }
}

/// Fields of the create/edit form
#[derive(Debug, Clone, PartialEq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    /// Blank on edit means "keep the current password"
    pub password: String,
    pub role: Role,
    pub company: CompanyField,
    pub active: bool,
    /// Roles the actor may choose from
    pub role_options: BTreeSet<Role>,
    /// Error text shown inside the modal
    pub message: Option<String>,
}

impl UserForm {
    /// Empty form for a new account
    pub fn for_create(actor: &User) -> Result<Self, Error> {
        let role_options = capabilities(actor.role).assignable_roles;
        // least privileged option first
        let role = match role_options.iter().next_back() {
            Some(role) => *role,
            None => {
                return Err(Error::permission(format!(
                    "Role {} cannot create users",
                    actor.role
                )))
            }
        };

        Ok(Self {
            name: String::new(),
            email: String::new(),
            password: String::new(),
            role,
            company: company_field(actor, None),
            active: true,
            role_options,
            message: None,
        })
    }

    /// Form prefilled from an existing account, password left blank
    pub fn for_edit(actor: &User, target: &User) -> Result<Self, Error> {
        let caps = capabilities(actor.role);
        if !caps.can_manage(target.role) {
            return Err(Error::permission(format!(
                "Role {} cannot edit a {} account",
                actor.role, target.role
            )));
        }

        Ok(Self {
            name: target.name.clone(),
            email: target.email.clone(),
            password: String::new(),
            role: target.role,
            company: company_field(actor, target.company_id.clone()),
            active: target.active,
            role_options: caps.assignable_roles,
            message: None,
        })
    }

    pub fn set_role(&mut self, role: Role) -> Result<(), Error> {
        if !self.role_options.contains(&role) {
            return Err(Error::permission(format!("Role {} cannot be assigned here", role)));
        }
        self.role = role;
        Ok(())
    }

    pub fn set_company(&mut self, company_id: Option<Id>) -> Result<(), Error> {
        match &mut self.company {
            CompanyField::Selectable(current) => {
                *current = company_id;
                Ok(())
            }
            CompanyField::Fixed(_) => Err(Error::permission("The company cannot be changed")),
        }
    }

    /// Validate and build the request body.
    ///
    /// `creating` makes the password mandatory; otherwise a blank password is
    /// left out of the payload entirely.
    pub fn to_payload(&self, creating: bool) -> Result<UserPayload, Error> {
        let name = self.name.trim();
        let email = self.email.trim();

        if name.is_empty() {
            return Err(Error::validation("Name is required"));
        }
        if email.is_empty() {
            return Err(Error::validation("Email is required"));
        }
        if creating && self.password.is_empty() {
            return Err(Error::validation("Password is required"));
        }
        if !self.role_options.contains(&self.role) {
            return Err(Error::permission(format!(
                "Role {} cannot be assigned here",
                self.role
            )));
        }

        Ok(UserPayload {
            name: name.to_string(),
            email: email.to_string(),
            password: Some(self.password.clone()).filter(|p| !p.is_empty()),
            role: self.role,
            company_id: self.company.value().cloned(),
            active: self.active,
        })
    }
}

fn company_field(actor: &User, current: Option<Id>) -> CompanyField {
    if capabilities(actor.role).can_filter_by_company() {
        CompanyField::Selectable(current)
    } else {
        CompanyField::Fixed(actor.company_id.clone())
    }
}

/// The create/edit modal. At most one form is open.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum UserModal {
    #[default]
    Closed,
    Creating(UserForm),
    Editing { user_id: Id, form: UserForm },
}

impl UserModal {
    /// Open the create form, closing any form already open
    pub fn open_create(&mut self, actor: &User) -> Result<(), Error> {
        let form = UserForm::for_create(actor)?;
        *self = UserModal::Creating(form);
        Ok(())
    }

    /// Open the edit form for `target`, closing any form already open
    pub fn open_edit(&mut self, actor: &User, target: &User) -> Result<(), Error> {
        let form = UserForm::for_edit(actor, target)?;
        *self = UserModal::Editing {
            user_id: target.id.clone(),
            form,
        };
        Ok(())
    }

    pub fn close(&mut self) {
        *self = UserModal::Closed;
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, UserModal::Closed)
    }

    pub fn is_creating(&self) -> bool {
        matches!(self, UserModal::Creating(_))
    }

    pub fn is_editing(&self) -> bool {
        matches!(self, UserModal::Editing { .. })
    }

    /// Whether this is the create form (`None`) or the edit form of `user_id`
    pub fn is_for(&self, user_id: Option<&Id>) -> bool {
        match (self, user_id) {
            (UserModal::Creating(_), None) => true,
            (UserModal::Editing { user_id: open, .. }, Some(id)) => open == id,
            _ => false,
        }
    }

    pub fn form(&self) -> Option<&UserForm> {
        match self {
            UserModal::Closed => None,
            UserModal::Creating(form) | UserModal::Editing { form, .. } => Some(form),
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut UserForm> {
        match self {
            UserModal::Closed => None,
            UserModal::Creating(form) | UserModal::Editing { form, .. } => Some(form),
        }
    }

    pub(crate) fn set_message(&mut self, message: String) {
        if let Some(form) = self.form_mut() {
            form.message = Some(message);
        }
    }
}

/// Delete waiting for the user's confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteConfirmation {
    pub user_id: Id,
    pub name: String,
}
