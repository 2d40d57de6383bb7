use super::*;

use crate::{AccountChanges, NewUserAccount, UpsertUserRoleGrant, UserRoleGrantView};
use warden_domain::{EmailAddress, EmployeeId, Username, validate_password};

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn replace_text(current: Option<String>, update: Option<String>) -> Option<String> {
    match update {
        Some(value) => optional_text(Some(value)),
        None => current,
    }
}

impl GrantService {
    /// Creates an account and gives it an initial role.
    ///
    /// The requested role is used when it exists and is active, otherwise
    /// the configured default role when that is active. An account without
    /// any role is allowed.
    pub async fn create_user(
        &self,
        input: CreateUserInput,
        actor: Option<UserId>,
    ) -> AppResult<MutationOutcome<CreatedUser>> {
        let username = Username::new(input.username)?;
        let email = optional_text(input.email).map(EmailAddress::new).transpose()?;
        let employee_id = optional_text(input.employee_id)
            .map(EmployeeId::new)
            .transpose()?;
        validate_password(&input.password, username.as_str())?;
        let password_hash = self.password_hasher.hash_password(&input.password)?;

        let account = self
            .users
            .create_user(NewUserAccount {
                username,
                email,
                first_name: input.first_name.trim().to_owned(),
                last_name: input.last_name.trim().to_owned(),
                employee_id,
                position: optional_text(input.position),
                department: optional_text(input.department),
                phone: optional_text(input.phone),
                is_staff: input.is_staff,
                is_superuser: input.is_superuser,
                password_hash,
            })
            .await?;

        info!(user_id = %account.id, username = account.username.as_str(), "user created");

        let requested = match input.role_id {
            Some(role_id) => {
                let role = self
                    .roles
                    .find_role(role_id)
                    .await?
                    .filter(|role| role.is_active);
                if role.is_none() {
                    warn!(%role_id, "requested initial role is missing or inactive; using default role");
                }
                role
            }
            None => None,
        };

        let role = match requested {
            Some(role) => Some(role),
            None => {
                self.policy_role(self.policy.default_role(), self.policy.default_role_name())
                    .await?
            }
        };

        let Some(role) = role else {
            warn!(
                user_id = %account.id,
                default_role = self.policy.default_role_name(),
                "user created without a role"
            );
            return Ok(MutationOutcome {
                value: CreatedUser {
                    account,
                    role: None,
                },
                mirror: MirrorStatus::NotLinked,
            });
        };

        self.grants
            .upsert_user_role_grant(UpsertUserRoleGrant {
                user_id: account.id,
                role_id: role.id,
                assigned_by: actor,
                expires_at: None,
            })
            .await?;

        info!(user_id = %account.id, role = role.name.as_str(), "initial role assigned");

        let mirror = self.mirror.add_member(&role, account.id).await;
        Self::log_mirror("create_user", &mirror);

        Ok(MutationOutcome {
            value: CreatedUser {
                account,
                role: Some(role),
            },
            mirror,
        })
    }

    /// Applies a partial account update.
    ///
    /// When the active flag changes, the mirror groups of every role the
    /// user holds are reconciled so membership follows the account state.
    pub async fn update_user(
        &self,
        user_id: UserId,
        input: UpdateUserInput,
    ) -> AppResult<MutationOutcome<UserAccount>> {
        let current = self.require_user(user_id).await?;

        let username = match input.username {
            Some(username) => Username::new(username)?,
            None => current.username.clone(),
        };
        let email = match input.email {
            Some(email) => optional_text(Some(email)).map(EmailAddress::new).transpose()?,
            None => current.email.clone(),
        };
        let employee_id = match input.employee_id {
            Some(employee_id) => optional_text(Some(employee_id))
                .map(EmployeeId::new)
                .transpose()?,
            None => current.employee_id.clone(),
        };
        let is_active = input.is_active.unwrap_or(current.is_active);

        let changes = AccountChanges {
            username,
            email,
            first_name: input
                .first_name
                .map_or_else(|| current.first_name.clone(), |name| name.trim().to_owned()),
            last_name: input
                .last_name
                .map_or_else(|| current.last_name.clone(), |name| name.trim().to_owned()),
            employee_id,
            position: replace_text(current.position.clone(), input.position),
            department: replace_text(current.department.clone(), input.department),
            phone: replace_text(current.phone.clone(), input.phone),
            is_active,
            is_staff: input.is_staff.unwrap_or(current.is_staff),
            is_superuser: input.is_superuser.unwrap_or(current.is_superuser),
        };

        let account = self
            .users
            .update_user(user_id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        info!(user_id = %account.id, is_active = account.is_active, "user updated");

        let mirror = if current.is_active == account.is_active {
            MirrorStatus::NotLinked
        } else {
            let grants = self.grants.list_user_role_grants(user_id).await?;
            self.resync_user_groups(&grants).await
        };
        Self::log_mirror("update_user", &mirror);

        Ok(MutationOutcome {
            value: account,
            mirror,
        })
    }

    /// Deletes an account and reconciles the mirror groups of its roles.
    pub async fn delete_user(&self, user_id: UserId) -> AppResult<MutationOutcome<UserAccount>> {
        let account = self.require_user(user_id).await?;
        let grants = self.grants.list_user_role_grants(user_id).await?;

        if !self.users.delete_user(user_id).await? {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }

        info!(user_id = %account.id, username = account.username.as_str(), "user deleted");

        let mirror = self.resync_user_groups(&grants).await;
        Self::log_mirror("delete_user", &mirror);

        Ok(MutationOutcome {
            value: account,
            mirror,
        })
    }

    async fn resync_user_groups(&self, grants: &[UserRoleGrantView]) -> MirrorStatus {
        let mut status = MirrorStatus::NotLinked;
        for view in grants
            .iter()
            .filter(|view| view.role.legacy_group_id.is_some())
        {
            status = status.and(self.mirror.sync_role_status(view.role.id).await);
        }
        status
    }
}
