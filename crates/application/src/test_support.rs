//! In-memory port implementations shared by service tests.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use warden_core::{AppError, AppResult, UserId, UserIdentity};
use warden_domain::{
    AuditAction, GrantId, LegacyCapability, LegacyCapabilityId, LegacyGroup, LegacyGroupId,
    Permission, PermissionCategory, PermissionId, PermissionName, Project, ProjectAssignment,
    ProjectId, Role, RoleColor, RoleId, RoleName, RolePermissionGrant, UserAccount,
    UserRoleGrant, Username,
};

use crate::{
    AccessGate, AuditEvent, AuditRepository, BootstrapService, CreatePermissionInput,
    CreateRoleInput, GrantRepository, GrantService, LegacyAuthRepository, MirrorSyncService,
    AccountChanges, NewUserAccount, PasswordHasher, PermissionRepository, PermissionResolver, ProjectRepository,
    ProjectService, RbacPolicy, RbacPolicySettings, RoleHolderView, RolePermissionGrantView,
    RoleReassignment, RoleRepository, SaveProjectInput, SecurityAdminService, SessionService,
    UpdateRoleInput, UpsertUserRoleGrant, UserAdminService, UserCredentials,
    UserDirectoryRepository, UserRoleGrantView,
};

#[derive(Default)]
pub(crate) struct FakeState {
    pub(crate) users: Vec<UserAccount>,
    pub(crate) password_hashes: Vec<(UserId, String)>,
    pub(crate) roles: Vec<Role>,
    pub(crate) permissions: Vec<Permission>,
    pub(crate) user_roles: Vec<UserRoleGrant>,
    pub(crate) role_permissions: Vec<RolePermissionGrant>,
    pub(crate) projects: Vec<Project>,
    pub(crate) assignments: Vec<ProjectAssignment>,
    pub(crate) groups: Vec<LegacyGroup>,
    pub(crate) capabilities: Vec<LegacyCapability>,
    pub(crate) group_capabilities: BTreeSet<(i64, i64)>,
    pub(crate) group_members: BTreeSet<(i64, UserId)>,
    pub(crate) audit_events: Vec<AuditEvent>,
    /// Grant written by a concurrent request just before the next role delete runs.
    pub(crate) assign_before_delete: Option<UpsertUserRoleGrant>,
    next_legacy_id: i64,
}

impl FakeState {
    fn next_legacy_id(&mut self) -> i64 {
        self.next_legacy_id += 1;
        self.next_legacy_id
    }

    fn upsert_user_role(&mut self, input: UpsertUserRoleGrant) -> UserRoleGrant {
        let now = Utc::now();
        if let Some(grant) = self
            .user_roles
            .iter_mut()
            .find(|grant| grant.user_id == input.user_id && grant.role_id == input.role_id)
        {
            grant.is_active = true;
            grant.assigned_by = input.assigned_by;
            grant.assigned_at = now;
            grant.expires_at = input.expires_at;
            return grant.clone();
        }

        let grant = UserRoleGrant {
            id: GrantId::new(),
            user_id: input.user_id,
            role_id: input.role_id,
            assigned_by: input.assigned_by,
            assigned_at: now,
            expires_at: input.expires_at,
            is_active: true,
        };
        self.user_roles.push(grant.clone());
        grant
    }

    fn with_member_count(&self, project: &Project) -> Project {
        let member_count = self
            .assignments
            .iter()
            .filter(|assignment| assignment.project_id == project.id && assignment.is_active)
            .filter(|assignment| {
                self.users
                    .iter()
                    .any(|user| user.id == assignment.user_id && user.is_active)
            })
            .count();

        Project {
            member_count: u32::try_from(member_count).unwrap_or(u32::MAX),
            ..project.clone()
        }
    }
}

/// Single in-memory store implementing every port.
#[derive(Default)]
pub(crate) struct FakeStore {
    pub(crate) state: Mutex<FakeState>,
    pub(crate) fail_legacy_writes: AtomicBool,
    pub(crate) fail_audit_writes: AtomicBool,
    legacy_writes: AtomicUsize,
}

impl FakeStore {
    pub(crate) async fn add_user(
        &self,
        username: &str,
        is_superuser: bool,
        is_staff: bool,
        is_active: bool,
    ) -> UserAccount {
        let account = UserAccount {
            id: UserId::new(),
            username: Username::new(username).unwrap_or_else(|_| panic!("username {username}")),
            email: None,
            first_name: String::new(),
            last_name: String::new(),
            employee_id: None,
            position: None,
            department: None,
            phone: None,
            is_superuser,
            is_staff,
            is_active,
            date_joined: Utc::now(),
        };

        let mut state = self.state.lock().await;
        state.users.push(account.clone());
        state
            .password_hashes
            .push((account.id, FakePasswordHasher::hash(&format!("{username}-password"))));
        account
    }

    pub(crate) async fn active_user(&self, username: &str) -> UserAccount {
        self.add_user(username, false, false, true).await
    }

    pub(crate) async fn set_user_active(&self, user_id: UserId, is_active: bool) {
        let mut state = self.state.lock().await;
        if let Some(user) = state.users.iter_mut().find(|user| user.id == user_id) {
            user.is_active = is_active;
        }
    }

    pub(crate) async fn add_role(&self, name: &str, is_active: bool) -> Role {
        let now = Utc::now();
        let role = Role {
            id: RoleId::new(),
            name: RoleName::new(name).unwrap_or_else(|_| panic!("role name {name}")),
            description: None,
            color: RoleColor::default(),
            is_active,
            legacy_group_id: None,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.roles.push(role.clone());
        role
    }

    pub(crate) async fn set_role_active(&self, role_id: RoleId, is_active: bool) {
        let mut state = self.state.lock().await;
        if let Some(role) = state.roles.iter_mut().find(|role| role.id == role_id) {
            role.is_active = is_active;
        }
    }

    pub(crate) async fn add_permission(&self, name: &str, category: Option<&str>) -> Permission {
        let now = Utc::now();
        let permission = Permission {
            id: PermissionId::new(),
            name: PermissionName::new(name).unwrap_or_else(|_| panic!("permission {name}")),
            description: None,
            category: category.map(|value| {
                PermissionCategory::new(value).unwrap_or_else(|_| panic!("category {value}"))
            }),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.permissions.push(permission.clone());
        permission
    }

    pub(crate) async fn set_permission_active(&self, permission_id: PermissionId, is_active: bool) {
        let mut state = self.state.lock().await;
        if let Some(permission) = state
            .permissions
            .iter_mut()
            .find(|permission| permission.id == permission_id)
        {
            permission.is_active = is_active;
        }
    }

    pub(crate) async fn add_user_role(
        &self,
        user_id: UserId,
        role_id: RoleId,
        expires_at: Option<DateTime<Utc>>,
        is_active: bool,
    ) -> UserRoleGrant {
        let mut state = self.state.lock().await;
        let mut grant = state.upsert_user_role(UpsertUserRoleGrant {
            user_id,
            role_id,
            assigned_by: None,
            expires_at,
        });
        if !is_active {
            grant.is_active = false;
            if let Some(row) = state.user_roles.iter_mut().find(|row| row.id == grant.id) {
                row.is_active = false;
            }
        }
        grant
    }

    pub(crate) async fn add_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        is_active: bool,
    ) {
        self.state
            .lock()
            .await
            .role_permissions
            .push(RolePermissionGrant {
                id: GrantId::new(),
                role_id,
                permission_id,
                granted_by: None,
                granted_at: Utc::now(),
                is_active,
            });
    }

    pub(crate) async fn add_project(&self, name: &str) -> Project {
        let now = Utc::now();
        let project = Project {
            id: ProjectId::new(),
            name: name.to_owned(),
            description: None,
            is_active: true,
            member_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.projects.push(project.clone());
        project
    }

    pub(crate) async fn add_assignment(&self, project_id: ProjectId, user_id: UserId, is_active: bool) {
        self.state.lock().await.assignments.push(ProjectAssignment {
            project_id,
            user_id,
            assigned_at: Utc::now(),
            is_active,
        });
    }

    pub(crate) async fn find_role_row(&self, role_id: RoleId) -> Option<Role> {
        self.state
            .lock()
            .await
            .roles
            .iter()
            .find(|role| role.id == role_id)
            .cloned()
    }

    pub(crate) async fn active_user_role_rows(&self, user_id: UserId, role_id: RoleId) -> usize {
        self.state
            .lock()
            .await
            .user_roles
            .iter()
            .filter(|grant| grant.user_id == user_id && grant.role_id == role_id && grant.is_active)
            .count()
    }

    pub(crate) async fn group_capability_codenames(&self, role_id: RoleId) -> BTreeSet<String> {
        let state = self.state.lock().await;
        let Some(group_id) = state
            .roles
            .iter()
            .find(|role| role.id == role_id)
            .and_then(|role| role.legacy_group_id)
        else {
            return BTreeSet::new();
        };

        state
            .group_capabilities
            .iter()
            .filter(|(group, _)| *group == group_id.as_i64())
            .filter_map(|(_, capability_id)| {
                state
                    .capabilities
                    .iter()
                    .find(|capability| capability.id.as_i64() == *capability_id)
                    .map(|capability| capability.codename.clone())
            })
            .collect()
    }

    pub(crate) async fn group_member_ids(&self, role_id: RoleId) -> BTreeSet<UserId> {
        let state = self.state.lock().await;
        let Some(group_id) = state
            .roles
            .iter()
            .find(|role| role.id == role_id)
            .and_then(|role| role.legacy_group_id)
        else {
            return BTreeSet::new();
        };

        state
            .group_members
            .iter()
            .filter(|(group, _)| *group == group_id.as_i64())
            .map(|(_, user_id)| *user_id)
            .collect()
    }

    pub(crate) fn legacy_write_count(&self) -> usize {
        self.legacy_writes.load(Ordering::SeqCst)
    }

    pub(crate) async fn audit_actions(&self) -> Vec<AuditAction> {
        self.state
            .lock()
            .await
            .audit_events
            .iter()
            .map(|event| event.action)
            .collect()
    }

    fn legacy_write(&self) -> AppResult<()> {
        if self.fail_legacy_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("legacy store unavailable".to_owned()));
        }

        self.legacy_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl UserDirectoryRepository for FakeStore {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<UserAccount>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .iter()
            .find(|user| user.id == user_id)
            .cloned())
    }

    async fn find_credentials(&self, username: &str) -> AppResult<Option<UserCredentials>> {
        let state = self.state.lock().await;
        Ok(state
            .users
            .iter()
            .find(|user| user.username.as_str() == username)
            .map(|account| UserCredentials {
                account: account.clone(),
                password_hash: state
                    .password_hashes
                    .iter()
                    .find(|(user_id, _)| *user_id == account.id)
                    .map(|(_, hash)| hash.clone()),
            }))
    }

    async fn create_user(&self, input: NewUserAccount) -> AppResult<UserAccount> {
        let mut state = self.state.lock().await;
        if state
            .users
            .iter()
            .any(|user| user.username == input.username)
        {
            return Err(AppError::Conflict(format!(
                "username '{}' already exists",
                input.username.as_str()
            )));
        }
        if input.employee_id.is_some()
            && state
                .users
                .iter()
                .any(|user| user.employee_id == input.employee_id)
        {
            return Err(AppError::Conflict("employee id already exists".to_owned()));
        }

        let account = UserAccount {
            id: UserId::new(),
            username: input.username,
            email: input.email,
            first_name: input.first_name,
            last_name: input.last_name,
            employee_id: input.employee_id,
            position: input.position,
            department: input.department,
            phone: input.phone,
            is_superuser: input.is_superuser,
            is_staff: input.is_staff,
            is_active: true,
            date_joined: Utc::now(),
        };
        state.users.push(account.clone());
        state.password_hashes.push((account.id, input.password_hash));
        Ok(account)
    }

    async fn list_users(&self) -> AppResult<Vec<UserAccount>> {
        let mut users = self.state.lock().await.users.clone();
        users.sort_by(|left, right| left.username.as_str().cmp(right.username.as_str()));
        Ok(users)
    }

    async fn update_user(
        &self,
        user_id: UserId,
        changes: AccountChanges,
    ) -> AppResult<Option<UserAccount>> {
        let mut state = self.state.lock().await;
        if state
            .users
            .iter()
            .any(|user| user.id != user_id && user.username == changes.username)
        {
            return Err(AppError::Conflict(format!(
                "username '{}' already exists",
                changes.username.as_str()
            )));
        }
        if changes.employee_id.is_some()
            && state
                .users
                .iter()
                .any(|user| user.id != user_id && user.employee_id == changes.employee_id)
        {
            return Err(AppError::Conflict("employee id already exists".to_owned()));
        }

        let Some(user) = state.users.iter_mut().find(|user| user.id == user_id) else {
            return Ok(None);
        };
        user.username = changes.username;
        user.email = changes.email;
        user.first_name = changes.first_name;
        user.last_name = changes.last_name;
        user.employee_id = changes.employee_id;
        user.position = changes.position;
        user.department = changes.department;
        user.phone = changes.phone;
        user.is_active = changes.is_active;
        user.is_staff = changes.is_staff;
        user.is_superuser = changes.is_superuser;
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, user_id: UserId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.users.len();
        state.users.retain(|user| user.id != user_id);
        if state.users.len() == before {
            return Ok(false);
        }

        state.password_hashes.retain(|(owner, _)| *owner != user_id);
        state.user_roles.retain(|grant| grant.user_id != user_id);
        state
            .assignments
            .retain(|assignment| assignment.user_id != user_id);
        state.group_members.retain(|(_, member)| *member != user_id);
        Ok(true)
    }
}

#[async_trait]
impl RoleRepository for FakeStore {
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.find_role_row(role_id).await)
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .lock()
            .await
            .roles
            .iter()
            .find(|role| role.name.as_str() == name)
            .cloned())
    }

    async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let mut roles = self.state.lock().await.roles.clone();
        roles.sort_by(|left, right| left.name.as_str().cmp(right.name.as_str()));
        Ok(roles)
    }

    async fn create_role(&self, input: CreateRoleInput) -> AppResult<Role> {
        let mut state = self.state.lock().await;
        if state.roles.iter().any(|role| role.name == input.name) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                input.name.as_str()
            )));
        }

        let now = Utc::now();
        let role = Role {
            id: RoleId::new(),
            name: input.name,
            description: input.description,
            color: input.color,
            is_active: input.is_active,
            legacy_group_id: None,
            created_at: now,
            updated_at: now,
        };
        state.roles.push(role.clone());
        Ok(role)
    }

    async fn update_role(&self, role_id: RoleId, input: UpdateRoleInput) -> AppResult<Role> {
        let mut state = self.state.lock().await;
        if let Some(name) = &input.name
            && state
                .roles
                .iter()
                .any(|role| role.id != role_id && &role.name == name)
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                name.as_str()
            )));
        }

        let role = state
            .roles
            .iter_mut()
            .find(|role| role.id == role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        if let Some(name) = input.name {
            role.name = name;
        }
        if let Some(description) = input.description {
            role.description = description;
        }
        if let Some(color) = input.color {
            role.color = color;
        }
        if let Some(is_active) = input.is_active {
            role.is_active = is_active;
        }
        role.updated_at = Utc::now();
        Ok(role.clone())
    }

    async fn link_legacy_group(&self, role_id: RoleId, group_id: LegacyGroupId) -> AppResult<()> {
        let mut state = self.state.lock().await;
        let role = state
            .roles
            .iter_mut()
            .find(|role| role.id == role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;
        role.legacy_group_id = Some(group_id);
        Ok(())
    }

    async fn delete_role(
        &self,
        role_id: RoleId,
        reassignment: Option<RoleReassignment>,
    ) -> AppResult<Vec<UserId>> {
        let mut state = self.state.lock().await;
        if !state.roles.iter().any(|role| role.id == role_id) {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        if let Some(concurrent) = state.assign_before_delete.take() {
            state.upsert_user_role(concurrent);
        }

        let now = Utc::now();
        let holders: Vec<UserId> = state
            .user_roles
            .iter()
            .filter(|grant| grant.role_id == role_id)
            .filter(|grant| {
                let user_active = state
                    .users
                    .iter()
                    .any(|user| user.id == grant.user_id && user.is_active);
                grant.is_effective(now, user_active, true)
            })
            .map(|grant| grant.user_id)
            .collect();

        if !holders.is_empty() {
            let fallback_active = reassignment.as_ref().is_some_and(|reassignment| {
                reassignment.fallback_role_id != role_id
                    && state
                        .roles
                        .iter()
                        .any(|role| role.id == reassignment.fallback_role_id && role.is_active)
            });
            let Some(reassignment) = reassignment.filter(|_| fallback_active) else {
                return Err(AppError::Configuration(
                    "fallback role is missing or inactive".to_owned(),
                ));
            };

            for user_id in &holders {
                state.upsert_user_role(UpsertUserRoleGrant {
                    user_id: *user_id,
                    role_id: reassignment.fallback_role_id,
                    assigned_by: reassignment.assigned_by,
                    expires_at: None,
                });
            }
        }

        state.roles.retain(|role| role.id != role_id);
        state.user_roles.retain(|grant| grant.role_id != role_id);
        state.role_permissions.retain(|grant| grant.role_id != role_id);
        Ok(holders)
    }
}

#[async_trait]
impl PermissionRepository for FakeStore {
    async fn find_permission(&self, permission_id: PermissionId) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .lock()
            .await
            .permissions
            .iter()
            .find(|permission| permission.id == permission_id)
            .cloned())
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .lock()
            .await
            .permissions
            .iter()
            .find(|permission| permission.name.as_str() == name)
            .cloned())
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let mut permissions = self.state.lock().await.permissions.clone();
        permissions.sort_by(|left, right| {
            (left.category.as_ref(), &left.name).cmp(&(right.category.as_ref(), &right.name))
        });
        Ok(permissions)
    }

    async fn create_permission(&self, input: CreatePermissionInput) -> AppResult<Permission> {
        let mut state = self.state.lock().await;
        if state
            .permissions
            .iter()
            .any(|permission| permission.name == input.name)
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                input.name.as_str()
            )));
        }

        let now = Utc::now();
        let permission = Permission {
            id: PermissionId::new(),
            name: input.name,
            description: input.description,
            category: input.category,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        };
        state.permissions.push(permission.clone());
        Ok(permission)
    }

    async fn list_categories(&self) -> AppResult<Vec<String>> {
        let categories: BTreeSet<String> = self
            .state
            .lock()
            .await
            .permissions
            .iter()
            .filter(|permission| permission.is_active)
            .filter_map(|permission| permission.category.as_ref())
            .map(|category| category.as_str().to_owned())
            .collect();
        Ok(categories.into_iter().collect())
    }
}

#[async_trait]
impl GrantRepository for FakeStore {
    async fn list_user_role_grants(&self, user_id: UserId) -> AppResult<Vec<UserRoleGrantView>> {
        let state = self.state.lock().await;
        Ok(state
            .user_roles
            .iter()
            .filter(|grant| grant.user_id == user_id)
            .filter_map(|grant| {
                state
                    .roles
                    .iter()
                    .find(|role| role.id == grant.role_id)
                    .map(|role| UserRoleGrantView {
                        grant: grant.clone(),
                        role: role.clone(),
                    })
            })
            .collect())
    }

    async fn list_role_holders(&self, role_id: RoleId) -> AppResult<Vec<RoleHolderView>> {
        let state = self.state.lock().await;
        Ok(state
            .user_roles
            .iter()
            .filter(|grant| grant.role_id == role_id)
            .filter_map(|grant| {
                state
                    .users
                    .iter()
                    .find(|user| user.id == grant.user_id)
                    .map(|user| RoleHolderView {
                        grant: grant.clone(),
                        user: user.clone(),
                    })
            })
            .collect())
    }

    async fn upsert_user_role_grant(&self, input: UpsertUserRoleGrant) -> AppResult<UserRoleGrant> {
        Ok(self.state.lock().await.upsert_user_role(input))
    }

    async fn deactivate_user_role_grant(&self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.user_roles.iter_mut().find(|grant| {
            grant.user_id == user_id && grant.role_id == role_id && grant.is_active
        }) {
            Some(grant) => {
                grant.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_role_permission_grants(
        &self,
        role_id: RoleId,
    ) -> AppResult<Vec<RolePermissionGrantView>> {
        let state = self.state.lock().await;
        Ok(state
            .role_permissions
            .iter()
            .filter(|grant| grant.role_id == role_id)
            .filter_map(|grant| {
                state
                    .permissions
                    .iter()
                    .find(|permission| permission.id == grant.permission_id)
                    .map(|permission| RolePermissionGrantView {
                        grant: grant.clone(),
                        permission: permission.clone(),
                    })
            })
            .collect())
    }

    async fn upsert_role_permission_grant(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        granted_by: Option<UserId>,
    ) -> AppResult<RolePermissionGrant> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        if let Some(grant) = state
            .role_permissions
            .iter_mut()
            .find(|grant| grant.role_id == role_id && grant.permission_id == permission_id)
        {
            grant.is_active = true;
            grant.granted_by = granted_by;
            grant.granted_at = now;
            return Ok(grant.clone());
        }

        let grant = RolePermissionGrant {
            id: GrantId::new(),
            role_id,
            permission_id,
            granted_by,
            granted_at: now,
            is_active: true,
        };
        state.role_permissions.push(grant.clone());
        Ok(grant)
    }

    async fn deactivate_role_permission_grant(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.role_permissions.iter_mut().find(|grant| {
            grant.role_id == role_id && grant.permission_id == permission_id && grant.is_active
        }) {
            Some(grant) => {
                grant.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ProjectRepository for FakeStore {
    async fn list_projects(&self) -> AppResult<Vec<Project>> {
        let state = self.state.lock().await;
        let mut projects: Vec<Project> = state
            .projects
            .iter()
            .map(|project| state.with_member_count(project))
            .collect();
        projects.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(projects)
    }

    async fn list_projects_for_user(&self, user_id: UserId) -> AppResult<Vec<Project>> {
        let state = self.state.lock().await;
        let mut projects: Vec<Project> = state
            .projects
            .iter()
            .filter(|project| {
                state.assignments.iter().any(|assignment| {
                    assignment.project_id == project.id
                        && assignment.user_id == user_id
                        && assignment.is_active
                })
            })
            .map(|project| state.with_member_count(project))
            .collect();
        projects.sort_by(|left, right| left.name.cmp(&right.name));
        Ok(projects)
    }

    async fn find_project(&self, project_id: ProjectId) -> AppResult<Option<Project>> {
        let state = self.state.lock().await;
        Ok(state
            .projects
            .iter()
            .find(|project| project.id == project_id)
            .map(|project| state.with_member_count(project)))
    }

    async fn create_project(&self, input: SaveProjectInput) -> AppResult<Project> {
        let now = Utc::now();
        let project = Project {
            id: ProjectId::new(),
            name: input.name,
            description: input.description,
            is_active: input.is_active,
            member_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().await.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(
        &self,
        project_id: ProjectId,
        input: SaveProjectInput,
    ) -> AppResult<Project> {
        let mut state = self.state.lock().await;
        let project = state
            .projects
            .iter_mut()
            .find(|project| project.id == project_id)
            .ok_or_else(|| AppError::NotFound(format!("project '{project_id}' does not exist")))?;
        project.name = input.name;
        project.description = input.description;
        project.is_active = input.is_active;
        project.updated_at = Utc::now();
        let project = project.clone();
        Ok(state.with_member_count(&project))
    }

    async fn delete_project(&self, project_id: ProjectId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        let before = state.projects.len();
        state.projects.retain(|project| project.id != project_id);
        state
            .assignments
            .retain(|assignment| assignment.project_id != project_id);
        Ok(state.projects.len() != before)
    }

    async fn find_assignment(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<Option<ProjectAssignment>> {
        Ok(self
            .state
            .lock()
            .await
            .assignments
            .iter()
            .find(|assignment| assignment.project_id == project_id && assignment.user_id == user_id)
            .cloned())
    }

    async fn upsert_assignment(
        &self,
        project_id: ProjectId,
        user_id: UserId,
    ) -> AppResult<ProjectAssignment> {
        let mut state = self.state.lock().await;
        if let Some(assignment) = state
            .assignments
            .iter_mut()
            .find(|assignment| assignment.project_id == project_id && assignment.user_id == user_id)
        {
            assignment.is_active = true;
            assignment.assigned_at = Utc::now();
            return Ok(assignment.clone());
        }

        let assignment = ProjectAssignment {
            project_id,
            user_id,
            assigned_at: Utc::now(),
            is_active: true,
        };
        state.assignments.push(assignment.clone());
        Ok(assignment)
    }

    async fn deactivate_assignment(&self, project_id: ProjectId, user_id: UserId) -> AppResult<bool> {
        let mut state = self.state.lock().await;
        match state.assignments.iter_mut().find(|assignment| {
            assignment.project_id == project_id
                && assignment.user_id == user_id
                && assignment.is_active
        }) {
            Some(assignment) => {
                assignment.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl LegacyAuthRepository for FakeStore {
    async fn find_group(&self, group_id: LegacyGroupId) -> AppResult<Option<LegacyGroup>> {
        Ok(self
            .state
            .lock()
            .await
            .groups
            .iter()
            .find(|group| group.id == group_id)
            .cloned())
    }

    async fn find_group_by_name(&self, name: &str) -> AppResult<Option<LegacyGroup>> {
        Ok(self
            .state
            .lock()
            .await
            .groups
            .iter()
            .find(|group| group.name == name)
            .cloned())
    }

    async fn ensure_group(&self, name: &str) -> AppResult<LegacyGroup> {
        let mut state = self.state.lock().await;
        if let Some(group) = state.groups.iter().find(|group| group.name == name) {
            return Ok(group.clone());
        }

        self.legacy_write()?;
        let group = LegacyGroup {
            id: LegacyGroupId::new(state.next_legacy_id()),
            name: name.to_owned(),
        };
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn rename_group(&self, group_id: LegacyGroupId, name: &str) -> AppResult<()> {
        self.legacy_write()?;
        let mut state = self.state.lock().await;
        if state
            .groups
            .iter()
            .any(|group| group.id != group_id && group.name == name)
        {
            return Err(AppError::Conflict(format!("group '{name}' already exists")));
        }
        if let Some(group) = state.groups.iter_mut().find(|group| group.id == group_id) {
            group.name = name.to_owned();
        }
        Ok(())
    }

    async fn delete_group(&self, group_id: LegacyGroupId) -> AppResult<()> {
        self.legacy_write()?;
        let mut state = self.state.lock().await;
        let key = group_id.as_i64();
        state.groups.retain(|group| group.id != group_id);
        state.group_capabilities.retain(|(group, _)| *group != key);
        state.group_members.retain(|(group, _)| *group != key);
        Ok(())
    }

    async fn ensure_capability(&self, codename: &str, label: &str) -> AppResult<LegacyCapability> {
        let mut state = self.state.lock().await;
        if let Some(index) = state
            .capabilities
            .iter()
            .position(|capability| capability.codename == codename)
        {
            if state.capabilities[index].name != label {
                self.legacy_write()?;
                state.capabilities[index].name = label.to_owned();
            }
            return Ok(state.capabilities[index].clone());
        }

        self.legacy_write()?;
        let capability = LegacyCapability {
            id: LegacyCapabilityId::new(state.next_legacy_id()),
            codename: codename.to_owned(),
            name: label.to_owned(),
        };
        state.capabilities.push(capability.clone());
        Ok(capability)
    }

    async fn list_group_capabilities(
        &self,
        group_id: LegacyGroupId,
    ) -> AppResult<Vec<LegacyCapability>> {
        let state = self.state.lock().await;
        Ok(state
            .capabilities
            .iter()
            .filter(|capability| {
                state
                    .group_capabilities
                    .contains(&(group_id.as_i64(), capability.id.as_i64()))
            })
            .cloned()
            .collect())
    }

    async fn add_group_capabilities(
        &self,
        group_id: LegacyGroupId,
        capability_ids: &[LegacyCapabilityId],
    ) -> AppResult<()> {
        self.legacy_write()?;
        let mut state = self.state.lock().await;
        for capability_id in capability_ids {
            state
                .group_capabilities
                .insert((group_id.as_i64(), capability_id.as_i64()));
        }
        Ok(())
    }

    async fn remove_group_capabilities(
        &self,
        group_id: LegacyGroupId,
        capability_ids: &[LegacyCapabilityId],
    ) -> AppResult<()> {
        self.legacy_write()?;
        let mut state = self.state.lock().await;
        for capability_id in capability_ids {
            state
                .group_capabilities
                .remove(&(group_id.as_i64(), capability_id.as_i64()));
        }
        Ok(())
    }

    async fn list_group_members(&self, group_id: LegacyGroupId) -> AppResult<Vec<UserId>> {
        Ok(self
            .state
            .lock()
            .await
            .group_members
            .iter()
            .filter(|(group, _)| *group == group_id.as_i64())
            .map(|(_, user_id)| *user_id)
            .collect())
    }

    async fn add_group_member(&self, group_id: LegacyGroupId, user_id: UserId) -> AppResult<()> {
        self.legacy_write()?;
        let mut state = self.state.lock().await;
        if !state.groups.iter().any(|group| group.id == group_id) {
            return Err(AppError::Internal(format!("group '{group_id}' does not exist")));
        }
        state.group_members.insert((group_id.as_i64(), user_id));
        Ok(())
    }

    async fn remove_group_member(&self, group_id: LegacyGroupId, user_id: UserId) -> AppResult<()> {
        self.legacy_write()?;
        self.state
            .lock()
            .await
            .group_members
            .remove(&(group_id.as_i64(), user_id));
        Ok(())
    }
}

#[async_trait]
impl AuditRepository for FakeStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        if self.fail_audit_writes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("audit log unavailable".to_owned()));
        }

        self.state.lock().await.audit_events.push(event);
        Ok(())
    }
}

/// Reversible stand-in for Argon2.
pub(crate) struct FakePasswordHasher;

impl FakePasswordHasher {
    pub(crate) fn hash(password: &str) -> String {
        format!("fake${password}")
    }
}

impl PasswordHasher for FakePasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(Self::hash(password))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(Self::hash(password) == hash)
    }
}

/// Services wired over one [`FakeStore`].
pub(crate) struct TestServices {
    pub(crate) store: Arc<FakeStore>,
    pub(crate) resolver: PermissionResolver,
    pub(crate) gate: AccessGate,
    pub(crate) mirror: MirrorSyncService,
    pub(crate) grants: GrantService,
}

impl TestServices {
    pub(crate) fn new() -> Self {
        Self::with_policy(RbacPolicy::new(RbacPolicySettings::default(), None, None))
    }

    pub(crate) fn with_policy(policy: RbacPolicy) -> Self {
        let store = Arc::new(FakeStore::default());
        let resolver = PermissionResolver::new(store.clone(), store.clone());
        let gate = AccessGate::new(resolver.clone(), store.clone());
        let mirror =
            MirrorSyncService::new(store.clone(), store.clone(), store.clone(), store.clone());
        let grants = GrantService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            Arc::new(FakePasswordHasher),
            mirror.clone(),
            policy,
        );

        Self {
            store,
            resolver,
            gate,
            mirror,
            grants,
        }
    }

    pub(crate) fn security_admin(&self) -> SecurityAdminService {
        SecurityAdminService::new(
            self.gate.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.grants.clone(),
            self.mirror.clone(),
            self.store.clone(),
        )
    }

    pub(crate) fn user_admin(&self) -> UserAdminService {
        UserAdminService::new(
            self.gate.clone(),
            self.store.clone(),
            self.grants.clone(),
            self.store.clone(),
        )
    }

    pub(crate) fn projects(&self) -> ProjectService {
        ProjectService::new(
            self.gate.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
        )
    }

    pub(crate) fn sessions(&self) -> SessionService {
        SessionService::new(
            self.store.clone(),
            Arc::new(FakePasswordHasher),
            self.resolver.clone(),
        )
    }

    pub(crate) fn bootstrap(&self) -> BootstrapService {
        BootstrapService::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.mirror.clone(),
            self.store.clone(),
        )
    }

    /// Creates an active account holding an active role with the named permissions.
    pub(crate) async fn user_with_permissions(
        &self,
        username: &str,
        permission_names: &[&str],
    ) -> UserAccount {
        let user = self.store.active_user(username).await;
        let role = self.store.add_role(&format!("{username} role"), true).await;
        for name in permission_names {
            let permission = self.store.add_permission(name, None).await;
            self.store
                .add_role_permission(role.id, permission.id, true)
                .await;
        }
        self.store.add_user_role(user.id, role.id, None, true).await;
        user
    }
}

pub(crate) fn identity(account: &UserAccount) -> UserIdentity {
    UserIdentity::new(account.id, account.username.as_str())
}
