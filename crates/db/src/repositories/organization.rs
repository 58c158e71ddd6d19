//! Organization repository: tenants and their members.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{organization_users, organizations, sea_orm_active_enums::UserRole};

/// Organization repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct OrganizationRepository {
    db: DatabaseConnection,
}

impl OrganizationRepository {
    /// Creates a new organization repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds an organization by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<organizations::Model>, DbErr> {
        organizations::Entity::find_by_id(id).one(&self.db).await
    }

    /// Creates a new organization with the creator as owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_with_owner(
        &self,
        name: &str,
        slug: &str,
        owner_id: Uuid,
    ) -> Result<organizations::Model, DbErr> {
        let txn = self.db.begin().await?;

        let now = chrono::Utc::now().into();
        let org = organizations::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.to_string()),
            slug: Set(slug.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        organization_users::ActiveModel {
            user_id: Set(owner_id),
            organization_id: Set(org.id),
            role: Set(UserRole::Owner),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(org)
    }

    /// Adds a user to an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn add_user(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        role: UserRole,
    ) -> Result<organization_users::Model, DbErr> {
        let now = chrono::Utc::now().into();
        organization_users::ActiveModel {
            user_id: Set(user_id),
            organization_id: Set(org_id),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await
    }

    /// Checks if a user is a member of an organization.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn is_member(&self, org_id: Uuid, user_id: Uuid) -> Result<bool, DbErr> {
        let count = organization_users::Entity::find()
            .filter(organization_users::Column::OrganizationId.eq(org_id))
            .filter(organization_users::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;

        Ok(count > 0)
    }
}
