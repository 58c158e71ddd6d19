//! Entity re-exports.

pub use super::accounts::Entity as Accounts;
pub use super::document_lines::Entity as DocumentLines;
pub use super::documents::Entity as Documents;
pub use super::items::Entity as Items;
pub use super::ledger_transactions::Entity as LedgerTransactions;
pub use super::organization_users::Entity as OrganizationUsers;
pub use super::organizations::Entity as Organizations;
pub use super::parties::Entity as Parties;
pub use super::users::Entity as Users;
