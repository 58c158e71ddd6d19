//! Initial database migration.
//!
//! Creates the enums, tenancy tables, accounts, documents and the ledger
//! transaction log.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TENANCY
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;
        db.execute_unprepared(ORGANIZATIONS_SQL).await?;
        db.execute_unprepared(ORGANIZATION_USERS_SQL).await?;

        // ============================================================
        // PART 3: ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 4: PARTIES & ITEMS
        // ============================================================
        db.execute_unprepared(PARTIES_SQL).await?;
        db.execute_unprepared(ITEMS_SQL).await?;

        // ============================================================
        // PART 5: DOCUMENTS
        // ============================================================
        db.execute_unprepared(DOCUMENTS_SQL).await?;
        db.execute_unprepared(DOCUMENT_LINES_SQL).await?;

        // ============================================================
        // PART 6: LEDGER TRANSACTIONS
        // ============================================================
        db.execute_unprepared(LEDGER_TRANSACTIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE user_role AS ENUM ('owner', 'admin', 'member');

CREATE TYPE account_type AS ENUM ('bank', 'cash');

-- Persisted names are read by reports; do not rename.
CREATE TYPE ledger_transaction_type AS ENUM (
    'add',
    'reduce',
    'transfer_out',
    'transfer_in',
    'expense',
    'payment_in',
    'payment_out',
    'sales_return',
    'purchase_return',
    'credit_note',
    'debit_note'
);

CREATE TYPE document_kind AS ENUM (
    'sales_invoice',
    'purchase_invoice',
    'payment_in',
    'payment_out',
    'credit_note',
    'debit_note',
    'sales_return',
    'purchase_return',
    'expense',
    'pos_sale'
);

CREATE TYPE payment_status AS ENUM ('unpaid', 'partial', 'paid');
";

const USERS_SQL: &str = r"
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    full_name VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ORGANIZATIONS_SQL: &str = r"
CREATE TABLE organizations (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    slug VARCHAR(100) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ORGANIZATION_USERS_SQL: &str = r"
CREATE TABLE organization_users (
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    role user_role NOT NULL DEFAULT 'member',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (user_id, organization_id)
);

CREATE INDEX idx_org_users_org ON organization_users(organization_id);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id),
    account_name VARCHAR(255) NOT NULL,
    account_type account_type NOT NULL,
    opening_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    current_balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    as_of_date DATE NOT NULL DEFAULT CURRENT_DATE,
    bank_account_no VARCHAR(50),
    ifsc_code VARCHAR(11),
    account_holder_name VARCHAR(255),
    upi_id VARCHAR(100),
    bank_name VARCHAR(255),
    branch_name VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    -- Get-or-create of the cash account relies on this.
    CONSTRAINT uq_accounts_org_name_type UNIQUE (organization_id, account_name, account_type)
);

CREATE INDEX idx_accounts_org ON accounts(organization_id);
";

const PARTIES_SQL: &str = r"
CREATE TABLE parties (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    phone VARCHAR(20),
    gstin VARCHAR(15),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_parties_org ON parties(organization_id);
";

const ITEMS_SQL: &str = r"
CREATE TABLE items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    name VARCHAR(255) NOT NULL,
    sku VARCHAR(100),
    unit VARCHAR(20),
    sale_price NUMERIC(19, 4) NOT NULL DEFAULT 0,
    purchase_price NUMERIC(19, 4) NOT NULL DEFAULT 0,
    stock_qty NUMERIC(19, 4) NOT NULL DEFAULT 0,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_items_org ON items(organization_id);
";

const DOCUMENTS_SQL: &str = r"
CREATE TABLE documents (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    user_id UUID NOT NULL REFERENCES users(id),
    kind document_kind NOT NULL,
    party_id UUID REFERENCES parties(id),
    prefix VARCHAR(20) NOT NULL,
    number BIGINT NOT NULL,
    document_number VARCHAR(50) NOT NULL,
    document_date DATE NOT NULL,
    due_date DATE,
    subtotal NUMERIC(19, 4) NOT NULL DEFAULT 0,
    discount_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    tax_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    additional_charges NUMERIC(19, 4) NOT NULL DEFAULT 0,
    round_off NUMERIC(19, 4) NOT NULL DEFAULT 0,
    total_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    settled_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    balance_amount NUMERIC(19, 4) NOT NULL DEFAULT 0,
    payment_status payment_status NOT NULL DEFAULT 'unpaid',
    payment_mode VARCHAR(50) NOT NULL DEFAULT 'Cash',
    -- Weak reference: an unknown account skips the posting, the document is kept.
    bank_account_id UUID,
    category VARCHAR(100),
    linked_document_id UUID REFERENCES documents(id) ON DELETE SET NULL,
    notes TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT uq_documents_number UNIQUE (organization_id, kind, prefix, number),
    CONSTRAINT chk_documents_number_positive CHECK (number > 0),
    CONSTRAINT chk_documents_settled_non_negative CHECK (settled_amount >= 0),
    CONSTRAINT chk_documents_balance_non_negative CHECK (balance_amount >= 0)
);

CREATE INDEX idx_documents_org_kind ON documents(organization_id, kind, document_date DESC);
CREATE INDEX idx_documents_party ON documents(party_id) WHERE party_id IS NOT NULL;
";

const DOCUMENT_LINES_SQL: &str = r"
CREATE TABLE document_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    document_id UUID NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    line_number INTEGER NOT NULL,
    item_id UUID REFERENCES items(id),
    description TEXT NOT NULL DEFAULT '',
    quantity NUMERIC(19, 4) NOT NULL,
    rate NUMERIC(19, 4) NOT NULL,
    discount_percent NUMERIC(7, 4) NOT NULL DEFAULT 0,
    tax_percent NUMERIC(7, 4) NOT NULL DEFAULT 0,
    subtotal NUMERIC(19, 4) NOT NULL,
    discount_amount NUMERIC(19, 4) NOT NULL,
    tax_amount NUMERIC(19, 4) NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,

    CONSTRAINT uq_document_lines_number UNIQUE (document_id, line_number),
    CONSTRAINT chk_document_lines_quantity CHECK (quantity >= 0),
    CONSTRAINT chk_document_lines_rate CHECK (rate >= 0)
);

CREATE INDEX idx_document_lines_item ON document_lines(item_id) WHERE item_id IS NOT NULL;
";

const LEDGER_TRANSACTIONS_SQL: &str = r"
CREATE TABLE ledger_transactions (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    organization_id UUID NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    user_id UUID NOT NULL REFERENCES users(id),
    transaction_type ledger_transaction_type NOT NULL,
    amount NUMERIC(19, 4) NOT NULL,
    transaction_date DATE NOT NULL,
    description TEXT NOT NULL,

    -- Reversal key: the document this posting settles.
    source_kind document_kind,
    source_document_id UUID REFERENCES documents(id) ON DELETE RESTRICT,

    related_account_id UUID REFERENCES accounts(id) ON DELETE SET NULL,
    related_transaction_id UUID REFERENCES ledger_transactions(id)
        ON DELETE SET NULL DEFERRABLE INITIALLY DEFERRED,

    is_external_transfer BOOLEAN NOT NULL DEFAULT false,
    external_account_holder VARCHAR(255),
    external_account_number VARCHAR(50),
    external_bank_name VARCHAR(255),
    external_ifsc_code VARCHAR(11),

    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),

    CONSTRAINT chk_ledger_transactions_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_ledger_transactions_source CHECK (
        (source_kind IS NULL) = (source_document_id IS NULL)
    ),
    CONSTRAINT chk_ledger_transactions_external CHECK (
        NOT is_external_transfer OR (
            external_account_holder IS NOT NULL
            AND external_account_number IS NOT NULL
            AND external_bank_name IS NOT NULL
            AND external_ifsc_code ~ '^[A-Z]{4}0[A-Z0-9]{6}$'
        )
    )
);

CREATE INDEX idx_ledger_transactions_account
    ON ledger_transactions(account_id, transaction_date DESC);
CREATE INDEX idx_ledger_transactions_org ON ledger_transactions(organization_id);
CREATE UNIQUE INDEX uq_ledger_transactions_source
    ON ledger_transactions(source_document_id) WHERE source_document_id IS NOT NULL;
";

const DROP_ALL_SQL: &str = r"
-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS ledger_transactions CASCADE;
DROP TABLE IF EXISTS document_lines CASCADE;
DROP TABLE IF EXISTS documents CASCADE;
DROP TABLE IF EXISTS items CASCADE;
DROP TABLE IF EXISTS parties CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS organization_users CASCADE;
DROP TABLE IF EXISTS organizations CASCADE;
DROP TABLE IF EXISTS users CASCADE;

-- Drop enums
DROP TYPE IF EXISTS payment_status;
DROP TYPE IF EXISTS document_kind;
DROP TYPE IF EXISTS ledger_transaction_type;
DROP TYPE IF EXISTS account_type;
DROP TYPE IF EXISTS user_role;
";
