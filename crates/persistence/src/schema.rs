//! ScyllaDB schema creation

use crate::error::PersistenceError;
use scylla::Session;

/// Create the keyspace if it doesn't exist
pub async fn create_keyspace(
    session: &Session,
    keyspace: &str,
    replication_factor: u8,
) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session
        .query_unpaged(query, &[])
        .await
        .map_err(|e| PersistenceError::Schema(format!("Failed to create keyspace: {}", e)))?;

    Ok(())
}

/// Create all required tables
pub async fn create_tables(session: &Session, keyspace: &str) -> Result<(), PersistenceError> {
    // Conversations, looked up by id
    let conversations_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.conversations (
            id UUID,
            proposal_id UUID,
            debtor_id UUID,
            company_id UUID,
            corporate_client_id UUID,
            status TEXT,
            ai_enabled BOOLEAN,
            message_count INT,
            negotiation_context_json TEXT,
            created_at BIGINT,
            updated_at BIGINT,
            PRIMARY KEY (id)
        )
    "#,
        keyspace
    );

    session
        .query_unpaged(conversations_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::Schema(format!("Failed to create conversations table: {}", e))
        })?;

    // Messages, clustered by arrival order within their conversation
    let messages_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.messages (
            conversation_id UUID,
            created_at BIGINT,
            id UUID,
            sender TEXT,
            content TEXT,
            metadata_json TEXT,
            PRIMARY KEY ((conversation_id), created_at, id)
        ) WITH CLUSTERING ORDER BY (created_at ASC, id ASC)
    "#,
        keyspace
    );

    session
        .query_unpaged(messages_table, &[])
        .await
        .map_err(|e| PersistenceError::Schema(format!("Failed to create messages table: {}", e)))?;

    // Proposals, read-only to the negotiation core
    let proposals_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.proposals (
            id UUID,
            company_id UUID,
            total_amount DOUBLE,
            installments INT,
            installment_amount DOUBLE,
            status TEXT,
            PRIMARY KEY (id)
        )
    "#,
        keyspace
    );

    session
        .query_unpaged(proposals_table, &[])
        .await
        .map_err(|e| PersistenceError::Schema(format!("Failed to create proposals table: {}", e)))?;

    // Debtor identity
    let debtors_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.debtors (
            id UUID,
            name TEXT,
            email TEXT,
            phone TEXT,
            preferred_contact_method TEXT,
            PRIMARY KEY (id)
        )
    "#,
        keyspace
    );

    session
        .query_unpaged(debtors_table, &[])
        .await
        .map_err(|e| PersistenceError::Schema(format!("Failed to create debtors table: {}", e)))?;

    // One open debt record per debtor
    let debts_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.debts (
            debtor_id UUID,
            amount DOUBLE,
            days_overdue INT,
            PRIMARY KEY (debtor_id)
        )
    "#,
        keyspace
    );

    session
        .query_unpaged(debts_table, &[])
        .await
        .map_err(|e| PersistenceError::Schema(format!("Failed to create debts table: {}", e)))?;

    // Payment history, newest first
    let payments_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.payments (
            debtor_id UUID,
            due_date BIGINT,
            id UUID,
            amount DOUBLE,
            paid_at BIGINT,
            on_time BOOLEAN,
            PRIMARY KEY ((debtor_id), due_date, id)
        ) WITH CLUSTERING ORDER BY (due_date DESC, id DESC)
    "#,
        keyspace
    );

    session
        .query_unpaged(payments_table, &[])
        .await
        .map_err(|e| PersistenceError::Schema(format!("Failed to create payments table: {}", e)))?;

    // Condensed prior negotiations, newest first
    let summaries_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.negotiation_summaries (
            debtor_id UUID,
            created_at BIGINT,
            conversation_id UUID,
            corporate_client_id UUID,
            status TEXT,
            summary TEXT,
            debtor_messages_json TEXT,
            PRIMARY KEY ((debtor_id), created_at, conversation_id)
        ) WITH CLUSTERING ORDER BY (created_at DESC, conversation_id DESC)
    "#,
        keyspace
    );

    session
        .query_unpaged(summaries_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::Schema(format!("Failed to create negotiation_summaries table: {}", e))
        })?;

    // Corporate client profiles
    let profiles_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.corporate_profiles (
            id UUID,
            name TEXT,
            description TEXT,
            industry TEXT,
            PRIMARY KEY (id)
        )
    "#,
        keyspace
    );

    session
        .query_unpaged(profiles_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::Schema(format!("Failed to create corporate_profiles table: {}", e))
        })?;

    // Policy documents per corporate client
    let policies_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.corporate_policies (
            corporate_client_id UUID,
            id UUID,
            title TEXT,
            content TEXT,
            active BOOLEAN,
            updated_at BIGINT,
            PRIMARY KEY ((corporate_client_id), id)
        )
    "#,
        keyspace
    );

    session
        .query_unpaged(policies_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::Schema(format!("Failed to create corporate_policies table: {}", e))
        })?;

    // Custom triggered-response templates per corporate client
    let templates_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.response_templates (
            corporate_client_id UUID,
            id UUID,
            trigger TEXT,
            content TEXT,
            active BOOLEAN,
            PRIMARY KEY ((corporate_client_id), id)
        )
    "#,
        keyspace
    );

    session
        .query_unpaged(templates_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::Schema(format!("Failed to create response_templates table: {}", e))
        })?;

    // AI config per corporate client, stored as JSON
    let ai_configs_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.ai_configs (
            corporate_client_id UUID,
            config_json TEXT,
            PRIMARY KEY (corporate_client_id)
        )
    "#,
        keyspace
    );

    session
        .query_unpaged(ai_configs_table, &[])
        .await
        .map_err(|e| PersistenceError::Schema(format!("Failed to create ai_configs table: {}", e)))?;

    // Append-only analytics events per company, newest first
    let events_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.analytics_events (
            company_id UUID,
            created_at BIGINT,
            id UUID,
            proposal_id UUID,
            event_type TEXT,
            outcome TEXT,
            conversation_duration_minutes BIGINT,
            ai_messages INT,
            PRIMARY KEY ((company_id), created_at, id)
        ) WITH CLUSTERING ORDER BY (created_at DESC, id DESC)
    "#,
        keyspace
    );

    session
        .query_unpaged(events_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::Schema(format!("Failed to create analytics_events table: {}", e))
        })?;

    tracing::info!("All tables created successfully");
    Ok(())
}
