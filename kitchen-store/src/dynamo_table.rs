use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::types::{
    self as ddb, AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use std::collections::HashMap;
use tracing::info;
use kitchen_core::{AttributeValue, Item, KeyValueTable, TableDescription, TableError, TableStatus};
use crate::app_config::StoreConfig;

type SdkItem = HashMap<String, ddb::AttributeValue>;

/// DynamoDB-backed table client
#[derive(Clone)]
pub struct DynamoTable {
    client: Client,
}

impl DynamoTable {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from store settings.
    ///
    /// With a `service_url` the client talks to a local DynamoDB using static
    /// credentials; otherwise the default AWS credential chain is used.
    pub async fn from_config(config: &StoreConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));

        if let Some(url) = config.local_endpoint() {
            info!(endpoint = %url, "Using local DynamoDB endpoint");
            let credentials = Credentials::new("local", "local", None, None, "kitchen-local");
            loader = loader.endpoint_url(url).credentials_provider(credentials);
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config))
    }
}

fn to_sdk(value: AttributeValue) -> ddb::AttributeValue {
    match value {
        AttributeValue::S(s) => ddb::AttributeValue::S(s),
        AttributeValue::N(n) => ddb::AttributeValue::N(n),
        AttributeValue::Null => ddb::AttributeValue::Null(true),
    }
}

fn from_sdk(name: &str, value: &ddb::AttributeValue) -> Result<AttributeValue, TableError> {
    match value {
        ddb::AttributeValue::S(s) => Ok(AttributeValue::S(s.clone())),
        ddb::AttributeValue::N(n) => Ok(AttributeValue::N(n.clone())),
        ddb::AttributeValue::Null(_) => Ok(AttributeValue::Null),
        _ => Err(TableError::UnsupportedAttribute {
            name: name.to_string(),
        }),
    }
}

fn item_to_sdk(item: Item) -> SdkItem {
    item.into_iter()
        .map(|(name, value)| (name, to_sdk(value)))
        .collect()
}

fn item_from_sdk(item: &SdkItem) -> Result<Item, TableError> {
    item.iter()
        .map(|(name, value)| Ok((name.clone(), from_sdk(name, value)?)))
        .collect()
}

fn status_from_sdk(status: &ddb::TableStatus) -> TableStatus {
    match status {
        ddb::TableStatus::Active => TableStatus::Active,
        ddb::TableStatus::Creating => TableStatus::Creating,
        ddb::TableStatus::Updating => TableStatus::Updating,
        ddb::TableStatus::Deleting => TableStatus::Deleting,
        other => TableStatus::Other(other.as_str().to_string()),
    }
}

#[async_trait]
impl KeyValueTable for DynamoTable {
    async fn describe_table(&self, table: &str) -> Result<TableDescription, TableError> {
        let output = self
            .client
            .describe_table()
            .table_name(table)
            .send()
            .await
            .map_err(|err| {
                let err = err.into_service_error();
                if err.is_resource_not_found_exception() {
                    TableError::ResourceNotFound {
                        table: table.to_string(),
                    }
                } else {
                    TableError::Service(Box::new(err))
                }
            })?;

        let status = output
            .table()
            .and_then(|t| t.table_status())
            .map(status_from_sdk)
            .unwrap_or_else(|| TableStatus::Other("UNKNOWN".to_string()));

        let name = output
            .table()
            .and_then(|t| t.table_name())
            .unwrap_or(table)
            .to_string();

        Ok(TableDescription { name, status })
    }

    async fn create_table(&self, table: &str, partition_key: &str) -> Result<(), TableError> {
        let key_schema = KeySchemaElement::builder()
            .attribute_name(partition_key)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| TableError::Service(Box::new(e)))?;

        let definition = AttributeDefinition::builder()
            .attribute_name(partition_key)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|e| TableError::Service(Box::new(e)))?;

        self.client
            .create_table()
            .table_name(table)
            .key_schema(key_schema)
            .attribute_definitions(definition)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .map_err(|err| TableError::Service(Box::new(err.into_service_error())))?;

        info!(table, partition_key, "Create table request accepted");
        Ok(())
    }

    async fn put_item(&self, table: &str, item: Item) -> Result<(), TableError> {
        self.client
            .put_item()
            .table_name(table)
            .set_item(Some(item_to_sdk(item)))
            .send()
            .await
            .map_err(|err| TableError::Service(Box::new(err.into_service_error())))?;
        Ok(())
    }

    async fn get_item(
        &self,
        table: &str,
        key_name: &str,
        key: AttributeValue,
    ) -> Result<Option<Item>, TableError> {
        let output = self
            .client
            .get_item()
            .table_name(table)
            .key(key_name, to_sdk(key))
            .send()
            .await
            .map_err(|err| TableError::Service(Box::new(err.into_service_error())))?;

        output.item().map(item_from_sdk).transpose()
    }

    async fn scan(&self, table: &str) -> Result<Vec<Item>, TableError> {
        let mut items = Vec::new();
        let mut start_key: Option<SdkItem> = None;

        // A single scan call stops at 1 MB; keep going until the last page
        loop {
            let output = self
                .client
                .scan()
                .table_name(table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|err| TableError::Service(Box::new(err.into_service_error())))?;

            for item in output.items() {
                items.push(item_from_sdk(item)?);
            }

            match output.last_evaluated_key() {
                Some(key) if !key.is_empty() => start_key = Some(key.clone()),
                _ => break,
            }
        }

        Ok(items)
    }
}
