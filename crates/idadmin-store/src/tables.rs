//! Committed tables and their constraint-checked mutations.

use std::collections::BTreeMap;

use idadmin_api_resource::domain::aggregates::{ApiResource, ApiScope};
use idadmin_client::domain::aggregates::{Client, ClientClaim, ClientProperty};
use idadmin_core::secret::Secret;
use idadmin_identity_resource::domain::aggregates::IdentityResource;
use idadmin_persisted_grant::domain::aggregates::PersistedGrant;

use crate::error::StoreError;

const API_RESOURCES: &str = "api_resources";
const API_SECRETS: &str = "api_secrets";
const API_SCOPES: &str = "api_scopes";
const CLIENTS: &str = "clients";
const CLIENT_SECRETS: &str = "client_secrets";
const CLIENT_CLAIMS: &str = "client_claims";
const CLIENT_PROPERTIES: &str = "client_properties";
const IDENTITY_RESOURCES: &str = "identity_resources";
const GRANTS: &str = "persisted_grants";

/// Every aggregate, keyed by natural key. Children live inside their parent.
#[derive(Debug, Clone, Default)]
pub struct Tables {
    /// API resources by name.
    pub api_resources: BTreeMap<String, ApiResource>,
    /// Clients by client id.
    pub clients: BTreeMap<String, Client>,
    /// Identity resources by name.
    pub identity_resources: BTreeMap<String, IdentityResource>,
    /// Persisted grants by key.
    pub grants: BTreeMap<String, PersistedGrant>,
}

fn insert<T>(
    rows: &mut BTreeMap<String, T>,
    table: &'static str,
    key: String,
    row: T,
) -> Result<(), StoreError> {
    if rows.contains_key(&key) {
        return Err(StoreError::Duplicate { table, key });
    }
    rows.insert(key, row);
    Ok(())
}

/// Moves the row at `old_key` to `new_key`, built by `merge` from the row
/// as committed and the staged replacement.
fn replace<T>(
    rows: &mut BTreeMap<String, T>,
    table: &'static str,
    old_key: &str,
    new_key: String,
    merge: impl FnOnce(T) -> T,
) -> Result<(), StoreError> {
    if !rows.contains_key(old_key) {
        return Err(missing(table, old_key));
    }
    if new_key != old_key && rows.contains_key(&new_key) {
        return Err(StoreError::Duplicate {
            table,
            key: new_key,
        });
    }
    let committed = rows.remove(old_key).ok_or_else(|| missing(table, old_key))?;
    rows.insert(new_key, merge(committed));
    Ok(())
}

fn delete<T>(rows: &mut BTreeMap<String, T>, table: &'static str, key: &str) -> Result<T, StoreError> {
    rows.remove(key).ok_or_else(|| missing(table, key))
}

fn row_mut<'a, T>(
    rows: &'a mut BTreeMap<String, T>,
    table: &'static str,
    key: &str,
) -> Result<&'a mut T, StoreError> {
    rows.get_mut(key).ok_or_else(|| missing(table, key))
}

/// Removes the first child matching `predicate`.
fn remove_child<T>(
    children: &mut Vec<T>,
    table: &'static str,
    key: &str,
    predicate: impl Fn(&T) -> bool,
) -> Result<(), StoreError> {
    let index = children
        .iter()
        .position(predicate)
        .ok_or_else(|| missing(table, key))?;
    children.remove(index);
    Ok(())
}

fn missing(table: &'static str, key: &str) -> StoreError {
    StoreError::Missing {
        table,
        key: key.to_owned(),
    }
}

impl Tables {
    pub(crate) fn insert_api_resource(&mut self, resource: ApiResource) -> Result<(), StoreError> {
        insert(
            &mut self.api_resources,
            API_RESOURCES,
            resource.name.clone(),
            resource,
        )
    }

    /// Top-level fields come from `resource`; secrets and scopes stay as
    /// committed.
    pub(crate) fn replace_api_resource(
        &mut self,
        old_name: &str,
        resource: ApiResource,
    ) -> Result<(), StoreError> {
        replace(
            &mut self.api_resources,
            API_RESOURCES,
            old_name,
            resource.name.clone(),
            |committed| ApiResource {
                secrets: committed.secrets,
                scopes: committed.scopes,
                ..resource
            },
        )
    }

    pub(crate) fn delete_api_resource(&mut self, name: &str) -> Result<(), StoreError> {
        delete(&mut self.api_resources, API_RESOURCES, name).map(|_| ())
    }

    pub(crate) fn add_api_secret(&mut self, name: &str, secret: Secret) -> Result<(), StoreError> {
        let resource = row_mut(&mut self.api_resources, API_RESOURCES, name)?;
        if resource.has_secret(&secret.secret_type, &secret.value) {
            return Err(StoreError::Duplicate {
                table: API_SECRETS,
                key: secret.secret_type,
            });
        }
        resource.secrets.push(secret);
        Ok(())
    }

    pub(crate) fn remove_api_secret(
        &mut self,
        name: &str,
        secret_type: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let resource = row_mut(&mut self.api_resources, API_RESOURCES, name)?;
        remove_child(&mut resource.secrets, API_SECRETS, secret_type, |s| {
            s.matches(secret_type, value)
        })
    }

    pub(crate) fn add_api_scope(&mut self, name: &str, scope: ApiScope) -> Result<(), StoreError> {
        let resource = row_mut(&mut self.api_resources, API_RESOURCES, name)?;
        if resource.has_scope(&scope.name) {
            return Err(StoreError::Duplicate {
                table: API_SCOPES,
                key: scope.name,
            });
        }
        resource.scopes.push(scope);
        Ok(())
    }

    pub(crate) fn remove_api_scope(&mut self, name: &str, scope_name: &str) -> Result<(), StoreError> {
        let resource = row_mut(&mut self.api_resources, API_RESOURCES, name)?;
        remove_child(&mut resource.scopes, API_SCOPES, scope_name, |s| {
            s.name == scope_name
        })
    }

    pub(crate) fn insert_client(&mut self, client: Client) -> Result<(), StoreError> {
        insert(
            &mut self.clients,
            CLIENTS,
            client.client_id().to_owned(),
            client,
        )
    }

    /// Settings come from `client`; secrets, claims and properties stay as
    /// committed.
    pub(crate) fn replace_client(&mut self, old_client_id: &str, client: Client) -> Result<(), StoreError> {
        let new_key = client.client_id().to_owned();
        replace(&mut self.clients, CLIENTS, old_client_id, new_key, |committed| {
            committed.with_settings(client.settings)
        })
    }

    pub(crate) fn delete_client(&mut self, client_id: &str) -> Result<(), StoreError> {
        delete(&mut self.clients, CLIENTS, client_id).map(|_| ())
    }

    pub(crate) fn add_client_secret(&mut self, client_id: &str, secret: Secret) -> Result<(), StoreError> {
        let client = row_mut(&mut self.clients, CLIENTS, client_id)?;
        if client.has_secret(&secret.secret_type, &secret.value) {
            return Err(StoreError::Duplicate {
                table: CLIENT_SECRETS,
                key: secret.secret_type,
            });
        }
        client.secrets.push(secret);
        Ok(())
    }

    pub(crate) fn remove_client_secret(
        &mut self,
        client_id: &str,
        secret_type: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let client = row_mut(&mut self.clients, CLIENTS, client_id)?;
        remove_child(&mut client.secrets, CLIENT_SECRETS, secret_type, |s| {
            s.matches(secret_type, value)
        })
    }

    pub(crate) fn add_client_claim(&mut self, client_id: &str, claim: ClientClaim) -> Result<(), StoreError> {
        let client = row_mut(&mut self.clients, CLIENTS, client_id)?;
        if client.has_claim(&claim.claim_type, &claim.value) {
            return Err(StoreError::Duplicate {
                table: CLIENT_CLAIMS,
                key: claim.claim_type,
            });
        }
        client.claims.push(claim);
        Ok(())
    }

    pub(crate) fn remove_client_claim(
        &mut self,
        client_id: &str,
        claim_type: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let client = row_mut(&mut self.clients, CLIENTS, client_id)?;
        remove_child(&mut client.claims, CLIENT_CLAIMS, claim_type, |c| {
            c.claim_type == claim_type && c.value == value
        })
    }

    pub(crate) fn add_client_property(
        &mut self,
        client_id: &str,
        property: ClientProperty,
    ) -> Result<(), StoreError> {
        let client = row_mut(&mut self.clients, CLIENTS, client_id)?;
        if client.has_property_key(&property.key) {
            return Err(StoreError::Duplicate {
                table: CLIENT_PROPERTIES,
                key: property.key,
            });
        }
        client.properties.push(property);
        Ok(())
    }

    pub(crate) fn remove_client_property(
        &mut self,
        client_id: &str,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let client = row_mut(&mut self.clients, CLIENTS, client_id)?;
        remove_child(&mut client.properties, CLIENT_PROPERTIES, key, |p| {
            p.key == key && p.value == value
        })
    }

    pub(crate) fn insert_identity_resource(&mut self, resource: IdentityResource) -> Result<(), StoreError> {
        insert(
            &mut self.identity_resources,
            IDENTITY_RESOURCES,
            resource.name.clone(),
            resource,
        )
    }

    pub(crate) fn replace_identity_resource(
        &mut self,
        old_name: &str,
        resource: IdentityResource,
    ) -> Result<(), StoreError> {
        replace(
            &mut self.identity_resources,
            IDENTITY_RESOURCES,
            old_name,
            resource.name.clone(),
            |_| resource,
        )
    }

    pub(crate) fn delete_identity_resource(&mut self, name: &str) -> Result<(), StoreError> {
        delete(&mut self.identity_resources, IDENTITY_RESOURCES, name).map(|_| ())
    }

    pub(crate) fn delete_grant(&mut self, key: &str) -> Result<(), StoreError> {
        delete(&mut self.grants, GRANTS, key).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use idadmin_api_resource::domain::aggregates::ApiResourceFields;

    use super::*;

    fn resource(name: &str) -> ApiResource {
        ApiResourceFields {
            name: name.to_owned(),
            display_name: None,
            description: None,
            enabled: true,
            user_claims: Vec::new(),
        }
        .into_new_resource()
    }

    #[test]
    fn test_insert_rejects_duplicate_key() {
        let mut tables = Tables::default();
        tables.insert_api_resource(resource("payments-api")).unwrap();

        let err = tables.insert_api_resource(resource("payments-api")).unwrap_err();

        assert_eq!(
            err,
            StoreError::Duplicate {
                table: API_RESOURCES,
                key: "payments-api".to_owned()
            }
        );
    }

    #[test]
    fn test_rename_onto_existing_key_is_rejected() {
        let mut tables = Tables::default();
        tables.insert_api_resource(resource("payments-api")).unwrap();
        tables.insert_api_resource(resource("billing-api")).unwrap();

        let result = tables.replace_api_resource("payments-api", resource("billing-api"));

        assert!(matches!(result, Err(StoreError::Duplicate { .. })));
        assert!(tables.api_resources.contains_key("payments-api"));
    }

    #[test]
    fn test_rename_moves_the_row() {
        let mut tables = Tables::default();
        tables.insert_api_resource(resource("payments-api")).unwrap();

        tables
            .replace_api_resource("payments-api", resource("billing-api"))
            .unwrap();

        assert!(!tables.api_resources.contains_key("payments-api"));
        assert!(tables.api_resources.contains_key("billing-api"));
    }

    #[test]
    fn test_child_removal_requires_a_match() {
        let mut tables = Tables::default();
        tables.insert_api_resource(resource("payments-api")).unwrap();

        let missing = tables.remove_api_scope("payments-api", "payments.write");
        let removed = tables.remove_api_scope("payments-api", "payments-api");

        assert!(matches!(missing, Err(StoreError::Missing { table: API_SCOPES, .. })));
        assert!(removed.is_ok());
        assert!(tables.api_resources["payments-api"].scopes.is_empty());
    }

    #[test]
    fn test_duplicate_api_secret_is_rejected() {
        let mut tables = Tables::default();
        tables.insert_api_resource(resource("payments-api")).unwrap();
        let secret = Secret {
            secret_type: "SharedSecret".to_owned(),
            value: "digest".to_owned(),
            description: None,
            expiration: None,
        };
        tables.add_api_secret("payments-api", secret.clone()).unwrap();

        let err = tables.add_api_secret("payments-api", secret).unwrap_err();

        assert!(matches!(err, StoreError::Duplicate { table: API_SECRETS, .. }));
        assert_eq!(tables.api_resources["payments-api"].secrets.len(), 1);
    }

    #[test]
    fn test_replace_keeps_committed_children() {
        let mut tables = Tables::default();
        tables.insert_api_resource(resource("payments-api")).unwrap();
        tables
            .add_api_scope("payments-api", ApiScope::named("payments.read", None))
            .unwrap();
        let mut edited = resource("payments-api");
        edited.display_name = Some("Payments".to_owned());

        tables.replace_api_resource("payments-api", edited).unwrap();

        let stored = &tables.api_resources["payments-api"];
        assert_eq!(stored.display_name.as_deref(), Some("Payments"));
        assert!(stored.has_scope("payments.read"));
        assert!(stored.has_scope("payments-api"));
    }
}
