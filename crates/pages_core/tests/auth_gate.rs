use pages_core::{
    AccessDenied, Account, AuthError, AuthGate, CallContext, CallMetadata, MemoryStore,
    Operation, Page, Session, Store, StoreError, StoreResult,
};
use std::sync::Arc;

fn gate_with_session() -> (AuthGate, String, String) {
    let store = Arc::new(MemoryStore::new());
    let account = store.account_create("Ann", "ann@x", "pw").unwrap();
    let token = store.token_set(&account.id).unwrap();
    (AuthGate::new(store), account.id, token)
}

fn protected_operations() -> Vec<Operation> {
    Operation::all()
        .iter()
        .copied()
        .filter(|operation| !operation.is_public())
        .collect()
}

#[test]
fn public_operations_bypass_token_checks() {
    let (gate, _, _) = gate_with_session();
    let bogus = CallMetadata::with_token("bogus");

    for operation in Operation::all().iter().filter(|operation| operation.is_public()) {
        assert_eq!(
            gate.authorize_operation(*operation, None).unwrap(),
            CallContext::Anonymous
        );
        assert_eq!(
            gate.authorize_operation(*operation, Some(&bogus)).unwrap(),
            CallContext::Anonymous
        );
    }
}

#[test]
fn protected_operations_resolve_valid_token_to_caller() {
    let (gate, account_id, token) = gate_with_session();
    let metadata = CallMetadata::with_token(token);

    for operation in protected_operations() {
        let context = gate.authorize_operation(operation, Some(&metadata)).unwrap();
        assert_eq!(context.account_id(), Some(account_id.as_str()));
    }
}

#[test]
fn protected_operation_without_metadata_is_denied() {
    let (gate, _, _) = gate_with_session();

    for operation in protected_operations() {
        let err = gate.authorize_operation(operation, None).unwrap_err();
        assert!(matches!(err, AuthError::Denied(AccessDenied::MissingMetadata)));
    }
}

#[test]
fn protected_operation_without_token_is_denied() {
    let (gate, _, _) = gate_with_session();
    let mut metadata = CallMetadata::new();
    metadata.append("user-agent", "pages-cli");

    let err = gate
        .authorize("/Pages/PageCreate", Some(&metadata))
        .unwrap_err();
    assert!(matches!(err, AuthError::Denied(AccessDenied::MissingToken)));

    let empty = CallMetadata::with_token("");
    let err = gate.authorize("/Pages/PageCreate", Some(&empty)).unwrap_err();
    assert!(matches!(err, AuthError::Denied(AccessDenied::MissingToken)));
}

#[test]
fn protected_operation_with_unknown_token_is_denied() {
    let (gate, _, _) = gate_with_session();
    let metadata = CallMetadata::with_token("not-a-real-token");

    let err = gate
        .authorize("/Pages/PageDelete", Some(&metadata))
        .unwrap_err();
    assert!(matches!(err, AuthError::Denied(AccessDenied::InvalidToken)));
    assert_eq!(err.code(), "access_denied_invalid_token");
}

#[test]
fn split_token_values_are_concatenated() {
    let (gate, account_id, token) = gate_with_session();
    let (head, tail) = token.split_at(token.len() / 2);
    let mut metadata = CallMetadata::with_token(head);
    metadata.append("TOKEN", tail);

    let context = gate.authorize("/Pages/PageUpdate", Some(&metadata)).unwrap();
    assert_eq!(context.account_id(), Some(account_id.as_str()));
}

#[test]
fn unknown_methods_are_treated_as_protected() {
    let (gate, account_id, token) = gate_with_session();

    let err = gate.authorize("/Pages/PageExport", None).unwrap_err();
    assert!(matches!(err, AuthError::Denied(AccessDenied::MissingMetadata)));

    // Exact matching only: a near-miss of a public name is not public.
    let err = gate.authorize("/accounts/register", None).unwrap_err();
    assert!(matches!(err, AuthError::Denied(AccessDenied::MissingMetadata)));

    let metadata = CallMetadata::with_token(token);
    let context = gate.authorize("/Pages/PageExport", Some(&metadata)).unwrap();
    assert_eq!(context.account_id(), Some(account_id.as_str()));
}

#[test]
fn revoked_token_is_denied_after_reissue() {
    let store = Arc::new(MemoryStore::new());
    let account = store.account_create("Ann", "ann@x", "pw").unwrap();
    let old_token = store.token_set(&account.id).unwrap();
    let new_token = store.token_set(&account.id).unwrap();
    let gate = AuthGate::new(store);

    let err = gate
        .authorize("/Pages/PageCreate", Some(&CallMetadata::with_token(old_token)))
        .unwrap_err();
    assert!(matches!(err, AuthError::Denied(AccessDenied::InvalidToken)));

    gate.authorize("/Pages/PageCreate", Some(&CallMetadata::with_token(new_token)))
        .unwrap();
}

struct BrokenStore;

impl BrokenStore {
    fn fail<T>() -> StoreResult<T> {
        Err(StoreError::InvalidData("backend offline".to_string()))
    }
}

impl Store for BrokenStore {
    fn description(&self) -> &'static str {
        "broken"
    }
    fn account(&self, _id: &str) -> StoreResult<Account> {
        Self::fail()
    }
    fn account_for_email(&self, _email: &str) -> StoreResult<Account> {
        Self::fail()
    }
    fn account_for_token(&self, _token: &str) -> StoreResult<Account> {
        Self::fail()
    }
    fn account_for_password(&self, _id: &str, _attempt: &str) -> StoreResult<Account> {
        Self::fail()
    }
    fn account_create(&self, _name: &str, _email: &str, _password: &str) -> StoreResult<Account> {
        Self::fail()
    }
    fn account_register(&self, _name: &str, _email: &str, _password: &str) -> StoreResult<Session> {
        Self::fail()
    }
    fn token_set(&self, _account_id: &str) -> StoreResult<String> {
        Self::fail()
    }
    fn pages(&self) -> StoreResult<Vec<Page>> {
        Self::fail()
    }
    fn page(&self, _id: &str) -> StoreResult<Page> {
        Self::fail()
    }
    fn page_create(&self, _account_id: &str, _text: &str) -> StoreResult<Page> {
        Self::fail()
    }
    fn page_update(&self, _id: &str, _account_id: &str, _text: &str) -> StoreResult<Page> {
        Self::fail()
    }
    fn page_delete(&self, _id: &str, _account_id: &str) -> StoreResult<Page> {
        Self::fail()
    }
}

#[test]
fn storage_faults_are_not_reported_as_invalid_token() {
    let gate = AuthGate::new(Arc::new(BrokenStore));
    let metadata = CallMetadata::with_token("whatever");

    let err = gate
        .authorize("/Pages/PageCreate", Some(&metadata))
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Store(StoreError::InvalidData(_))
    ));

    // Public calls never touch storage.
    assert_eq!(
        gate.authorize("/Pages/PageList", None).unwrap(),
        CallContext::Anonymous
    );
}
