use pages_core::{MemoryStore, SqliteStore, Store, StoreError};
use std::collections::HashSet;
use std::sync::Arc;

fn backends() -> Vec<Arc<dyn Store>> {
    vec![
        Arc::new(MemoryStore::new()),
        Arc::new(SqliteStore::open_in_memory().unwrap()),
    ]
}

#[test]
fn account_create_and_lookups_agree() {
    for store in backends() {
        let created = store.account_create("Ann", "ann@x", "pw").unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.name, "Ann");
        assert_eq!(created.email, "ann@x");
        assert_eq!(created.created, created.modified);

        assert_eq!(store.account(&created.id).unwrap(), created);
        assert_eq!(store.account_for_email("ann@x").unwrap(), created);
    }
}

#[test]
fn duplicate_email_is_rejected() {
    for store in backends() {
        store.account_create("Ann", "ann@x", "pw").unwrap();
        let err = store.account_create("Other", "ann@x", "pw2").unwrap_err();
        assert!(
            matches!(err, StoreError::EmailTaken(ref email) if email == "ann@x"),
            "{}: unexpected error {err}",
            store.description()
        );
        assert_eq!(err.code(), "email_taken");

        let stored = store.account_for_email("ann@x").unwrap();
        assert_eq!(stored.name, "Ann");
        store.account_for_password(&stored.id, "pw").unwrap();
        assert!(matches!(
            store.account_for_password(&stored.id, "pw2").unwrap_err(),
            StoreError::PasswordInvalid
        ));

        let err = store.account_register("Other", "ann@x", "pw2").unwrap_err();
        assert!(matches!(err, StoreError::EmailTaken(_)));
        assert_eq!(store.account_for_email("ann@x").unwrap(), stored);
    }
}

#[test]
fn account_register_stores_account_and_token_together() {
    for store in backends() {
        let session = store.account_register("Ann", "ann@x", "pw").unwrap();
        let backend = store.description();

        assert_eq!(session.token.len(), 64);
        assert_eq!(
            store.account(&session.account.id).unwrap(),
            session.account,
            "{backend}: returned account must match what was stored"
        );
        assert_eq!(store.account_for_token(&session.token).unwrap(), session.account);
        store.account_for_password(&session.account.id, "pw").unwrap();

        let next = store.token_set(&session.account.id).unwrap();
        assert!(matches!(
            store.account_for_token(&session.token).unwrap_err(),
            StoreError::InvalidToken
        ));
        assert_eq!(store.account_for_token(&next).unwrap().id, session.account.id);
    }
}

#[test]
fn missing_account_lookups_fail_with_not_found() {
    for store in backends() {
        let err = store.account("nope").unwrap_err();
        assert!(matches!(err, StoreError::AccountNotFound(_)));
        assert!(err.is_not_found());

        let err = store.account_for_email("nobody@x").unwrap_err();
        assert!(matches!(err, StoreError::AccountNotFound(_)));

        let err = store.token_set("nope").unwrap_err();
        assert!(matches!(err, StoreError::AccountNotFound(_)));
    }
}

#[test]
fn password_check_accepts_match_and_rejects_mismatch() {
    for store in backends() {
        let account = store.account_create("Ann", "ann@x", "secret").unwrap();

        let verified = store.account_for_password(&account.id, "secret").unwrap();
        assert_eq!(verified.id, account.id);

        let err = store
            .account_for_password(&account.id, "Secret")
            .unwrap_err();
        assert!(matches!(err, StoreError::PasswordInvalid));
        assert_eq!(err.code(), "password_invalid");
    }
}

#[test]
fn token_set_mints_resolvable_token_and_revokes_previous() {
    for store in backends() {
        let account = store.account_create("Ann", "ann@x", "pw").unwrap();

        let first = store.token_set(&account.id).unwrap();
        assert_eq!(first.len(), 64);
        assert_eq!(store.account_for_token(&first).unwrap().id, account.id);

        let second = store.token_set(&account.id).unwrap();
        assert_ne!(first, second);
        assert_eq!(store.account_for_token(&second).unwrap().id, account.id);

        let err = store.account_for_token(&first).unwrap_err();
        assert!(
            matches!(err, StoreError::InvalidToken),
            "{}: previous token should be revoked",
            store.description()
        );
        assert!(store.account(&account.id).unwrap().modified > account.modified);
    }
}

#[test]
fn unknown_and_empty_tokens_are_invalid() {
    for store in backends() {
        let account = store.account_create("Ann", "ann@x", "pw").unwrap();
        store.token_set(&account.id).unwrap();

        assert!(matches!(
            store.account_for_token("not-a-token").unwrap_err(),
            StoreError::InvalidToken
        ));
        assert!(matches!(
            store.account_for_token("").unwrap_err(),
            StoreError::InvalidToken
        ));
    }
}

#[test]
fn tokens_are_distinct_across_accounts() {
    for store in backends() {
        let mut seen = HashSet::new();
        for index in 0..5 {
            let account = store
                .account_create("user", &format!("user{index}@x"), "pw")
                .unwrap();
            let token = store.token_set(&account.id).unwrap();
            assert!(seen.insert(token));
        }
    }
}

#[test]
fn page_create_embeds_owner_and_is_readable() {
    for store in backends() {
        let ann = store.account_create("Ann", "ann@x", "pw").unwrap();
        let page = store.page_create(&ann.id, "hello").unwrap();

        assert_eq!(page.text, "hello");
        assert_eq!(page.account, ann);
        assert_eq!(page.created, page.modified);
        assert!(page.is_owned_by(&ann.id));

        assert_eq!(store.page(&page.id).unwrap(), page);
    }
}

#[test]
fn page_create_for_unknown_account_fails() {
    for store in backends() {
        let err = store.page_create("ghost", "text").unwrap_err();
        assert!(matches!(err, StoreError::AccountNotFound(_)));
        assert!(store.pages().unwrap().is_empty());
    }
}

#[test]
fn missing_page_fails_with_page_not_found() {
    for store in backends() {
        let ann = store.account_create("Ann", "ann@x", "pw").unwrap();

        assert!(matches!(
            store.page("nope").unwrap_err(),
            StoreError::PageNotFound(_)
        ));
        assert!(matches!(
            store.page_update("nope", &ann.id, "x").unwrap_err(),
            StoreError::PageNotFound(_)
        ));
        assert!(matches!(
            store.page_delete("nope", &ann.id).unwrap_err(),
            StoreError::PageNotFound(_)
        ));
    }
}

#[test]
fn owner_can_update_and_delete() {
    for store in backends() {
        let ann = store.account_create("Ann", "ann@x", "pw").unwrap();
        let page = store.page_create(&ann.id, "draft").unwrap();

        let updated = store.page_update(&page.id, &ann.id, "final").unwrap();
        assert_eq!(updated.id, page.id);
        assert_eq!(updated.text, "final");
        assert_eq!(updated.created, page.created);
        assert!(updated.modified > page.modified);
        assert_eq!(updated.account.id, ann.id);
        assert_eq!(store.page(&page.id).unwrap().text, "final");

        let removed = store.page_delete(&page.id, &ann.id).unwrap();
        assert_eq!(removed, updated);
        assert!(matches!(
            store.page(&page.id).unwrap_err(),
            StoreError::PageNotFound(_)
        ));
    }
}

#[test]
fn non_owner_writes_are_unauthorized_and_leave_page_intact() {
    for store in backends() {
        let ann = store.account_create("Ann", "ann@x", "pw").unwrap();
        let bob = store.account_create("Bob", "bob@x", "pw").unwrap();
        let page = store.page_create(&ann.id, "mine").unwrap();

        let err = store.page_update(&page.id, &bob.id, "hijack").unwrap_err();
        match err {
            StoreError::Unauthorized {
                ref page_id,
                ref account_id,
            } => {
                assert_eq!(page_id, &page.id);
                assert_eq!(account_id, &bob.id);
            }
            ref other => panic!("{}: unexpected error {other}", store.description()),
        }
        assert_eq!(err.code(), "unauthorized");

        let err = store.page_delete(&page.id, &bob.id).unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized { .. }));

        assert_eq!(store.page(&page.id).unwrap(), page);
    }
}

#[test]
fn pages_are_listed_in_creation_order_with_owners() {
    for store in backends() {
        let ann = store.account_create("Ann", "ann@x", "pw").unwrap();
        let bob = store.account_create("Bob", "bob@x", "pw").unwrap();

        let first = store.page_create(&ann.id, "one").unwrap();
        let second = store.page_create(&bob.id, "two").unwrap();
        let third = store.page_create(&ann.id, "three").unwrap();

        let pages = store.pages().unwrap();
        let ids: Vec<&str> = pages.iter().map(|page| page.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str(), third.id.as_str()]);
        assert_eq!(pages[0].account, ann);
        assert_eq!(pages[1].account, bob);
        assert_eq!(pages[2].account, ann);
    }
}

#[test]
fn pages_listing_resolves_many_owners() {
    for store in backends() {
        let mut expected = Vec::new();
        for index in 0..40 {
            let owner = store
                .account_create(&format!("user{index}"), &format!("user{index}@x"), "pw")
                .unwrap();
            expected.push(store.page_create(&owner.id, &format!("page {index}")).unwrap());
        }

        assert_eq!(store.pages().unwrap(), expected);
    }
}

#[test]
fn backends_describe_themselves_by_registry_name() {
    let names: Vec<&str> = backends().iter().map(|store| store.description()).collect();
    assert_eq!(names, vec!["memory", "sqlite"]);
}
