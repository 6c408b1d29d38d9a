pub mod fixtures;

use fixtures::*;
use keyroute_crypto::prelude::*;
use std::sync::Arc;
use std::thread;

#[test]
fn first_registered_provider_wins() {
    let a = provider_for(&["foo"], 1);
    let b = provider_for(&["foo"], 2);
    let crypto = CompositeCrypto::builder().provider(a.clone()).provider(b.clone()).build().unwrap();

    assert!(crypto.can_encrypt(Some("foo")));

    let sealed = crypto.encrypt_text("routed", Some("foo")).unwrap();
    assert_eq!(a.decrypt_text(&sealed, Some("foo")).unwrap(), "routed");
    assert!(b.decrypt_text(&sealed, Some("foo")).is_err(), "Ciphertext must come from A");
}

#[test]
fn misses_fail_with_provider_not_found() {
    let crypto = CompositeCrypto::builder()
        .provider(provider_for(&["foo"], 1))
        .provider(provider_for(&["bar"], 2))
        .build()
        .unwrap();

    assert!(!crypto.can_encrypt(Some("baz")));
    assert!(!crypto.can_decrypt(Some("baz")));

    let result = crypto.encrypt(b"x", Some("baz"));
    assert!(
        matches!(
            &result,
            Err(CryptoError::ProviderNotFound { name, direction: Direction::Encrypt, .. })
                if name.contains("baz")
        ),
        "Must fail with ProviderNotFound naming baz"
    );
}

#[test]
fn empty_composite_claims_nothing() {
    let crypto = CompositeCrypto::builder().providers([]).build().unwrap();

    for name in [None, Some("anything"), Some("foo")] {
        assert!(!crypto.can_encrypt(name));
        assert!(!crypto.can_decrypt(name));
    }
    assert!(matches!(crypto.encryptor(None), Err(CryptoError::ProviderNotFound { .. })));
}

#[test]
fn missing_provider_collection_is_invalid() {
    let result = CompositeCrypto::builder().build();
    assert!(matches!(result, Err(CryptoError::InvalidArgument { .. })));
}

#[test]
fn directions_are_routed_independently() {
    let shared = provider_for(&["audit"], 4);
    let crypto = CompositeCrypto::builder()
        .provider(EncryptOnly(shared.clone()))
        .provider(shared)
        .build()
        .unwrap();

    assert!(crypto.can_encrypt(Some("audit")));
    assert!(crypto.can_decrypt(Some("audit")));

    let direct = crypto.providers()[0].encrypt_text("entry", Some("audit")).unwrap();
    assert_eq!(crypto.decrypt_text(&direct, Some("audit")).unwrap(), "entry");

    let sealed = crypto.encrypt_text("entry", Some("audit")).unwrap();
    assert_eq!(crypto.decrypt_text(&sealed, Some("audit")).unwrap(), "entry");
}

#[test]
fn encrypt_only_names_cannot_be_decrypted() {
    let crypto =
        CompositeCrypto::builder().provider(EncryptOnly(provider_for(&["drop"], 5))).build().unwrap();

    assert!(crypto.can_encrypt(Some("drop")));
    assert!(!crypto.can_decrypt(Some("drop")));

    let sealed = crypto.encrypt(b"one-way", Some("drop")).unwrap();
    let result = crypto.decrypt(&sealed, Some("drop"));
    assert!(matches!(
        result,
        Err(CryptoError::ProviderNotFound { direction: Direction::Decrypt, .. })
    ));
}

#[test]
fn composites_nest() {
    let inner = CompositeCrypto::builder()
        .provider(provider_for(&["a"], 1))
        .provider(provider_for(&["b"], 2))
        .build()
        .unwrap();
    let outer = CompositeCrypto::builder()
        .provider(inner)
        .provider(setup_crypto())
        .build()
        .unwrap();

    for name in [Some("a"), Some("b"), Some("billing"), None] {
        let sealed = outer.encrypt_text("nested", name).unwrap();
        assert_eq!(outer.decrypt_text(&sealed, name).unwrap(), "nested");
    }
    assert!(!outer.can_encrypt(Some("c")));
}

#[test]
fn composite_is_shareable_across_threads() {
    let crypto = Arc::new(
        CompositeCrypto::builder()
            .provider(setup_crypto())
            .provider(provider_for(&["worker"], 9))
            .build()
            .unwrap(),
    );

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let crypto = Arc::clone(&crypto);
            thread::spawn(move || {
                let name = if i % 2 == 0 { Some("worker") } else { Some("billing") };
                for round in 0..32 {
                    let text = format!("{i}:{round}");
                    let sealed = crypto.encrypt_text(&text, name).unwrap();
                    assert_eq!(crypto.decrypt_text(&sealed, name).unwrap(), text);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker panicked");
    }
}

#[test]
fn handles_outlive_their_call_site() {
    let crypto = CompositeCrypto::builder().provider(setup_crypto()).build().unwrap();

    let encryptor = crypto.encryptor(Some("reports")).unwrap();
    let decryptor = crypto.decryptor(Some("reports")).unwrap();
    drop(crypto);

    let sealed = encryptor.encrypt(b"after drop").unwrap();
    assert_eq!(decryptor.decrypt(&sealed).unwrap(), b"after drop");
}
