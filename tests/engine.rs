//! End-to-end tests through the public API.

use cryptoforge::encoding::{decode_base64, encode_base64};
use cryptoforge::prime::{is_carmichael_number, is_probable_prime};
use cryptoforge::{
    BigUint, EngineConfig, Error, HashAlgorithm, KeyPair, PrivateKeyParts, PublicKeyParts,
    RandomSource, RsaEngine,
};
use rand_chacha::ChaCha8Rng;
use rand_core::{OsRng, SeedableRng};

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::from_seed([42; 32])
}

#[test]
fn seeded_keys_are_reproducible() {
    let mut a = RsaEngine::new();
    let mut b = RsaEngine::new();
    let ka = a.generate_key_pair(1024, RandomSource::Seeded(1234)).unwrap().clone();
    let kb = b.generate_key_pair(1024, RandomSource::Seeded(1234)).unwrap().clone();
    assert_eq!(ka, kb);
    assert_ne!(a.session_id(), b.session_id());
}

#[test]
fn secure_keys_differ() {
    let mut a = RsaEngine::new();
    let mut b = RsaEngine::new();
    let ka = a.generate_key_pair(512, RandomSource::Secure).unwrap().clone();
    let kb = b.generate_key_pair(512, RandomSource::Secure).unwrap().clone();
    assert_ne!(ka.n(), kb.n());
}

#[test]
fn generated_exponents_invert() {
    let mut rng = rng();
    let mut engine = RsaEngine::new();
    let key = engine.generate_key_pair_with_rng(&mut rng, 768).unwrap();

    let n = key.n();
    let d = key.d().unwrap();
    assert!(!is_probable_prime(n, 20, &mut rng));

    // e*d = 1 mod phi means m^(ed) = m mod n for every m
    for m in [2u32, 3, 65535].iter() {
        let m = BigUint::from(*m);
        assert_eq!(m.modpow(&(key.e() * d), n), m);
    }
}

#[test]
fn text_and_long_text_with_2048_bit_key() {
    let mut engine = RsaEngine::new();
    engine.generate_key_pair(2048, RandomSource::Seeded(2048)).unwrap();
    let mut rng = rng();

    let text = "The quick brown fox jumps over the lazy dog";
    let c = engine.encrypt_text(&mut rng, text).unwrap();
    assert_eq!(decode_base64(&c).unwrap().len(), 256);
    assert_eq!(engine.decrypt_text(&c).unwrap(), text);

    let long = text.repeat(30);
    let blocks = engine.encrypt_long_text(&mut rng, &long).unwrap();
    assert_eq!(blocks.len(), (long.len() + 244) / 245);
    assert_eq!(engine.decrypt_long_text(&blocks).unwrap(), long);

    let sig = engine.sign_message(text, HashAlgorithm::Sha512).unwrap();
    assert!(engine.verify_signature(text, &sig, HashAlgorithm::Sha512));
    assert!(!engine.verify_signature(text, &sig, HashAlgorithm::Sha256));
}

#[test]
fn exported_keys_work_across_engines() {
    let mut owner = RsaEngine::new();
    owner.generate_key_pair(512, RandomSource::Seeded(99)).unwrap();
    let bundle = owner.export_key_pair().unwrap();

    let mut sender = RsaEngine::new();
    sender.load_public_key(&bundle.public_key).unwrap();
    assert_eq!(sender.key_info().unwrap().fingerprint, owner.key_info().unwrap().fingerprint);

    let c = sender.encrypt_text(&mut OsRng, "meet at noon").unwrap();
    assert_eq!(sender.decrypt_text(&c), Err(Error::NoPrivateKey));
    assert_eq!(owner.decrypt_text(&c).unwrap(), "meet at noon");

    let mut restored = RsaEngine::new();
    restored.load_private_key(bundle.private_key.as_deref().unwrap()).unwrap();
    assert_eq!(restored.key_pair(), owner.key_pair());
    assert_eq!(restored.decrypt_text(&c).unwrap(), "meet at noon");
}

#[test]
fn signatures_reject_any_change() {
    let mut engine = RsaEngine::new();
    engine.generate_key_pair(512, RandomSource::Seeded(5)).unwrap();
    let sig = engine.sign_message("pay 100", HashAlgorithm::Sha256).unwrap();

    assert!(engine.verify_signature("pay 100", &sig, HashAlgorithm::Sha256));
    assert!(!engine.verify_signature("pay 1000", &sig, HashAlgorithm::Sha256));

    let mut raw = decode_base64(&sig).unwrap();
    let last = raw.len() - 1;
    raw[last] ^= 0x80;
    assert!(!engine.verify_signature("pay 100", &encode_base64(&raw), HashAlgorithm::Sha256));

    // a signature from another key
    let mut other = RsaEngine::new();
    other.generate_key_pair(512, RandomSource::Seeded(6)).unwrap();
    let foreign = other.sign_message("pay 100", HashAlgorithm::Sha256).unwrap();
    assert!(!engine.verify_signature("pay 100", &foreign, HashAlgorithm::Sha256));
}

#[test]
fn textbook_key_rejects_text() {
    let key = KeyPair::from_components(
        BigUint::from(17u32),
        BigUint::from(3233u32),
        Some(BigUint::from(2753u32)),
    )
    .unwrap();
    let mut engine = RsaEngine::new();
    engine.load_key_pair(key);

    assert_eq!(engine.encrypt_text(&mut rng(), "a"), Err(Error::MessageTooLarge));
    assert_eq!(engine.encrypt_number(&BigUint::from(65u32)).unwrap(), BigUint::from(2790u32));
    assert_eq!(engine.decrypt_number(&BigUint::from(2790u32)).unwrap(), BigUint::from(65u32));
    let factor = engine.find_factor(engine.key_pair().unwrap().n());
    assert!(factor == BigUint::from(53u32) || factor == BigUint::from(61u32));
}

#[test]
fn config_from_json_drives_engine() {
    let config = EngineConfig::from_json(
        r#"{"miller_rabin_rounds": 8, "preferred_exponents": [17], "default_hash": "sha384"}"#,
    )
    .unwrap();
    let mut engine = RsaEngine::with_config(config);
    engine.generate_key_pair(512, RandomSource::Seeded(17)).unwrap();

    let sig = engine.sign_default("hello").unwrap();
    assert!(engine.verify_signature_named("hello", &sig, "sha-384"));
    assert!(engine.verify_default("hello", &sig));
}

#[test]
fn config_rejects_weak_generation_settings() {
    for json in [r#"{"preferred_exponents": [1]}"#, r#"{"miller_rabin_rounds": 0}"#] {
        assert!(matches!(EngineConfig::from_json(json), Err(Error::InvalidConfig(_))));
    }

    let mut engine = RsaEngine::with_config(EngineConfig {
        preferred_exponents: vec![1],
        ..EngineConfig::default()
    });
    assert!(matches!(
        engine.generate_key_pair(512, RandomSource::Seeded(1)),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn carmichael_numbers() {
    let mut rng = rng();
    assert!(is_carmichael_number(&BigUint::from(561u32), &mut rng));
    assert!(!is_carmichael_number(&BigUint::from(562u32), &mut rng));
}
