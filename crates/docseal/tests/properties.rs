//! Property tests over the public pipeline pieces.

use docseal::core::{
    build_rounded_rect_path, identify, layout, AttestationBuilder, LocalSigner, Signer,
    VerificationPayload,
};
use docseal::identify_reader;
use docseal_testkit::generators::{
    document_bytes, organization, rounded_rect, secret_key, timestamp_millis,
};
use docseal_testkit::{dev_signer, recover_signer};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn streaming_identify_matches_in_memory(bytes in document_bytes(4096)) {
        prop_assert_eq!(identify_reader(&bytes[..]).unwrap(), identify(&bytes));
    }

    #[test]
    fn attestation_text_round_trips(
        bytes in document_bytes(256),
        ts in timestamp_millis(),
        org in organization(),
    ) {
        let (attestation, envelope) = AttestationBuilder::new(identify(&bytes))
            .timestamp(ts)
            .organization(org.clone())
            .sign(&dev_signer())
            .unwrap();

        prop_assert_eq!(envelope.attestation_text().unwrap(), attestation.canonical_text());
        prop_assert_eq!(attestation.organization, org);
    }

    #[test]
    fn any_key_recovers_from_payload(key in secret_key(), bytes in document_bytes(64)) {
        // keys above the curve order are rejected, not mis-signed
        if let Ok(signer) = LocalSigner::from_secret_bytes(&key) {
            let (_, envelope) = AttestationBuilder::new(identify(&bytes))
                .sign(&signer)
                .unwrap();
            let payload = VerificationPayload::from_envelope(&envelope);
            let (signature, message) = payload.decode().unwrap();
            prop_assert_eq!(recover_signer(&message, &signature), Some(signer.address()));
        }
    }

    #[test]
    fn trail_fits_any_valid_rectangle((x, y, w, h, r) in rounded_rect()) {
        let path = build_rounded_rect_path(x, y, w, h, r).unwrap();
        let trail = layout("AB", 1.5, &path).unwrap();
        let total = path.total_length();
        prop_assert!(trail.placements().len() as f64 <= (total / 1.5).floor());
        prop_assert!(trail.repeated_text().chars().count() as f64 * 1.5 >= total);
    }
}
