//! Golden stamping scenarios.
//!
//! Every run of a vector must produce the same signer, original identifier
//! and canonical message.

/// A fixed stamping scenario.
#[derive(Debug, Clone)]
pub struct StampVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Pages in the generated source document.
    pub page_count: u32,
    /// Requested page (1-based, may be out of range).
    pub page: u32,
    /// Page actually expected to carry the stamp.
    pub expected_page: u32,
    /// Signature position.
    pub position: (f64, f64),
    /// Signature scale.
    pub scale: f64,
    /// Attestation timestamp.
    pub timestamp_millis: u64,
    /// Organization, if any.
    pub organization: Option<&'static str>,
    /// Expected organization field in the attestation text.
    pub expected_organization: &'static str,
}

/// Get all golden vectors.
pub fn all_vectors() -> Vec<StampVector> {
    vec![
        StampVector {
            name: "single page, Acme",
            page_count: 1,
            page: 1,
            expected_page: 1,
            position: (50.0, 50.0),
            scale: 1.0,
            timestamp_millis: 1_700_000_000_000,
            organization: Some("Acme"),
            expected_organization: "Acme",
        },
        StampVector {
            name: "second of five, no organization",
            page_count: 5,
            page: 2,
            expected_page: 2,
            position: (300.0, 120.0),
            scale: 0.5,
            timestamp_millis: 1_700_000_000_000,
            organization: None,
            expected_organization: "-",
        },
        StampVector {
            name: "page out of range clamps to last",
            page_count: 3,
            page: 99,
            expected_page: 3,
            position: (72.0, 72.0),
            scale: 1.0,
            timestamp_millis: 0,
            organization: Some("Example Corp"),
            expected_organization: "Example Corp",
        },
    ]
}
