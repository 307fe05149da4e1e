//! Loading signer keys from command-line style arguments.

use std::path::Path;

use docseal_core::LocalSigner;

use crate::error::Result;

/// Build a signer from `hex` or `@path` (a file holding the hex key).
///
/// Surrounding whitespace and a `0x` prefix are accepted.
pub fn signer_from_arg(arg: &str) -> Result<LocalSigner> {
    let hex = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(Path::new(path))?,
        None => arg.to_string(),
    };
    Ok(LocalSigner::from_hex(hex.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StampError;
    use docseal_core::Signer;
    use docseal_testkit::{DEV_ADDRESS, DEV_KEY_HEX};
    use std::io::Write;

    #[test]
    fn test_inline_key() {
        let signer = signer_from_arg(&format!("0x{DEV_KEY_HEX}")).unwrap();
        assert_eq!(signer.address().to_checksum(), DEV_ADDRESS);
    }

    #[test]
    fn test_key_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{DEV_KEY_HEX}").unwrap();

        let arg = format!("@{}", file.path().display());
        let signer = signer_from_arg(&arg).unwrap();
        assert_eq!(signer.address().to_checksum(), DEV_ADDRESS);
    }

    #[test]
    fn test_bad_keys() {
        assert!(matches!(
            signer_from_arg("not-hex"),
            Err(StampError::Signing(_))
        ));
        assert!(matches!(
            signer_from_arg("@/nonexistent/key"),
            Err(StampError::Io(_))
        ));
    }
}
