//! Object naming.
//!
//! Every upload gets a fresh random name so identical bytes uploaded twice
//! never overwrite each other.

/// Bytes of randomness in an object id.
pub const OBJECT_ID_BYTES: usize = 16;

/// A random lowercase hex id.
///
/// # Errors
///
/// Fails only if the platform has no usable randomness source.
pub fn random_object_id() -> Result<String, getrandom::Error> {
    let mut buf = [0u8; OBJECT_ID_BYTES];
    getrandom::getrandom(&mut buf)?;
    Ok(buf.iter().map(|b| format!("{b:02x}")).collect())
}

/// `{folder}/{id}.{extension}`, or `{id}.{extension}` without a folder.
pub fn object_path(folder: &str, id: &str, extension: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        format!("{id}.{extension}")
    } else {
        format!("{folder}/{id}.{extension}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_path() {
        assert_eq!(object_path("avatars", "ab12", "jpg"), "avatars/ab12.jpg");
        assert_eq!(object_path("/logos/", "ff", "jpg"), "logos/ff.jpg");
        assert_eq!(object_path("", "ff", "jpg"), "ff.jpg");
    }

    #[test]
    fn test_random_object_id_shape() {
        let id = random_object_id().unwrap();
        assert_eq!(id.len(), OBJECT_ID_BYTES * 2);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_random_object_ids_differ() {
        assert_ne!(random_object_id().unwrap(), random_object_id().unwrap());
    }
}
