//! Path strings and their grammar
//!
//! A path is `[/namespace/]root[/seg1/seg2/...]` where namespace is `ipfs`
//! (content-addressed, root is a CID) or `ipns` (name-addressed, root is a
//! public-key-derived name). A bare string with no namespace marker is
//! accepted when it parses as a CID.
//!
//! All validation happens here, at parse time: a path that parses never
//! fails on grammar during traversal.

use std::fmt;
use std::str::FromStr;

use common::crypto::PublicKey;
use common::linked_data::Cid;

/// Malformed path string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPathError {
    #[error("invalid path: empty input")]
    Empty,
    #[error("invalid path {0:?}: root is not a valid CID")]
    InvalidCid(String),
    #[error("invalid path {0:?}: root is not a valid name")]
    InvalidName(String),
    #[error("invalid path {0:?}")]
    Malformed(String),
}

/// The two path flavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Content-addressed: `/ipfs/...`, immutable.
    Ipfs,
    /// Name-addressed: `/ipns/...`, mutable indirection.
    Ipns,
}

impl Namespace {
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Ipfs => "/ipfs/",
            Namespace::Ipns => "/ipns/",
        }
    }
}

/// The root a path starts from: a CID or a name key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    Cid(Cid),
    Name(PublicKey),
}

/// A parsed, validated path.
///
/// Parsing is deterministic and does no I/O: identical inputs always yield
/// structurally identical paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpfsPath {
    namespace: Namespace,
    root: Root,
    segments: Vec<String>,
}

impl IpfsPath {
    /// A content path rooted at `cid` with no segments.
    pub fn from_cid(cid: Cid) -> Self {
        Self {
            namespace: Namespace::Ipfs,
            root: Root::Cid(cid),
            segments: Vec::new(),
        }
    }

    /// A name path rooted at `name` with no segments.
    pub fn from_name(name: PublicKey) -> Self {
        Self {
            namespace: Namespace::Ipns,
            root: Root::Name(name),
            segments: Vec::new(),
        }
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    pub fn root(&self) -> &Root {
        &self.root
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_name(&self) -> bool {
        matches!(self.namespace, Namespace::Ipns)
    }

    /// The root CID, if content-addressed.
    pub fn root_cid(&self) -> Option<&Cid> {
        match &self.root {
            Root::Cid(cid) => Some(cid),
            Root::Name(_) => None,
        }
    }

    /// The root name key, if name-addressed.
    pub fn root_name(&self) -> Option<&PublicKey> {
        match &self.root {
            Root::Name(name) => Some(name),
            Root::Cid(_) => None,
        }
    }

    /// Append further link segments to walk after this path's own.
    pub fn join(mut self, extra: &[String]) -> Self {
        self.segments.extend_from_slice(extra);
        self
    }
}

impl FromStr for IpfsPath {
    type Err = InvalidPathError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() {
            return Err(InvalidPathError::Empty);
        }

        let (namespace, rest) = if let Some(rest) = input.strip_prefix("/ipfs/") {
            (Some(Namespace::Ipfs), rest)
        } else if let Some(rest) = input.strip_prefix("/ipns/") {
            (Some(Namespace::Ipns), rest)
        } else if input.starts_with('/') {
            return Err(InvalidPathError::Malformed(input.to_string()));
        } else {
            (None, input)
        };

        // one trailing slash is tolerated
        let rest = rest.strip_suffix('/').unwrap_or(rest);

        let mut parts = rest.split('/');
        let root = parts.next().unwrap_or_default();
        if root.is_empty() {
            // a namespace marker with no root, or a bare "/"
            return Err(InvalidPathError::Malformed(input.to_string()));
        }

        let segments: Vec<String> = parts.map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(InvalidPathError::Malformed(input.to_string()));
        }

        let (namespace, root) = match namespace {
            Some(Namespace::Ipfs) | None => {
                // bare roots default to the content namespace, but only
                // when they actually parse as a CID
                let cid = Cid::try_from(root)
                    .map_err(|_| InvalidPathError::InvalidCid(root.to_string()))?;
                (Namespace::Ipfs, Root::Cid(cid))
            }
            Some(Namespace::Ipns) => {
                let name = PublicKey::from_hex(root)
                    .map_err(|_| InvalidPathError::InvalidName(root.to_string()))?;
                (Namespace::Ipns, Root::Name(name))
            }
        };

        Ok(Self {
            namespace,
            root,
            segments,
        })
    }
}

impl fmt::Display for IpfsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace.prefix())?;
        match &self.root {
            Root::Cid(cid) => write!(f, "{}", cid)?,
            Root::Name(name) => write!(f, "{}", name)?,
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::crypto::SecretKey;
    use common::linked_data::{cid_for_block, RAW_CODE};

    fn some_cid() -> Cid {
        cid_for_block(RAW_CODE, b"path tests")
    }

    fn some_name() -> PublicKey {
        SecretKey::from([7u8; 32]).public()
    }

    #[test]
    fn test_parse_content_path() {
        let cid = some_cid();
        let path: IpfsPath = format!("/ipfs/{}", cid).parse().unwrap();

        assert_eq!(path.namespace(), Namespace::Ipfs);
        assert_eq!(path.root_cid(), Some(&cid));
        assert!(path.segments().is_empty());
    }

    #[test]
    fn test_parse_bare_cid_defaults_to_content() {
        let cid = some_cid();
        let path: IpfsPath = cid.to_string().parse().unwrap();

        assert_eq!(path.namespace(), Namespace::Ipfs);
        assert_eq!(path.root_cid(), Some(&cid));
    }

    #[test]
    fn test_parse_segments_preserved_in_order() {
        let cid = some_cid();
        let path: IpfsPath = format!("/ipfs/{}/links/by/name", cid).parse().unwrap();

        assert_eq!(path.segments(), ["links", "by", "name"]);
    }

    #[test]
    fn test_parse_trailing_slash_tolerated() {
        let cid = some_cid();
        let with: IpfsPath = format!("/ipfs/{}/a/", cid).parse().unwrap();
        let without: IpfsPath = format!("/ipfs/{}/a", cid).parse().unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_parse_name_path() {
        let name = some_name();
        let path: IpfsPath = format!("/ipns/{}/sub", name.to_hex()).parse().unwrap();

        assert_eq!(path.namespace(), Namespace::Ipns);
        assert_eq!(path.root_name(), Some(&name));
        assert_eq!(path.segments(), ["sub"]);
    }

    #[test]
    fn test_parse_failures() {
        assert_eq!("".parse::<IpfsPath>(), Err(InvalidPathError::Empty));
        assert!(matches!(
            "/ipfs/".parse::<IpfsPath>(),
            Err(InvalidPathError::Malformed(_))
        ));
        assert!(matches!(
            "/".parse::<IpfsPath>(),
            Err(InvalidPathError::Malformed(_))
        ));
        assert!(matches!(
            "/dag/whatever".parse::<IpfsPath>(),
            Err(InvalidPathError::Malformed(_))
        ));
        assert!(matches!(
            "/ipfs/not-a-cid".parse::<IpfsPath>(),
            Err(InvalidPathError::InvalidCid(_))
        ));
        assert!(matches!(
            "not-a-cid-either".parse::<IpfsPath>(),
            Err(InvalidPathError::InvalidCid(_))
        ));
        assert!(matches!(
            "/ipns/zz-not-a-key".parse::<IpfsPath>(),
            Err(InvalidPathError::InvalidName(_))
        ));
        // empty interior segment
        let cid = some_cid();
        assert!(matches!(
            format!("/ipfs/{}//x", cid).parse::<IpfsPath>(),
            Err(InvalidPathError::Malformed(_))
        ));
    }

    #[test]
    fn test_display_round_trip() {
        let cid = some_cid();
        let name = some_name();

        for input in [
            format!("/ipfs/{}", cid),
            format!("/ipfs/{}/mercury/venus", cid),
            format!("/ipns/{}", name.to_hex()),
            format!("/ipns/{}/deep/path", name.to_hex()),
        ] {
            let path: IpfsPath = input.parse().unwrap();
            assert_eq!(path.to_string(), input);
            let reparsed: IpfsPath = path.to_string().parse().unwrap();
            assert_eq!(reparsed, path);
        }

        // bare CIDs render in canonical /ipfs/ form
        let bare: IpfsPath = cid.to_string().parse().unwrap();
        assert_eq!(bare.to_string(), format!("/ipfs/{}", cid));
    }

    #[test]
    fn test_join_appends_segments() {
        let cid = some_cid();
        let path: IpfsPath = format!("/ipfs/{}/a", cid).parse().unwrap();
        let joined = path.join(&["b".to_string(), "c".to_string()]);
        assert_eq!(joined.segments(), ["a", "b", "c"]);
    }

    #[test]
    fn test_parse_is_deterministic() {
        let cid = some_cid();
        let input = format!("/ipfs/{}/x/y", cid);
        let a: IpfsPath = input.parse().unwrap();
        let b: IpfsPath = input.parse().unwrap();
        assert_eq!(a, b);
    }
}
