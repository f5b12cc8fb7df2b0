//! Typed identifiers that bridge cluster resources and OVN objects
//!
//! OVN objects are named after the cluster resources that own them:
//! - pod ports and pod IP records: `<pod>.<namespace>`
//! - node ports and node IP records: `node-<node>`
//! - load balancer VIPs: `<clusterIP>:<port>`
//! - port group owners: `<namespace>/<name>`
//!
//! Each derivation is defined once here together with its inverse.

use std::fmt;

/// Prefix carried by node port and node IP record names
pub const NODE_PREFIX: &str = "node-";

/// Name of a logical switch port, which is also the name of its IP record
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PortKey {
    /// Port of a pod: `<pod>.<namespace>`
    Pod {
        /// Pod name
        name: String,
        /// Pod namespace
        namespace: String,
    },
    /// Port of a node: `node-<node>`
    Node(String),
}

impl PortKey {
    /// Key for a pod's port
    pub fn pod(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self::Pod {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Key for a node's port
    pub fn node(name: impl Into<String>) -> Self {
        Self::Node(name.into())
    }

    /// Classify a port or IP record name.
    ///
    /// Names containing a `.` are pod keys; namespaces are DNS labels and
    /// cannot contain dots, so the split happens at the last one. Names
    /// without a dot are node keys when they carry the `node-` prefix.
    /// Anything else is not a key this collector manages.
    pub fn parse(raw: &str) -> Option<Self> {
        if let Some((name, namespace)) = raw.rsplit_once('.') {
            if name.is_empty() || namespace.is_empty() {
                return None;
            }
            return Some(Self::pod(name, namespace));
        }
        match raw.strip_prefix(NODE_PREFIX) {
            Some(node) if !node.is_empty() => Some(Self::node(node)),
            _ => None,
        }
    }

    /// Node name if this key names a node
    pub fn node_name(&self) -> Option<&str> {
        match self {
            Self::Node(name) => Some(name),
            Self::Pod { .. } => None,
        }
    }
}

impl fmt::Display for PortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pod { name, namespace } => write!(f, "{}.{}", name, namespace),
            Self::Node(name) => write!(f, "{}{}", NODE_PREFIX, name),
        }
    }
}

/// Load balancer VIP key: `<clusterIP>:<port>`, with IPv6 addresses in
/// brackets (`[fd00::1]:443`) as OVN stores them
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VipKey {
    /// Service cluster IP
    pub ip: String,
    /// Service port
    pub port: i32,
}

impl VipKey {
    /// Create a VIP key
    pub fn new(ip: impl Into<String>, port: i32) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }

    /// Parse `<ip>:<port>` or `[<ipv6>]:<port>`, splitting at the last colon
    pub fn parse(raw: &str) -> Option<Self> {
        let (ip, port) = raw.rsplit_once(':')?;
        let port = port.parse().ok()?;
        let ip = match ip.strip_prefix('[') {
            Some(rest) => rest.strip_suffix(']')?,
            None => ip,
        };
        if ip.is_empty() {
            return None;
        }
        Some(Self::new(ip, port))
    }
}

impl fmt::Display for VipKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ip.contains(':') {
            write!(f, "[{}]:{}", self.ip, self.port)
        } else {
            write!(f, "{}:{}", self.ip, self.port)
        }
    }
}

/// Key of the network policy that owns a port group: `<namespace>/<name>`
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PolicyKey {
    /// Policy namespace
    pub namespace: String,
    /// Policy name
    pub name: String,
}

impl PolicyKey {
    /// Create a policy key
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Parse `<namespace>/<name>`
    pub fn parse(raw: &str) -> Option<Self> {
        let (namespace, name) = raw.split_once('/')?;
        if namespace.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(namespace, name))
    }
}

impl fmt::Display for PolicyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}
