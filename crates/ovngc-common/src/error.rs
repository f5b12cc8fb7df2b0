//! Error types for the OVN garbage collector
//!
//! Errors carry the identifiers needed to trace a failed pass back to the
//! object or command that caused it.

use thiserror::Error;

/// Main error type for garbage collection operations
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// An `ovn-nbctl` invocation failed or timed out
    #[error("ovn-nbctl {command} failed: {message}")]
    Ovn {
        /// The nbctl subcommand and its arguments
        command: String,
        /// stderr output or spawn/timeout description
        message: String,
    },

    /// A value read from the SDN database or cluster could not be parsed
    #[error("failed to parse {kind} from {value:?}")]
    Parse {
        /// What was being parsed (e.g. "static route", "vip map")
        kind: &'static str,
        /// The offending input
        value: String,
    },

    /// Looking up a configured load balancer failed
    #[error("failed to look up load balancer {name}: {message}")]
    LoadBalancerLookup {
        /// Configured load balancer name
        name: String,
        /// Description of the failure
        message: String,
    },

    /// Another garbage collection pass is still running
    #[error("a garbage collection pass is already in progress")]
    GcInProgress,

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error with context
    #[error("internal error [{context}]: {message}")]
    Internal {
        /// Where the error happened
        context: String,
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create an nbctl error for the given command
    pub fn ovn(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Ovn {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse(kind: &'static str, value: impl Into<String>) -> Self {
        Self::Parse {
            kind,
            value: value.into(),
        }
    }

    /// Create a load balancer lookup error
    pub fn lb_lookup(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::LoadBalancerLookup {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an internal error with context
    pub fn internal(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Internal {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Whether a retry of the same operation could succeed.
    ///
    /// Parse and configuration errors are deterministic; everything that
    /// crosses a process or network boundary is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Kube { .. } | Self::Ovn { .. } | Self::LoadBalancerLookup { .. } => true,
            Self::GcInProgress => true,
            Self::Parse { .. } | Self::Config(_) | Self::Internal { .. } => false,
        }
    }
}

/// Returns true when a kube error is an API 404.
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 404)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ovn_error_names_the_command() {
        let err = Error::ovn("lsp-del web.default", "connection refused");
        assert_eq!(
            err.to_string(),
            "ovn-nbctl lsp-del web.default failed: connection refused"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn parse_errors_are_not_retryable() {
        let err = Error::parse("static route", "garbage");
        assert!(err.to_string().contains("static route"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn lb_lookup_error_includes_name() {
        let err = Error::lb_lookup("cluster-tcp-loadbalancer", "timed out");
        assert!(err.to_string().contains("cluster-tcp-loadbalancer"));
    }

    #[test]
    fn not_found_detection() {
        let err = kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "ips.kubeovn.io \"web.default\" not found".to_string(),
            reason: "NotFound".to_string(),
            code: 404,
        });
        assert!(is_not_found(&err));

        let err = kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "forbidden".to_string(),
            reason: "Forbidden".to_string(),
            code: 403,
        });
        assert!(!is_not_found(&err));
    }
}
