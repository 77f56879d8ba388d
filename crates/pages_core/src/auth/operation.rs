//! Call classification for the authorization gate.

/// Every operation exposed to the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operation {
    Register,
    Connect,
    PageList,
    PageGet,
    PageCreate,
    PageUpdate,
    PageDelete,
}

const ALL_OPERATIONS: &[Operation] = &[
    Operation::Register,
    Operation::Connect,
    Operation::PageList,
    Operation::PageGet,
    Operation::PageCreate,
    Operation::PageUpdate,
    Operation::PageDelete,
];

impl Operation {
    /// Fully qualified method name as routed by the transport.
    pub fn full_method(self) -> &'static str {
        match self {
            Self::Register => "/Accounts/Register",
            Self::Connect => "/Accounts/Connect",
            Self::PageList => "/Pages/PageList",
            Self::PageGet => "/Pages/PageGet",
            Self::PageCreate => "/Pages/PageCreate",
            Self::PageUpdate => "/Pages/PageUpdate",
            Self::PageDelete => "/Pages/PageDelete",
        }
    }

    /// Parses a fully qualified method name. Matching is exact.
    pub fn from_full_method(method: &str) -> Option<Self> {
        ALL_OPERATIONS
            .iter()
            .copied()
            .find(|operation| operation.full_method() == method)
    }

    /// Public calls run without a token.
    pub fn is_public(self) -> bool {
        matches!(
            self,
            Self::Register | Self::Connect | Self::PageList | Self::PageGet
        )
    }

    pub fn all() -> &'static [Operation] {
        ALL_OPERATIONS
    }
}
