//! Operation tags and the server-side scripts that execute them.

use std::fmt;
use std::sync::LazyLock;

use redis::Script;

/// The operation a script call performs, passed as `ARGV[1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Remove,
    Contains,
    IsEmpty,
    Len,
    Clear,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Remove => "Remove",
            Self::Contains => "Contains",
            Self::IsEmpty => "IsEmpty",
            Self::Len => "Len",
            Self::Clear => "Clear",
        }
    }

    /// Whether the operation takes a member as `ARGV[2]`.
    pub fn takes_member(&self) -> bool {
        matches!(self, Self::Add | Self::Remove | Self::Contains)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

static BITMAP32: LazyLock<Script> = LazyLock::new(|| Script::new(include_str!("lua/bitmap32.lua")));
static BITMAP64: LazyLock<Script> = LazyLock::new(|| Script::new(include_str!("lua/bitmap64.lua")));

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::W32 {}
    impl Sealed for super::W64 {}
}

/// Member width of a distributed bitmap, selecting its member type and script.
pub trait Width: sealed::Sealed + Send + Sync + 'static {
    type Member: Copy + fmt::Display + fmt::Debug + Send + Sync + 'static;

    /// The script serving every operation at this width.
    fn script() -> &'static Script;
}

/// 32-bit members, stored as a Redis string bitmap (one bit per member).
#[derive(Debug, Clone, Copy)]
pub enum W32 {}

/// 64-bit members, stored as a Redis set.
#[derive(Debug, Clone, Copy)]
pub enum W64 {}

impl Width for W32 {
    type Member = u32;

    fn script() -> &'static Script {
        &BITMAP32
    }
}

impl Width for W64 {
    type Member = u64;

    fn script() -> &'static Script {
        &BITMAP64
    }
}
