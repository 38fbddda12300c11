//! Nesting-depth visual tiers. Unrelated to duration severity.

use colored::Color;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DepthTier {
    Root,
    Child,
    Grandchild,
    GreatGrandchild,
    Deep,
}

impl DepthTier {
    /// Depth 0..=3 map to their own tier, anything deeper shares `Deep`
    pub fn from_depth(depth: usize) -> Self {
        match depth {
            0 => DepthTier::Root,
            1 => DepthTier::Child,
            2 => DepthTier::Grandchild,
            3 => DepthTier::GreatGrandchild,
            _ => DepthTier::Deep,
        }
    }

    pub fn color(self) -> Color {
        match self {
            DepthTier::Root => Color::BrightWhite,
            DepthTier::Child => Color::BrightBlue,
            DepthTier::Grandchild => Color::Blue,
            DepthTier::GreatGrandchild => Color::Magenta,
            DepthTier::Deep => Color::BrightBlack,
        }
    }

    /// Tree marker drawn before the span row
    pub fn marker(self) -> &'static str {
        match self {
            DepthTier::Root => "●",
            DepthTier::Child => "├─",
            DepthTier::Grandchild => "├──",
            DepthTier::GreatGrandchild => "├───",
            DepthTier::Deep => "└┄",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_depth() {
        assert_eq!(DepthTier::from_depth(0), DepthTier::Root);
        assert_eq!(DepthTier::from_depth(1), DepthTier::Child);
        assert_eq!(DepthTier::from_depth(2), DepthTier::Grandchild);
        assert_eq!(DepthTier::from_depth(3), DepthTier::GreatGrandchild);
        assert_eq!(DepthTier::from_depth(4), DepthTier::Deep);
        assert_eq!(DepthTier::from_depth(40), DepthTier::Deep);
    }
}
