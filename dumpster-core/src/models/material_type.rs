use serde::{Deserialize, Serialize};

use super::SizeClass;

/// Debris category accepted by a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaterialType {
    ConstructionDemo,
    CleanConcrete,
    CleanDirt,
    CleanBrick,
    Asphalt,
    TreesBrush,
    Mixed,
}

impl MaterialType {
    pub const ALL: [Self; 7] = [
        Self::ConstructionDemo,
        Self::CleanConcrete,
        Self::CleanDirt,
        Self::CleanBrick,
        Self::Asphalt,
        Self::TreesBrush,
        Self::Mixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConstructionDemo => "construction-demo",
            Self::CleanConcrete => "clean-concrete",
            Self::CleanDirt => "clean-dirt",
            Self::CleanBrick => "clean-brick",
            Self::Asphalt => "asphalt",
            Self::TreesBrush => "trees-brush",
            Self::Mixed => "mixed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == s)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ConstructionDemo => "Construction Demo",
            Self::CleanConcrete => "Clean Concrete",
            Self::CleanDirt => "Clean Dirt",
            Self::CleanBrick => "Clean Brick Only",
            Self::Asphalt => "Asphalt Only",
            Self::TreesBrush => "Trees/Brush Only",
            Self::Mixed => "Mixed Asph/Conc/Dirt/Brick",
        }
    }

    /// Container sizes a hauler will drop for this material. Heavy loads
    /// (concrete, dirt) are capped at 20 yards.
    pub fn supported_sizes(&self) -> &'static [SizeClass] {
        use SizeClass::*;
        match self {
            Self::ConstructionDemo => &[Yards5, Yards10, Yards15, Yards20, Yards30, Yards40],
            Self::CleanConcrete | Self::CleanDirt => &[Yards10, Yards15, Yards20],
            Self::CleanBrick | Self::Asphalt | Self::Mixed => &[Yards5, Yards10, Yards15, Yards20],
            Self::TreesBrush => &[Yards10, Yards15, Yards20, Yards30, Yards40],
        }
    }

    pub fn supports(
        &self,
        size: SizeClass,
    ) -> bool {
        self.supported_sizes().contains(&size)
    }
}

impl std::fmt::Display for MaterialType {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_round_trips_every_identifier() {
        for material in MaterialType::ALL {
            assert_eq!(MaterialType::parse(material.as_str()), Some(material));
        }
    }

    #[test]
    fn heavy_materials_stop_at_twenty_yards() {
        assert!(!MaterialType::CleanConcrete.supports(SizeClass::Yards30));
        assert!(!MaterialType::CleanDirt.supports(SizeClass::Yards5));
        assert!(MaterialType::CleanDirt.supports(SizeClass::Yards20));
    }

    #[test]
    fn trees_brush_has_no_five_yard_container() {
        assert!(!MaterialType::TreesBrush.supports(SizeClass::Yards5));
        assert!(MaterialType::TreesBrush.supports(SizeClass::Yards40));
    }
}
