use std::path::Path;

use serde::Deserialize;

use crate::error::CatalogError;

/// Catalog shipped inside the binary, used when no `--catalog` is given.
const BUILTIN_CATALOG: &str = include_str!("../assets/animations.json");

/// One horizontal strip of the sprite sheet.
///
/// Frames are `num_frames` consecutive cells starting at column 0 of `row`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnimationDef {
    pub name: String,
    pub row: u32,
    #[serde(rename = "numFrames")]
    pub num_frames: u32,
}

/// Ordered, immutable list of selectable animations.
#[derive(Debug, Clone)]
pub struct Catalog {
    animations: Vec<AnimationDef>,
}

impl Catalog {
    /// Build from already-parsed records. Order is preserved.
    pub fn new(animations: Vec<AnimationDef>) -> Result<Self, CatalogError> {
        if animations.is_empty() {
            return Err(CatalogError::Empty);
        }
        if let Some(bad) = animations.iter().find(|a| a.num_frames == 0) {
            return Err(CatalogError::NoFrames {
                name: bad.name.clone(),
            });
        }
        Ok(Self { animations })
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let animations: Vec<AnimationDef> = serde_json::from_str(json)?;
        Self::new(animations)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&json)?;
        log::info!(
            "Loaded {} animations from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Look up an animation by exact name.
    pub fn find(&self, name: &str) -> Option<&AnimationDef> {
        self.animations.iter().find(|a| a.name == name)
    }

    /// First entry. Always present, construction rejects empty catalogs.
    pub fn first(&self) -> &AnimationDef {
        &self.animations[0]
    }

    /// Names in catalog order, for populating the selection control.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.animations.iter().map(|a| a.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SMALL: &str = r#"[
        {"name": "idle", "row": 0, "numFrames": 2},
        {"name": "dizzy", "row": 3, "numFrames": 6}
    ]"#;

    #[test]
    fn parses_in_order() {
        let catalog = Catalog::from_json(SMALL).unwrap();
        assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["idle", "dizzy"]);
        assert_eq!(catalog.first().name, "idle");
    }

    #[test]
    fn find_by_name() {
        let catalog = Catalog::from_json(SMALL).unwrap();
        let dizzy = catalog.find("dizzy").unwrap();
        assert_eq!(dizzy.row, 3);
        assert_eq!(dizzy.num_frames, 6);
        assert!(catalog.find("sleep").is_none());
    }

    #[test]
    fn rejects_empty_and_frameless() {
        assert!(matches!(Catalog::from_json("[]"), Err(CatalogError::Empty)));
        let err = Catalog::from_json(r#"[{"name": "x", "row": 1, "numFrames": 0}]"#).unwrap_err();
        assert!(matches!(err, CatalogError::NoFrames { ref name } if name == "x"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            Catalog::from_json(r#"[{"name": "x"}]"#),
            Err(CatalogError::Json(_))
        ));
    }

    #[test]
    fn builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.len(), 10);
        assert!(catalog.find("dizzy").is_some());
        assert!(catalog.find("there is no meaning in life").is_some());
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("animations.json");
        std::fs::write(&path, SMALL).unwrap();
        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 2);

        let missing = Catalog::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, CatalogError::Io { .. }));
    }
}
